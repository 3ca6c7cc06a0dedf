#![allow(dead_code)]

use chrono::NaiveDate;
use movers::domain::error::MoversError;
use movers::domain::interval::FetchWindow;
use movers::domain::price::{PriceBar, PriceSeries};
use movers::ports::price_port::PricePort;
use std::cell::RefCell;
use std::collections::HashMap;

pub struct MockPricePort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
    pub requests: RefCell<Vec<String>>,
}

impl MockPricePort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    /// Daily closes starting 2024-01-01, one per calendar day.
    pub fn with_closes(self, symbol: &str, closes: &[f64]) -> Self {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PriceBar::close_only(day(i), c))
            .collect();
        self.with_bars(symbol, bars)
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl PricePort for MockPricePort {
    fn fetch_series(
        &self,
        symbol: &str,
        window: &FetchWindow,
    ) -> Result<PriceSeries, MoversError> {
        self.requests.borrow_mut().push(symbol.to_string());
        if let Some(reason) = self.errors.get(symbol) {
            return Err(MoversError::DataSource {
                reason: reason.clone(),
            });
        }
        let bars = self
            .data
            .get(symbol)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|b| window.contains(b.date))
            .collect();
        Ok(PriceSeries::new(symbol, bars))
    }

    fn list_symbols(&self) -> Result<Vec<String>, MoversError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, MoversError> {
        Ok(self
            .data
            .get(symbol)
            .and_then(|bars| PriceSeries::new(symbol, bars.clone()).date_range()))
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// `offset` days after 2024-01-01.
pub fn day(offset: usize) -> NaiveDate {
    date(2024, 1, 1) + chrono::Duration::days(offset as i64)
}

pub fn bar(d: NaiveDate, open: Option<f64>, close: Option<f64>) -> PriceBar {
    PriceBar::new(d, open, close)
}

pub fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    use std::io::Write;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
