//! CSV file price adapter.
//!
//! One file per symbol, `<base>/<SYMBOL>.csv`. Columns are located by header
//! name: `date`, `open` and `close` (falling back to `adj close`), case
//! insensitive. Empty cells, `nan` and `null` are missing prices.

use crate::domain::error::MoversError;
use crate::domain::interval::FetchWindow;
use crate::domain::price::{PriceBar, PriceSeries};
use crate::ports::price_port::PricePort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

pub struct CsvAdapter {
    base_path: PathBuf,
}

struct Columns {
    date: usize,
    open: Option<usize>,
    close: usize,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    fn read_series(&self, symbol: &str) -> Result<PriceSeries, MoversError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| MoversError::DataSource {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| MoversError::DataSource {
                reason: format!("CSV header error in {}: {}", path.display(), e),
            })?
            .clone();
        let columns = locate_columns(&headers).ok_or_else(|| MoversError::DataSource {
            reason: format!("{} needs date and close columns", path.display()),
        })?;

        let mut bars = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| MoversError::DataSource {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(columns.date).unwrap_or_default();
            let date = parse_date(date_str).ok_or_else(|| MoversError::DataSource {
                reason: format!("invalid date '{}' in {}", date_str, path.display()),
            })?;
            let open = match columns.open {
                Some(idx) => parse_price(record.get(idx), "open")?,
                None => None,
            };
            let close = parse_price(record.get(columns.close), "close")?;

            bars.push(PriceBar::new(date, open, close));
        }

        debug!(symbol, rows = bars.len(), path = %path.display(), "read csv");
        Ok(PriceSeries::new(symbol, bars))
    }
}

fn locate_columns(headers: &csv::StringRecord) -> Option<Columns> {
    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    };
    Some(Columns {
        date: find("date")?,
        open: find("open"),
        close: find("close").or_else(|| find("adj close"))?,
    })
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time part.
fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let date_part = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

fn parse_price(value: Option<&str>, column: &str) -> Result<Option<f64>, MoversError> {
    let raw = value.unwrap_or_default().trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") || raw.eq_ignore_ascii_case("null") {
        return Ok(None);
    }
    raw.parse::<f64>()
        .map(Some)
        .map_err(|e| MoversError::DataSource {
            reason: format!("invalid {} value '{}': {}", column, raw, e),
        })
}

impl PricePort for CsvAdapter {
    fn fetch_series(
        &self,
        symbol: &str,
        window: &FetchWindow,
    ) -> Result<PriceSeries, MoversError> {
        let series = self.read_series(symbol)?;
        let bars = series
            .into_bars()
            .into_iter()
            .filter(|b| window.contains(b.date))
            .collect();
        Ok(PriceSeries::new(symbol, bars))
    }

    fn list_symbols(&self) -> Result<Vec<String>, MoversError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| MoversError::DataSource {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| MoversError::DataSource {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(symbol) = name_str.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, MoversError> {
        if !self.csv_path(symbol).exists() {
            return Ok(None);
        }
        Ok(self.read_series(symbol)?.date_range())
    }
}
