//! Price observations and per-symbol series.

use chrono::NaiveDate;

/// One observation for an instrument. Either price may be missing when the
/// provider omitted it.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub close: Option<f64>,
}

impl PriceBar {
    pub fn new(date: NaiveDate, open: Option<f64>, close: Option<f64>) -> Self {
        Self { date, open, close }
    }

    /// Bar with only a close, open missing.
    pub fn close_only(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: None,
            close: Some(close),
        }
    }

    /// Close price if present and finite.
    pub fn valid_close(&self) -> Option<f64> {
        self.close.filter(|c| c.is_finite())
    }

    /// Open price if present and finite.
    pub fn valid_open(&self) -> Option<f64> {
        self.open.filter(|o| o.is_finite())
    }
}

/// Observations for one symbol, ascending by date, one bar per date.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Sorts `bars` by date. For duplicate dates the last bar supplied wins.
    pub fn new(symbol: impl Into<String>, mut bars: Vec<PriceBar>) -> Self {
        // stable sort keeps supply order within a date
        bars.sort_by_key(|b| b.date);
        let mut deduped: Vec<PriceBar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(prev) if prev.date == bar.date => *prev = bar,
                _ => deduped.push(bar),
            }
        }
        Self {
            symbol: symbol.into(),
            bars: deduped,
        }
    }

    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            bars: Vec::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// Present, finite closes in date order.
    pub fn valid_closes(&self) -> Vec<f64> {
        self.bars.iter().filter_map(PriceBar::valid_close).collect()
    }

    /// (first date, last date, bar count), or `None` when empty.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate, usize)> {
        match (self.bars.first(), self.bars.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date, self.bars.len())),
            _ => None,
        }
    }

    pub fn into_bars(self) -> Vec<PriceBar> {
        self.bars
    }
}
