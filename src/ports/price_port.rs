//! Price fetch port trait.

use crate::domain::error::MoversError;
use crate::domain::interval::FetchWindow;
use crate::domain::price::PriceSeries;
use chrono::NaiveDate;

pub trait PricePort {
    /// Daily bars for `symbol` inside `window`. An empty series is a valid
    /// answer; errors are per symbol.
    fn fetch_series(&self, symbol: &str, window: &FetchWindow)
        -> Result<PriceSeries, MoversError>;

    fn list_symbols(&self) -> Result<Vec<String>, MoversError>;

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, MoversError>;

    /// Default implementation: one `fetch_series` call per symbol, in order.
    fn fetch_many(
        &self,
        symbols: &[String],
        window: &FetchWindow,
    ) -> Vec<(String, Result<PriceSeries, MoversError>)> {
        symbols
            .iter()
            .map(|symbol| (symbol.clone(), self.fetch_series(symbol, window)))
            .collect()
    }
}
