//! Records handed to presentation adapters.

use crate::domain::ranker::{Movers, RankedSet};
use crate::domain::variation::Unavailable;

#[derive(Debug, Clone, PartialEq)]
pub struct MoverRecord {
    pub instrument_name: String,
    pub symbol: String,
    pub category: Option<String>,
    pub last_price: f64,
    pub percent_change: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnavailableRecord {
    pub instrument_name: String,
    pub symbol: String,
    pub reason: Unavailable,
}

/// Everything a renderer needs for one gainers/losers view.
#[derive(Debug, Clone, PartialEq)]
pub struct MoversReport {
    pub k: usize,
    pub baseline: String,
    pub gainers: Vec<MoverRecord>,
    pub losers: Vec<MoverRecord>,
    pub unavailable: Vec<UnavailableRecord>,
}

fn records(set: &RankedSet) -> Vec<MoverRecord> {
    set.entries
        .iter()
        .map(|entry| MoverRecord {
            instrument_name: entry.result.instrument.name.clone(),
            symbol: entry.result.instrument.symbol.clone(),
            category: entry.result.instrument.category.clone(),
            // ranked entries always carry a current price
            last_price: entry.result.current_price.unwrap_or(f64::NAN),
            percent_change: entry.percent_change,
        })
        .collect()
}

impl MoversReport {
    pub fn new(movers: &Movers, baseline: impl Into<String>) -> Self {
        Self {
            k: movers.k,
            baseline: baseline.into(),
            gainers: records(&movers.gainers),
            losers: records(&movers.losers),
            unavailable: movers
                .unavailable
                .iter()
                .map(|u| UnavailableRecord {
                    instrument_name: u.result.instrument.name.clone(),
                    symbol: u.result.instrument.symbol.clone(),
                    reason: u.reason,
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.gainers.is_empty() && self.losers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::instrument::Instrument;
    use crate::domain::ranker::rank;
    use crate::domain::variation::{compute_variations, VariationInput};

    #[test]
    fn builds_records_from_movers() {
        let results = compute_variations(vec![
            VariationInput {
                instrument: Instrument::new("GC=F").with_name("Gold").with_category("Metals"),
                baseline: Some(2000.0),
                current: Some(2100.0),
            },
            VariationInput {
                instrument: Instrument::new("X"),
                baseline: None,
                current: Some(1.0),
            },
        ]);
        let report = MoversReport::new(&rank(&results, 5), "previous close");

        assert_eq!(report.k, 5);
        assert_eq!(report.gainers.len(), 1);
        let gold = &report.gainers[0];
        assert_eq!(gold.instrument_name, "Gold");
        assert_eq!(gold.category.as_deref(), Some("Metals"));
        assert_eq!(gold.last_price, 2100.0);
        assert!((gold.percent_change - 5.0).abs() < 1e-9);
        assert_eq!(report.losers, report.gainers);
        assert_eq!(report.unavailable.len(), 1);
        assert_eq!(report.unavailable[0].reason, Unavailable::MissingData);
        assert!(!report.is_empty());
    }
}
