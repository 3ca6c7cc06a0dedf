//! Top/bottom movers ranking.
//!
//! Unavailable results are excluded. Sorting is stable, so instruments with
//! equal changes keep their universe order in both directions.

use std::cmp::Ordering;

use crate::domain::variation::{Unavailable, VariationResult};

pub const DEFAULT_TOP: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Descending by percent change.
    Gainers,
    /// Ascending by percent change, most negative first.
    Losers,
}

/// A ranked entry. `percent_change` is the available change of `result`.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry {
    pub result: VariationResult,
    pub percent_change: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedSet {
    pub direction: Direction,
    pub entries: Vec<RankedEntry>,
}

impl RankedSet {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|e| e.result.instrument.symbol.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnavailableEntry {
    pub result: VariationResult,
    pub reason: Unavailable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Movers {
    pub k: usize,
    pub gainers: RankedSet,
    pub losers: RankedSet,
    pub unavailable: Vec<UnavailableEntry>,
}

impl Movers {
    /// Ranked instruments per direction, at most `k`.
    pub fn available_count(&self) -> usize {
        self.gainers.len().max(self.losers.len())
    }

    pub fn is_empty(&self) -> bool {
        self.gainers.is_empty() && self.losers.is_empty()
    }
}

fn by_change(a: &RankedEntry, b: &RankedEntry) -> Ordering {
    a.percent_change
        .partial_cmp(&b.percent_change)
        .unwrap_or(Ordering::Equal)
}

/// Top-`k` gainers and bottom-`k` losers of `results`.
pub fn rank(results: &[VariationResult], k: usize) -> Movers {
    let mut available = Vec::new();
    let mut unavailable = Vec::new();

    for result in results {
        match (result.percent_change(), result.unavailable_reason()) {
            (Some(pct), _) => available.push(RankedEntry {
                result: result.clone(),
                percent_change: pct,
            }),
            (None, Some(reason)) => unavailable.push(UnavailableEntry {
                result: result.clone(),
                reason,
            }),
            (None, None) => {}
        }
    }

    let mut gainers = available.clone();
    gainers.sort_by(|a, b| by_change(b, a));
    gainers.truncate(k);

    let mut losers = available;
    losers.sort_by(by_change);
    losers.truncate(k);

    Movers {
        k,
        gainers: RankedSet {
            direction: Direction::Gainers,
            entries: gainers,
        },
        losers: RankedSet {
            direction: Direction::Losers,
            entries: losers,
        },
        unavailable,
    }
}

/// Category used for instruments without one.
pub const UNCATEGORISED: &str = "Other";

/// Ranks each category independently. Groups appear in first-seen order.
pub fn rank_by_category(results: &[VariationResult], k: usize) -> Vec<(String, Movers)> {
    let mut groups: Vec<(String, Vec<VariationResult>)> = Vec::new();

    for result in results {
        let category = result
            .instrument
            .category
            .clone()
            .unwrap_or_else(|| UNCATEGORISED.to_string());
        match groups.iter_mut().find(|(name, _)| *name == category) {
            Some((_, members)) => members.push(result.clone()),
            None => groups.push((category, vec![result.clone()])),
        }
    }

    groups
        .into_iter()
        .map(|(category, members)| (category, rank(&members, k)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::instrument::Instrument;
    use crate::domain::variation::{compute_variation, VariationInput};
    use proptest::prelude::*;

    fn result(symbol: &str, baseline: f64, current: f64) -> VariationResult {
        compute_variation(VariationInput {
            instrument: Instrument::new(symbol),
            baseline: Some(baseline),
            current: Some(current),
        })
    }

    fn categorised(symbol: &str, category: Option<&str>, current: f64) -> VariationResult {
        let mut instrument = Instrument::new(symbol);
        instrument.category = category.map(str::to_string);
        compute_variation(VariationInput {
            instrument,
            baseline: Some(100.0),
            current: Some(current),
        })
    }

    #[test]
    fn orders_gainers_and_losers() {
        let results = vec![
            result("A", 100.0, 101.0),
            result("B", 100.0, 120.0),
            result("C", 100.0, 90.0),
            result("D", 100.0, 80.0),
            result("E", 100.0, 105.0),
        ];
        let movers = rank(&results, 2);
        assert_eq!(movers.gainers.symbols(), vec!["B", "E"]);
        assert_eq!(movers.losers.symbols(), vec!["D", "C"]);
        assert_eq!(movers.gainers.direction, Direction::Gainers);
        assert_eq!(movers.losers.direction, Direction::Losers);
    }

    #[test]
    fn excludes_unavailable() {
        let results = vec![
            result("X", 100.0, 110.0),
            result("Z", 0.0, 5.0),
            result("Y", 50.0, 45.0),
        ];
        let movers = rank(&results, 5);
        assert_eq!(movers.gainers.symbols(), vec!["X", "Y"]);
        assert_eq!(movers.losers.symbols(), vec!["Y", "X"]);
        assert_eq!(movers.unavailable.len(), 1);
        assert_eq!(movers.unavailable[0].result.instrument.symbol, "Z");
        assert_eq!(movers.unavailable[0].reason, Unavailable::DegenerateBaseline);
    }

    #[test]
    fn fewer_than_k_is_not_padded() {
        let results = vec![
            result("A", 100.0, 103.0),
            result("B", 100.0, 101.0),
            result("C", 100.0, 102.0),
        ];
        let movers = rank(&results, 5);
        assert_eq!(movers.gainers.symbols(), vec!["A", "C", "B"]);
        assert_eq!(movers.losers.symbols(), vec!["B", "C", "A"]);
        assert_eq!(movers.available_count(), 3);
    }

    #[test]
    fn empty_input_gives_empty_sets() {
        let movers = rank(&[], 5);
        assert!(movers.is_empty());
        assert!(movers.unavailable.is_empty());
    }

    #[test]
    fn zero_k_gives_empty_sets() {
        let movers = rank(&[result("A", 1.0, 2.0)], 0);
        assert!(movers.is_empty());
    }

    #[test]
    fn ties_keep_universe_order() {
        let results = vec![
            result("A", 100.0, 110.0),
            result("B", 50.0, 55.0),
            result("C", 10.0, 11.0),
            result("D", 100.0, 90.0),
        ];
        let movers = rank(&results, 4);
        assert_eq!(movers.gainers.symbols(), vec!["A", "B", "C", "D"]);
        assert_eq!(movers.losers.symbols(), vec!["D", "A", "B", "C"]);
    }

    #[test]
    fn groups_by_category_in_first_seen_order() {
        let results = vec![
            categorised("CL=F", Some("Energy"), 110.0),
            categorised("GC=F", Some("Metals"), 95.0),
            categorised("NG=F", Some("Energy"), 90.0),
            categorised("BTC", None, 150.0),
            categorised("SI=F", Some("Metals"), 105.0),
        ];
        let groups = rank_by_category(&results, 5);
        let names: Vec<_> = groups.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["Energy", "Metals", UNCATEGORISED]);
        assert_eq!(groups[0].1.gainers.symbols(), vec!["CL=F", "NG=F"]);
        assert_eq!(groups[1].1.losers.symbols(), vec!["GC=F", "SI=F"]);
        assert_eq!(groups[2].1.gainers.symbols(), vec!["BTC"]);
    }

    proptest! {
        #[test]
        fn length_and_ordering_hold(
            changes in prop::collection::vec(prop::option::of(-50.0f64..50.0), 0..30),
            k in 0usize..10,
        ) {
            let results: Vec<_> = changes
                .iter()
                .enumerate()
                .map(|(i, c)| match c {
                    Some(c) => result(&format!("S{i}"), 100.0, 100.0 + c),
                    None => result(&format!("S{i}"), 0.0, 1.0),
                })
                .collect();
            let available = changes.iter().filter(|c| c.is_some()).count();
            let movers = rank(&results, k);

            prop_assert_eq!(movers.gainers.len(), k.min(available));
            prop_assert_eq!(movers.losers.len(), k.min(available));
            prop_assert_eq!(movers.unavailable.len(), changes.len() - available);
            for pair in movers.gainers.entries.windows(2) {
                prop_assert!(pair[0].percent_change >= pair[1].percent_change);
            }
            for pair in movers.losers.entries.windows(2) {
                prop_assert!(pair[0].percent_change <= pair[1].percent_change);
            }
        }
    }
}
