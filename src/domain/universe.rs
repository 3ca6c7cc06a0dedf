//! Instrument universe: parsing from configuration and batch fetching.
//!
//! A fetch never fails as a whole. Symbols whose fetch errors, that come back
//! empty, or that have fewer valid closes than the baseline needs are logged
//! and listed in [`Snapshot::skipped`]. They still produce an (unavailable)
//! variation result downstream so every instrument is accounted for.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::domain::baseline::Baseline;
use crate::domain::instrument::Instrument;
use crate::domain::interval::FetchWindow;
use crate::domain::price::PriceSeries;
use crate::domain::variation::{compute_variations, VariationResult};
use crate::ports::price_port::PricePort;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Universe {
    pub instruments: Vec<Instrument>,
}

impl Universe {
    pub fn new(instruments: Vec<Instrument>) -> Self {
        Self { instruments }
    }

    pub fn count(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    pub fn symbols(&self) -> Vec<String> {
        self.instruments.iter().map(|i| i.symbol.clone()).collect()
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.instruments
            .iter()
            .filter_map(|i| i.category.as_deref())
            .filter(|c| seen.insert(*c))
            .collect()
    }

    /// Keep only the instrument with `symbol` (case-insensitive).
    pub fn restrict_to(&self, symbol: &str) -> Universe {
        let wanted = symbol.trim().to_uppercase();
        let instruments: Vec<Instrument> = self
            .instruments
            .iter()
            .filter(|i| i.symbol == wanted)
            .cloned()
            .collect();
        if instruments.is_empty() {
            Universe::new(vec![Instrument::new(wanted)])
        } else {
            Universe::new(instruments)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in instrument list")]
    EmptyToken,

    #[error("empty symbol in instrument '{0}'")]
    EmptySymbol(String),

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),
}

/// Parse `SYMBOL[:Name[:Category]]` tokens separated by commas.
///
/// Blank input is an empty universe.
pub fn parse_instruments(input: &str) -> Result<Vec<Instrument>, UniverseError> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut instruments = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }

        let mut parts = trimmed.splitn(3, ':').map(str::trim);
        let symbol = parts.next().unwrap_or_default().to_uppercase();
        if symbol.is_empty() {
            return Err(UniverseError::EmptySymbol(trimmed.to_string()));
        }
        if !seen.insert(symbol.clone()) {
            return Err(UniverseError::DuplicateSymbol(symbol));
        }

        let mut instrument = Instrument::new(symbol);
        if let Some(name) = parts.next().filter(|n| !n.is_empty()) {
            instrument = instrument.with_name(name);
        }
        if let Some(category) = parts.next().filter(|c| !c.is_empty()) {
            instrument = instrument.with_category(category);
        }
        instruments.push(instrument);
    }

    Ok(instruments)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    FetchFailed { reason: String },
    NoData,
    InsufficientObservations { observations: usize, required: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: SkipReason,
}

/// Fetched series for every instrument of a universe, in universe order.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub entries: Vec<(Instrument, PriceSeries)>,
    pub skipped: Vec<SkippedSymbol>,
}

impl Snapshot {
    /// One variation result per instrument, in universe order.
    pub fn variations(&self, baseline: &Baseline) -> Vec<VariationResult> {
        compute_variations(
            self.entries
                .iter()
                .map(|(instrument, series)| baseline.variation_input(instrument, series)),
        )
    }

    pub fn series(&self, symbol: &str) -> Option<&PriceSeries> {
        self.entries
            .iter()
            .find(|(i, _)| i.symbol == symbol)
            .map(|(_, s)| s)
    }
}

pub fn fetch_universe(
    port: &dyn PricePort,
    universe: &Universe,
    window: &FetchWindow,
    baseline: &Baseline,
) -> Snapshot {
    if universe.is_empty() {
        warn!("instrument universe is empty, nothing to fetch");
    }

    let symbols = universe.symbols();
    let fetched = port.fetch_many(&symbols, window);

    let mut entries = Vec::with_capacity(universe.count());
    let mut skipped = Vec::new();

    for (instrument, (symbol, outcome)) in universe.instruments.iter().zip(fetched) {
        let series = match outcome {
            Ok(series) => window.interval.resample(&series),
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "skipping instrument, fetch failed");
                skipped.push(SkippedSymbol {
                    symbol: symbol.clone(),
                    reason: SkipReason::FetchFailed {
                        reason: e.to_string(),
                    },
                });
                entries.push((instrument.clone(), PriceSeries::empty(symbol)));
                continue;
            }
        };

        let observations = series.valid_closes().len();
        let required = baseline.min_observations();
        if series.is_empty() {
            warn!(symbol = %symbol, "no data in window");
            skipped.push(SkippedSymbol {
                symbol: symbol.clone(),
                reason: SkipReason::NoData,
            });
        } else if observations < required {
            warn!(
                symbol = %symbol,
                observations,
                required,
                baseline = %baseline,
                "not enough observations for baseline"
            );
            skipped.push(SkippedSymbol {
                symbol: symbol.clone(),
                reason: SkipReason::InsufficientObservations {
                    observations,
                    required,
                },
            });
        } else {
            debug!(symbol = %symbol, bars = series.len(), "fetched");
        }
        entries.push((instrument.clone(), series));
    }

    if !skipped.is_empty() {
        info!(
            usable = universe.count() - skipped.len(),
            total = universe.count(),
            "fetched universe with skipped symbols"
        );
    }

    Snapshot { entries, skipped }
}
