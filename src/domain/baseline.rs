//! Baseline selection: which two observations of a series a variation is
//! measured between.
//!
//! | mode             | baseline                        | current               |
//! |------------------|---------------------------------|-----------------------|
//! | `previous_close` | second-to-last valid close      | last valid close      |
//! | `open`           | open of the last bar            | close of the last bar |
//! | `lookback:N`     | valid close N observations back | last valid close      |
//! | `window_start`   | first valid close in the window | last valid close      |
//!
//! When baseline and current would be the same observation the baseline is
//! reported as missing.

use std::fmt;
use std::str::FromStr;

use crate::domain::instrument::Instrument;
use crate::domain::price::PriceSeries;
use crate::domain::variation::VariationInput;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid baseline '{0}' (expected previous_close, open, lookback:N or window_start)")]
pub struct BaselineParseError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Baseline {
    #[default]
    PreviousClose,
    SessionOpen,
    /// Close this many valid observations before the last one. Never zero.
    LookbackClose(usize),
    WindowStart,
}

/// Prices a variation is computed from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceReferences {
    pub baseline: Option<f64>,
    pub current: Option<f64>,
}

impl Baseline {
    pub fn references(&self, series: &PriceSeries) -> PriceReferences {
        match self {
            Baseline::SessionOpen => match series.last() {
                Some(bar) => PriceReferences {
                    baseline: bar.valid_open(),
                    current: bar.valid_close(),
                },
                None => PriceReferences {
                    baseline: None,
                    current: None,
                },
            },
            Baseline::PreviousClose => lookback(&series.valid_closes(), 1),
            Baseline::LookbackClose(n) => lookback(&series.valid_closes(), *n),
            Baseline::WindowStart => {
                let closes = series.valid_closes();
                lookback(&closes, closes.len().saturating_sub(1))
            }
        }
    }

    pub fn variation_input(&self, instrument: &Instrument, series: &PriceSeries) -> VariationInput {
        let refs = self.references(series);
        VariationInput {
            instrument: instrument.clone(),
            baseline: refs.baseline,
            current: refs.current,
        }
    }

    /// Valid closes a series needs before this baseline can resolve.
    pub fn min_observations(&self) -> usize {
        match self {
            Baseline::SessionOpen => 1,
            Baseline::LookbackClose(n) => n.saturating_add(1),
            Baseline::PreviousClose | Baseline::WindowStart => 2,
        }
    }

    /// Human readable label for report headers.
    pub fn describe(&self) -> String {
        match self {
            Baseline::PreviousClose => "last close vs previous close".to_string(),
            Baseline::SessionOpen => "last close vs session open".to_string(),
            Baseline::LookbackClose(n) => format!("last close vs close {n} bars back"),
            Baseline::WindowStart => "last close vs first close in window".to_string(),
        }
    }
}

fn lookback(closes: &[f64], n: usize) -> PriceReferences {
    let current = closes.last().copied();
    let baseline = if n == 0 {
        None
    } else {
        closes
            .len()
            .checked_sub(n + 1)
            .map(|idx| closes[idx])
    };
    PriceReferences { baseline, current }
}

impl fmt::Display for Baseline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Baseline::PreviousClose => f.write_str("previous_close"),
            Baseline::SessionOpen => f.write_str("open"),
            Baseline::LookbackClose(n) => write!(f, "lookback:{n}"),
            Baseline::WindowStart => f.write_str("window_start"),
        }
    }
}

impl FromStr for Baseline {
    type Err = BaselineParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lower = value.trim().to_ascii_lowercase();
        match lower.as_str() {
            "previous_close" => Ok(Baseline::PreviousClose),
            "open" => Ok(Baseline::SessionOpen),
            "window_start" => Ok(Baseline::WindowStart),
            other => other
                .strip_prefix("lookback:")
                .and_then(|n| n.trim().parse::<usize>().ok())
                .filter(|n| *n >= 1)
                .map(Baseline::LookbackClose)
                .ok_or_else(|| BaselineParseError(value.to_string())),
        }
    }
}
