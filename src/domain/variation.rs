//! Percentage variation between a baseline and a current price.
//!
//! change = (current - baseline) / baseline * 100
//!
//! Full precision is kept; rounding is left to whoever renders the value.
//! Instruments without a usable baseline/current pair are tagged
//! [`Unavailable`] and never reported as 0%.

use std::fmt;

use crate::domain::instrument::Instrument;

/// Why no percent change could be computed for an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unavailable {
    /// Not enough observations for a baseline, or the current price is
    /// missing or not finite.
    MissingData,
    /// Baseline is zero or not finite.
    DegenerateBaseline,
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unavailable::MissingData => f.write_str("missing data"),
            Unavailable::DegenerateBaseline => f.write_str("degenerate baseline"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Variation {
    Change(f64),
    Unavailable(Unavailable),
}

/// Baseline and current prices for one instrument, as extracted from its
/// series.
#[derive(Debug, Clone, PartialEq)]
pub struct VariationInput {
    pub instrument: Instrument,
    pub baseline: Option<f64>,
    pub current: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariationResult {
    pub instrument: Instrument,
    pub baseline_price: Option<f64>,
    pub current_price: Option<f64>,
    pub variation: Variation,
}

impl VariationResult {
    pub fn percent_change(&self) -> Option<f64> {
        match self.variation {
            Variation::Change(pct) => Some(pct),
            Variation::Unavailable(_) => None,
        }
    }

    pub fn unavailable_reason(&self) -> Option<Unavailable> {
        match self.variation {
            Variation::Change(_) => None,
            Variation::Unavailable(reason) => Some(reason),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.variation, Variation::Change(_))
    }
}

/// Percent change from `baseline` to `current`.
pub fn percent_change(baseline: f64, current: f64) -> Result<f64, Unavailable> {
    if !baseline.is_finite() || baseline == 0.0 {
        return Err(Unavailable::DegenerateBaseline);
    }
    if !current.is_finite() {
        return Err(Unavailable::MissingData);
    }

    let pct = (current - baseline) / baseline * 100.0;
    if pct.is_finite() {
        Ok(pct)
    } else {
        Err(Unavailable::DegenerateBaseline)
    }
}

pub fn compute_variation(input: VariationInput) -> VariationResult {
    let variation = match (input.baseline, input.current) {
        (None, _) | (_, None) => Variation::Unavailable(Unavailable::MissingData),
        (Some(baseline), Some(current)) => match percent_change(baseline, current) {
            Ok(pct) => Variation::Change(pct),
            Err(reason) => Variation::Unavailable(reason),
        },
    };

    VariationResult {
        instrument: input.instrument,
        baseline_price: input.baseline,
        current_price: input.current,
        variation,
    }
}

/// One result per input, in input order.
pub fn compute_variations<I>(inputs: I) -> Vec<VariationResult>
where
    I: IntoIterator<Item = VariationInput>,
{
    inputs.into_iter().map(compute_variation).collect()
}
