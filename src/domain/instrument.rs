//! Instrument definitions.

use std::fmt;

/// A tradable symbol with a display name and optional grouping.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Instrument {
    pub symbol: String,
    pub name: String,
    pub category: Option<String>,
}

impl Instrument {
    /// Instrument whose display name is its symbol.
    pub fn new(symbol: impl Into<String>) -> Self {
        let symbol = symbol.into();
        Self {
            name: symbol.clone(),
            symbol,
            category: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name == self.symbol {
            write!(f, "{}", self.symbol)
        } else {
            write!(f, "{} ({})", self.name, self.symbol)
        }
    }
}
