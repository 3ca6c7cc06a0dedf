//! Core domain types and logic.

pub mod baseline;
pub mod error;
pub mod instrument;
pub mod interval;
pub mod monthly_returns;
pub mod price;
pub mod ranker;
pub mod report;
pub mod universe;
pub mod variation;
