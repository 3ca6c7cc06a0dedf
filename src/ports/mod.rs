//! Port traits for the collaborators around the movers core.

pub mod config_port;
pub mod price_port;
pub mod report_port;
