//! Crate-level error type and exit code mapping.

use crate::domain::universe::UniverseError;

/// Top-level error type for movers.
///
/// Per-instrument data problems never surface here: they are recorded as
/// [`crate::domain::variation::Unavailable`] on the instrument's result.
#[derive(Debug, thiserror::Error)]
pub enum MoversError {
    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("data query error: {reason}")]
    DataQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Universe(#[from] UniverseError),

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&MoversError> for std::process::ExitCode {
    fn from(err: &MoversError) -> Self {
        let code: u8 = match err {
            MoversError::Io(_) => 1,
            MoversError::ConfigParse { .. }
            | MoversError::ConfigMissing { .. }
            | MoversError::ConfigInvalid { .. }
            | MoversError::Universe(_) => 2,
            MoversError::DataSource { .. } | MoversError::DataQuery { .. } => 3,
            MoversError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_config_invalid() {
        let err = MoversError::ConfigInvalid {
            section: "movers".into(),
            key: "top".into(),
            reason: "must be at least 1".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid config value [movers] top: must be at least 1"
        );
    }

    #[test]
    fn universe_error_converts() {
        let err: MoversError = UniverseError::DuplicateSymbol("BHP".into()).into();
        assert!(matches!(err, MoversError::Universe(_)));
        assert_eq!(err.to_string(), "duplicate symbol: BHP");
    }

    #[test]
    fn exit_codes_by_category() {
        let cases = [
            (MoversError::Io(std::io::Error::other("x")), 1u8),
            (
                MoversError::ConfigMissing {
                    section: "universe".into(),
                    key: "instruments".into(),
                },
                2,
            ),
            (MoversError::DataSource { reason: "x".into() }, 3),
            (MoversError::NoData { symbol: "BHP".into() }, 5),
        ];
        for (err, expected) in cases {
            let code: std::process::ExitCode = (&err).into();
            assert_eq!(
                format!("{code:?}"),
                format!("{:?}", std::process::ExitCode::from(expected))
            );
        }
    }
}
