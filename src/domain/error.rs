//! Domain error types.

/// Reasons a trade could not be sized. The trade is skipped, never retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SizingError {
    #[error("account equity must be positive, got {0}")]
    NonPositiveEquity(f64),

    #[error("stop distance must be positive, got {0} points")]
    NonPositiveStopDistance(f64),

    #[error("value per point must be positive, got {0}")]
    NonPositiveTickValue(f64),

    #[error("volume step must be positive, got {0}")]
    InvalidVolumeStep(f64),
}

/// Top-level error type for bandtrader.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
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

    #[error("market data unavailable: {what}")]
    DataUnavailable { what: String },

    #[error(transparent)]
    Sizing(#[from] SizingError),

    #[error("gateway rejected {operation}: {reason}")]
    GatewayRejected { operation: String, reason: String },

    #[error("csv error: {reason}")]
    Csv { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        EngineError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn rejected(operation: &str, reason: impl Into<String>) -> Self {
        EngineError::GatewayRejected {
            operation: operation.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&EngineError> for std::process::ExitCode {
    fn from(err: &EngineError) -> Self {
        let code: u8 = match err {
            EngineError::Io(_) => 1,
            EngineError::ConfigParse { .. }
            | EngineError::ConfigMissing { .. }
            | EngineError::ConfigInvalid { .. } => 2,
            EngineError::Csv { .. } | EngineError::DataUnavailable { .. } => 3,
            EngineError::Sizing(_) => 4,
            EngineError::GatewayRejected { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
