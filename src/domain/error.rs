//! Domain error types.

use chrono::{DateTime, Utc};

/// Top-level error type for trendtrader.
#[derive(Debug, thiserror::Error)]
pub enum TrendtraderError {
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

    #[error("unknown strategy '{name}' (expected sma_cross, ema_cross or trend_structure)")]
    UnknownStrategy { name: String },

    #[error("invalid strategy parameters: {reason}")]
    InvalidStrategy { reason: String },

    #[error("failed to load bars from {source_name}: {reason}")]
    DataLoad { source_name: String, reason: String },

    #[error("bars out of order at index {index}: {time} does not follow {previous}")]
    UnorderedBars {
        index: usize,
        previous: DateTime<Utc>,
        time: DateTime<Utc>,
    },

    #[error("no bars available from {source_name}")]
    NoData { source_name: String },

    #[error("failed to write report: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TrendtraderError {
    pub(crate) fn config_invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        TrendtraderError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&TrendtraderError> for std::process::ExitCode {
    fn from(err: &TrendtraderError) -> Self {
        let code: u8 = match err {
            TrendtraderError::Io(_) => 1,
            TrendtraderError::ConfigParse { .. }
            | TrendtraderError::ConfigMissing { .. }
            | TrendtraderError::ConfigInvalid { .. } => 2,
            TrendtraderError::UnknownStrategy { .. }
            | TrendtraderError::InvalidStrategy { .. } => 3,
            TrendtraderError::DataLoad { .. }
            | TrendtraderError::UnorderedBars { .. }
            | TrendtraderError::NoData { .. } => 4,
            TrendtraderError::Report { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
