//! Domain error types.

use crate::domain::watchlist::WatchlistError;

/// Top-level error type for swingscan.
#[derive(Debug, thiserror::Error)]
pub enum SwingError {
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

    #[error("no data for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    #[error("empty bar series: no indicators can be computed")]
    EmptySeries,

    #[error(transparent)]
    Watchlist(#[from] WatchlistError),

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SwingError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        SwingError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unavailable(symbol: &str, reason: impl Into<String>) -> Self {
        SwingError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }

    /// Process exit status for this error family.
    pub fn exit_status(&self) -> u8 {
        match self {
            SwingError::Io(_) => 1,
            SwingError::ConfigParse { .. }
            | SwingError::ConfigMissing { .. }
            | SwingError::ConfigInvalid { .. } => 2,
            SwingError::Watchlist(_) => 3,
            SwingError::DataUnavailable { .. } | SwingError::EmptySeries => 5,
            SwingError::Report { .. } => 6,
        }
    }
}

impl From<&SwingError> for std::process::ExitCode {
    fn from(err: &SwingError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}
