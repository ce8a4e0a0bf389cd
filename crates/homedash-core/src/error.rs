// ── Core error type ──
//
// User-facing errors from homedash-core. Consumers never see raw
// transport failures; the `From<homedash_api::Error>` impl translates
// them into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Source not configured: {source_id}")]
    SourceNotConfigured { source_id: String },

    #[error("Source not found: {source_id}")]
    SourceNotFound { source_id: String },

    #[error("Engine already running")]
    AlreadyRunning,

    #[error("Engine not running")]
    NotRunning,

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("{message}")]
    Fetch {
        message: String,
        kind: homedash_api::ErrorKind,
    },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<homedash_api::Error> for CoreError {
    fn from(err: homedash_api::Error) -> Self {
        Self::Fetch {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl CoreError {
    /// Errors worth retrying on the next tick without operator action.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Fetch {
                kind: homedash_api::ErrorKind::Network
                    | homedash_api::ErrorKind::Timeout
                    | homedash_api::ErrorKind::Http,
                ..
            }
        )
    }
}
