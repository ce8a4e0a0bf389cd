//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use homedash_config::ConfigError;
use homedash_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("No integrations configured")]
    #[diagnostic(
        code(homedash::no_sources),
        help(
            "Write a starter config with: homedash config init\n\
             Then enable at least one integration section."
        )
    )]
    NoSources,

    #[error("Unknown source '{source_id}'")]
    #[diagnostic(
        code(homedash::unknown_source),
        help("Run `homedash status` to list configured source ids.")
    )]
    UnknownSource { source_id: String },

    #[error("{0}")]
    #[diagnostic(
        code(homedash::config),
        help("Check the named section in your config file (homedash config path).")
    )]
    Config(String),

    #[error(transparent)]
    #[diagnostic(code(homedash::config_load))]
    ConfigLoad(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(code(homedash::core))]
    Core(CoreError),
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Config { message } => Self::Config(message),
            other => Self::Core(other),
        }
    }
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoSources | Self::Config(_) | Self::ConfigLoad(_) => exit_code::USAGE,
            Self::UnknownSource { .. } => exit_code::NOT_FOUND,
            Self::Core(CoreError::Fetch { kind, .. }) => match kind {
                homedash_core::ErrorKind::Auth => exit_code::AUTH,
                homedash_core::ErrorKind::Network | homedash_core::ErrorKind::Http => {
                    exit_code::CONNECTION
                }
                homedash_core::ErrorKind::Timeout => exit_code::TIMEOUT,
                _ => exit_code::GENERAL,
            },
            Self::Core(_) => exit_code::GENERAL,
        }
    }
}
