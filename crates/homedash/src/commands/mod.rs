//! Command handlers.

pub mod config_cmd;
pub mod show;
pub mod status;
pub mod watch;

use homedash_core::{Engine, EngineConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Load configuration (file + env) honoring the `--config` override.
pub(crate) fn load_config(global: &GlobalOpts) -> Result<EngineConfig, CliError> {
    let config = match &global.config {
        Some(path) => homedash_config::load_from(path)?,
        None => homedash_config::load()?,
    };
    Ok(config)
}

/// Build an engine from config, refusing to run with zero sources.
///
/// Build warnings go to stderr so they never pollute piped output.
pub(crate) fn build_engine(global: &GlobalOpts) -> Result<Engine, CliError> {
    let config = load_config(global)?;
    if config.is_empty() {
        return Err(CliError::NoSources);
    }
    let engine = Engine::from_config(&config)?;
    tracing::debug!(sources = engine.source_ids().len(), "engine built");
    if !global.quiet {
        for warning in engine.warnings() {
            eprintln!("warning: {warning}");
        }
    }
    Ok(engine)
}
