//! `homedash config` — inspect and bootstrap the configuration file.

use std::path::PathBuf;

use crate::cli::{ConfigCommand, GlobalOpts};
use crate::commands::load_config;
use crate::error::CliError;

pub fn handle(command: ConfigCommand, global: &GlobalOpts) -> Result<(), CliError> {
    match command {
        ConfigCommand::Init => init(global),
        ConfigCommand::Path => {
            println!("{}", target_path(global).display());
            Ok(())
        }
        ConfigCommand::Check => check(global),
    }
}

fn target_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(homedash_config::config_path)
}

fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let path = target_path(global);
    homedash_config::write_example(&path)?;
    if !global.quiet {
        println!("Wrote starter config to {}", path.display());
    }
    Ok(())
}

fn check(global: &GlobalOpts) -> Result<(), CliError> {
    let config = load_config(global)?;
    config.validate().map_err(CliError::from)?;
    if !global.quiet {
        if config.is_empty() {
            println!("Configuration is valid but no integrations are enabled.");
        } else {
            println!("Configuration is valid.");
        }
    }
    Ok(())
}
