//! Configuration loading for homedash.
//!
//! Layers, lowest precedence first: an optional TOML file at the
//! platform config path, then `HOMEDASH_`-prefixed environment
//! variables. Sections nest with a double underscore, so
//! `HOMEDASH_RADARR__API_KEY` overrides `[radarr] api_key`.
//! The result is a [`homedash_core::EngineConfig`]; semantic checks
//! (which credentials each integration needs) stay in core's
//! `EngineConfig::validate`.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use thiserror::Error;

use homedash_core::EngineConfig;

const ENV_PREFIX: &str = "HOMEDASH_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("config file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "homedash", "homedash").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("homedash");
    p
}

/// Load configuration from the default path plus the environment.
///
/// A missing file is not an error: the environment alone (or nothing
/// at all) yields a valid, empty `EngineConfig`.
pub fn load() -> Result<EngineConfig, ConfigError> {
    load_from(&config_path())
}

/// Load configuration from an explicit file path plus the environment.
pub fn load_from(path: &Path) -> Result<EngineConfig, ConfigError> {
    let figment = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));
    Ok(figment.extract()?)
}

/// Commented starter config written by `homedash config init`.
pub const EXAMPLE_CONFIG: &str = r##"# homedash configuration.
# Every section is optional; delete what you don't run.

[transport]
# Self-signed certificates are accepted by default (LAN services).
# accept_invalid_certs = true
# ca_cert = "/etc/ssl/my-lan-ca.pem"
# timeout_secs = 30

# [overseerr]
# url = "http://overseerr.lan:5055"
# api_key = "..."

# [radarr]
# url = "http://radarr.lan:7878"
# api_key = "..."

# [sonarr]
# url = "http://sonarr.lan:8989"
# api_key = "..."

# [readarr]
# url = "http://readarr.lan:8787"
# api_key = "..."

# [docker]
# url = "http://docker.lan:2375"

# [portainer]
# url = "https://portainer.lan:9443"
# api_key = "..."
# endpoint_id = 1

# [[downloads]]
# kind = "qbittorrent"
# url = "http://qbit.lan:8080"
# username = "admin"
# password = "..."
# interval_secs = 5

# [[downloads]]
# kind = "sabnzbd"
# url = "http://sab.lan:8085"
# api_key = "..."

# [glances]
# url = "http://nas.lan:61208"
# api_version = "v4"

# [calendar]
# interval_secs = 300
# [[calendar.feeds]]
# name = "Family"
# url = "https://calendar.google.com/calendar/ical/.../basic.ics"
# color = "#7e57c2"

# [feeds]
# [[feeds.feeds]]
# name = "Lobsters"
# url = "https://lobste.rs/rss"

# [markets]
# coins = ["bitcoin", "ethereum"]
# stocks = ["AAPL"]
# stock_api_key = "..."
"##;

/// Write the starter config, refusing to clobber an existing file.
pub fn write_example(path: &Path) -> Result<(), ConfigError> {
    if path.exists() {
        return Err(ConfigError::AlreadyExists(path.to_path_buf()));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, EXAMPLE_CONFIG)?;
    Ok(())
}
