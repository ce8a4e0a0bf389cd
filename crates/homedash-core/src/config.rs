// ── Engine configuration ──
//
// Per-integration sections consumed by `Engine::from_config`. Loading
// from disk/environment lives in `homedash-config`; this module only
// defines the shapes, defaults, and validation.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;

use crate::error::CoreError;

/// Default poll intervals, by integration family.
pub const DEFAULT_DOWNLOADS_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_CONTAINERS_INTERVAL_SECS: u64 = 15;
pub const DEFAULT_MEDIA_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_SYSTEM_INTERVAL_SECS: u64 = 15;
pub const DEFAULT_FEED_INTERVAL_SECS: u64 = 300;
pub const DEFAULT_MARKETS_INTERVAL_SECS: u64 = 300;

pub const DEFAULT_CRYPTO_BASE_URL: &str = "https://api.coingecko.com";
pub const DEFAULT_STOCK_BASE_URL: &str = "https://finnhub.io";

/// Everything the engine needs to build its adapters.
///
/// Every section is optional; an absent or disabled section simply
/// means no source of that family is registered.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub transport: TransportSettings,
    pub overseerr: Option<OverseerrConfig>,
    pub radarr: Option<ArrConfig>,
    pub readarr: Option<ArrConfig>,
    pub sonarr: Option<ArrConfig>,
    pub docker: Option<DockerConfig>,
    pub portainer: Option<PortainerConfig>,
    pub downloads: Vec<DownloadClientConfig>,
    pub glances: Option<GlancesConfig>,
    pub calendar: Option<CalendarConfig>,
    pub feeds: Option<FeedsConfig>,
    pub markets: Option<MarketsConfig>,
}

/// HTTP transport options shared by every upstream client.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransportSettings {
    /// Accept self-signed certificates (common on LAN services).
    pub accept_invalid_certs: bool,
    /// PEM file with a custom CA certificate. Takes precedence over
    /// `accept_invalid_certs`.
    pub ca_cert: Option<PathBuf>,
    pub timeout_secs: u64,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            accept_invalid_certs: true,
            ca_cert: None,
            timeout_secs: 30,
        }
    }
}

impl TransportSettings {
    pub fn to_transport(&self) -> homedash_api::TransportConfig {
        let tls = match &self.ca_cert {
            Some(path) => homedash_api::TlsMode::CustomCa(path.clone()),
            None if self.accept_invalid_certs => homedash_api::TlsMode::DangerAcceptInvalid,
            None => homedash_api::TlsMode::System,
        };
        homedash_api::TransportConfig {
            tls,
            timeout: Duration::from_secs(self.timeout_secs),
            cookie_jar: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OverseerrConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub url: String,
    pub api_key: SecretString,
    pub interval_secs: Option<u64>,
}

/// Radarr-shaped library instance (Radarr `/api/v3`, Readarr `/api/v1`).
#[derive(Debug, Clone, Deserialize)]
pub struct ArrConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub url: String,
    pub api_key: SecretString,
    pub interval_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DockerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub url: String,
    pub interval_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PortainerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub url: String,
    pub api_key: SecretString,
    /// Explicit Docker environment id. When absent the first endpoint
    /// is used and a warning is recorded.
    pub endpoint_id: Option<i64>,
    pub interval_secs: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, strum::Display, strum::EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DownloadClientKind {
    Qbittorrent,
    Deluge,
    Sabnzbd,
    Transmission,
}

/// One download client. Which credential fields are required depends
/// on `kind`; `validate` enforces that before any adapter is built.
#[derive(Debug, Clone, Deserialize)]
pub struct DownloadClientConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Source id; defaults to the kind name.
    pub id: Option<String>,
    pub kind: DownloadClientKind,
    pub url: String,
    pub username: Option<String>,
    pub password: Option<SecretString>,
    pub api_key: Option<SecretString>,
    pub interval_secs: Option<u64>,
}

impl DownloadClientConfig {
    pub fn source_id(&self) -> String {
        self.id.clone().unwrap_or_else(|| self.kind.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlancesApiVersion {
    V3,
    #[default]
    V4,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GlancesConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub url: String,
    #[serde(default)]
    pub api_version: GlancesApiVersion,
    pub interval_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalendarFeedConfig {
    pub name: String,
    pub url: String,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalendarConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub feeds: Vec<CalendarFeedConfig>,
    pub interval_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedSourceConfig {
    pub url: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub feeds: Vec<FeedSourceConfig>,
    pub interval_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarketsConfig {
    pub enabled: bool,
    /// CoinGecko coin ids, e.g. `"bitcoin"`.
    pub coins: Vec<String>,
    /// Stock ticker symbols; require `stock_api_key`.
    pub stocks: Vec<String>,
    pub stock_api_key: Option<SecretString>,
    pub crypto_url: String,
    pub stock_url: String,
    pub interval_secs: Option<u64>,
}

impl Default for MarketsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            coins: Vec::new(),
            stocks: Vec::new(),
            stock_api_key: None,
            crypto_url: DEFAULT_CRYPTO_BASE_URL.to_owned(),
            stock_url: DEFAULT_STOCK_BASE_URL.to_owned(),
            interval_secs: None,
        }
    }
}

impl EngineConfig {
    /// Check that every enabled integration carries the fields its
    /// adapter needs. Errors name the offending integration.
    pub fn validate(&self) -> Result<(), CoreError> {
        for dl in self.downloads.iter().filter(|d| d.enabled) {
            let id = dl.source_id();
            match dl.kind {
                DownloadClientKind::Qbittorrent => {
                    if dl.username.is_none() || dl.password.is_none() {
                        return Err(config_error(&id, "username and password are required"));
                    }
                }
                DownloadClientKind::Deluge => {
                    if dl.password.is_none() {
                        return Err(config_error(&id, "password is required"));
                    }
                }
                DownloadClientKind::Sabnzbd => {
                    if dl.api_key.is_none() {
                        return Err(config_error(&id, "api_key is required"));
                    }
                }
                DownloadClientKind::Transmission => {}
            }
        }

        if let Some(cal) = self.calendar.as_ref().filter(|c| c.enabled) {
            if cal.feeds.is_empty() {
                return Err(config_error("calendar", "at least one feed is required"));
            }
        }
        if let Some(feeds) = self.feeds.as_ref().filter(|f| f.enabled) {
            if feeds.feeds.is_empty() {
                return Err(config_error("feeds", "at least one feed is required"));
            }
        }
        if let Some(markets) = self.markets.as_ref().filter(|m| m.enabled) {
            if !markets.stocks.is_empty() && markets.stock_api_key.is_none() {
                return Err(config_error(
                    "markets",
                    "stock_api_key is required when stocks are configured",
                ));
            }
        }

        Ok(())
    }

    /// True when no integration section is enabled.
    pub fn is_empty(&self) -> bool {
        self.overseerr.as_ref().is_none_or(|c| !c.enabled)
            && self.radarr.as_ref().is_none_or(|c| !c.enabled)
            && self.readarr.as_ref().is_none_or(|c| !c.enabled)
            && self.sonarr.as_ref().is_none_or(|c| !c.enabled)
            && self.docker.as_ref().is_none_or(|c| !c.enabled)
            && self.portainer.as_ref().is_none_or(|c| !c.enabled)
            && self.downloads.iter().all(|c| !c.enabled)
            && self.glances.as_ref().is_none_or(|c| !c.enabled)
            && self.calendar.as_ref().is_none_or(|c| !c.enabled)
            && self.feeds.as_ref().is_none_or(|c| !c.enabled)
            && self
                .markets
                .as_ref()
                .is_none_or(|m| !m.enabled || (m.coins.is_empty() && m.stocks.is_empty()))
    }
}

fn config_error(integration: &str, detail: &str) -> CoreError {
    CoreError::Config {
        message: format!("{integration}: {detail}"),
    }
}

fn default_true() -> bool {
    true
}
