// Deluge Web JSON-RPC client.
//
// All calls go through POST /json with `{method, params, id}` envelopes.
// `auth.login` must succeed first (cookie session). The Deluge web
// daemon is known to hang when the backend daemon is down, so every RPC
// carries a hard 10 s deadline surfaced as a distinct timeout error
// rather than a generic failure.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use secrecy::ExposeSecret;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

const SERVICE: &str = "deluge";

/// Hard per-request deadline. Enforced via cancellation so a wedged
/// upstream cannot stall the whole poll tick.
pub const RPC_TIMEOUT: Duration = Duration::from_secs(10);

/// Torrent fields requested from `web.update_ui`.
const TORRENT_FIELDS: &[&str] = &[
    "name",
    "progress",
    "total_size",
    "total_done",
    "download_payload_rate",
    "upload_payload_rate",
    "eta",
    "state",
    "ratio",
];

// ── Wire types ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RpcEnvelope<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUi {
    #[serde(default)]
    pub torrents: Option<HashMap<String, DelugeTorrent>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DelugeTorrent {
    pub name: String,
    /// 0.0 ..= 100.0
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub total_size: i64,
    #[serde(default)]
    pub total_done: i64,
    #[serde(default)]
    pub download_payload_rate: i64,
    #[serde(default)]
    pub upload_payload_rate: i64,
    #[serde(default)]
    pub eta: f64,
    /// Native state string, e.g. "Downloading", "Seeding", "Paused".
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub ratio: f64,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the Deluge web UI JSON-RPC endpoint.
pub struct DelugeClient {
    http: reqwest::Client,
    endpoint: Url,
    request_id: AtomicU64,
}

impl DelugeClient {
    /// Build with a fresh cookie jar; call [`login`](Self::login) first.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let http = config.build_client()?;
        let endpoint = crate::normalize_base_url(base_url)?.join("json")?;
        Ok(Self {
            http,
            endpoint,
            request_id: AtomicU64::new(1),
        })
    }

    /// Wrap an existing `reqwest::Client` (must carry a cookie jar).
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self, Error> {
        let endpoint = crate::normalize_base_url(base_url)?.join("json")?;
        Ok(Self {
            http,
            endpoint,
            request_id: AtomicU64::new(1),
        })
    }

    /// Authenticate against the web UI password.
    pub async fn login(&self, password: &secrecy::SecretString) -> Result<(), Error> {
        let ok: bool = self
            .call("auth.login", json!([password.expose_secret()]))
            .await?;
        if ok {
            Ok(())
        } else {
            Err(Error::Auth {
                service: SERVICE,
                message: "web UI password rejected".into(),
            })
        }
    }

    /// Fetch the torrent table via `web.update_ui`.
    pub async fn update_ui(&self) -> Result<UpdateUi, Error> {
        self.call("web.update_ui", json!([TORRENT_FIELDS, {}])).await
    }

    /// Issue one JSON-RPC call under the hard deadline.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, Error> {
        let id = self.request_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({ "method": method, "params": params, "id": id });
        debug!("POST {} method={method}", self.endpoint);

        let send = self.http.post(self.endpoint.clone()).json(&body).send();
        let resp = tokio::time::timeout(RPC_TIMEOUT, send)
            .await
            .map_err(|_| Error::Timeout {
                service: SERVICE,
                timeout_secs: RPC_TIMEOUT.as_secs(),
            })??;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Http {
                service: SERVICE,
                status: status.as_u16(),
            });
        }

        let body = tokio::time::timeout(RPC_TIMEOUT, resp.text())
            .await
            .map_err(|_| Error::Timeout {
                service: SERVICE,
                timeout_secs: RPC_TIMEOUT.as_secs(),
            })??;

        let envelope: RpcEnvelope<T> = serde_json::from_str(&body)
            .map_err(|e| Error::parse_with_preview(&format!("{SERVICE}: {e}"), &body))?;

        if let Some(err) = envelope.error {
            // "Not authenticated" means the session cookie expired.
            return Err(if err.message.to_lowercase().contains("auth") {
                Error::Auth {
                    service: SERVICE,
                    message: err.message,
                }
            } else {
                Error::Parse {
                    message: format!("{SERVICE} RPC error: {}", err.message),
                }
            });
        }

        envelope.result.ok_or_else(|| Error::Parse {
            message: format!("{SERVICE} RPC returned neither result nor error"),
        })
    }
}
