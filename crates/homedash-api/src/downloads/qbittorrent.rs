// qBittorrent WebAPI v2 client.
//
// Session auth: POST /api/v2/auth/login with form credentials sets an
// SID cookie in the shared jar; the body is "Ok." on success and
// "Fails." on rejection (always HTTP 200).

use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

const SERVICE: &str = "qbittorrent";

// ── Wire types ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct TorrentInfo {
    pub hash: String,
    pub name: String,
    /// 0.0 ..= 1.0
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub downloaded: i64,
    /// Bytes per second.
    #[serde(default)]
    pub dlspeed: i64,
    #[serde(default)]
    pub upspeed: i64,
    /// Seconds; 8640000 means "infinity" upstream.
    #[serde(default)]
    pub eta: i64,
    /// Native state string, e.g. "downloading", "stalledDL", "pausedUP".
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub ratio: f64,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the qBittorrent WebAPI v2.
pub struct QbittorrentClient {
    http: reqwest::Client,
    base_url: Url,
}

impl QbittorrentClient {
    /// Build with a fresh cookie jar; call [`login`](Self::login) before
    /// listing torrents.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let http = config.build_client()?;
        let base_url = crate::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client` (must carry a cookie jar).
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self, Error> {
        let base_url = crate::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Authenticate and store the SID cookie in the jar.
    pub async fn login(
        &self,
        username: &str,
        password: &secrecy::SecretString,
    ) -> Result<(), Error> {
        let url = self.base_url.join("api/v2/auth/login")?;
        debug!("POST {url}");

        let resp = self
            .http
            .post(url)
            .form(&[("username", username), ("password", password.expose_secret())])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Http {
                service: SERVICE,
                status: status.as_u16(),
            });
        }

        // Rejections come back as HTTP 200 with body "Fails.".
        let body = resp.text().await?;
        if body.trim() != "Ok." {
            return Err(Error::Auth {
                service: SERVICE,
                message: "login rejected (check username/password)".into(),
            });
        }
        Ok(())
    }

    /// List all torrents.
    pub async fn list_torrents(&self) -> Result<Vec<TorrentInfo>, Error> {
        let url = self.base_url.join("api/v2/torrents/info")?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;

        // An expired session yields 403 — surface it as an auth failure so
        // the adapter can re-login on the next tick.
        crate::handle_json_response(SERVICE, resp).await
    }
}
