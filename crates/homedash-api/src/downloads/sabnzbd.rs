// SABnzbd REST client.
//
// Auth: `apikey` query parameter on every request. Numeric fields come
// back as strings ("mb", "kbpersec", "percentage"); the wire types keep
// them verbatim and the core adapter parses them.

use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

const SERVICE: &str = "sabnzbd";

// ── Wire types ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct QueueResponse {
    pub queue: Queue,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Queue {
    #[serde(default)]
    pub slots: Vec<QueueSlot>,
    /// Aggregate download rate in KB/s, as a string.
    #[serde(default)]
    pub kbpersec: Option<String>,
    /// "Downloading", "Paused", "Idle".
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueueSlot {
    pub nzo_id: String,
    #[serde(default)]
    pub filename: String,
    /// Whole-number percent as a string, e.g. "42".
    #[serde(default)]
    pub percentage: Option<String>,
    /// Total size in megabytes, as a string.
    #[serde(default)]
    pub mb: Option<String>,
    /// Remaining megabytes, as a string.
    #[serde(default)]
    pub mbleft: Option<String>,
    /// "Downloading", "Queued", "Paused", "Checking".
    #[serde(default)]
    pub status: Option<String>,
    /// "H:MM:SS" remaining.
    #[serde(default)]
    pub timeleft: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the SABnzbd JSON API.
pub struct SabnzbdClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: secrecy::SecretString,
}

impl SabnzbdClient {
    pub fn new(
        base_url: &str,
        api_key: secrecy::SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let base_url = crate::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: &str,
        api_key: secrecy::SecretString,
    ) -> Result<Self, Error> {
        let base_url = crate::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    /// Fetch the current download queue.
    pub async fn queue(&self) -> Result<Queue, Error> {
        let url = self.base_url.join("api")?;
        debug!("GET {url} mode=queue");

        let resp = self
            .http
            .get(url)
            .query(&[
                ("mode", "queue"),
                ("output", "json"),
                ("apikey", self.api_key.expose_secret()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Http {
                service: SERVICE,
                status: status.as_u16(),
            });
        }

        // A wrong API key comes back as HTTP 200 with an error body.
        let body = resp.text().await?;
        if body.contains("\"error\"") && body.to_lowercase().contains("api key") {
            return Err(Error::Auth {
                service: SERVICE,
                message: "API key rejected".into(),
            });
        }

        let parsed: QueueResponse = serde_json::from_str(&body)
            .map_err(|e| Error::parse_with_preview(&format!("{SERVICE}: {e}"), &body))?;
        Ok(parsed.queue)
    }
}
