// Transmission JSON-RPC client.
//
// The daemon requires an `X-Transmission-Session-Id` header. The id is
// negotiated lazily: the first request comes back 409 with the id in a
// response header, is stored, and the request is retried once. The same
// capture-and-retry runs whenever the daemon rotates the id.

use std::sync::RwLock;

use serde::Deserialize;
use serde_json::json;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

const SERVICE: &str = "transmission";
const SESSION_HEADER: &str = "X-Transmission-Session-Id";

/// Torrent status codes from the RPC spec.
pub const STATUS_STOPPED: i64 = 0;
pub const STATUS_CHECK_WAIT: i64 = 1;
pub const STATUS_CHECK: i64 = 2;
pub const STATUS_DOWNLOAD_WAIT: i64 = 3;
pub const STATUS_DOWNLOAD: i64 = 4;
pub const STATUS_SEED_WAIT: i64 = 5;
pub const STATUS_SEED: i64 = 6;

// ── Wire types ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: String,
    arguments: Option<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TorrentGetArgs {
    #[serde(default)]
    pub torrents: Vec<TransmissionTorrent>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransmissionTorrent {
    pub id: i64,
    pub name: String,
    /// 0.0 ..= 1.0
    #[serde(default)]
    pub percent_done: f64,
    #[serde(default)]
    pub total_size: i64,
    #[serde(default)]
    pub downloaded_ever: i64,
    /// Bytes per second.
    #[serde(default)]
    pub rate_download: i64,
    #[serde(default)]
    pub rate_upload: i64,
    /// Seconds; -1 when unknown.
    #[serde(default)]
    pub eta: i64,
    /// Status code 0..=6 (see the STATUS_* constants).
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub upload_ratio: f64,
    #[serde(default)]
    pub error_string: String,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the Transmission RPC endpoint.
pub struct TransmissionClient {
    http: reqwest::Client,
    endpoint: Url,
    session_id: RwLock<Option<String>>,
}

impl TransmissionClient {
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let endpoint = crate::normalize_base_url(base_url)?.join("transmission/rpc")?;
        Ok(Self {
            http,
            endpoint,
            session_id: RwLock::new(None),
        })
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self, Error> {
        let endpoint = crate::normalize_base_url(base_url)?.join("transmission/rpc")?;
        Ok(Self {
            http,
            endpoint,
            session_id: RwLock::new(None),
        })
    }

    /// Fetch the torrent list.
    pub async fn torrent_get(&self) -> Result<Vec<TransmissionTorrent>, Error> {
        let body = json!({
            "method": "torrent-get",
            "arguments": {
                "fields": [
                    "id", "name", "percentDone", "totalSize", "downloadedEver",
                    "rateDownload", "rateUpload", "eta", "status",
                    "uploadRatio", "errorString"
                ]
            }
        });

        let resp = self.post(&body).await?;
        let status = resp.status();

        // Session id rotated mid-session: capture and retry once.
        let resp = if status == reqwest::StatusCode::CONFLICT {
            self.capture_session_id(resp.headers());
            let retry = self.post(&body).await?;
            if retry.status() == reqwest::StatusCode::CONFLICT {
                return Err(Error::Auth {
                    service: SERVICE,
                    message: "session id handshake failed (409 after retry)".into(),
                });
            }
            retry
        } else {
            resp
        };

        let envelope: RpcResponse<TorrentGetArgs> =
            crate::handle_json_response(SERVICE, resp).await?;

        if envelope.result != "success" {
            return Err(Error::Parse {
                message: format!("{SERVICE} RPC result: {}", envelope.result),
            });
        }

        Ok(envelope.arguments.map(|a| a.torrents).unwrap_or_default())
    }

    async fn post(&self, body: &serde_json::Value) -> Result<reqwest::Response, Error> {
        debug!("POST {}", self.endpoint);
        let mut builder = self.http.post(self.endpoint.clone()).json(body);
        let session = self
            .session_id
            .read()
            .map_err(|_| poisoned())?
            .clone();
        if let Some(id) = session {
            builder = builder.header(SESSION_HEADER, id);
        }
        Ok(builder.send().await?)
    }

    fn capture_session_id(&self, headers: &reqwest::header::HeaderMap) {
        if let Some(id) = headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok()) {
            trace!("captured rotated session id");
            if let Ok(mut guard) = self.session_id.write() {
                *guard = Some(id.to_owned());
            }
        }
    }
}

fn poisoned() -> Error {
    Error::Parse {
        message: "transmission session lock poisoned".into(),
    }
}
