// Overseerr REST v1 client.
//
// Auth: X-Api-Key header. Base path: /api/v1/
//
// Wire contract (bit-exact where the adapter depends on it):
//   request.status ∈ {1: pending, 2: approved, 3: declined}
//   media.status   ∈ {1: unknown, 2: pending, 3: processing,
//                     4: partially available, 5: available}

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

const SERVICE: &str = "overseerr";

/// Request approval status codes.
pub const REQUEST_PENDING: u8 = 1;
pub const REQUEST_APPROVED: u8 = 2;
pub const REQUEST_DECLINED: u8 = 3;

/// Media availability status codes.
pub const MEDIA_PARTIALLY_AVAILABLE: u8 = 4;
pub const MEDIA_AVAILABLE: u8 = 5;

// ── Wire types ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPage {
    #[serde(default)]
    pub results: Vec<MediaRequest>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRequest {
    pub id: i64,
    /// Request approval status (1/2/3).
    pub status: u8,
    #[serde(default)]
    pub created_at: Option<String>,
    pub media: MediaInfo,
    #[serde(default)]
    pub requested_by: Option<RequestUser>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaInfo {
    pub id: i64,
    /// "movie" or "tv".
    #[serde(default)]
    pub media_type: Option<String>,
    /// Media availability status (1..5).
    pub status: u8,
    #[serde(default)]
    pub tmdb_id: Option<i64>,
    #[serde(default)]
    pub tvdb_id: Option<i64>,
    /// Movie title, when the server inlines metadata (Jellyseerr does).
    #[serde(default)]
    pub title: Option<String>,
    /// Series name, same caveat as `title`.
    #[serde(default)]
    pub name: Option<String>,
    /// Relative TMDB poster path, e.g. "/abc.jpg".
    #[serde(default)]
    pub poster_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestUser {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the Overseerr v1 API.
pub struct OverseerrClient {
    http: reqwest::Client,
    base_url: Url,
}

impl OverseerrClient {
    /// Build from a base URL and API key.
    pub fn new(
        base_url: &str,
        api_key: &secrecy::SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut key_value =
            HeaderValue::from_str(api_key.expose_secret()).map_err(|e| Error::Auth {
                service: SERVICE,
                message: format!("invalid API key header value: {e}"),
            })?;
        key_value.set_sensitive(true);
        headers.insert("X-Api-Key", key_value);

        let http = transport.build_client_with_headers(headers)?;
        let base_url = crate::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self, Error> {
        let base_url = crate::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// List media requests, newest first.
    pub async fn list_requests(&self, take: u32) -> Result<Vec<MediaRequest>, Error> {
        let url = self.base_url.join("api/v1/request")?;
        debug!("GET {url}");

        let resp = self
            .http
            .get(url)
            .query(&[
                ("take", take.to_string()),
                ("filter", "all".to_string()),
                ("sort", "added".to_string()),
            ])
            .send()
            .await?;

        let page: RequestPage = crate::handle_json_response(SERVICE, resp).await?;
        Ok(page.results)
    }
}
