// Radarr REST v3 client.
//
// Auth: X-Api-Key header. Base path: /api/v3/
//
// One endpoint feeds two derived dashboard views (recently added and
// missing); the derivation lives in homedash-core, this module only
// carries the wire shape.

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

const SERVICE: &str = "radarr";

// ── Wire types ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieResource {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub year: Option<i32>,
    /// ISO-8601 timestamp the movie was added to the library.
    #[serde(default)]
    pub added: Option<String>,
    #[serde(default)]
    pub has_file: bool,
    #[serde(default)]
    pub monitored: bool,
    /// In-cinemas / release date, when known.
    #[serde(default)]
    pub in_cinemas: Option<String>,
    #[serde(default)]
    pub images: Vec<ImageResource>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResource {
    #[serde(default)]
    pub cover_type: Option<String>,
    /// Absolute URL when the instance exposes one.
    #[serde(default)]
    pub remote_url: Option<String>,
    /// Instance-relative URL otherwise.
    #[serde(default)]
    pub url: Option<String>,
}

impl ImageResource {
    /// Resolve the image to an absolute URL against the instance base.
    pub fn resolve(&self, base_url: &Url) -> Option<String> {
        if let Some(ref remote) = self.remote_url {
            return Some(remote.clone());
        }
        let relative = self.url.as_deref()?;
        base_url
            .join(relative.trim_start_matches('/'))
            .ok()
            .map(Into::into)
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the Radarr v3 API.
///
/// Readarr exposes the same movie-library surface under `/api/v1/`, so
/// the client takes the API version as a constructor parameter and the
/// series/book distinction stays in the adapter layer.
pub struct RadarrClient {
    http: reqwest::Client,
    base_url: Url,
    api_path: &'static str,
}

impl RadarrClient {
    /// Build a Radarr client (`/api/v3/`).
    pub fn new(
        base_url: &str,
        api_key: &secrecy::SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        Self::with_api_path(base_url, api_key, transport, "api/v3")
    }

    /// Build a Readarr-compatible client (`/api/v1/`).
    pub fn readarr(
        base_url: &str,
        api_key: &secrecy::SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        Self::with_api_path(base_url, api_key, transport, "api/v1")
    }

    fn with_api_path(
        base_url: &str,
        api_key: &secrecy::SecretString,
        transport: &TransportConfig,
        api_path: &'static str,
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
        Ok(Self {
            http,
            base_url,
            api_path,
        })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self, Error> {
        let base_url = crate::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            api_path: "api/v3",
        })
    }

    /// The instance base URL (for resolving relative poster paths).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetch the full movie (or book) library.
    pub async fn list_movies(&self) -> Result<Vec<MovieResource>, Error> {
        let url = self.base_url.join(&format!("{}/movie", self.api_path))?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        crate::handle_json_response(SERVICE, resp).await
    }
}
