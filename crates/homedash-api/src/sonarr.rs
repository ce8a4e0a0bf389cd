// Sonarr REST v3 client.
//
// Auth: X-Api-Key header. Base path: /api/v3/
//
// Three endpoints feed the dashboard: the series catalog, recent grab/
// import history (pre-sorted descending by date), and the wanted/missing
// page. The core adapter joins them in memory by series id.

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::radarr::ImageResource;
use crate::transport::TransportConfig;

const SERVICE: &str = "sonarr";

// ── Wire types ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesResource {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub monitored: bool,
    #[serde(default)]
    pub images: Vec<ImageResource>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPage {
    #[serde(default)]
    pub records: Vec<HistoryRecord>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub id: i64,
    pub series_id: i64,
    pub episode_id: i64,
    #[serde(default)]
    pub source_title: Option<String>,
    /// "grabbed", "downloadFolderImported", etc.
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub episode: Option<EpisodeResource>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WantedPage {
    #[serde(default)]
    pub records: Vec<EpisodeResource>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeResource {
    pub id: i64,
    pub series_id: i64,
    #[serde(default)]
    pub season_number: i32,
    #[serde(default)]
    pub episode_number: i32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub air_date_utc: Option<String>,
    #[serde(default)]
    pub series: Option<Box<SeriesResource>>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the Sonarr v3 API.
pub struct SonarrClient {
    http: reqwest::Client,
    base_url: Url,
}

impl SonarrClient {
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

    /// The instance base URL (for resolving relative poster paths).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetch the full series catalog.
    pub async fn list_series(&self) -> Result<Vec<SeriesResource>, Error> {
        let url = self.base_url.join("api/v3/series")?;
        debug!("GET {url}");
        let resp = self.http.get(url).send().await?;
        crate::handle_json_response(SERVICE, resp).await
    }

    /// Fetch recent history, newest first.
    pub async fn history(&self, page_size: u32) -> Result<Vec<HistoryRecord>, Error> {
        let url = self.base_url.join("api/v3/history")?;
        debug!("GET {url}");
        let resp = self
            .http
            .get(url)
            .query(&[
                ("pageSize", page_size.to_string()),
                ("sortKey", "date".to_string()),
                ("sortDirection", "descending".to_string()),
                ("includeEpisode", "true".to_string()),
            ])
            .send()
            .await?;
        let page: HistoryPage = crate::handle_json_response(SERVICE, resp).await?;
        Ok(page.records)
    }

    /// Fetch wanted/missing episodes, newest air date first.
    pub async fn wanted_missing(&self, page_size: u32) -> Result<Vec<EpisodeResource>, Error> {
        let url = self.base_url.join("api/v3/wanted/missing")?;
        debug!("GET {url}");
        let resp = self
            .http
            .get(url)
            .query(&[
                ("pageSize", page_size.to_string()),
                ("sortKey", "airDateUtc".to_string()),
                ("sortDirection", "descending".to_string()),
                ("includeSeries", "true".to_string()),
            ])
            .send()
            .await?;
        let page: WantedPage = crate::handle_json_response(SERVICE, resp).await?;
        Ok(page.records)
    }
}
