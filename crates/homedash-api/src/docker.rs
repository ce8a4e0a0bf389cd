// Docker Engine API client, plus the Portainer variant that proxies the
// same Engine endpoints under /api/endpoints/{id}/docker/.
//
// Both produce the same wire shape (`/containers/json`), so one set of
// types covers both surfaces and the core adapter normalizes them once.

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

const SERVICE: &str = "docker";

// ── Wire types (Engine API, PascalCase) ──────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ContainerJson {
    #[serde(rename = "Id")]
    pub id: String,
    /// Names carry a leading slash, e.g. `"/jellyfin"`.
    #[serde(rename = "Names", default)]
    pub names: Vec<String>,
    #[serde(rename = "Image", default)]
    pub image: String,
    /// "running", "exited", "paused", "restarting", "dead", "created".
    #[serde(rename = "State", default)]
    pub state: String,
    /// Free text, e.g. `"Up 2 hours (healthy)"`.
    #[serde(rename = "Status", default)]
    pub status: String,
    /// Unix epoch seconds.
    #[serde(rename = "Created", default)]
    pub created: i64,
    #[serde(rename = "Ports", default)]
    pub ports: Vec<PortJson>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PortJson {
    #[serde(rename = "PrivatePort")]
    pub private_port: u16,
    #[serde(rename = "PublicPort", default)]
    pub public_port: Option<u16>,
    #[serde(rename = "Type", default)]
    pub protocol: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PortainerEndpoint {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(rename = "Name", default)]
    pub name: String,
}

// ── Direct Engine client ─────────────────────────────────────────────

/// Client for a Docker Engine API exposed over TCP.
pub struct DockerClient {
    http: reqwest::Client,
    base_url: Url,
}

impl DockerClient {
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let base_url = crate::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self, Error> {
        let base_url = crate::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// List all containers (running and stopped).
    pub async fn list_containers(&self) -> Result<Vec<ContainerJson>, Error> {
        let url = self.base_url.join("containers/json")?;
        debug!("GET {url}");
        let resp = self.http.get(url).query(&[("all", "true")]).send().await?;
        crate::handle_json_response(SERVICE, resp).await
    }
}

// ── Portainer-proxied client ─────────────────────────────────────────

/// Client for Portainer's REST API, which proxies the Engine API of each
/// registered endpoint.
pub struct PortainerClient {
    http: reqwest::Client,
    base_url: Url,
}

impl PortainerClient {
    /// Build from a Portainer base URL and access token (X-API-Key).
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
        headers.insert("X-API-Key", key_value);

        let http = transport.build_client_with_headers(headers)?;
        let base_url = crate::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self, Error> {
        let base_url = crate::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// List registered endpoints (Docker environments).
    pub async fn list_endpoints(&self) -> Result<Vec<PortainerEndpoint>, Error> {
        let url = self.base_url.join("api/endpoints")?;
        debug!("GET {url}");
        let resp = self.http.get(url).send().await?;
        crate::handle_json_response(SERVICE, resp).await
    }

    /// List all containers of one endpoint through the Docker proxy.
    pub async fn list_containers(&self, endpoint_id: i64) -> Result<Vec<ContainerJson>, Error> {
        let url = self
            .base_url
            .join(&format!("api/endpoints/{endpoint_id}/docker/containers/json"))?;
        debug!("GET {url}");
        let resp = self.http.get(url).query(&[("all", "true")]).send().await?;
        crate::handle_json_response(SERVICE, resp).await
    }
}
