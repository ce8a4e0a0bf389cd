// Glances REST client (v3 and v4).
//
// Glances exposes one endpoint per metric plugin under /api/{3,4}/.
// The core adapter fetches the quicklook payload plus the supplementary
// plugins concurrently and merges them into one SystemSample; any
// supplementary plugin failing is non-fatal.
//
// v3 and v4 differ in path prefix and in whether network counters are
// cumulative totals or live rates — the rate tracker's magnitude
// heuristic absorbs that difference downstream.

use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

const SERVICE: &str = "glances";

/// Glances REST API major version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlancesVersion {
    V3,
    V4,
}

impl GlancesVersion {
    fn prefix(self) -> &'static str {
        match self {
            Self::V3 => "api/3",
            Self::V4 => "api/4",
        }
    }
}

// ── Wire types ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct QuickLook {
    #[serde(default)]
    pub cpu: f64,
    #[serde(default)]
    pub mem: f64,
    #[serde(default)]
    pub swap: f64,
    #[serde(default)]
    pub percpu: Vec<PerCpu>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PerCpu {
    #[serde(default)]
    pub cpu_number: u32,
    #[serde(default)]
    pub total: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FsEntry {
    #[serde(default)]
    pub mnt_point: String,
    #[serde(default)]
    pub percent: f64,
    #[serde(default)]
    pub used: u64,
    #[serde(default)]
    pub size: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemInfo {
    #[serde(default)]
    pub percent: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkInterface {
    #[serde(default)]
    pub interface_name: String,
    /// Cumulative bytes in v3; may instead be a live rate in v4 builds.
    #[serde(default)]
    pub bytes_recv: f64,
    #[serde(default)]
    pub bytes_sent: f64,
    /// Present on v4 when the server computes rates itself.
    #[serde(default)]
    pub bytes_recv_rate_per_sec: Option<f64>,
    #[serde(default)]
    pub bytes_sent_rate_per_sec: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sensor {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(rename = "type", default)]
    pub sensor_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoadAvg {
    #[serde(default)]
    pub min1: f64,
    #[serde(default)]
    pub min5: f64,
    #[serde(default)]
    pub min15: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessCount {
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub running: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HostInfo {
    #[serde(default)]
    pub hostname: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the Glances modular metrics API.
pub struct GlancesClient {
    http: reqwest::Client,
    base_url: Url,
    version: GlancesVersion,
}

impl GlancesClient {
    pub fn new(
        base_url: &str,
        version: GlancesVersion,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let base_url = crate::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            version,
        })
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: &str,
        version: GlancesVersion,
    ) -> Result<Self, Error> {
        let base_url = crate::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            version,
        })
    }

    async fn plugin<T: serde::de::DeserializeOwned>(&self, name: &str) -> Result<T, Error> {
        let url = self
            .base_url
            .join(&format!("{}/{name}", self.version.prefix()))?;
        debug!("GET {url}");
        let resp = self.http.get(url).send().await?;
        crate::handle_json_response(SERVICE, resp).await
    }

    /// Primary payload: cpu/mem/swap percentages and per-core totals.
    pub async fn quicklook(&self) -> Result<QuickLook, Error> {
        self.plugin("quicklook").await
    }

    /// Mounted filesystems (includes pseudo filesystems; filtered downstream).
    pub async fn fs(&self) -> Result<Vec<FsEntry>, Error> {
        self.plugin("fs").await
    }

    pub async fn mem(&self) -> Result<MemInfo, Error> {
        self.plugin("mem").await
    }

    pub async fn memswap(&self) -> Result<MemInfo, Error> {
        self.plugin("memswap").await
    }

    pub async fn network(&self) -> Result<Vec<NetworkInterface>, Error> {
        self.plugin("network").await
    }

    pub async fn sensors(&self) -> Result<Vec<Sensor>, Error> {
        self.plugin("sensors").await
    }

    pub async fn load(&self) -> Result<LoadAvg, Error> {
        self.plugin("load").await
    }

    pub async fn processcount(&self) -> Result<ProcessCount, Error> {
        self.plugin("processcount").await
    }

    pub async fn system(&self) -> Result<HostInfo, Error> {
        self.plugin("system").await
    }

    /// Uptime as reported by Glances, e.g. `"4 days, 2:02:02"`.
    pub async fn uptime(&self) -> Result<String, Error> {
        self.plugin("uptime").await
    }
}
