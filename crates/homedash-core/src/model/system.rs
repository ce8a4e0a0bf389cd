// ── System-metrics domain types ──

use serde::{Deserialize, Serialize};

/// One mounted filesystem after pseudo-filesystem filtering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilesystemUsage {
    pub mount: String,
    pub percent: f64,
    pub used_bytes: u64,
    pub total_bytes: u64,
}

/// One poll tick's merged view of a monitored host.
///
/// Not purely a function of the latest payload: `network_down_bps` and
/// `network_up_bps` are derived from the previous raw counter sample via
/// the rate tracker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemSample {
    pub hostname: Option<String>,
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub swap_percent: Option<f64>,
    pub cpu_core_percents: Vec<f64>,
    /// Headline figure: the root filesystem, or the first remaining one.
    pub disk_percent: Option<f64>,
    pub filesystems: Vec<FilesystemUsage>,
    pub network_down_bps: f64,
    pub network_up_bps: f64,
    pub cpu_temp_celsius: Option<f64>,
    pub load: Option<(f64, f64, f64)>,
    pub uptime: Option<String>,
    pub process_count: Option<u32>,
    pub process_running: Option<u32>,
}
