// ── Download domain types ──

use serde::{Deserialize, Serialize};

/// Canonical download status shared by all four client protocols.
///
/// Each protocol's native vocabulary (qBittorrent state strings, Deluge
/// state names, SABnzbd queue statuses, Transmission numeric codes) is
/// mapped onto this set; unmapped values fall back to `Queued`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "lowercase")]
#[non_exhaustive]
pub enum DownloadStatus {
    Queued,
    Downloading,
    Seeding,
    Paused,
    Stalled,
    Checking,
    Completed,
    Error,
}

/// One active or completed transfer, normalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadItem {
    pub id: String,
    pub name: String,
    /// 0.0 ..= 100.0
    pub progress_percent: f64,
    pub size_bytes: i64,
    pub downloaded_bytes: i64,
    pub download_rate_bps: i64,
    pub upload_rate_bps: i64,
    /// None when the upstream reports no (or an "infinite") ETA.
    pub eta_seconds: Option<i64>,
    pub status: DownloadStatus,
    pub ratio: Option<f64>,
}

impl DownloadItem {
    pub fn is_active(&self) -> bool {
        matches!(
            self.status,
            DownloadStatus::Downloading | DownloadStatus::Seeding | DownloadStatus::Checking
        )
    }
}
