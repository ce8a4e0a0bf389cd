// ── Download-client adapter ──
//
// Four wire protocols behind one normalized output. Session-based
// backends (qBittorrent, Deluge) re-login and retry once when a fetch
// comes back as an auth failure, so an expired cookie costs one tick at
// most. Each protocol's status vocabulary maps onto the shared enum;
// unmapped values fall back to Queued.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::SecretString;
use tracing::debug;

use homedash_api::downloads::{
    DelugeClient, QbittorrentClient, SabnzbdClient, TransmissionClient, deluge, qbittorrent,
    sabnzbd, transmission,
};

use super::{Adapter, SourceData, SourceId, SourceKind};
use crate::model::{DownloadItem, DownloadStatus};

/// qBittorrent reports this ETA when it has none.
const QBIT_ETA_INFINITY: i64 = 8_640_000;

pub enum DownloadBackend {
    Qbittorrent {
        client: QbittorrentClient,
        username: String,
        password: SecretString,
    },
    Deluge {
        client: DelugeClient,
        password: SecretString,
    },
    Sabnzbd {
        client: SabnzbdClient,
    },
    Transmission {
        client: TransmissionClient,
    },
}

pub struct DownloadAdapter {
    id: SourceId,
    interval: Duration,
    backend: DownloadBackend,
}

impl DownloadAdapter {
    pub fn new(id: SourceId, backend: DownloadBackend, interval: Duration) -> Self {
        Self {
            id,
            interval,
            backend,
        }
    }
}

#[async_trait]
impl Adapter for DownloadAdapter {
    fn id(&self) -> &SourceId {
        &self.id
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Downloads
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn fetch(&self) -> Result<SourceData, homedash_api::Error> {
        let items = match &self.backend {
            DownloadBackend::Qbittorrent {
                client,
                username,
                password,
            } => {
                let torrents = match client.list_torrents().await {
                    Err(err) if err.is_auth() => {
                        // Session expired or never established.
                        client.login(username, password).await?;
                        client.list_torrents().await?
                    }
                    other => other?,
                };
                torrents.iter().map(from_qbittorrent).collect()
            }
            DownloadBackend::Deluge { client, password } => {
                let ui = match client.update_ui().await {
                    Err(err) if err.is_auth() => {
                        client.login(password).await?;
                        client.update_ui().await?
                    }
                    other => other?,
                };
                ui.torrents
                    .unwrap_or_default()
                    .iter()
                    .map(|(hash, torrent)| from_deluge(hash, torrent))
                    .collect()
            }
            DownloadBackend::Sabnzbd { client } => {
                let queue = client.queue().await?;
                from_sabnzbd(&queue)
            }
            DownloadBackend::Transmission { client } => {
                let torrents = client.torrent_get().await?;
                torrents.iter().map(from_transmission).collect()
            }
        };

        debug!(source = %self.id, count = items.len(), "fetched downloads");
        Ok(SourceData::Downloads(items))
    }
}

// ── Per-protocol normalization ───────────────────────────────────────

fn from_qbittorrent(t: &qbittorrent::TorrentInfo) -> DownloadItem {
    let status = qbittorrent_status(&t.state, t.progress);
    DownloadItem {
        id: t.hash.clone(),
        name: t.name.clone(),
        progress_percent: (t.progress * 100.0).clamp(0.0, 100.0),
        size_bytes: t.size,
        downloaded_bytes: t.downloaded,
        download_rate_bps: t.dlspeed,
        upload_rate_bps: t.upspeed,
        eta_seconds: (t.eta > 0 && t.eta < QBIT_ETA_INFINITY).then_some(t.eta),
        status,
        ratio: Some(t.ratio),
    }
}

fn qbittorrent_status(state: &str, progress: f64) -> DownloadStatus {
    match state {
        "downloading" | "forcedDL" | "metaDL" | "allocating" => DownloadStatus::Downloading,
        "stalledDL" => DownloadStatus::Stalled,
        "uploading" | "forcedUP" | "stalledUP" => DownloadStatus::Seeding,
        "queuedDL" | "queuedUP" => DownloadStatus::Queued,
        "checkingDL" | "checkingUP" | "checkingResumeData" => DownloadStatus::Checking,
        "error" | "missingFiles" => DownloadStatus::Error,
        s if s.starts_with("paused") || s.starts_with("stopped") => {
            if progress >= 1.0 {
                DownloadStatus::Completed
            } else {
                DownloadStatus::Paused
            }
        }
        _ => DownloadStatus::Queued,
    }
}

fn from_deluge(hash: &str, t: &deluge::DelugeTorrent) -> DownloadItem {
    let status = match t.state.as_str() {
        "Downloading" => DownloadStatus::Downloading,
        "Seeding" => DownloadStatus::Seeding,
        "Paused" => {
            if t.progress >= 100.0 {
                DownloadStatus::Completed
            } else {
                DownloadStatus::Paused
            }
        }
        "Checking" => DownloadStatus::Checking,
        "Error" => DownloadStatus::Error,
        _ => DownloadStatus::Queued,
    };

    #[allow(clippy::cast_possible_truncation)]
    let eta = t.eta.round() as i64;
    DownloadItem {
        id: hash.to_owned(),
        name: t.name.clone(),
        progress_percent: t.progress.clamp(0.0, 100.0),
        size_bytes: t.total_size,
        downloaded_bytes: t.total_done,
        download_rate_bps: t.download_payload_rate,
        upload_rate_bps: t.upload_payload_rate,
        eta_seconds: (eta > 0).then_some(eta),
        status,
        ratio: Some(t.ratio),
    }
}

fn from_sabnzbd(queue: &sabnzbd::Queue) -> Vec<DownloadItem> {
    // The queue reports one aggregate rate; attribute it to the first
    // actively downloading slot so per-item rates stay meaningful.
    let queue_bps = queue
        .kbpersec
        .as_deref()
        .and_then(|v| v.parse::<f64>().ok())
        .map_or(0, |kb| (kb * 1024.0) as i64);
    let mut rate_assigned = false;

    queue
        .slots
        .iter()
        .map(|slot| {
            let status = match slot.status.as_deref() {
                Some("Downloading") => DownloadStatus::Downloading,
                Some("Paused") => DownloadStatus::Paused,
                Some("Checking" | "Verifying" | "Repairing") => DownloadStatus::Checking,
                _ => DownloadStatus::Queued,
            };

            let total_mb = parse_mb(slot.mb.as_deref());
            let left_mb = parse_mb(slot.mbleft.as_deref());
            let size_bytes = (total_mb * 1024.0 * 1024.0) as i64;
            let downloaded_bytes = ((total_mb - left_mb).max(0.0) * 1024.0 * 1024.0) as i64;

            let download_rate_bps = if status == DownloadStatus::Downloading && !rate_assigned {
                rate_assigned = true;
                queue_bps
            } else {
                0
            };

            DownloadItem {
                id: slot.nzo_id.clone(),
                name: slot.filename.clone(),
                progress_percent: slot
                    .percentage
                    .as_deref()
                    .and_then(|p| p.parse::<f64>().ok())
                    .unwrap_or(0.0)
                    .clamp(0.0, 100.0),
                size_bytes,
                downloaded_bytes,
                download_rate_bps,
                upload_rate_bps: 0,
                eta_seconds: slot.timeleft.as_deref().and_then(parse_timeleft),
                status,
                ratio: None,
            }
        })
        .collect()
}

fn parse_mb(raw: Option<&str>) -> f64 {
    raw.and_then(|v| v.parse::<f64>().ok()).unwrap_or(0.0)
}

/// `"1:04:50"` -> seconds.
fn parse_timeleft(raw: &str) -> Option<i64> {
    let mut parts = raw.split(':').rev();
    let seconds: i64 = parts.next()?.parse().ok()?;
    let minutes: i64 = parts.next().map_or(Ok(0), str::parse).ok()?;
    let hours: i64 = parts.next().map_or(Ok(0), str::parse).ok()?;
    Some(hours * 3_600 + minutes * 60 + seconds)
}

fn from_transmission(t: &transmission::TransmissionTorrent) -> DownloadItem {
    let status = if t.error_string.is_empty() {
        match t.status {
            transmission::STATUS_STOPPED => {
                if t.percent_done >= 1.0 {
                    DownloadStatus::Completed
                } else {
                    DownloadStatus::Paused
                }
            }
            transmission::STATUS_CHECK_WAIT | transmission::STATUS_CHECK => {
                DownloadStatus::Checking
            }
            transmission::STATUS_DOWNLOAD => DownloadStatus::Downloading,
            transmission::STATUS_SEED => DownloadStatus::Seeding,
            _ => DownloadStatus::Queued,
        }
    } else {
        DownloadStatus::Error
    };

    DownloadItem {
        id: t.id.to_string(),
        name: t.name.clone(),
        progress_percent: (t.percent_done * 100.0).clamp(0.0, 100.0),
        size_bytes: t.total_size,
        downloaded_bytes: t.downloaded_ever,
        download_rate_bps: t.rate_download,
        upload_rate_bps: t.rate_upload,
        eta_seconds: (t.eta > 0).then_some(t.eta),
        status,
        ratio: Some(t.upload_ratio),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn qbittorrent_vocabulary_maps_to_the_shared_enum() {
        assert_eq!(qbittorrent_status("downloading", 0.4), DownloadStatus::Downloading);
        assert_eq!(qbittorrent_status("stalledDL", 0.4), DownloadStatus::Stalled);
        assert_eq!(qbittorrent_status("stalledUP", 1.0), DownloadStatus::Seeding);
        assert_eq!(qbittorrent_status("pausedDL", 0.4), DownloadStatus::Paused);
        assert_eq!(qbittorrent_status("pausedUP", 1.0), DownloadStatus::Completed);
        assert_eq!(qbittorrent_status("checkingDL", 0.4), DownloadStatus::Checking);
        assert_eq!(qbittorrent_status("missingFiles", 0.4), DownloadStatus::Error);
        // Unmapped upstream state falls back to Queued.
        assert_eq!(qbittorrent_status("moving", 1.0), DownloadStatus::Queued);
    }

    #[test]
    fn qbittorrent_infinite_eta_becomes_none() {
        let torrent: qbittorrent::TorrentInfo = serde_json::from_value(serde_json::json!({
            "hash": "h", "name": "n", "progress": 0.5, "size": 100, "downloaded": 50,
            "dlspeed": 10, "upspeed": 0, "eta": 8_640_000, "state": "downloading", "ratio": 0.0
        }))
        .unwrap();
        assert_eq!(from_qbittorrent(&torrent).eta_seconds, None);
    }

    #[test]
    fn deluge_progress_is_already_percent() {
        let torrent: deluge::DelugeTorrent = serde_json::from_value(serde_json::json!({
            "name": "n", "progress": 73.5, "total_size": 100, "total_done": 73,
            "download_payload_rate": 10, "upload_payload_rate": 0,
            "eta": 60.0, "state": "Downloading", "ratio": 0.1
        }))
        .unwrap();
        let item = from_deluge("hash", &torrent);
        assert!((item.progress_percent - 73.5).abs() < f64::EPSILON);
        assert_eq!(item.status, DownloadStatus::Downloading);
        assert_eq!(item.eta_seconds, Some(60));
    }

    #[test]
    fn sabnzbd_aggregate_rate_goes_to_the_first_downloading_slot() {
        let queue: sabnzbd::Queue = serde_json::from_value(serde_json::json!({
            "kbpersec": "1024.00",
            "status": "Downloading",
            "slots": [
                { "nzo_id": "a", "filename": "first", "percentage": "42",
                  "mb": "1000.0", "mbleft": "580.0", "status": "Downloading",
                  "timeleft": "0:04:50" },
                { "nzo_id": "b", "filename": "second", "percentage": "0",
                  "mb": "500.0", "mbleft": "500.0", "status": "Queued", "timeleft": "0:00:00" }
            ]
        }))
        .unwrap();

        let items = from_sabnzbd(&queue);
        assert_eq!(items[0].download_rate_bps, 1024 * 1024);
        assert_eq!(items[0].eta_seconds, Some(290));
        assert_eq!(items[1].download_rate_bps, 0);
        assert_eq!(items[1].status, DownloadStatus::Queued);
    }

    #[test]
    fn sabnzbd_downloaded_bytes_never_go_negative() {
        let queue: sabnzbd::Queue = serde_json::from_value(serde_json::json!({
            "slots": [
                { "nzo_id": "a", "filename": "odd", "percentage": "0",
                  "mb": "100.0", "mbleft": "150.0", "status": "Queued" }
            ]
        }))
        .unwrap();
        assert_eq!(from_sabnzbd(&queue)[0].downloaded_bytes, 0);
    }

    #[test]
    fn transmission_codes_map_to_the_shared_enum() {
        let make = |status: i64, percent: f64, error: &str| -> DownloadItem {
            let torrent: transmission::TransmissionTorrent =
                serde_json::from_value(serde_json::json!({
                    "id": 1, "name": "n", "percentDone": percent, "totalSize": 100,
                    "downloadedEver": 50, "rateDownload": 0, "rateUpload": 0,
                    "eta": -1, "status": status, "uploadRatio": 0.0, "errorString": error
                }))
                .unwrap();
            from_transmission(&torrent)
        };

        assert_eq!(make(4, 0.5, "").status, DownloadStatus::Downloading);
        assert_eq!(make(6, 1.0, "").status, DownloadStatus::Seeding);
        assert_eq!(make(0, 1.0, "").status, DownloadStatus::Completed);
        assert_eq!(make(0, 0.5, "").status, DownloadStatus::Paused);
        assert_eq!(make(2, 0.5, "").status, DownloadStatus::Checking);
        assert_eq!(make(3, 0.5, "").status, DownloadStatus::Queued);
        assert_eq!(make(4, 0.5, "tracker error").status, DownloadStatus::Error);
        assert_eq!(make(4, 0.5, "").eta_seconds, None);
    }

    #[test]
    fn timeleft_parses_hms_and_ms() {
        assert_eq!(parse_timeleft("1:04:50"), Some(3_890));
        assert_eq!(parse_timeleft("04:50"), Some(290));
        assert_eq!(parse_timeleft("50"), Some(50));
        assert_eq!(parse_timeleft("junk"), None);
    }
}
