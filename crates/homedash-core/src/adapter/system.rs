// ── System-metrics adapter (Glances) ──
//
// The quicklook payload is the primary fetch; every supplementary
// plugin is fetched concurrently and is individually non-fatal, so a
// Glances build without the sensors plugin still produces a sample.
// Network counters go through the rate tracker, which owns the only
// cross-tick state and is committed after the last await.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, trace};

use homedash_api::glances::{FsEntry, GlancesClient, NetworkInterface, Sensor};

use super::{Adapter, SourceData, SourceId, SourceKind};
use crate::model::{FilesystemUsage, SystemSample};
use crate::rates::RateTracker;

/// Mount-point prefixes of virtual/pseudo filesystems.
const PSEUDO_FS_PREFIXES: &[&str] = &["/dev", "/proc", "/sys", "/run", "/snap", "/boot/efi"];

pub struct SystemAdapter {
    id: SourceId,
    interval: Duration,
    client: GlancesClient,
    rates: Mutex<RateTracker>,
}

impl SystemAdapter {
    pub fn new(id: SourceId, client: GlancesClient, interval: Duration) -> Self {
        Self {
            id,
            interval,
            client,
            rates: Mutex::new(RateTracker::new()),
        }
    }
}

#[async_trait]
impl Adapter for SystemAdapter {
    fn id(&self) -> &SourceId {
        &self.id
    }

    fn kind(&self) -> SourceKind {
        SourceKind::System
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn fetch(&self) -> Result<SourceData, homedash_api::Error> {
        // Quicklook is the one mandatory call.
        let (quicklook, fs, network, sensors, load, processes, host, uptime) = tokio::join!(
            self.client.quicklook(),
            self.client.fs(),
            self.client.network(),
            self.client.sensors(),
            self.client.load(),
            self.client.processcount(),
            self.client.system(),
            self.client.uptime(),
        );
        let quicklook = quicklook?;

        let filesystems = fs.map(|entries| filter_filesystems(&entries)).ok();
        let (network_down_bps, network_up_bps) = match network {
            Ok(interfaces) => {
                let mut tracker = self.rates.lock().await;
                aggregate_network(&mut tracker, self.id.as_str(), &interfaces, self.interval)
            }
            Err(err) => {
                trace!(source = %self.id, %err, "network plugin unavailable");
                (0.0, 0.0)
            }
        };

        let filesystems = filesystems.unwrap_or_default();
        let sample = SystemSample {
            hostname: host.ok().and_then(|h| h.hostname),
            cpu_percent: quicklook.cpu,
            memory_percent: quicklook.mem,
            swap_percent: (quicklook.swap > 0.0).then_some(quicklook.swap),
            cpu_core_percents: quicklook.percpu.iter().map(|c| c.total).collect(),
            disk_percent: headline_disk(&filesystems),
            filesystems,
            network_down_bps,
            network_up_bps,
            cpu_temp_celsius: sensors.ok().as_deref().and_then(cpu_temperature),
            load: load.ok().map(|l| (l.min1, l.min5, l.min15)),
            uptime: uptime.ok(),
            process_count: processes.as_ref().ok().map(|p| p.total),
            process_running: processes.ok().map(|p| p.running),
        };

        debug!(source = %self.id, cpu = sample.cpu_percent, "fetched system sample");
        Ok(SourceData::System(Box::new(sample)))
    }
}

/// Drop pseudo filesystems, keep real mounts.
fn filter_filesystems(entries: &[FsEntry]) -> Vec<FilesystemUsage> {
    entries
        .iter()
        .filter(|e| {
            !PSEUDO_FS_PREFIXES
                .iter()
                .any(|prefix| e.mnt_point.starts_with(prefix))
        })
        .map(|e| FilesystemUsage {
            mount: e.mnt_point.clone(),
            percent: e.percent,
            used_bytes: e.used,
            total_bytes: e.size,
        })
        .collect()
}

/// The root filesystem, or the first remaining one.
fn headline_disk(filesystems: &[FilesystemUsage]) -> Option<f64> {
    filesystems
        .iter()
        .find(|f| f.mount == "/")
        .or_else(|| filesystems.first())
        .map(|f| f.percent)
}

/// Sum per-interface rates, skipping loopback. v4 builds that report
/// server-side rates bypass the tracker; raw counters go through it.
fn aggregate_network(
    tracker: &mut RateTracker,
    source_key: &str,
    interfaces: &[NetworkInterface],
    interval: Duration,
) -> (f64, f64) {
    let mut down = 0.0;
    let mut up = 0.0;

    for iface in interfaces {
        if iface.interface_name == "lo" {
            continue;
        }

        if let (Some(rx), Some(tx)) = (iface.bytes_recv_rate_per_sec, iface.bytes_sent_rate_per_sec)
        {
            down += rx.max(0.0);
            up += tx.max(0.0);
            continue;
        }

        let rate = tracker.compute_rate(
            source_key,
            &iface.interface_name,
            iface.bytes_recv,
            iface.bytes_sent,
            u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
        );
        down += rate.rx_bps;
        up += rate.tx_bps;
    }

    (down, up)
}

/// First CPU-ish temperature sensor.
fn cpu_temperature(sensors: &[Sensor]) -> Option<f64> {
    sensors
        .iter()
        .find(|s| {
            s.sensor_type.as_deref() == Some("temperature_core")
                || s.label.to_lowercase().contains("cpu")
                || s.label.to_lowercase().contains("package")
        })
        .map(|s| s.value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn fs_entry(mount: &str, percent: f64) -> FsEntry {
        serde_json::from_value(serde_json::json!({
            "mnt_point": mount, "percent": percent, "used": 100_u64, "size": 200_u64
        }))
        .unwrap()
    }

    #[test]
    fn pseudo_filesystems_are_filtered_by_prefix() {
        let entries = vec![
            fs_entry("/", 71.0),
            fs_entry("/dev/shm", 0.0),
            fs_entry("/proc/sys", 0.0),
            fs_entry("/run/lock", 0.0),
            fs_entry("/snap/core", 100.0),
            fs_entry("/boot/efi", 12.0),
            fs_entry("/mnt/media", 80.0),
        ];
        let filtered = filter_filesystems(&entries);
        let mounts: Vec<&str> = filtered.iter().map(|f| f.mount.as_str()).collect();
        assert_eq!(mounts, vec!["/", "/mnt/media"]);
    }

    #[test]
    fn headline_prefers_root_over_order() {
        let filesystems = filter_filesystems(&[fs_entry("/mnt/media", 80.0), fs_entry("/", 71.0)]);
        assert_eq!(headline_disk(&filesystems), Some(71.0));
    }

    #[test]
    fn headline_falls_back_to_first_without_root() {
        let filesystems = filter_filesystems(&[fs_entry("/mnt/a", 30.0), fs_entry("/mnt/b", 60.0)]);
        assert_eq!(headline_disk(&filesystems), Some(30.0));
        assert_eq!(headline_disk(&[]), None);
    }

    fn iface(name: &str, recv: f64, sent: f64, rates: Option<(f64, f64)>) -> NetworkInterface {
        let mut value = serde_json::json!({
            "interface_name": name, "bytes_recv": recv, "bytes_sent": sent
        });
        if let Some((rx, tx)) = rates {
            value["bytes_recv_rate_per_sec"] = rx.into();
            value["bytes_sent_rate_per_sec"] = tx.into();
        }
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn server_side_rates_bypass_the_tracker() {
        let mut tracker = RateTracker::new();
        let interfaces = vec![iface("eth0", 5e9, 5e9, Some((1_000.0, 500.0)))];
        let (down, up) =
            aggregate_network(&mut tracker, "sys", &interfaces, Duration::from_secs(5));
        assert!((down - 1_000.0).abs() < f64::EPSILON);
        assert!((up - 500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn cumulative_counters_need_a_baseline_tick() {
        let mut tracker = RateTracker::new();
        let first = vec![iface("eth0", 5e9, 5e9, None)];
        let (down, _) = aggregate_network(&mut tracker, "sys", &first, Duration::from_secs(5));
        assert!(down.abs() < f64::EPSILON);

        let second = vec![iface("eth0", 5e9 + 5_000_000.0, 5e9, None)];
        let (down, _) = aggregate_network(&mut tracker, "sys", &second, Duration::from_secs(5));
        assert!((down - 1_000_000.0).abs() < 1.0);
    }

    #[test]
    fn loopback_is_skipped() {
        let mut tracker = RateTracker::new();
        let interfaces = vec![iface("lo", 1e12, 1e12, Some((9e9, 9e9)))];
        let (down, up) =
            aggregate_network(&mut tracker, "sys", &interfaces, Duration::from_secs(5));
        assert!(down.abs() < f64::EPSILON);
        assert!(up.abs() < f64::EPSILON);
    }

    #[test]
    fn cpu_temperature_picks_a_cpu_sensor() {
        let sensors: Vec<Sensor> = serde_json::from_value(serde_json::json!([
            { "label": "ambient", "value": 25.0, "unit": "C" },
            { "label": "Package id 0", "value": 54.0, "unit": "C", "type": "temperature_core" }
        ]))
        .unwrap();
        assert_eq!(cpu_temperature(&sensors), Some(54.0));
    }
}
