// ── Rate delta tracker ──
//
// Converts cumulative byte counters into per-second rates by keeping the
// previous raw sample per (source, interface) key. The only cross-tick
// mutable state in the engine; owned by the system-metrics adapter and
// updated at the end of each successful fetch.

use std::collections::HashMap;

/// Values below this magnitude are treated as already-per-second rates
/// rather than cumulative totals. Upstream API versions differ in which
/// they report, and a live rate never plausibly reaches 1 GB/s on the
/// hardware this targets while a cumulative counter passes it quickly.
pub const RATE_THRESHOLD_BYTES: f64 = 1e9;

/// Per-direction rate in bytes per second.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rate {
    pub rx_bps: f64,
    pub tx_bps: f64,
}

#[derive(Debug, Clone, Copy)]
struct Sample {
    rx: f64,
    tx: f64,
}

/// Stateful cumulative-counter to rate converter.
#[derive(Debug, Default)]
pub struct RateTracker {
    previous: HashMap<(String, String), Sample>,
}

impl RateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the per-second rate for one interface of one source.
    ///
    /// The first observation for a key returns `{0, 0}` and seeds the
    /// baseline. Counter resets (current below previous) clamp to zero
    /// rather than going negative. Values under
    /// [`RATE_THRESHOLD_BYTES`] are passed through as rates directly.
    pub fn compute_rate(
        &mut self,
        source_key: &str,
        interface_key: &str,
        cumulative_rx: f64,
        cumulative_tx: f64,
        interval_ms: u64,
    ) -> Rate {
        // Already a rate, not a counter: use it as-is, keep no baseline.
        if cumulative_rx < RATE_THRESHOLD_BYTES
            && cumulative_tx < RATE_THRESHOLD_BYTES
            && !self.looks_cumulative(source_key, interface_key)
        {
            return Rate {
                rx_bps: cumulative_rx.max(0.0),
                tx_bps: cumulative_tx.max(0.0),
            };
        }

        let key = (source_key.to_owned(), interface_key.to_owned());
        let current = Sample {
            rx: cumulative_rx,
            tx: cumulative_tx,
        };

        let rate = match self.previous.get(&key) {
            None => Rate::default(),
            Some(prev) => {
                #[allow(clippy::cast_precision_loss)]
                let secs = (interval_ms as f64 / 1_000.0).max(f64::EPSILON);
                Rate {
                    rx_bps: ((current.rx - prev.rx) / secs).max(0.0),
                    tx_bps: ((current.tx - prev.tx) / secs).max(0.0),
                }
            }
        };

        self.previous.insert(key, current);
        rate
    }

    /// Drop the baseline for every interface of a source, e.g. when the
    /// source is reconfigured.
    pub fn reset_source(&mut self, source_key: &str) {
        self.previous.retain(|(source, _), _| source != source_key);
    }

    /// A key that has an established baseline stays in diff mode even if
    /// one sample dips under the threshold (a freshly rebooted host's
    /// counters start small but are still cumulative).
    fn looks_cumulative(&self, source_key: &str, interface_key: &str) -> bool {
        self.previous
            .contains_key(&(source_key.to_owned(), interface_key.to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn first_observation_returns_zero_and_seeds_baseline() {
        let mut tracker = RateTracker::new();
        let rate = tracker.compute_rate("sys", "eth0", 5e9, 2e9, 5_000);
        assert_eq!(rate, Rate::default());

        let rate = tracker.compute_rate("sys", "eth0", 5e9 + 5_000_000.0, 2e9, 5_000);
        assert!((rate.rx_bps - 1_000_000.0).abs() < 1.0);
        assert!(rate.tx_bps.abs() < f64::EPSILON);
    }

    #[test]
    fn counter_reset_clamps_to_zero() {
        let mut tracker = RateTracker::new();
        tracker.compute_rate("sys", "eth0", 9e9, 9e9, 5_000);
        // Host rebooted: counters restart near zero but stay in diff mode.
        let rate = tracker.compute_rate("sys", "eth0", 1_000.0, 1_000.0, 5_000);
        assert!(rate.rx_bps >= 0.0);
        assert!(rate.tx_bps >= 0.0);
    }

    #[test]
    fn never_negative_over_any_sequence() {
        let mut tracker = RateTracker::new();
        for sample in [3e9, 4e9, 2e9, 9e9, 1e9, 1.5e9] {
            let rate = tracker.compute_rate("sys", "eth0", sample, sample, 1_000);
            assert!(rate.rx_bps >= 0.0, "negative rx at sample {sample}");
            assert!(rate.tx_bps >= 0.0, "negative tx at sample {sample}");
        }
    }

    #[test]
    fn sub_threshold_values_pass_through_as_rates() {
        let mut tracker = RateTracker::new();
        let rate = tracker.compute_rate("sys", "wlan0", 1_250_000.0, 300_000.0, 5_000);
        assert!((rate.rx_bps - 1_250_000.0).abs() < f64::EPSILON);
        assert!((rate.tx_bps - 300_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn interfaces_are_tracked_independently() {
        let mut tracker = RateTracker::new();
        tracker.compute_rate("sys", "eth0", 5e9, 5e9, 5_000);
        // Different interface: no baseline yet, still zero.
        let rate = tracker.compute_rate("sys", "eth1", 6e9, 6e9, 5_000);
        assert_eq!(rate, Rate::default());
    }

    #[test]
    fn reset_source_drops_all_its_baselines() {
        let mut tracker = RateTracker::new();
        tracker.compute_rate("a", "eth0", 5e9, 5e9, 5_000);
        tracker.compute_rate("b", "eth0", 5e9, 5e9, 5_000);
        tracker.reset_source("a");

        // "a" starts over; "b" keeps its baseline.
        assert_eq!(tracker.compute_rate("a", "eth0", 6e9, 6e9, 5_000), Rate::default());
        let rate = tracker.compute_rate("b", "eth0", 5e9 + 5_000.0, 5e9, 5_000);
        assert!(rate.rx_bps > 0.0);
    }
}
