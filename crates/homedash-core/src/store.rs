// ── Reactive per-source state table ──
//
// Lock-free concurrent storage keyed by source id, with push-based
// change notification via `watch` channels. Mutation happens only
// through the scheduler's completion path for each source.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use homedash_api::ErrorKind;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::adapter::{SourceData, SourceId, SourceKind};

/// The last recorded failure for a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    pub kind: ErrorKind,
    pub message: String,
}

/// Everything the dashboard knows about one configured source.
///
/// `data` holds the last successful fetch and survives later failures,
/// so a transient upstream error never blanks a panel. `loading` is set
/// when a fetch starts and cleared on both completion paths.
#[derive(Debug, Clone)]
pub struct SourceState {
    pub kind: SourceKind,
    pub data: Option<SourceData>,
    pub loading: bool,
    pub last_error: Option<SourceError>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl SourceState {
    fn empty(kind: SourceKind) -> Self {
        Self {
            kind,
            data: None,
            loading: false,
            last_error: None,
            last_updated: None,
        }
    }

    /// A source is healthy once it has data and no standing error.
    pub fn is_healthy(&self) -> bool {
        self.data.is_some() && self.last_error.is_none()
    }
}

/// Reactive table of all configured sources.
///
/// Each source gets its own `watch` channel carrying an `Arc` snapshot
/// of its state, plus a table-wide version counter bumped on every
/// mutation so a consumer can wake on "anything changed".
pub struct SourceTable {
    sources: DashMap<SourceId, watch::Sender<Arc<SourceState>>>,
    version: watch::Sender<u64>,
}

impl Default for SourceTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceTable {
    pub fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        Self {
            sources: DashMap::new(),
            version,
        }
    }

    /// Add a source with an empty state. Idempotent per id.
    pub fn register(&self, id: SourceId, kind: SourceKind) {
        self.sources.entry(id).or_insert_with(|| {
            let (tx, _) = watch::channel(Arc::new(SourceState::empty(kind)));
            tx
        });
        self.bump_version();
    }

    /// Mark a fetch as started. Existing data stays visible.
    pub fn begin_fetch(&self, id: &SourceId) {
        self.mutate(id, |state| state.loading = true);
    }

    /// Record a successful fetch: fresh data, error cleared.
    pub fn complete_success(&self, id: &SourceId, data: SourceData) {
        self.mutate(id, |state| {
            state.data = Some(data);
            state.loading = false;
            state.last_error = None;
            state.last_updated = Some(Utc::now());
        });
    }

    /// Record a failed fetch. Previous data is kept (stale-but-present)
    /// and `last_updated` still marks the last successful fetch.
    pub fn complete_error(&self, id: &SourceId, kind: ErrorKind, message: String) {
        self.mutate(id, |state| {
            state.loading = false;
            state.last_error = Some(SourceError { kind, message });
        });
    }

    /// Current state of one source (cheap `Arc` clone).
    pub fn get(&self, id: &SourceId) -> Option<Arc<SourceState>> {
        self.sources.get(id).map(|tx| tx.borrow().clone())
    }

    /// Subscribe to state changes for one source.
    pub fn subscribe(&self, id: &SourceId) -> Option<watch::Receiver<Arc<SourceState>>> {
        self.sources.get(id).map(|tx| tx.subscribe())
    }

    /// Stream of state snapshots for one source, yielding the current
    /// value first and then every subsequent change.
    pub fn stream(&self, id: &SourceId) -> Option<WatchStream<Arc<SourceState>>> {
        self.subscribe(id).map(WatchStream::new)
    }

    /// Subscribe to the table-wide version counter, bumped on every
    /// mutation of any source.
    pub fn subscribe_version(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    /// Snapshot of every source, sorted by id for stable display order.
    pub fn snapshot(&self) -> Vec<(SourceId, Arc<SourceState>)> {
        let mut all: Vec<(SourceId, Arc<SourceState>)> = self
            .sources
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().borrow().clone()))
            .collect();
        all.sort_by(|a, b| a.0.as_str().cmp(b.0.as_str()));
        all
    }

    /// Registered source ids, sorted.
    pub fn ids(&self) -> Vec<SourceId> {
        let mut ids: Vec<SourceId> = self.sources.iter().map(|e| e.key().clone()).collect();
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        ids
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn mutate(&self, id: &SourceId, f: impl FnOnce(&mut SourceState)) {
        if let Some(tx) = self.sources.get(id) {
            // `send_modify` updates unconditionally, even with zero receivers.
            tx.send_modify(|state| {
                let mut next = (**state).clone();
                f(&mut next);
                *state = Arc::new(next);
            });
            drop(tx);
            self.bump_version();
        }
    }

    fn bump_version(&self) {
        self.version.send_modify(|v| *v += 1);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::DownloadItem;

    fn table_with(id: &str) -> (SourceTable, SourceId) {
        let table = SourceTable::new();
        let id = SourceId::from(id);
        table.register(id.clone(), SourceKind::Downloads);
        (table, id)
    }

    fn sample_data() -> SourceData {
        SourceData::Downloads(vec![DownloadItem {
            id: "t1".into(),
            name: "linux.iso".into(),
            progress_percent: 42.0,
            size_bytes: 1_000_000,
            downloaded_bytes: 420_000,
            download_rate_bps: 1024,
            upload_rate_bps: 0,
            eta_seconds: Some(600),
            status: crate::model::DownloadStatus::Downloading,
            ratio: None,
        }])
    }

    #[test]
    fn register_starts_empty() {
        let (table, id) = table_with("qbit");
        let state = table.get(&id).unwrap();
        assert!(state.data.is_none());
        assert!(!state.loading);
        assert!(state.last_error.is_none());
    }

    #[test]
    fn success_sets_data_and_clears_error() {
        let (table, id) = table_with("qbit");
        table.complete_error(&id, ErrorKind::Network, "connection refused".into());
        table.begin_fetch(&id);
        table.complete_success(&id, sample_data());

        let state = table.get(&id).unwrap();
        assert!(state.data.is_some());
        assert!(!state.loading);
        assert!(state.last_error.is_none());
        assert!(state.last_updated.is_some());
    }

    #[test]
    fn error_keeps_stale_data() {
        let (table, id) = table_with("qbit");
        table.complete_success(&id, sample_data());
        let updated = table.get(&id).unwrap().last_updated;

        table.begin_fetch(&id);
        table.complete_error(&id, ErrorKind::Http, "HTTP 503 from qbittorrent".into());

        let state = table.get(&id).unwrap();
        assert!(state.data.is_some(), "stale data must stay visible");
        assert!(!state.loading, "loading must clear on the error path too");
        assert_eq!(state.last_error.as_ref().unwrap().kind, ErrorKind::Http);
        assert_eq!(state.last_updated, updated);
    }

    #[test]
    fn subscribers_see_updates() {
        let (table, id) = table_with("qbit");
        let mut rx = table.subscribe(&id).unwrap();
        assert!(rx.borrow_and_update().data.is_none());

        table.complete_success(&id, sample_data());
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().data.is_some());
    }

    #[tokio::test]
    async fn stream_yields_current_then_updates() {
        use futures_util::StreamExt;

        let (table, id) = table_with("qbit");
        let mut stream = table.stream(&id).unwrap();
        assert!(stream.next().await.unwrap().data.is_none());

        table.complete_success(&id, sample_data());
        assert!(stream.next().await.unwrap().data.is_some());
    }

    #[test]
    fn version_bumps_on_every_mutation() {
        let (table, id) = table_with("qbit");
        let rx = table.subscribe_version();
        let before = *rx.borrow();

        table.begin_fetch(&id);
        table.complete_success(&id, sample_data());
        assert!(*rx.borrow() > before);
    }

    #[test]
    fn snapshot_is_sorted_by_id() {
        let table = SourceTable::new();
        table.register(SourceId::from("zzz"), SourceKind::Feeds);
        table.register(SourceId::from("aaa"), SourceKind::Containers);

        let snap = table.snapshot();
        assert_eq!(snap[0].0.as_str(), "aaa");
        assert_eq!(snap[1].0.as_str(), "zzz");
    }

    #[test]
    fn unknown_id_is_ignored() {
        let table = SourceTable::new();
        let ghost = SourceId::from("ghost");
        table.begin_fetch(&ghost);
        table.complete_success(&ghost, sample_data());
        assert!(table.get(&ghost).is_none());
    }
}
