// ── Polling scheduler ──
//
// One background task per registered source. Each task runs its
// adapter immediately, then on a fixed interval, with at most one
// fetch in flight: ticks that fire mid-fetch are skipped, and manual
// triggers that arrive mid-fetch are drained after the fetch, never
// queued. Teardown cancels every task before returning.

use std::sync::Arc;

use futures_util::FutureExt;
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::adapter::{Adapter, SourceId};
use crate::error::CoreError;
use crate::store::SourceTable;

pub struct Scheduler {
    table: Arc<SourceTable>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
    triggers: dashmap::DashMap<SourceId, Arc<Notify>>,
}

impl Scheduler {
    pub fn new(table: Arc<SourceTable>) -> Self {
        Self {
            table,
            cancel: CancellationToken::new(),
            task_handles: Mutex::new(Vec::new()),
            triggers: dashmap::DashMap::new(),
        }
    }

    /// Register an adapter and start its polling task.
    ///
    /// The adapter runs once immediately, then every `interval()`.
    pub async fn register(&self, adapter: Arc<dyn Adapter>) {
        let id = adapter.id().clone();
        self.table.register(id.clone(), adapter.kind());

        let trigger = Arc::new(Notify::new());
        self.triggers.insert(id, Arc::clone(&trigger));

        let table = Arc::clone(&self.table);
        let cancel = self.cancel.child_token();
        let handle = tokio::spawn(poll_task(adapter, table, trigger, cancel));
        self.task_handles.lock().await.push(handle);
    }

    /// Re-run a source's fetch now without disturbing its periodic
    /// schedule. A no-op while that source's fetch is already in
    /// flight: the pending notification is drained, not queued.
    pub fn trigger_now(&self, id: &SourceId) -> Result<(), CoreError> {
        match self.triggers.get(id) {
            Some(trigger) => {
                trigger.notify_one();
                Ok(())
            }
            None => Err(CoreError::SourceNotFound {
                source_id: id.to_string(),
            }),
        }
    }

    /// Stop every polling task. In-flight fetches are cancelled, so no
    /// stale update can land after this returns.
    pub async fn unregister_all(&self) {
        self.cancel.cancel();
        let mut handles = self.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        self.triggers.clear();
    }
}

async fn poll_task(
    adapter: Arc<dyn Adapter>,
    table: Arc<SourceTable>,
    trigger: Arc<Notify>,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(adapter.interval());
    // A delayed tick must not cause a burst of catch-up fetches.
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            // The first tick fires immediately on registration.
            _ = interval.tick() => {}
            () = trigger.notified() => {}
        }

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = run_once(adapter.as_ref(), &table) => {}
        }

        // Triggers that arrived during the fetch are dropped, never
        // replayed: that fetch already produced fresh data.
        while trigger.notified().now_or_never().is_some() {}
    }
}

/// One fetch cycle: mark loading, fetch with the adapter's deadline,
/// record the outcome. Loading clears on every path.
pub(crate) async fn run_once(adapter: &dyn Adapter, table: &SourceTable) {
    let id = adapter.id();
    table.begin_fetch(id);

    let timeout = adapter.timeout();
    match tokio::time::timeout(timeout, adapter.fetch()).await {
        Ok(Ok(data)) => {
            debug!(source = %id, items = data.len(), "fetch ok");
            table.complete_success(id, data);
        }
        Ok(Err(e)) => {
            warn!(source = %id, error = %e, "fetch failed");
            table.complete_error(id, e.kind(), e.to_string());
        }
        Err(_) => {
            warn!(source = %id, timeout_secs = timeout.as_secs(), "fetch timed out");
            table.complete_error(
                id,
                homedash_api::ErrorKind::Timeout,
                format!("{id} did not respond within {}s", timeout.as_secs()),
            );
        }
    }
}
