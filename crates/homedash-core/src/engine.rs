// ── Engine facade ──
//
// Builds one adapter per enabled integration, owns the source table,
// and drives either a single refresh cycle (`oneshot`) or the polling
// scheduler (`start`/`stop`). Cheaply cloneable via `Arc`.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tokio::sync::{Mutex, watch};
use tracing::info;

use homedash_api::calendar::CalendarClient;
use homedash_api::docker::{DockerClient, PortainerClient};
use homedash_api::downloads::{
    DelugeClient, QbittorrentClient, SabnzbdClient, TransmissionClient,
};
use homedash_api::feeds::FeedClient;
use homedash_api::glances::{GlancesClient, GlancesVersion};
use homedash_api::markets::{CryptoClient, StockClient};
use homedash_api::overseerr::OverseerrClient;
use homedash_api::radarr::RadarrClient;
use homedash_api::sonarr::SonarrClient;

use crate::adapter::{
    Adapter, CalendarAdapter, CalendarFeed, ContainerAdapter, DownloadAdapter, DownloadBackend,
    FeedAdapter, FeedSource, LibraryAdapter, MarketAdapter, MarketAssets, RequestAdapter,
    SeriesAdapter, SourceId, SystemAdapter,
};
use crate::config::{
    DEFAULT_CONTAINERS_INTERVAL_SECS, DEFAULT_DOWNLOADS_INTERVAL_SECS, DEFAULT_FEED_INTERVAL_SECS,
    DEFAULT_MARKETS_INTERVAL_SECS, DEFAULT_MEDIA_INTERVAL_SECS, DEFAULT_SYSTEM_INTERVAL_SECS,
    DownloadClientKind, EngineConfig, GlancesApiVersion,
};
use crate::error::CoreError;
use crate::scheduler::{self, Scheduler};
use crate::store::{SourceState, SourceTable};

/// The main entry point for consumers.
#[derive(Clone)]
pub struct Engine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    table: Arc<SourceTable>,
    adapters: Vec<Arc<dyn Adapter>>,
    scheduler: Mutex<Option<Scheduler>>,
    /// Non-fatal degradations noticed while building adapters.
    warnings: Vec<String>,
}

impl Engine {
    /// Validate the configuration and build every enabled adapter.
    pub fn from_config(config: &EngineConfig) -> Result<Self, CoreError> {
        config.validate()?;
        let (adapters, warnings) = build_adapters(config)?;

        let table = Arc::new(SourceTable::new());
        Ok(Self {
            inner: Arc::new(EngineInner {
                table,
                adapters,
                scheduler: Mutex::new(None),
                warnings,
            }),
        })
    }

    /// Ids of the configured sources, in registration order.
    pub fn source_ids(&self) -> Vec<SourceId> {
        self.inner.adapters.iter().map(|a| a.id().clone()).collect()
    }

    /// Warnings accumulated while building adapters.
    pub fn warnings(&self) -> &[String] {
        &self.inner.warnings
    }

    /// Run every adapter once, concurrently, then return. Per-source
    /// outcomes land in the table; a failing source never aborts the
    /// others.
    pub async fn oneshot(&self) {
        for adapter in &self.inner.adapters {
            self.inner
                .table
                .register(adapter.id().clone(), adapter.kind());
        }
        join_all(
            self.inner
                .adapters
                .iter()
                .map(|a| scheduler::run_once(a.as_ref(), &self.inner.table)),
        )
        .await;
    }

    /// Run a single source's adapter once.
    pub async fn oneshot_source(&self, id: &SourceId) -> Result<(), CoreError> {
        let adapter = self
            .inner
            .adapters
            .iter()
            .find(|a| a.id() == id)
            .ok_or_else(|| CoreError::SourceNotFound {
                source_id: id.to_string(),
            })?;
        self.inner
            .table
            .register(adapter.id().clone(), adapter.kind());
        scheduler::run_once(adapter.as_ref(), &self.inner.table).await;
        Ok(())
    }

    /// Start the polling scheduler: every adapter runs immediately,
    /// then on its own interval.
    pub async fn start(&self) -> Result<(), CoreError> {
        let mut slot = self.inner.scheduler.lock().await;
        if slot.is_some() {
            return Err(CoreError::AlreadyRunning);
        }

        let sched = Scheduler::new(Arc::clone(&self.inner.table));
        for adapter in &self.inner.adapters {
            sched.register(Arc::clone(adapter)).await;
        }
        info!(sources = self.inner.adapters.len(), "engine started");
        *slot = Some(sched);
        Ok(())
    }

    /// Stop the scheduler, cancelling in-flight fetches.
    pub async fn stop(&self) -> Result<(), CoreError> {
        let sched = self
            .inner
            .scheduler
            .lock()
            .await
            .take()
            .ok_or(CoreError::NotRunning)?;
        sched.unregister_all().await;
        info!("engine stopped");
        Ok(())
    }

    /// Re-run one source now, outside its periodic schedule.
    pub async fn refresh(&self, id: &SourceId) -> Result<(), CoreError> {
        match self.inner.scheduler.lock().await.as_ref() {
            Some(sched) => sched.trigger_now(id),
            None => Err(CoreError::NotRunning),
        }
    }

    pub fn get(&self, id: &SourceId) -> Option<Arc<SourceState>> {
        self.inner.table.get(id)
    }

    pub fn snapshot(&self) -> Vec<(SourceId, Arc<SourceState>)> {
        self.inner.table.snapshot()
    }

    pub fn subscribe(&self, id: &SourceId) -> Option<watch::Receiver<Arc<SourceState>>> {
        self.inner.table.subscribe(id)
    }

    /// Wakes whenever any source's state changes.
    pub fn subscribe_changes(&self) -> watch::Receiver<u64> {
        self.inner.table.subscribe_version()
    }
}

// ── Adapter construction ─────────────────────────────────────────

type BuiltAdapters = (Vec<Arc<dyn Adapter>>, Vec<String>);

#[allow(clippy::too_many_lines)]
fn build_adapters(config: &EngineConfig) -> Result<BuiltAdapters, CoreError> {
    let transport = config.transport.to_transport();
    let mut adapters: Vec<Arc<dyn Adapter>> = Vec::new();
    let mut warnings = Vec::new();

    let media = |secs: Option<u64>| interval(secs, DEFAULT_MEDIA_INTERVAL_SECS);

    if let Some(c) = config.overseerr.as_ref().filter(|c| c.enabled) {
        let client = OverseerrClient::new(&c.url, &c.api_key, &transport)?;
        adapters.push(Arc::new(RequestAdapter::new(
            SourceId::from("overseerr"),
            client,
            media(c.interval_secs),
        )));
    }

    if let Some(c) = config.radarr.as_ref().filter(|c| c.enabled) {
        let client = RadarrClient::new(&c.url, &c.api_key, &transport)?;
        adapters.push(Arc::new(LibraryAdapter::movies(
            SourceId::from("radarr"),
            client,
            media(c.interval_secs),
        )));
    }

    if let Some(c) = config.readarr.as_ref().filter(|c| c.enabled) {
        let client = RadarrClient::readarr(&c.url, &c.api_key, &transport)?;
        adapters.push(Arc::new(LibraryAdapter::books(
            SourceId::from("readarr"),
            client,
            media(c.interval_secs),
        )));
    }

    if let Some(c) = config.sonarr.as_ref().filter(|c| c.enabled) {
        let client = SonarrClient::new(&c.url, &c.api_key, &transport)?;
        adapters.push(Arc::new(SeriesAdapter::new(
            SourceId::from("sonarr"),
            client,
            media(c.interval_secs),
        )));
    }

    if let Some(c) = config.docker.as_ref().filter(|c| c.enabled) {
        let client = DockerClient::new(&c.url, &transport)?;
        adapters.push(Arc::new(ContainerAdapter::direct(
            SourceId::from("docker"),
            client,
            interval(c.interval_secs, DEFAULT_CONTAINERS_INTERVAL_SECS),
        )));
    }

    if let Some(c) = config.portainer.as_ref().filter(|c| c.enabled) {
        let client = PortainerClient::new(&c.url, &c.api_key, &transport)?;
        if c.endpoint_id.is_none() {
            warnings
                .push("portainer: no endpoint_id set, the first endpoint will be used".to_owned());
        }
        adapters.push(Arc::new(ContainerAdapter::portainer(
            SourceId::from("portainer"),
            client,
            c.endpoint_id,
            interval(c.interval_secs, DEFAULT_CONTAINERS_INTERVAL_SECS),
        )));
    }

    for dl in config.downloads.iter().filter(|d| d.enabled) {
        let id = dl.source_id();
        let backend = match dl.kind {
            DownloadClientKind::Qbittorrent => DownloadBackend::Qbittorrent {
                client: QbittorrentClient::new(&dl.url, &transport)?,
                username: required(&id, "username", dl.username.clone())?,
                password: required(&id, "password", dl.password.clone())?,
            },
            DownloadClientKind::Deluge => DownloadBackend::Deluge {
                client: DelugeClient::new(&dl.url, &transport)?,
                password: required(&id, "password", dl.password.clone())?,
            },
            DownloadClientKind::Sabnzbd => DownloadBackend::Sabnzbd {
                client: SabnzbdClient::new(
                    &dl.url,
                    required(&id, "api_key", dl.api_key.clone())?,
                    &transport,
                )?,
            },
            DownloadClientKind::Transmission => DownloadBackend::Transmission {
                client: TransmissionClient::new(&dl.url, &transport)?,
            },
        };
        adapters.push(Arc::new(DownloadAdapter::new(
            SourceId::new(id),
            backend,
            interval(dl.interval_secs, DEFAULT_DOWNLOADS_INTERVAL_SECS),
        )));
    }

    if let Some(c) = config.glances.as_ref().filter(|c| c.enabled) {
        let version = match c.api_version {
            GlancesApiVersion::V3 => GlancesVersion::V3,
            GlancesApiVersion::V4 => GlancesVersion::V4,
        };
        let client = GlancesClient::new(&c.url, version, &transport)?;
        adapters.push(Arc::new(SystemAdapter::new(
            SourceId::from("glances"),
            client,
            interval(c.interval_secs, DEFAULT_SYSTEM_INTERVAL_SECS),
        )));
    }

    if let Some(c) = config.calendar.as_ref().filter(|c| c.enabled) {
        let client = CalendarClient::new(&transport)?;
        let feeds = c
            .feeds
            .iter()
            .map(|f| CalendarFeed {
                name: f.name.clone(),
                url: f.url.clone(),
                color: f.color.clone(),
            })
            .collect();
        adapters.push(Arc::new(CalendarAdapter::new(
            SourceId::from("calendar"),
            client,
            feeds,
            interval(c.interval_secs, DEFAULT_FEED_INTERVAL_SECS),
        )));
    }

    if let Some(c) = config.feeds.as_ref().filter(|c| c.enabled) {
        let client = FeedClient::new(&transport)?;
        let feeds = c
            .feeds
            .iter()
            .map(|f| FeedSource {
                id: f.url.clone(),
                name: f.name.clone(),
                url: f.url.clone(),
            })
            .collect();
        adapters.push(Arc::new(FeedAdapter::new(
            SourceId::from("feeds"),
            client,
            feeds,
            interval(c.interval_secs, DEFAULT_FEED_INTERVAL_SECS),
        )));
    }

    if let Some(c) = config.markets.as_ref().filter(|c| c.enabled) {
        if c.coins.is_empty() && c.stocks.is_empty() {
            warnings.push("markets: enabled with no coins or stocks, skipped".to_owned());
        } else {
            let crypto = if c.coins.is_empty() {
                None
            } else {
                Some(CryptoClient::new(&c.crypto_url, &transport)?)
            };
            let stocks = match (&c.stock_api_key, c.stocks.is_empty()) {
                (Some(key), false) => Some(StockClient::new(&c.stock_url, key.clone(), &transport)?),
                _ => None,
            };
            adapters.push(Arc::new(MarketAdapter::new(
                SourceId::from("markets"),
                crypto,
                stocks,
                MarketAssets {
                    coins: c.coins.clone(),
                    stocks: c.stocks.clone(),
                },
                interval(c.interval_secs, DEFAULT_MARKETS_INTERVAL_SECS),
            )));
        }
    }

    Ok((adapters, warnings))
}

fn interval(secs: Option<u64>, default: u64) -> Duration {
    Duration::from_secs(secs.unwrap_or(default))
}

fn required<T>(integration: &str, field: &str, value: Option<T>) -> Result<T, CoreError> {
    value.ok_or_else(|| CoreError::Config {
        message: format!("{integration}: {field} is required"),
    })
}
