//! Aggregation engine between `homedash-api` and UI consumers.
//!
//! This crate owns the normalization logic, domain model, and reactive
//! state for the dashboard workspace:
//!
//! - **[`Engine`]** — Central facade: builds one adapter per enabled
//!   integration from an [`EngineConfig`], then either runs a single
//!   refresh cycle ([`Engine::oneshot`]) for one-off CLI invocations or
//!   starts the polling [`scheduler`] ([`Engine::start`]).
//!
//! - **[`Adapter`]** — One per integration family (requests, libraries,
//!   containers, downloads, system metrics, calendars, feeds, markets).
//!   Each maps its upstream wire schema onto the domain [`model`] and
//!   computes derived state (status buckets, recent/missing views,
//!   network-rate deltas, history dedup).
//!
//! - **[`SourceTable`]** — Lock-free reactive per-source state
//!   (`DashMap` + `tokio::sync::watch`). A source's failure is recorded
//!   under its own id; last-good data stays visible through transient
//!   errors, and no source ever disturbs another.
//!
//! - **[`view`]** — Pure presentation helpers: stable pagination,
//!   request buckets, poster-rotation state.

pub mod adapter;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod rates;
pub mod scheduler;
pub mod store;
pub mod units;
pub mod view;

// ── Primary re-exports ──────────────────────────────────────────────
pub use adapter::{Adapter, SourceData, SourceId, SourceKind};
pub use config::EngineConfig;
// Part of this crate's public surface (`SourceError`, `CoreError::Fetch`).
pub use homedash_api::ErrorKind;
pub use engine::Engine;
pub use error::CoreError;
pub use rates::{Rate, RateTracker};
pub use scheduler::Scheduler;
pub use store::{SourceError, SourceState, SourceTable};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    CalendarEvent,
    ContainerHealth,
    ContainerState,
    ContainerSummary,
    DownloadItem,
    DownloadStatus,
    FeedItem,
    FilesystemUsage,
    MarketKind,
    MarketQuote,
    // Media
    MediaItem,
    MediaKind,
    MediaStatus,
    RequestBucket,
    SystemSample,
};
