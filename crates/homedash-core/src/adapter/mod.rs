// ── Integration adapter framework ──
//
// One adapter per integration family. Each knows its upstream wire
// schema and produces a normalized payload plus an error outcome; the
// scheduler drives them and the store holds what they return.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::{
    CalendarEvent, ContainerSummary, DownloadItem, FeedItem, MarketQuote, SystemSample,
};

pub mod calendar;
pub mod containers;
pub mod downloads;
pub mod feeds;
pub mod library;
pub mod markets;
pub mod requests;
pub mod series;
pub mod system;

pub use calendar::{CalendarAdapter, CalendarFeed};
pub use containers::ContainerAdapter;
pub use downloads::{DownloadAdapter, DownloadBackend};
pub use feeds::{FeedAdapter, FeedSource};
pub use library::{LibraryAdapter, LibraryData};
pub use markets::{MarketAdapter, MarketAssets};
pub use requests::{BucketedRequest, RequestAdapter};
pub use series::{SeriesAdapter, SeriesData};
pub use system::SystemAdapter;

/// Identifier of one configured source instance, e.g. `"radarr-main"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceId(String);

impl SourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Which family of integration a source belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "kebab-case")]
#[non_exhaustive]
pub enum SourceKind {
    Requests,
    MovieLibrary,
    BookLibrary,
    SeriesLibrary,
    Containers,
    Downloads,
    System,
    Calendar,
    Feeds,
    Markets,
}

/// Normalized payload of one successful fetch, per family.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum SourceData {
    Requests(Vec<BucketedRequest>),
    Library(LibraryData),
    Series(SeriesData),
    Containers(Vec<ContainerSummary>),
    Downloads(Vec<DownloadItem>),
    System(Box<SystemSample>),
    Calendar(Vec<CalendarEvent>),
    Feed(Vec<FeedItem>),
    Markets(Vec<MarketQuote>),
}

impl SourceData {
    /// Item count, for logging and status lines.
    pub fn len(&self) -> usize {
        match self {
            Self::Requests(v) => v.len(),
            Self::Library(d) => d.recent.len() + d.missing.len(),
            Self::Series(d) => d.recent.len() + d.upcoming.len(),
            Self::Containers(v) => v.len(),
            Self::Downloads(v) => v.len(),
            Self::System(_) => 1,
            Self::Calendar(v) => v.len(),
            Self::Feed(v) => v.len(),
            Self::Markets(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One configured integration instance.
///
/// `fetch` must be cancel-safe: the scheduler drops the future on
/// teardown, and a dropped fetch must leave no partial state behind.
/// The only adapter with cross-tick state (system metrics) commits it
/// after the last await.
#[async_trait]
pub trait Adapter: Send + Sync {
    fn id(&self) -> &SourceId;

    fn kind(&self) -> SourceKind;

    /// Poll cadence for this instance.
    fn interval(&self) -> Duration;

    /// Upper bound on one fetch; the scheduler aborts past it.
    fn timeout(&self) -> Duration {
        Duration::from_secs(30)
    }

    async fn fetch(&self) -> Result<SourceData, homedash_api::Error>;
}
