// ── Domain model ──
//
// Canonical types every adapter normalizes into. Upstream vocabulary
// (Overseerr status codes, qBittorrent state strings, Engine API
// PascalCase) never leaks past the adapter that consumes it.

pub mod calendar;
pub mod container;
pub mod download;
pub mod feed;
pub mod market;
pub mod media;
pub mod system;

pub use calendar::CalendarEvent;
pub use container::{ContainerHealth, ContainerState, ContainerSummary};
pub use download::{DownloadItem, DownloadStatus};
pub use feed::FeedItem;
pub use market::{MarketKind, MarketQuote};
pub use media::{MediaItem, MediaKind, MediaStatus, RequestBucket};
pub use system::{FilesystemUsage, SystemSample};
