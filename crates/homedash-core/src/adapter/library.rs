// ── Media-library adapter (Radarr/Readarr-like) ──
//
// One fetch, two derived views: "recently added" (48 h trailing window,
// newest first) and "missing" (monitored without a file, newest-added
// first), both capped. Readarr exposes the same surface under a
// different API version, so the adapter is generic over the item kind.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use homedash_api::radarr::{MovieResource, RadarrClient};

use super::{Adapter, SourceData, SourceId, SourceKind};
use crate::model::{MediaItem, MediaKind, MediaStatus};

/// Trailing window for the "recently added" view, in hours.
pub const RECENT_WINDOW_HOURS: i64 = 48;

/// Cap on each derived view.
pub const VIEW_CAP: usize = 8;

/// The two derived views of one library fetch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryData {
    /// Added within the last [`RECENT_WINDOW_HOURS`], newest first.
    pub recent: Vec<MediaItem>,
    /// Monitored without a file, newest-added first.
    pub missing: Vec<MediaItem>,
}

pub struct LibraryAdapter {
    id: SourceId,
    interval: Duration,
    client: RadarrClient,
    item_kind: MediaKind,
}

impl LibraryAdapter {
    /// Movie library (Radarr).
    pub fn movies(id: SourceId, client: RadarrClient, interval: Duration) -> Self {
        Self {
            id,
            interval,
            client,
            item_kind: MediaKind::Movie,
        }
    }

    /// Book library (Readarr, same wire surface under `/api/v1/`).
    pub fn books(id: SourceId, client: RadarrClient, interval: Duration) -> Self {
        Self {
            id,
            interval,
            client,
            item_kind: MediaKind::Book,
        }
    }
}

#[async_trait]
impl Adapter for LibraryAdapter {
    fn id(&self) -> &SourceId {
        &self.id
    }

    fn kind(&self) -> SourceKind {
        match self.item_kind {
            MediaKind::Book => SourceKind::BookLibrary,
            _ => SourceKind::MovieLibrary,
        }
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn fetch(&self) -> Result<SourceData, homedash_api::Error> {
        let movies = self.client.list_movies().await?;
        debug!(source = %self.id, count = movies.len(), "fetched library");

        let data = derive_views(&movies, self.item_kind, self.client.base_url(), Utc::now());
        Ok(SourceData::Library(data))
    }
}

/// Compute both views from one item list without re-fetching.
fn derive_views(
    movies: &[MovieResource],
    item_kind: MediaKind,
    base_url: &url::Url,
    now: DateTime<Utc>,
) -> LibraryData {
    let cutoff = now - TimeDelta::hours(RECENT_WINDOW_HOURS);

    let mut recent: Vec<(DateTime<Utc>, MediaItem)> = Vec::new();
    let mut missing: Vec<(DateTime<Utc>, MediaItem)> = Vec::new();

    for movie in movies {
        let added = movie.added.as_deref().and_then(parse_instant);
        let item = normalize(movie, item_kind, base_url, added);

        if let Some(added_at) = added {
            if added_at >= cutoff {
                recent.push((added_at, item.clone()));
            }
            if movie.monitored && !movie.has_file {
                missing.push((added_at, item));
            }
        } else if movie.monitored && !movie.has_file {
            // No added date: sorts to the end of missing.
            missing.push((DateTime::UNIX_EPOCH, item));
        }
    }

    recent.sort_by(|a, b| b.0.cmp(&a.0));
    missing.sort_by(|a, b| b.0.cmp(&a.0));

    LibraryData {
        recent: recent.into_iter().take(VIEW_CAP).map(|(_, i)| i).collect(),
        missing: missing.into_iter().take(VIEW_CAP).map(|(_, i)| i).collect(),
    }
}

fn normalize(
    movie: &MovieResource,
    kind: MediaKind,
    base_url: &url::Url,
    added_at: Option<DateTime<Utc>>,
) -> MediaItem {
    let status = if movie.has_file {
        MediaStatus::Downloaded
    } else if movie.monitored {
        MediaStatus::Wanted
    } else {
        MediaStatus::Pending
    };

    let poster_url = movie
        .images
        .iter()
        .find(|img| img.cover_type.as_deref() == Some("poster"))
        .or_else(|| movie.images.first())
        .and_then(|img| img.resolve(base_url));

    MediaItem {
        id: movie.id.to_string(),
        title: movie.title.clone(),
        subtitle: None,
        kind,
        status,
        year: movie.year,
        added_at,
        air_date: movie.in_cinemas.as_deref().and_then(parse_instant),
        poster_url,
        requested_by: None,
    }
}

fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
