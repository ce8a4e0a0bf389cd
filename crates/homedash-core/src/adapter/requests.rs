// ── Request-manager adapter (Overseerr-like) ──
//
// Classifies every request into exactly one of three buckets. The
// priority rule: media availability always beats request approval, so
// an approved-then-available item is Available, never Requested.
// Declined requests stay in Requests tagged Declined.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use homedash_api::overseerr::{
    self, MediaRequest, OverseerrClient, REQUEST_APPROVED, REQUEST_DECLINED,
};

use super::{Adapter, SourceData, SourceId, SourceKind};
use crate::model::{MediaItem, MediaKind, MediaStatus, RequestBucket};

const TMDB_POSTER_BASE: &str = "https://image.tmdb.org/t/p/w342";
const DEFAULT_PAGE: u32 = 40;

/// A request together with its display bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketedRequest {
    pub bucket: RequestBucket,
    pub item: MediaItem,
}

pub struct RequestAdapter {
    id: SourceId,
    interval: Duration,
    client: OverseerrClient,
}

impl RequestAdapter {
    pub fn new(id: SourceId, client: OverseerrClient, interval: Duration) -> Self {
        Self {
            id,
            interval,
            client,
        }
    }
}

#[async_trait]
impl Adapter for RequestAdapter {
    fn id(&self) -> &SourceId {
        &self.id
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Requests
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn fetch(&self) -> Result<SourceData, homedash_api::Error> {
        let requests = self.client.list_requests(DEFAULT_PAGE).await?;
        debug!(source = %self.id, count = requests.len(), "fetched requests");

        let items = requests.iter().map(classify).collect();
        Ok(SourceData::Requests(items))
    }
}

/// Bucket one request. Exactly one bucket per item, availability first.
fn classify(request: &MediaRequest) -> BucketedRequest {
    let available = request.media.status >= overseerr::MEDIA_PARTIALLY_AVAILABLE;

    let bucket = if available {
        RequestBucket::Available
    } else if request.status == REQUEST_APPROVED {
        RequestBucket::Requested
    } else {
        RequestBucket::Requests
    };

    let status = if request.status == REQUEST_DECLINED {
        MediaStatus::Declined
    } else if request.media.status == overseerr::MEDIA_AVAILABLE {
        MediaStatus::Available
    } else if request.media.status == overseerr::MEDIA_PARTIALLY_AVAILABLE {
        MediaStatus::PartiallyAvailable
    } else if request.status == REQUEST_APPROVED {
        MediaStatus::Approved
    } else {
        MediaStatus::Pending
    };

    let kind = match request.media.media_type.as_deref() {
        Some("tv") => MediaKind::Show,
        _ => MediaKind::Movie,
    };

    // The request payload only inlines titles on some servers; when
    // they are absent the external-id label stands in.
    let title = request
        .media
        .title
        .clone()
        .or_else(|| request.media.name.clone())
        .unwrap_or_else(|| match (kind, request.media.tmdb_id, request.media.tvdb_id) {
            (MediaKind::Show, _, Some(tvdb)) => format!("Series tvdb:{tvdb}"),
            (_, Some(tmdb), _) => format!("Title tmdb:{tmdb}"),
            _ => format!("Request #{}", request.id),
        });

    let poster_url = request
        .media
        .poster_path
        .as_deref()
        .map(|path| format!("{TMDB_POSTER_BASE}{path}"));

    let added_at = request
        .created_at
        .as_deref()
        .and_then(parse_instant);

    BucketedRequest {
        bucket,
        item: MediaItem {
            id: request.id.to_string(),
            title,
            subtitle: None,
            kind,
            status,
            year: None,
            added_at,
            air_date: None,
            poster_url,
            requested_by: request
                .requested_by
                .as_ref()
                .and_then(|u| u.display_name.clone().or_else(|| u.email.clone())),
        },
    }
}

fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
