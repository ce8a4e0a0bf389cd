// ── Media domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a media item fundamentally is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum MediaKind {
    Movie,
    Show,
    Book,
    Episode,
}

/// Canonical media status. Source-specific strings and codes are mapped
/// onto this set; anything unmapped falls back to [`MediaStatus::Pending`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[non_exhaustive]
pub enum MediaStatus {
    Pending,
    Approved,
    Declined,
    /// Grabbed/imported but not yet (fully) available.
    Processing,
    PartiallyAvailable,
    Available,
    /// Monitored with no file on disk.
    Wanted,
    Downloaded,
}

/// Mutually exclusive display bucket for request-manager items.
///
/// Media availability dominates request approval: an approved request
/// whose media has become available lands in `Available`, never in
/// `Requested`. Declined requests stay in `Requests` with a
/// [`MediaStatus::Declined`] tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum RequestBucket {
    /// Pending approval (includes declined, tagged as such).
    Requests,
    /// Approved but not yet available.
    Requested,
    /// Fully or partially available.
    Available,
}

/// Unified representation of a request, library entry, or episode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaItem {
    /// Unique within its source.
    pub id: String,
    pub title: String,
    /// Secondary display line, e.g. `"S02E05 - Endings"`.
    pub subtitle: Option<String>,
    pub kind: MediaKind,
    pub status: MediaStatus,
    pub year: Option<i32>,
    pub added_at: Option<DateTime<Utc>>,
    pub air_date: Option<DateTime<Utc>>,
    /// Absolute image URL; relative upstream paths are resolved by the
    /// adapter before the item leaves it.
    pub poster_url: Option<String>,
    pub requested_by: Option<String>,
}

impl MediaItem {
    /// Zero-padded `SxxExx` label.
    pub fn episode_label(season: i32, episode: i32) -> String {
        format!("S{season:02}E{episode:02}")
    }
}
