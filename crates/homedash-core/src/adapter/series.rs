// ── Series-library adapter (Sonarr-like) ──
//
// Joins three endpoints in memory: the series catalog keys the lookup,
// history feeds "recently downloaded" (deduped per episode), and
// wanted/missing feeds "upcoming/missing". History arrives pre-sorted
// descending by date, so keeping the first occurrence of a
// (series, episode) pair keeps the most recent one.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use homedash_api::sonarr::{EpisodeResource, HistoryRecord, SeriesResource, SonarrClient};

use super::{Adapter, SourceData, SourceId, SourceKind};
use crate::model::{MediaItem, MediaKind, MediaStatus};

const PAGE_SIZE: u32 = 30;
const VIEW_CAP: usize = 8;

/// The derived views of one series-library fetch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeriesData {
    /// Recently grabbed/imported episodes, newest first, one per episode.
    pub recent: Vec<MediaItem>,
    /// Wanted/missing episodes, newest air date first.
    pub upcoming: Vec<MediaItem>,
}

pub struct SeriesAdapter {
    id: SourceId,
    interval: Duration,
    client: SonarrClient,
}

impl SeriesAdapter {
    pub fn new(id: SourceId, client: SonarrClient, interval: Duration) -> Self {
        Self {
            id,
            interval,
            client,
        }
    }
}

#[async_trait]
impl Adapter for SeriesAdapter {
    fn id(&self) -> &SourceId {
        &self.id
    }

    fn kind(&self) -> SourceKind {
        SourceKind::SeriesLibrary
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn fetch(&self) -> Result<SourceData, homedash_api::Error> {
        // Independent endpoints, issued concurrently and joined.
        let (series, history, wanted) = tokio::try_join!(
            self.client.list_series(),
            self.client.history(PAGE_SIZE),
            self.client.wanted_missing(PAGE_SIZE),
        )?;
        debug!(
            source = %self.id,
            series = series.len(),
            history = history.len(),
            wanted = wanted.len(),
            "fetched series data"
        );

        let by_id: HashMap<i64, &SeriesResource> = series.iter().map(|s| (s.id, s)).collect();

        let data = SeriesData {
            recent: dedup_history(&history, &by_id),
            upcoming: normalize_wanted(&wanted, &by_id),
        };
        Ok(SourceData::Series(data))
    }
}

/// Dedupe on (series, episode), keeping the first (most recent) record.
fn dedup_history(
    history: &[HistoryRecord],
    series: &HashMap<i64, &SeriesResource>,
) -> Vec<MediaItem> {
    let mut seen: HashSet<(i64, i64)> = HashSet::new();
    let mut items = Vec::new();

    for record in history {
        if !seen.insert((record.series_id, record.episode_id)) {
            continue;
        }

        let series_title = series
            .get(&record.series_id)
            .map_or("Unknown series", |s| s.title.as_str());

        let subtitle = record.episode.as_ref().map(episode_subtitle);

        items.push(MediaItem {
            id: format!("{}:{}", record.series_id, record.episode_id),
            title: series_title.to_owned(),
            subtitle,
            kind: MediaKind::Episode,
            status: history_status(record.event_type.as_deref()),
            year: series.get(&record.series_id).and_then(|s| s.year),
            added_at: record.date.as_deref().and_then(parse_instant),
            air_date: None,
            poster_url: None,
            requested_by: None,
        });

        if items.len() == VIEW_CAP {
            break;
        }
    }
    items
}

fn normalize_wanted(
    wanted: &[EpisodeResource],
    series: &HashMap<i64, &SeriesResource>,
) -> Vec<MediaItem> {
    wanted
        .iter()
        .take(VIEW_CAP)
        .map(|ep| {
            let series_title = ep
                .series
                .as_ref()
                .map(|s| s.title.as_str())
                .or_else(|| series.get(&ep.series_id).map(|s| s.title.as_str()))
                .unwrap_or("Unknown series");

            MediaItem {
                id: format!("{}:{}", ep.series_id, ep.id),
                title: series_title.to_owned(),
                subtitle: Some(episode_subtitle(ep)),
                kind: MediaKind::Episode,
                status: MediaStatus::Wanted,
                year: None,
                added_at: None,
                air_date: ep.air_date_utc.as_deref().and_then(parse_instant),
                poster_url: None,
                requested_by: None,
            }
        })
        .collect()
}

/// `"S02E05 - Endings"`, or just the label when the episode is untitled.
fn episode_subtitle(ep: &EpisodeResource) -> String {
    let label = MediaItem::episode_label(ep.season_number, ep.episode_number);
    match ep.title.as_deref() {
        Some(title) if !title.is_empty() => format!("{label} - {title}"),
        _ => label,
    }
}

fn history_status(event_type: Option<&str>) -> MediaStatus {
    match event_type {
        Some("downloadFolderImported") => MediaStatus::Downloaded,
        _ => MediaStatus::Processing,
    }
}

fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn history_record(series_id: i64, episode_id: i64, date: &str) -> HistoryRecord {
        serde_json::from_value(serde_json::json!({
            "id": episode_id * 10,
            "seriesId": series_id,
            "episodeId": episode_id,
            "eventType": "downloadFolderImported",
            "date": date,
            "episode": {
                "id": episode_id, "seriesId": series_id,
                "seasonNumber": 2, "episodeNumber": 5, "title": "Endings"
            }
        }))
        .unwrap()
    }

    fn catalog() -> Vec<SeriesResource> {
        serde_json::from_value(serde_json::json!([
            { "id": 5, "title": "Dark", "year": 2017, "monitored": true, "images": [] }
        ]))
        .unwrap()
    }

    #[test]
    fn duplicate_episodes_keep_the_first_record() {
        let catalog = catalog();
        let by_id: HashMap<i64, &SeriesResource> = catalog.iter().map(|s| (s.id, s)).collect();

        // Same (series, episode) twice, descending by date: the re-grab
        // at 09:00 must win over the older import at 08:00.
        let history = vec![
            history_record(5, 50, "2024-05-02T09:00:00Z"),
            history_record(5, 50, "2024-05-02T08:00:00Z"),
            history_record(5, 51, "2024-05-01T08:00:00Z"),
        ];

        let items = dedup_history(&history, &by_id);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "5:50");
        assert_eq!(
            items[0].added_at.unwrap().to_rfc3339(),
            "2024-05-02T09:00:00+00:00"
        );
    }

    #[test]
    fn history_items_use_series_title_and_episode_subtitle() {
        let catalog = catalog();
        let by_id: HashMap<i64, &SeriesResource> = catalog.iter().map(|s| (s.id, s)).collect();
        let history = vec![history_record(5, 50, "2024-05-02T09:00:00Z")];

        let items = dedup_history(&history, &by_id);
        assert_eq!(items[0].title, "Dark");
        assert_eq!(items[0].subtitle.as_deref(), Some("S02E05 - Endings"));
    }

    #[test]
    fn unknown_series_gets_a_placeholder_title() {
        let by_id = HashMap::new();
        let history = vec![history_record(99, 1, "2024-05-02T09:00:00Z")];
        let items = dedup_history(&history, &by_id);
        assert_eq!(items[0].title, "Unknown series");
    }

    #[test]
    fn wanted_episodes_prefer_the_embedded_series() {
        let wanted: Vec<EpisodeResource> = serde_json::from_value(serde_json::json!([
            {
                "id": 60, "seriesId": 7, "seasonNumber": 1, "episodeNumber": 3,
                "airDateUtc": "2024-06-01T20:00:00Z",
                "series": { "id": 7, "title": "Severance", "monitored": true, "images": [] }
            }
        ]))
        .unwrap();

        let items = normalize_wanted(&wanted, &HashMap::new());
        assert_eq!(items[0].title, "Severance");
        assert_eq!(items[0].subtitle.as_deref(), Some("S01E03"));
        assert_eq!(items[0].status, MediaStatus::Wanted);
    }
}
