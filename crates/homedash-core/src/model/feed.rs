// ── Feed domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One RSS/Atom entry, normalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedItem {
    /// guid/id from the feed, falling back to the link.
    pub id: String,
    /// Which configured feed this came from.
    pub feed_id: String,
    pub feed_name: Option<String>,
    pub title: String,
    pub link: Option<String>,
    /// Original description/summary markup.
    pub description: Option<String>,
    /// HTML-stripped plain text, for previews.
    pub description_text: Option<String>,
    pub pub_date: Option<DateTime<Utc>>,
    pub author: Option<String>,
}

impl FeedItem {
    /// Sort key: descending by publish date, items without one last.
    pub fn sort_key(&self) -> DateTime<Utc> {
        self.pub_date.unwrap_or(DateTime::UNIX_EPOCH)
    }
}
