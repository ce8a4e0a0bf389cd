// ── RSS/Atom feed adapter ──
//
// Aggregates every configured feed into one sorted list. A single feed
// failing drops only its own items; items sort descending by publish
// date with dateless items last.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join_all;
use tracing::{debug, warn};

use homedash_api::feeds::FeedClient;

use super::{Adapter, SourceData, SourceId, SourceKind};
use crate::model::FeedItem;

/// One subscribed feed.
#[derive(Debug, Clone)]
pub struct FeedSource {
    pub id: String,
    pub name: Option<String>,
    pub url: String,
}

pub struct FeedAdapter {
    id: SourceId,
    interval: Duration,
    client: FeedClient,
    feeds: Vec<FeedSource>,
    /// Cap on the merged list.
    max_items: usize,
}

impl FeedAdapter {
    pub fn new(
        id: SourceId,
        client: FeedClient,
        feeds: Vec<FeedSource>,
        interval: Duration,
    ) -> Self {
        Self {
            id,
            interval,
            client,
            feeds,
            max_items: 50,
        }
    }
}

#[async_trait]
impl Adapter for FeedAdapter {
    fn id(&self) -> &SourceId {
        &self.id
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Feeds
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn fetch(&self) -> Result<SourceData, homedash_api::Error> {
        let fetches = self.feeds.iter().map(|feed| async move {
            let result = self.client.fetch(&feed.url).await;
            (feed, result)
        });

        let mut items: Vec<FeedItem> = Vec::new();
        let mut last_err = None;
        for (feed, result) in join_all(fetches).await {
            match result {
                Ok(parsed) => {
                    let feed_name = parsed.title.or_else(|| feed.name.clone());
                    let mapped = parsed.items.into_iter().enumerate().map(|(idx, raw)| {
                        FeedItem {
                            id: raw
                                .id
                                .or_else(|| raw.link.clone())
                                .unwrap_or_else(|| format!("{}:{idx}", feed.id)),
                            feed_id: feed.id.clone(),
                            feed_name: feed_name.clone(),
                            title: raw.title.unwrap_or_default(),
                            link: raw.link,
                            description: raw.description,
                            description_text: raw.description_text,
                            pub_date: raw.published,
                            author: raw.author,
                        }
                    });
                    items.extend(mapped);
                }
                Err(err) => {
                    warn!(source = %self.id, feed = %feed.id, %err, "feed fetch failed");
                    last_err = Some(err);
                }
            }
        }

        if items.is_empty() {
            if let Some(err) = last_err {
                return Err(err);
            }
        }

        // Newest first; missing dates sort as epoch, i.e. last.
        items.sort_by(|a, b| b.sort_key().cmp(&a.sort_key()));
        items.truncate(self.max_items);

        debug!(source = %self.id, count = items.len(), "fetched feed items");
        Ok(SourceData::Feed(items))
    }
}
