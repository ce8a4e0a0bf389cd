// ── Calendar adapter (iCal subscriptions) ──
//
// One adapter instance covers every configured calendar URL. A single
// calendar failing to fetch or parse drops only its own events.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join_all;
use tracing::{debug, warn};

use homedash_api::calendar::CalendarClient;

use super::{Adapter, SourceData, SourceId, SourceKind};
use crate::model::CalendarEvent;

/// One subscribed calendar.
#[derive(Debug, Clone)]
pub struct CalendarFeed {
    pub name: String,
    pub url: String,
    pub color: Option<String>,
}

pub struct CalendarAdapter {
    id: SourceId,
    interval: Duration,
    client: CalendarClient,
    feeds: Vec<CalendarFeed>,
}

impl CalendarAdapter {
    pub fn new(
        id: SourceId,
        client: CalendarClient,
        feeds: Vec<CalendarFeed>,
        interval: Duration,
    ) -> Self {
        Self {
            id,
            interval,
            client,
            feeds,
        }
    }
}

#[async_trait]
impl Adapter for CalendarAdapter {
    fn id(&self) -> &SourceId {
        &self.id
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Calendar
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn fetch(&self) -> Result<SourceData, homedash_api::Error> {
        let fetches = self.feeds.iter().map(|feed| async move {
            let result = self.client.fetch_events(&feed.url).await;
            (feed, result)
        });

        let mut events: Vec<CalendarEvent> = Vec::new();
        let mut last_err = None;
        for (feed, result) in join_all(fetches).await {
            match result {
                Ok(parsed) => {
                    events.extend(parsed.into_iter().map(|ev| CalendarEvent {
                        id: ev.uid.unwrap_or_else(|| {
                            format!("{}:{}", feed.name, ev.start.timestamp())
                        }),
                        summary: ev.summary.unwrap_or_default(),
                        start: ev.start,
                        end: ev.end,
                        all_day: ev.all_day,
                        location: ev.location,
                        description: ev.description,
                        calendar_name: Some(feed.name.clone()),
                        calendar_color: feed.color.clone(),
                    }));
                }
                Err(err) => {
                    warn!(source = %self.id, calendar = %feed.name, %err, "calendar fetch failed");
                    last_err = Some(err);
                }
            }
        }

        // All calendars down: surface the failure instead of an empty list.
        if events.is_empty() {
            if let Some(err) = last_err {
                return Err(err);
            }
        }

        events.sort_by_key(|ev| ev.start);
        debug!(source = %self.id, count = events.len(), "fetched calendar events");
        Ok(SourceData::Calendar(events))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use homedash_api::TransportConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ICS: &str = "BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nUID:ev1\r\n\
        DTSTART:20240115T090000Z\r\nDTEND:20240115T100000Z\r\n\
        SUMMARY:Dentist\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";

    async fn ics_server(status: u16, body: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cal.ics"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&server)
            .await;
        server
    }

    fn feed(name: &str, url: String) -> CalendarFeed {
        CalendarFeed {
            name: name.into(),
            url,
            color: Some("#7e57c2".into()),
        }
    }

    #[tokio::test]
    async fn one_failing_calendar_drops_only_its_own_events() {
        let good = ics_server(200, ICS).await;
        let bad = ics_server(503, "").await;
        let adapter = CalendarAdapter::new(
            SourceId::from("calendar"),
            CalendarClient::new(&TransportConfig::default()).unwrap(),
            vec![
                feed("family", format!("{}/cal.ics", good.uri())),
                feed("work", format!("{}/cal.ics", bad.uri())),
            ],
            Duration::from_secs(300),
        );

        let SourceData::Calendar(events) = adapter.fetch().await.unwrap() else {
            panic!("expected a calendar payload");
        };
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].summary, "Dentist");
        assert_eq!(events[0].calendar_name.as_deref(), Some("family"));
        assert_eq!(events[0].calendar_color.as_deref(), Some("#7e57c2"));
    }
}
