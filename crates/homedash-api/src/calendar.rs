// iCalendar feed fetcher.
//
// Downloads an .ics document and hands it to the [`crate::ical`] parser.
// Calendars are typically public/basic-auth-free URLs (Radarr/Sonarr
// expose their schedules this way too), so there is no auth surface here.

use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::ical::IcalEvent;
use crate::transport::TransportConfig;

const SERVICE: &str = "calendar";

/// Fetches and parses iCalendar feeds.
pub struct CalendarClient {
    http: reqwest::Client,
}

impl CalendarClient {
    pub fn new(transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
        })
    }

    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Fetch one feed URL and parse its events.
    pub async fn fetch_events(&self, url: &str) -> Result<Vec<IcalEvent>, Error> {
        let url = Url::parse(url)?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Http {
                service: SERVICE,
                status: status.as_u16(),
            });
        }

        let text = resp.text().await?;
        Ok(crate::ical::parse(&text))
    }
}
