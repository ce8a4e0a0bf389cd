//! Async clients for the upstream services aggregated by homedash.
//!
//! One module per integration family, each owning its wire schema and the
//! quirks of its protocol:
//!
//! - [`overseerr`] — media request manager (REST v1, API-key header)
//! - [`radarr`] / [`sonarr`] — movie and series libraries (REST v3, API key)
//! - [`docker`] — Docker Engine API, directly or proxied through Portainer
//! - [`downloads`] — qBittorrent, Deluge, SABnzbd, Transmission
//! - [`glances`] — system metrics (modular REST v3/v4 endpoints)
//! - [`markets`] — crypto prices plus optional keyed stock quotes
//! - [`calendar`] / [`ical`] — iCalendar feeds (RFC 5545 subset)
//! - [`feeds`] — RSS 2.0 / Atom 1.0
//!
//! All clients share [`TransportConfig`](transport::TransportConfig) and
//! the [`Error`] taxonomy. `homedash-core` normalizes the wire types these
//! modules return into its domain model.

pub mod calendar;
pub mod docker;
pub mod downloads;
pub mod error;
pub mod feeds;
pub mod glances;
pub mod ical;
pub mod markets;
pub mod overseerr;
pub mod radarr;
pub mod sonarr;
pub mod transport;

pub use error::{Error, ErrorKind};
pub use transport::{TlsMode, TransportConfig};

use serde::de::DeserializeOwned;
use url::Url;

/// Parse a base URL, forcing a trailing slash so `Url::join` keeps the
/// full path (`join` on `".../glances"` would otherwise drop the last
/// segment).
pub(crate) fn normalize_base_url(raw: &str) -> Result<Url, Error> {
    let trimmed = raw.trim_end_matches('/');
    Ok(Url::parse(&format!("{trimmed}/"))?)
}

/// Check the HTTP status and deserialize a JSON body.
///
/// 401/403 map to [`Error::Auth`], other non-2xx to [`Error::Http`], and
/// malformed JSON to [`Error::Parse`] with a body preview.
pub(crate) async fn handle_json_response<T: DeserializeOwned>(
    service: &'static str,
    resp: reqwest::Response,
) -> Result<T, Error> {
    let status = resp.status();

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(Error::Auth {
            service,
            message: format!("HTTP {status}"),
        });
    }

    if !status.is_success() {
        return Err(Error::Http {
            service,
            status: status.as_u16(),
        });
    }

    let body = resp.text().await?;
    serde_json::from_str(&body)
        .map_err(|e| Error::parse_with_preview(&format!("{service}: {e}"), &body))
}
