//! Download-client protocol implementations.
//!
//! Four distinct wire protocols behind one normalized output:
//!
//! - [`qbittorrent`] — REST with a cookie session (`auth/login` sets SID)
//! - [`deluge`] — JSON-RPC with an explicit `auth.login` handshake and a
//!   hard 10 s request deadline
//! - [`sabnzbd`] — query-string REST with an API key parameter
//! - [`transmission`] — JSON-RPC with an `X-Transmission-Session-Id`
//!   negotiated through an initial 409 response
//!
//! Status vocabulary mapping to the shared enum lives in
//! `homedash-core::adapter::downloads`.

pub mod deluge;
pub mod qbittorrent;
pub mod sabnzbd;
pub mod transmission;

pub use deluge::DelugeClient;
pub use qbittorrent::QbittorrentClient;
pub use sabnzbd::SabnzbdClient;
pub use transmission::TransmissionClient;
