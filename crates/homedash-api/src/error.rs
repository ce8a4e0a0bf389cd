use thiserror::Error;

/// Top-level error type for the `homedash-api` crate.
///
/// Covers every failure mode across all upstream clients: transport,
/// non-2xx responses, malformed payloads (JSON/XML/iCal), per-service
/// authentication, explicit deadlines, and missing upstream
/// configuration. `homedash-core` stores these per source and never lets
/// one source's failure touch another.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Network(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Non-2xx response from an upstream.
    #[error("HTTP {status} from {service}")]
    Http { service: &'static str, status: u16 },

    /// Request exceeded an explicit deadline.
    #[error("{service} did not respond within {timeout_secs}s")]
    Timeout {
        service: &'static str,
        timeout_secs: u64,
    },

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Authentication ──────────────────────────────────────────────
    /// Login or session failure (rejected password, invalid API key,
    /// expired cookie session).
    #[error("{service} authentication failed: {message}")]
    Auth {
        service: &'static str,
        message: String,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// Malformed JSON, XML, or iCal payload.
    #[error("Parse error: {message}")]
    Parse { message: String },

    // ── Upstream configuration ──────────────────────────────────────
    /// A required upstream prerequisite is missing (e.g. no root folder
    /// or quality profile configured before adding media).
    #[error("{service} is not configured for this operation: {message}")]
    Config {
        service: &'static str,
        message: String,
    },
}

/// Coarse classification stored against a source in the dashboard state.
///
/// Mirrors the variants of [`Error`] minus detail, so a UI can badge a
/// source without holding the full error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Http,
    Timeout,
    Auth,
    Parse,
    Config,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Network => "network",
            Self::Http => "http",
            Self::Timeout => "timeout",
            Self::Auth => "auth",
            Self::Parse => "parse",
            Self::Config => "config",
        };
        f.write_str(label)
    }
}

impl Error {
    /// Classify this error for per-source status display.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_) | Self::InvalidUrl(_) | Self::Tls(_) => ErrorKind::Network,
            Self::Http { .. } => ErrorKind::Http,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Auth { .. } => ErrorKind::Auth,
            Self::Parse { .. } => ErrorKind::Parse,
            Self::Config { .. } => ErrorKind::Config,
        }
    }

    /// Returns `true` if a retry on the next tick is likely to succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this error indicates rejected credentials.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }

    /// Build a parse error with a payload preview for debugging.
    pub(crate) fn parse_with_preview(context: &str, body: &str) -> Self {
        let mut end = body.len().min(200);
        // Never split a multibyte character.
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        let preview = &body[..end];
        Self::Parse {
            message: format!("{context} (body preview: {preview:?})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_5xx_is_transient() {
        let err = Error::Http {
            service: "radarr",
            status: 503,
        };
        assert!(err.is_transient());
        assert_eq!(err.kind(), ErrorKind::Http);
    }

    #[test]
    fn http_4xx_is_not_transient() {
        let err = Error::Http {
            service: "radarr",
            status: 404,
        };
        assert!(!err.is_transient());
    }

    #[test]
    fn timeout_is_transient_and_classified() {
        let err = Error::Timeout {
            service: "deluge",
            timeout_secs: 10,
        };
        assert!(err.is_transient());
        assert_eq!(err.kind(), ErrorKind::Timeout);
    }

    #[test]
    fn auth_is_flagged() {
        let err = Error::Auth {
            service: "deluge",
            message: "password rejected".into(),
        };
        assert!(err.is_auth());
        assert!(!err.is_transient());
        assert_eq!(err.kind(), ErrorKind::Auth);
    }

    #[test]
    fn preview_truncates_on_a_char_boundary() {
        // Byte 200 lands inside the two-byte 'é'.
        let body = format!("{}é{}", "a".repeat(199), "b".repeat(50));
        let err = Error::parse_with_preview("radarr returned non-JSON", &body);
        let message = err.to_string();
        assert!(message.contains("body preview"));
        assert!(!message.contains('é'));
        assert!(!message.contains("bbb"));
    }

    #[test]
    fn preview_keeps_short_ascii_bodies_whole() {
        let err = Error::parse_with_preview("bad payload", "<html>oops</html>");
        assert!(err.to_string().contains("<html>oops</html>"));
    }
}
