//! HTTP status codes as reported by an article source.
//!
//! The core never speaks HTTP itself; sources surface the status of a failed
//! response so the classifier in [`crate::error`] can decide whether the failure
//! was a network-layer problem or a definitive rejection from the server.

use std::fmt;

/// An HTTP response status code.
///
/// Unlike a closed enum, any three-digit code a server sends is representable,
/// which matters for range checks such as [`is_server_error`](Self::is_server_error).
///
/// # Examples
///
/// ```
/// use help_articles::http::StatusCode;
///
/// let status = StatusCode::NOT_FOUND;
/// assert_eq!(status.as_u16(), 404);
/// assert_eq!(status.canonical_reason(), Some("Not Found"));
/// assert!(StatusCode::from(503).is_server_error());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatusCode(u16);

impl StatusCode {
    pub const NOT_FOUND: Self = Self(404);

    /// Returns the numeric status code as a `u16`.
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// `true` for 5xx codes.
    pub const fn is_server_error(self) -> bool {
        matches!(self.0, 500..=599)
    }

    /// Returns the canonical reason phrase, if this is a code we know by name.
    pub fn canonical_reason(self) -> Option<&'static str> {
        Some(match self.0 {
            200 => "OK",
            400 => "Bad Request",
            401 => "Unauthorized",
            403 => "Forbidden",
            404 => "Not Found",
            408 => "Request Timeout",
            410 => "Gone",
            429 => "Too Many Requests",
            500 => "Internal Server Error",
            501 => "Not Implemented",
            502 => "Bad Gateway",
            503 => "Service Unavailable",
            504 => "Gateway Timeout",
            _ => return None,
        })
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.canonical_reason() {
            Some(reason) => write!(f, "{} {}", self.0, reason),
            None => write!(f, "{}", self.0),
        }
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        Self(code)
    }
}
