//! Error types and source-failure classification.
//!
//! Every raw [`SourceError`] is classified exactly once, at the orchestrator
//! boundary, into a [`FetchError`]. Nothing downstream looks at the raw error.
//!
//! | Condition                              | network | retry          | code         |
//! |----------------------------------------|---------|----------------|--------------|
//! | unresolved host / connection refused   | yes     | yes            | —            |
//! | timeout                                | yes     | yes            | —            |
//! | structured error body                  | no      | status != 404  | from payload |
//! | 5xx without body                       | yes     | yes            | —            |
//! | 404 without body                       | no      | no             | —            |
//! | any other status                       | no      | yes            | —            |
//! | anything else                          | no      | yes            | —            |

use thiserror::Error;

use crate::article::ErrorBody;
use crate::http::StatusCode;
use crate::source::SourceError;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config field `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// A classified fetch failure, ready to show to a user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FetchError {
    pub message: String,
    /// Connectivity-layer problem; may be masked by cached data.
    pub is_network_error: bool,
    pub can_retry: bool,
    /// Server-supplied code from a structured error body.
    pub error_code: Option<String>,
}

impl FetchError {
    fn network(message: &str) -> Self {
        Self {
            message: message.to_owned(),
            is_network_error: true,
            can_retry: true,
            error_code: None,
        }
    }

    fn rejected(message: impl Into<String>, can_retry: bool) -> Self {
        Self {
            message: message.into(),
            is_network_error: false,
            can_retry,
            error_code: None,
        }
    }
}

/// Maps a raw source failure onto the user-facing taxonomy.
///
/// # Examples
///
/// ```
/// use help_articles::error::classify;
/// use help_articles::source::SourceError;
///
/// let err = classify(&SourceError::status(404));
/// assert!(!err.is_network_error);
/// assert!(!err.can_retry);
///
/// let err = classify(&SourceError::Timeout);
/// assert!(err.is_network_error);
/// ```
pub fn classify(error: &SourceError) -> FetchError {
    match error {
        SourceError::Unresolved { .. } | SourceError::ConnectionRefused { .. } => {
            FetchError::network("No internet connection. Please check your network settings.")
        }
        SourceError::Timeout => FetchError::network("Connection timed out. Please try again."),
        SourceError::Status { status, body } => {
            match body.as_deref().and_then(ErrorBody::parse) {
                Some(parsed) => FetchError {
                    message: parsed.error_message,
                    is_network_error: false,
                    can_retry: *status != StatusCode::NOT_FOUND,
                    error_code: Some(parsed.error_code),
                },
                None => classify_status(*status),
            }
        }
        SourceError::Other(message) => {
            FetchError::rejected(format!("An unexpected error occurred: {message}"), true)
        }
    }
}

fn classify_status(status: StatusCode) -> FetchError {
    if status.is_server_error() {
        FetchError::network("Server error. Please try again later.")
    } else if status == StatusCode::NOT_FOUND {
        FetchError::rejected("Article not found.", false)
    } else {
        FetchError::rejected(format!("An error occurred (HTTP {})", status.as_u16()), true)
    }
}
