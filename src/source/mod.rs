//! The network capability the orchestrator reads through.
//!
//! A source fetches the article list or a single article and may fail. The
//! concrete transport (HTTP client, fixture server, in-process fake) lives
//! outside this crate; it only has to report failures as a [`SourceError`].

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use thiserror::Error;

use crate::article::{ArticleList, ArticleRecord};
use crate::http::StatusCode;

/// Boxed, `Send` future returned by [`ArticleSource`] methods.
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + Send + 'a>>;

/// Raw failure reported by a source, before classification.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("could not resolve host {host}")]
    Unresolved { host: String },

    #[error("connection refused by {addr}")]
    ConnectionRefused { addr: String },

    #[error("request timed out")]
    Timeout,

    /// The server answered with a non-success status.
    #[error("server responded with {status}")]
    Status {
        status: StatusCode,
        body: Option<Bytes>,
    },

    #[error("{0}")]
    Other(String),
}

impl SourceError {
    /// Shorthand for a status failure without a body.
    pub fn status(code: u16) -> Self {
        Self::Status {
            status: StatusCode::from(code),
            body: None,
        }
    }

    /// Shorthand for a status failure carrying a response body.
    pub fn status_with_body(code: u16, body: impl Into<Bytes>) -> Self {
        Self::Status {
            status: StatusCode::from(code),
            body: Some(body.into()),
        }
    }
}

/// Fetches articles from the network.
///
/// Implementations must be shareable across the tasks the orchestrator spawns.
///
/// # Examples
///
/// ```rust
/// use help_articles::article::{ArticleList, ArticleRecord};
/// use help_articles::source::{ArticleSource, SourceError, SourceFuture};
///
/// struct Offline;
///
/// impl ArticleSource for Offline {
///     fn fetch_list(&self) -> SourceFuture<'_, ArticleList> {
///         Box::pin(async { Err::<ArticleList, _>(SourceError::Timeout) })
///     }
///
///     fn fetch_one<'a>(&'a self, _id: &'a str) -> SourceFuture<'a, ArticleRecord> {
///         Box::pin(async { Err::<ArticleRecord, _>(SourceError::Timeout) })
///     }
/// }
/// ```
pub trait ArticleSource: Send + Sync + 'static {
    fn fetch_list(&self) -> SourceFuture<'_, ArticleList>;

    fn fetch_one<'a>(&'a self, id: &'a str) -> SourceFuture<'a, ArticleRecord>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_shorthands() {
        match SourceError::status(404) {
            SourceError::Status { status, body } => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert!(body.is_none());
            }
            other => panic!("expected Status, got {other:?}"),
        }

        match SourceError::status_with_body(429, "{}") {
            SourceError::Status { body, .. } => assert_eq!(body.as_deref(), Some(&b"{}"[..])),
            other => panic!("expected Status, got {other:?}"),
        }
    }

    #[test]
    fn display_names_status() {
        let err = SourceError::status(503);
        assert_eq!(err.to_string(), "server responded with 503 Service Unavailable");
    }
}
