//! Article payloads and the server's structured error body.
//!
//! The cache treats [`ArticleRecord`] as opaque: only [`ArticleRecord::id`] is
//! ever inspected, as the key for per-article slots.

use serde::{Deserialize, Serialize};

/// A single help article as delivered by the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRecord {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub content: String,
    pub category: String,
    /// Author-supplied ISO-8601 timestamp. Not used for freshness.
    pub updated_at: String,
}

impl ArticleRecord {
    /// Returns the unique key for this article.
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// The ordered article list backing the list view.
pub type ArticleList = Vec<ArticleRecord>;

/// Error payload a server may attach to a failed response.
///
/// # Examples
///
/// ```
/// use help_articles::article::ErrorBody;
///
/// let body = br#"{"errorCode":"RATE_LIMIT_EXCEEDED","errorTitle":"Too Many Requests","errorMessage":"Slow down."}"#;
/// let parsed = ErrorBody::parse(body).unwrap();
/// assert_eq!(parsed.error_code, "RATE_LIMIT_EXCEEDED");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error_code: String,
    pub error_title: String,
    pub error_message: String,
}

impl ErrorBody {
    /// Parses `bytes` as a structured error body.
    ///
    /// Returns `None` when the body is not JSON or lacks any of the three fields;
    /// such responses are classified by status code alone.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        serde_json::from_slice(bytes).ok()
    }
}
