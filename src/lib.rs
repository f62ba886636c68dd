//! # help-articles
//!
//! The data-freshness core of an offline-tolerant help-article client: a
//! read-through [`FreshnessCache`] and an [`ArticleRepository`] that decides,
//! for every read, whether to serve cached data, refresh from the network, or
//! fall back to a stale copy when the network fails.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use help_articles::{ArticleRepository, FetchOutcome, FreshnessCache};
//! # use help_articles::source::ArticleSource;
//!
//! # async fn run(source: Arc<dyn ArticleSource>) {
//! let repo = ArticleRepository::new(source, Arc::new(FreshnessCache::default()));
//!
//! let mut outcomes = repo.observe_one("3", false);
//! while let Some(outcome) = outcomes.next().await {
//!     match outcome {
//!         FetchOutcome::Loading => println!("loading…"),
//!         FetchOutcome::Success { data, from_cache } => {
//!             println!("{} (cached: {from_cache})", data.title)
//!         }
//!         FetchOutcome::Error(e) => println!("error: {e} (retry: {})", e.can_retry),
//!     }
//! }
//! # }
//! ```

// ── Data and boundaries ───────────────────────────────────────────────────────
pub mod article;
pub mod clock;
pub mod config;
pub mod http;
pub mod source;

// ── Freshness core ────────────────────────────────────────────────────────────
pub mod cache;
pub mod error;
pub mod orchestrator;

// ── Convenience re-exports ────────────────────────────────────────────────────
pub use article::{ArticleList, ArticleRecord};
pub use cache::{CacheReadOutcome, FreshnessCache};
pub use config::FreshnessConfig;
pub use error::{ConfigError, FetchError};
pub use orchestrator::{ArticleRepository, FetchOutcome, OutcomeStream};
pub use source::{ArticleSource, SourceError};
