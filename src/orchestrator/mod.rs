//! Fetch orchestration — decides, per read, what to serve and in what order.
//!
//! Each read produces a short, ordered sequence of [`FetchOutcome`]s:
//!
//! ```text
//! Loading ─┬─ fresh hit ──────────► Success(cached)                      (no network call)
//!          ├─ stale hit ──────────► Success(cached) ─► network ─► ...
//!          └─ miss / expired ─────────────────────────► network ─► ...
//!
//! network ─┬─ ok ───────────────────────────────► write cache, Success(fresh)
//!          ├─ network error, cache hit on recheck ► (end, nothing emitted)
//!          └─ otherwise ────────────────────────► Error
//! ```
//!
//! The sequence is produced by a spawned task feeding a bounded channel. The
//! only suspension point is the network call; cache access is synchronous.
//! Dropping an [`OutcomeStream`] does not cancel the task: the fetch and its
//! cache write still complete.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use crate::article::{ArticleList, ArticleRecord};
use crate::cache::{CacheReadOutcome, FreshnessCache};
use crate::config::{FreshnessConfig, PREFETCH_ATTEMPTS};
use crate::error::{FetchError, classify};
use crate::source::{ArticleSource, SourceFuture};

/// Longest possible sequence: `Loading`, a cached `Success`, and a terminal outcome.
const OUTCOME_BUFFER: usize = 3;

/// One observable state of a read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome<T> {
    Loading,
    Success { data: T, from_cache: bool },
    Error(FetchError),
}

impl<T> FetchOutcome<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// The payload, if this is a `Success`.
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success { data, .. } => Some(data),
            _ => None,
        }
    }

    /// Whether a `Success` was served from cache; `None` for other variants.
    pub fn from_cache(&self) -> Option<bool> {
        match self {
            Self::Success { from_cache, .. } => Some(*from_cache),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Self::Error(error) => Some(error),
            _ => None,
        }
    }
}

/// Receiving end of a read's outcome sequence.
#[derive(Debug)]
pub struct OutcomeStream<T> {
    rx: mpsc::Receiver<FetchOutcome<T>>,
}

impl<T> OutcomeStream<T> {
    /// Waits for the next outcome. Returns `None` once the sequence has ended.
    pub async fn next(&mut self) -> Option<FetchOutcome<T>> {
        self.rx.recv().await
    }

    /// Drains the whole sequence.
    pub async fn collect(mut self) -> Vec<FetchOutcome<T>> {
        let mut outcomes = Vec::with_capacity(OUTCOME_BUFFER);
        while let Some(outcome) = self.rx.recv().await {
            outcomes.push(outcome);
        }
        outcomes
    }
}

// Sending half; a consumer that went away is not an error for the producer.
struct Emitter<T> {
    tx: mpsc::Sender<FetchOutcome<T>>,
}

impl<T> Emitter<T> {
    async fn emit(&self, outcome: FetchOutcome<T>) {
        if self.tx.send(outcome).await.is_err() {
            trace!("outcome dropped, consumer went away");
        }
    }
}

/// Read API over the freshness cache and an article source.
///
/// Every `observe_*` call spawns a Tokio task, so it must be made from within
/// a Tokio runtime.
///
/// # Examples
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use help_articles::{ArticleRepository, FreshnessCache};
/// # use help_articles::source::ArticleSource;
///
/// # async fn demo(source: Arc<dyn ArticleSource>) {
/// let repo = ArticleRepository::new(source, Arc::new(FreshnessCache::default()));
/// let mut outcomes = repo.observe_list(false);
/// while let Some(outcome) = outcomes.next().await {
///     println!("{outcome:?}");
/// }
/// # }
/// ```
#[derive(Clone)]
pub struct ArticleRepository {
    source: Arc<dyn ArticleSource>,
    cache: Arc<FreshnessCache>,
    prefetch_attempts: u32,
}

impl ArticleRepository {
    pub fn new(source: Arc<dyn ArticleSource>, cache: Arc<FreshnessCache>) -> Self {
        Self {
            source,
            cache,
            prefetch_attempts: PREFETCH_ATTEMPTS,
        }
    }

    /// Like [`new`](Self::new), taking the prefetch attempt bound from `config`.
    pub fn with_config(
        source: Arc<dyn ArticleSource>,
        cache: Arc<FreshnessCache>,
        config: &FreshnessConfig,
    ) -> Self {
        Self {
            source,
            cache,
            prefetch_attempts: config.prefetch_attempts.max(1),
        }
    }

    pub fn cache(&self) -> &Arc<FreshnessCache> {
        &self.cache
    }

    /// Observes the full article list.
    pub fn observe_list(&self, force_refresh: bool) -> OutcomeStream<ArticleList> {
        let (tx, rx) = mpsc::channel(OUTCOME_BUFFER);
        let source = Arc::clone(&self.source);
        let cache = Arc::clone(&self.cache);

        tokio::spawn(async move {
            read_through(
                &Emitter { tx },
                "list",
                force_refresh,
                || cache.read_list(),
                || source.fetch_list(),
                |articles: &ArticleList| cache.write_list(articles.clone()),
            )
            .await;
        });

        OutcomeStream { rx }
    }

    /// Observes a single article.
    pub fn observe_one(
        &self,
        id: impl Into<String>,
        force_refresh: bool,
    ) -> OutcomeStream<ArticleRecord> {
        let id = id.into();
        let (tx, rx) = mpsc::channel(OUTCOME_BUFFER);
        let source = Arc::clone(&self.source);
        let cache = Arc::clone(&self.cache);

        tokio::spawn(async move {
            read_through(
                &Emitter { tx },
                &id,
                force_refresh,
                || cache.read_one(&id),
                || source.fetch_one(&id),
                |article: &ArticleRecord| cache.write_one(article.clone()),
            )
            .await;
        });

        OutcomeStream { rx }
    }

    /// User-initiated retry of the list view; always goes to the network.
    pub fn retry_list(&self) -> OutcomeStream<ArticleList> {
        self.observe_list(true)
    }

    /// User-initiated retry of a detail view; always goes to the network.
    pub fn retry_one(&self, id: impl Into<String>) -> OutcomeStream<ArticleRecord> {
        self.observe_one(id, true)
    }

    /// Background refresh of the article list.
    ///
    /// Makes up to the configured number of immediate attempts (three by
    /// default), stopping early on a failure that is not worth retrying.
    /// Returns `true` once a fetch succeeds and is cached. Scheduling the next
    /// cycle is the caller's job.
    pub async fn prefetch(&self) -> bool {
        for attempt in 1..=self.prefetch_attempts {
            match self.source.fetch_list().await {
                Ok(articles) => {
                    let count = articles.len();
                    self.cache.write_list(articles);
                    info!(attempt, count, "article prefetch succeeded");
                    return true;
                }
                Err(err) => {
                    let error = classify(&err);
                    warn!(
                        attempt,
                        max_attempts = self.prefetch_attempts,
                        error = %err,
                        "article prefetch attempt failed"
                    );
                    if !error.can_retry {
                        break;
                    }
                }
            }
        }

        warn!("article prefetch gave up for this cycle");
        false
    }

    /// Empties the cache.
    pub fn clear(&self) {
        self.cache.clear();
    }
}

// Shared sequencing for list and detail reads. `read` is invoked twice on the
// failure path: once before the fetch and once after, so a writer that raced
// in during the fetch can still mask a network error.
async fn read_through<'a, T, R, F, W>(
    emitter: &Emitter<T>,
    resource: &str,
    force_refresh: bool,
    read: R,
    fetch: F,
    write: W,
) where
    R: Fn() -> CacheReadOutcome<T>,
    F: FnOnce() -> SourceFuture<'a, T>,
    W: FnOnce(&T),
{
    emitter.emit(FetchOutcome::Loading).await;

    if !force_refresh {
        match read() {
            CacheReadOutcome::Hit { data, is_stale, .. } => {
                emitter
                    .emit(FetchOutcome::Success {
                        data,
                        from_cache: true,
                    })
                    .await;
                if !is_stale {
                    debug!(resource, "served fresh from cache");
                    return;
                }
                debug!(resource, "cached copy is stale, refreshing");
            }
            CacheReadOutcome::Miss | CacheReadOutcome::Expired => {
                debug!(resource, "cache miss, fetching");
            }
        }
    }

    match fetch().await {
        Ok(data) => {
            write(&data);
            emitter
                .emit(FetchOutcome::Success {
                    data,
                    from_cache: false,
                })
                .await;
        }
        Err(err) => {
            let error = classify(&err);
            if error.is_network_error && read().is_hit() {
                info!(resource, error = %err, "network failure masked by cached copy");
                return;
            }
            warn!(
                resource,
                error = %err,
                network = error.is_network_error,
                retryable = error.can_retry,
                "fetch failed"
            );
            emitter.emit(FetchOutcome::Error(error)).await;
        }
    }
}
