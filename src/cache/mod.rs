//! Freshness cache — in-memory article store with staleness and expiry.
//!
//! The store has two independent slots:
//!
//! - the **list slot**, holding the full ordered article list for the list view;
//! - the **article slots**, one per article id, for detail views.
//!
//! Every read classifies the slot by its age (time since it was last written):
//!
//! | Age                          | Outcome                              |
//! |------------------------------|--------------------------------------|
//! | `< stale_after`              | `Hit { is_stale: false }`            |
//! | `stale_after ..expire_after` | `Hit { is_stale: true }`             |
//! | `>= expire_after`            | `Expired`, and the slot is removed   |
//! | never written / removed      | `Miss`                               |
//!
//! Writing the list also writes every article into its own slot at the same
//! timestamp, so a list fetch refreshes the detail views too.
//!
//! All operations are synchronous and in-memory; locks are held only for the
//! duration of a slot swap and never across an `.await`.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::article::{ArticleList, ArticleRecord};
use crate::clock::{Clock, SystemClock, Timestamp};
use crate::config::FreshnessConfig;

/// Result of reading one cache slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheReadOutcome<T> {
    Hit {
        data: T,
        stored_at: Timestamp,
        is_stale: bool,
    },
    /// The slot was never written, or was removed.
    Miss,
    /// The slot existed but had outlived the expiry threshold; it is now gone.
    Expired,
}

impl<T> CacheReadOutcome<T> {
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit { .. })
    }
}

// A cached payload and the time it was stored.
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    data: T,
    stored_at: Timestamp,
}

impl<T> CacheEntry<T> {
    fn new(data: T, stored_at: Timestamp) -> Self {
        Self { data, stored_at }
    }
}

/// Thread-safe freshness cache for articles.
///
/// Share it behind an [`Arc`]; every method takes `&self`.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use help_articles::cache::{CacheReadOutcome, FreshnessCache};
/// use help_articles::clock::ManualClock;
/// # use help_articles::article::ArticleRecord;
/// # let article = ArticleRecord {
/// #     id: "1".into(), title: "t".into(), summary: "s".into(),
/// #     content: "c".into(), category: "k".into(), updated_at: "u".into(),
/// # };
///
/// let clock = ManualClock::new();
/// let cache = FreshnessCache::new(Arc::new(clock.clone()));
/// cache.write_list(vec![article]);
///
/// clock.advance(Duration::from_secs(25 * 60 * 60));
/// assert!(matches!(cache.read_one("1"), CacheReadOutcome::Hit { is_stale: true, .. }));
/// ```
pub struct FreshnessCache {
    clock: Arc<dyn Clock>,
    stale_after: Duration,
    expire_after: Duration,
    list: RwLock<Option<CacheEntry<ArticleList>>>,
    articles: DashMap<String, CacheEntry<ArticleRecord>>,
}

impl Default for FreshnessCache {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock::new()))
    }
}

impl FreshnessCache {
    /// Creates an empty cache using the default 24h / 72h thresholds.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_config(clock, &FreshnessConfig::default())
    }

    /// Creates an empty cache using the thresholds from `config`.
    ///
    /// `config` is expected to have passed [`FreshnessConfig::validate`].
    pub fn with_config(clock: Arc<dyn Clock>, config: &FreshnessConfig) -> Self {
        Self {
            clock,
            stale_after: config.stale_after(),
            expire_after: config.expire_after(),
            list: RwLock::new(None),
            articles: DashMap::new(),
        }
    }

    /// Reads the list slot.
    pub fn read_list(&self) -> CacheReadOutcome<ArticleList> {
        let now = self.clock.now();

        {
            let slot = self.list.read();
            match slot.as_ref() {
                None => return CacheReadOutcome::Miss,
                Some(entry) if !self.is_expired(entry, now) => return self.hit(entry, now),
                Some(_) => {}
            }
        }

        // Re-check under the write lock: another reader may have purged the
        // slot, or a writer may have replaced it, since the read lock dropped.
        let mut slot = self.list.write();
        match slot.as_ref() {
            None => CacheReadOutcome::Miss,
            Some(entry) if !self.is_expired(entry, now) => self.hit(entry, now),
            Some(entry) => {
                debug!(stored_at = %entry.stored_at, "purging expired article list");
                *slot = None;
                CacheReadOutcome::Expired
            }
        }
    }

    /// Reads the slot for article `id`.
    pub fn read_one(&self, id: &str) -> CacheReadOutcome<ArticleRecord> {
        let now = self.clock.now();

        if let Some(outcome) = self.lookup_article(id, now) {
            return outcome;
        }

        match self
            .articles
            .remove_if(id, |_, entry| self.is_expired(entry, now))
        {
            Some(_) => {
                debug!(article_id = id, "purging expired article");
                CacheReadOutcome::Expired
            }
            None => self
                .lookup_article(id, now)
                .unwrap_or(CacheReadOutcome::Miss),
        }
    }

    /// Replaces the list slot and fans each article out to its own slot, all
    /// at the same store time.
    ///
    /// The clock is sampled under the slot lock, so concurrent writers land in
    /// store-time order.
    pub fn write_list(&self, articles: ArticleList) {
        let mut slot = self.list.write();
        let now = self.clock.now();
        trace!(count = articles.len(), "caching article list");

        for article in &articles {
            self.articles
                .insert(article.id.clone(), CacheEntry::new(article.clone(), now));
        }
        *slot = Some(CacheEntry::new(articles, now));
    }

    /// Replaces the slot for one article. The list slot is left untouched.
    pub fn write_one(&self, article: ArticleRecord) {
        trace!(article_id = article.id(), "caching article");
        let slot = self.articles.entry(article.id.clone());
        let now = self.clock.now();
        slot.insert(CacheEntry::new(article, now));
    }

    /// Empties both slots.
    pub fn clear(&self) {
        *self.list.write() = None;
        self.articles.clear();
        debug!("article cache cleared");
    }

    /// Number of per-article slots currently held.
    pub fn article_count(&self) -> usize {
        self.articles.len()
    }

    // Returns `None` when the slot exists but has expired, leaving removal to the caller.
    fn lookup_article(&self, id: &str, now: Timestamp) -> Option<CacheReadOutcome<ArticleRecord>> {
        match self.articles.get(id) {
            None => Some(CacheReadOutcome::Miss),
            Some(entry) if !self.is_expired(entry.value(), now) => {
                Some(self.hit(entry.value(), now))
            }
            Some(_) => None,
        }
    }

    fn hit<T: Clone>(&self, entry: &CacheEntry<T>, now: Timestamp) -> CacheReadOutcome<T> {
        CacheReadOutcome::Hit {
            data: entry.data.clone(),
            stored_at: entry.stored_at,
            is_stale: now.saturating_since(entry.stored_at) >= self.stale_after,
        }
    }

    fn is_expired<T>(&self, entry: &CacheEntry<T>, now: Timestamp) -> bool {
        now.saturating_since(entry.stored_at) >= self.expire_after
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    const HOUR: Duration = Duration::from_secs(60 * 60);

    fn article(id: &str, title: &str) -> ArticleRecord {
        ArticleRecord {
            id: id.to_owned(),
            title: title.to_owned(),
            summary: format!("summary of {title}"),
            content: format!("# {title}"),
            category: "Account".to_owned(),
            updated_at: "2024-05-01T10:00:00Z".to_owned(),
        }
    }

    fn cache() -> (ManualClock, FreshnessCache) {
        let clock = ManualClock::starting_at(Timestamp::from_millis(1_000_000));
        let cache = FreshnessCache::new(Arc::new(clock.clone()));
        (clock, cache)
    }

    #[test]
    fn empty_cache_misses() {
        let (_, cache) = cache();
        assert_eq!(cache.read_list(), CacheReadOutcome::Miss);
        assert_eq!(cache.read_one("1"), CacheReadOutcome::Miss);
    }

    #[test]
    fn fresh_write_is_fresh_hit() {
        let (clock, cache) = cache();
        cache.write_one(article("1", "Reset Password"));

        match cache.read_one("1") {
            CacheReadOutcome::Hit {
                data,
                stored_at,
                is_stale,
            } => {
                assert_eq!(data.title, "Reset Password");
                assert_eq!(stored_at, clock.now());
                assert!(!is_stale);
            }
            other => panic!("expected Hit, got {other:?}"),
        }
    }

    #[test]
    fn latest_write_wins() {
        let (clock, cache) = cache();
        for n in 0..5 {
            cache.write_one(article("1", &format!("rev {n}")));
            clock.advance(Duration::from_secs(1));
        }

        match cache.read_one("1") {
            CacheReadOutcome::Hit { data, .. } => assert_eq!(data.title, "rev 4"),
            other => panic!("expected Hit, got {other:?}"),
        }
    }

    #[test]
    fn backward_clock_step_does_not_pin_entry() {
        let (clock, cache) = cache();
        clock.advance(100 * HOUR);
        cache.write_one(article("1", "written ahead"));

        clock.set(Timestamp::from_millis(1_000_000));
        cache.write_one(article("1", "written after correction"));
        let rewritten = clock.now();

        clock.advance(30 * HOUR);
        match cache.read_one("1") {
            CacheReadOutcome::Hit {
                data,
                stored_at,
                is_stale,
            } => {
                assert_eq!(data.title, "written after correction");
                assert_eq!(stored_at, rewritten);
                assert!(is_stale);
            }
            other => panic!("expected Hit, got {other:?}"),
        }

        clock.advance(50 * HOUR);
        assert_eq!(cache.read_one("1"), CacheReadOutcome::Expired);
    }

    #[test]
    fn staleness_is_not_destructive() {
        let (clock, cache) = cache();
        cache.write_list(vec![article("1", "a")]);

        clock.advance(24 * HOUR);
        for _ in 0..3 {
            assert!(matches!(
                cache.read_list(),
                CacheReadOutcome::Hit { is_stale: true, .. }
            ));
            assert!(matches!(
                cache.read_one("1"),
                CacheReadOutcome::Hit { is_stale: true, .. }
            ));
        }

        clock.advance(48 * HOUR - Duration::from_millis(1));
        assert!(matches!(
            cache.read_list(),
            CacheReadOutcome::Hit { is_stale: true, .. }
        ));
    }

    #[test]
    fn expiry_reports_once_then_misses() {
        let (clock, cache) = cache();
        cache.write_list(vec![article("1", "a")]);
        clock.advance(72 * HOUR);

        assert_eq!(cache.read_list(), CacheReadOutcome::Expired);
        assert_eq!(cache.read_list(), CacheReadOutcome::Miss);

        assert_eq!(cache.read_one("1"), CacheReadOutcome::Expired);
        assert_eq!(cache.read_one("1"), CacheReadOutcome::Miss);
        assert_eq!(cache.article_count(), 0);
    }

    #[test]
    fn overwrite_rescues_stale_entry() {
        let (clock, cache) = cache();
        cache.write_one(article("1", "old"));
        clock.advance(30 * HOUR);
        cache.write_one(article("1", "new"));

        match cache.read_one("1") {
            CacheReadOutcome::Hit { data, is_stale, .. } => {
                assert_eq!(data.title, "new");
                assert!(!is_stale);
            }
            other => panic!("expected Hit, got {other:?}"),
        }
    }

    #[test]
    fn list_write_fans_out_to_articles() {
        let (_, cache) = cache();
        let list = vec![article("a", "A"), article("b", "B"), article("c", "C")];
        cache.write_list(list.clone());

        for expected in &list {
            match cache.read_one(expected.id()) {
                CacheReadOutcome::Hit { data, is_stale, .. } => {
                    assert_eq!(&data, expected);
                    assert!(!is_stale);
                }
                other => panic!("expected Hit for {}, got {other:?}", expected.id),
            }
        }

        match cache.read_list() {
            CacheReadOutcome::Hit { data, .. } => assert_eq!(data, list),
            other => panic!("expected Hit, got {other:?}"),
        }
    }

    #[test]
    fn single_write_leaves_list_alone() {
        let (_, cache) = cache();
        cache.write_one(article("1", "solo"));
        assert_eq!(cache.read_list(), CacheReadOutcome::Miss);
    }

    #[test]
    fn clear_empties_both_slots() {
        let (_, cache) = cache();
        cache.write_list(vec![article("1", "a"), article("2", "b")]);
        cache.clear();

        assert_eq!(cache.read_list(), CacheReadOutcome::Miss);
        assert_eq!(cache.read_one("1"), CacheReadOutcome::Miss);
        assert_eq!(cache.article_count(), 0);
    }

    #[test]
    fn custom_thresholds_apply() {
        let clock = ManualClock::new();
        let config = FreshnessConfig {
            stale_after_secs: 10,
            expire_after_secs: 20,
            ..FreshnessConfig::default()
        };
        let cache = FreshnessCache::with_config(Arc::new(clock.clone()), &config);
        cache.write_one(article("1", "a"));

        clock.advance(Duration::from_secs(10));
        assert!(matches!(
            cache.read_one("1"),
            CacheReadOutcome::Hit { is_stale: true, .. }
        ));

        clock.advance(Duration::from_secs(10));
        assert_eq!(cache.read_one("1"), CacheReadOutcome::Expired);
    }

    #[test]
    fn concurrent_writers_leave_a_whole_entry() {
        let (_, cache) = cache();
        let cache = Arc::new(cache);

        let handles: Vec<_> = (0..8)
            .map(|n| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for i in 0..100 {
                        let title = format!("writer {n} rev {i}");
                        let mut record = article("shared", &title);
                        record.summary = title;
                        cache.write_one(record);
                        let _ = cache.read_one("shared");
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        match cache.read_one("shared") {
            // Payload fields were written together, so they must agree.
            CacheReadOutcome::Hit { data, .. } => assert_eq!(data.title, data.summary),
            other => panic!("expected Hit, got {other:?}"),
        }
    }
}
