//! Walks through a browsing session against an in-process flaky source.
//!
//! Run with `RUST_LOG=help_articles=debug cargo run --example offline_browse`
//! to see cache and fetch decisions as they happen.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use help_articles::clock::ManualClock;
use help_articles::source::SourceFuture;
use help_articles::{
    ArticleList, ArticleRecord, ArticleRepository, ArticleSource, FetchOutcome, FreshnessCache,
    SourceError,
};
use tracing_subscriber::EnvFilter;

const TITLES: [&str; 5] = [
    "How to Reset Your Password",
    "Understanding Your Dashboard",
    "Setting Up Two-Factor Authentication",
    "Billing Cycle Explained",
    "API Authentication Guide",
];

const RATE_LIMITED: &str = r#"{"errorCode":"RATE_LIMIT_EXCEEDED","errorTitle":"Too Many Requests","errorMessage":"You have exceeded the rate limit. Please try again in 60 seconds."}"#;

/// Serves a fixed catalogue, failing on a predictable cadence or whenever offline.
#[derive(Default)]
struct FlakySource {
    requests: AtomicUsize,
    offline: AtomicBool,
}

impl FlakySource {
    fn next_failure(&self) -> Option<SourceError> {
        let n = self.requests.fetch_add(1, Ordering::SeqCst) + 1;
        if self.offline.load(Ordering::SeqCst) {
            return Some(SourceError::Unresolved {
                host: "help.example.com".to_owned(),
            });
        }
        match n {
            n if n % 15 == 0 => Some(SourceError::Timeout),
            n if n % 20 == 0 => Some(SourceError::status_with_body(500, "Server error")),
            n if n % 25 == 0 => Some(SourceError::status_with_body(429, RATE_LIMITED)),
            _ => None,
        }
    }

    fn article(id: &str) -> Result<ArticleRecord, SourceError> {
        let index: usize = id.parse().map_err(|_| SourceError::status(404))?;
        let title = TITLES
            .get(index.wrapping_sub(1))
            .ok_or_else(|| SourceError::status(404))?;
        Ok(ArticleRecord {
            id: id.to_owned(),
            title: (*title).to_owned(),
            summary: format!("Key steps for {}.", title.to_lowercase()),
            content: format!("# {title}\n\n1. Open settings\n2. Follow the prompts"),
            category: "Getting Started".to_owned(),
            updated_at: "2024-05-01T10:00:00Z".to_owned(),
        })
    }
}

impl ArticleSource for FlakySource {
    fn fetch_list(&self) -> SourceFuture<'_, ArticleList> {
        let result: Result<ArticleList, SourceError> = match self.next_failure() {
            Some(err) => Err(err),
            None => (1..=TITLES.len())
                .map(|n| Self::article(&n.to_string()))
                .collect(),
        };
        Box::pin(async move { result })
    }

    fn fetch_one<'a>(&'a self, id: &'a str) -> SourceFuture<'a, ArticleRecord> {
        let result = match self.next_failure() {
            Some(err) => Err(err),
            None => Self::article(id),
        };
        Box::pin(async move { result })
    }
}

fn describe<T>(label: &str, outcome: &FetchOutcome<T>, summary: impl Fn(&T) -> String) {
    match outcome {
        FetchOutcome::Loading => println!("  [{label}] loading"),
        FetchOutcome::Success { data, from_cache } => {
            let origin = if *from_cache { "cache" } else { "network" };
            println!("  [{label}] {} (from {origin})", summary(data));
        }
        FetchOutcome::Error(e) => println!(
            "  [{label}] error: {e} (network: {}, retry: {}, code: {:?})",
            e.is_network_error, e.can_retry, e.error_code
        ),
    }
}

async fn show_list(repo: &ArticleRepository, force_refresh: bool) {
    let mut outcomes = repo.observe_list(force_refresh);
    while let Some(outcome) = outcomes.next().await {
        describe("list", &outcome, |list| format!("{} articles", list.len()));
    }
}

async fn show_article(repo: &ArticleRepository, id: &str) {
    let mut outcomes = repo.observe_one(id, false);
    while let Some(outcome) = outcomes.next().await {
        describe(id, &outcome, |article| article.title.clone());
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let clock = ManualClock::new();
    let cache = Arc::new(FreshnessCache::new(Arc::new(clock.clone())));
    let source = Arc::new(FlakySource::default());
    let repo = ArticleRepository::new(source.clone(), cache);

    println!("cold start:");
    show_list(&repo, false).await;

    println!("detail view after list fetch:");
    show_article(&repo, "3").await;

    println!("a day later, offline:");
    clock.advance(Duration::from_secs(25 * 60 * 60));
    source.offline.store(true, Ordering::SeqCst);
    show_list(&repo, false).await;

    println!("unknown article while offline:");
    show_article(&repo, "42").await;

    println!("back online, background prefetch:");
    source.offline.store(false, Ordering::SeqCst);
    println!("  prefetch ok: {}", repo.prefetch().await);
    show_list(&repo, false).await;

    println!("unknown article online:");
    show_article(&repo, "42").await;

    println!("four days later:");
    clock.advance(Duration::from_secs(4 * 24 * 60 * 60));
    show_list(&repo, false).await;
}
