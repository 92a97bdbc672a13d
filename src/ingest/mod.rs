// src/ingest/mod.rs
pub mod normalize;
pub mod providers;
pub mod registry;
pub mod retry;
pub mod types;

use std::time::{Duration, Instant};

use futures::future::join_all;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use once_cell::sync::OnceCell;

use crate::error::FetchError;
use crate::ingest::retry::{retry, RetryPolicy, Sleeper};
use crate::ingest::types::{Post, SourceEntry, SourceFetcher};

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_sources_total", "Sources attempted by the orchestrator.");
        describe_counter!("ingest_posts_total", "Normalized posts accumulated.");
        describe_counter!("ingest_retries_total", "Retry sleeps taken after transient errors.");
        describe_counter!(
            "ingest_source_errors_total",
            "Sources dropped after an unrecognized or exhausted fetch."
        );
        describe_histogram!("ingest_fetch_ms", "Per-source fetch time in milliseconds.");
        describe_gauge!(
            "ingest_pipeline_last_run_ts",
            "Unix ts when the fetch orchestrator last finished."
        );
    });
}

/// Batching and retry knobs for one orchestrator run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPlan {
    pub batch_size: usize,
    pub batch_delay: Duration,
    pub retry: RetryPolicy,
}

impl Default for FetchPlan {
    fn default() -> Self {
        Self {
            batch_size: 3,
            batch_delay: Duration::from_secs(5),
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFailure {
    pub identifier: String,
    pub error: FetchError,
}

#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    pub posts: Vec<Post>,
    pub failures: Vec<SourceFailure>,
    pub batches: usize,
}

/// Fetch every source in fixed-size batches and accumulate their posts.
///
/// Never fails: per-source errors are logged and reported in
/// [`FetchReport::failures`]. Output keeps source order, and each source's
/// posts stay in the order the fetcher returned them.
pub async fn fetch_all(
    entries: &[SourceEntry],
    fetcher: &dyn SourceFetcher,
    plan: FetchPlan,
    sleeper: &dyn Sleeper,
) -> FetchReport {
    ensure_metrics_described();
    tracing::info!(sources = entries.len(), fetcher = fetcher.name(), "scraping sources");

    let batch_size = plan.batch_size.max(1);
    let batches: Vec<&[SourceEntry]> = entries.chunks(batch_size).collect();
    let mut report = FetchReport {
        batches: batches.len(),
        ..FetchReport::default()
    };

    for (idx, batch) in batches.iter().enumerate() {
        let results = join_all(
            batch
                .iter()
                .map(|entry| fetch_one(entry, fetcher, plan.retry, sleeper)),
        )
        .await;

        for (entry, res) in batch.iter().zip(results) {
            match res {
                Ok(mut posts) => {
                    counter!("ingest_posts_total").increment(posts.len() as u64);
                    report.posts.append(&mut posts);
                }
                Err(error) => {
                    tracing::error!(source = %entry.identifier, error = %error, "dropping source");
                    counter!("ingest_source_errors_total").increment(1);
                    report.failures.push(SourceFailure {
                        identifier: entry.identifier.clone(),
                        error,
                    });
                }
            }
        }

        if idx + 1 < batches.len() {
            tracing::debug!(batch = idx + 1, delay_ms = plan.batch_delay.as_millis() as u64, "pausing between batches");
            sleeper.sleep(plan.batch_delay).await;
        }
    }

    gauge!("ingest_pipeline_last_run_ts").set(chrono::Utc::now().timestamp() as f64);
    tracing::info!(
        posts = report.posts.len(),
        failed = report.failures.len(),
        batches = report.batches,
        "scraping finished"
    );
    report
}

async fn fetch_one(
    entry: &SourceEntry,
    fetcher: &dyn SourceFetcher,
    policy: RetryPolicy,
    sleeper: &dyn Sleeper,
) -> Result<Vec<Post>, FetchError> {
    counter!("ingest_sources_total").increment(1);
    let source = entry.resolve()?;

    let t0 = Instant::now();
    let src = &source;
    let out = retry(policy, sleeper, &source.identifier, move |_| fetcher.fetch_posts(src)).await;
    histogram!("ingest_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

    if let Ok(posts) = &out {
        if posts.is_empty() {
            tracing::warn!(source = %source.identifier, "no valid posts found");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::types::{Platform, Source};
    use std::sync::Mutex;

    struct Echo;

    #[async_trait::async_trait]
    impl SourceFetcher for Echo {
        async fn fetch_posts(&self, source: &Source) -> Result<Vec<Post>, FetchError> {
            Ok(vec![Post {
                headline: source.identifier.clone(),
                link: source.target_url(),
                date_posted: "2025-01-01T00:00:00Z".into(),
                content: None,
                score: None,
                media_url: None,
                media_type: None,
            }])
        }
        fn name(&self) -> &'static str {
            "echo"
        }
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<Duration>>);

    #[async_trait::async_trait]
    impl Sleeper for Recorder {
        async fn sleep(&self, d: Duration) {
            self.0.lock().unwrap().push(d);
        }
    }

    #[tokio::test]
    async fn keeps_source_order_across_batches() {
        let entries: Vec<SourceEntry> = ["r/a", "r/b", "r/c", "r/d", "r/e"]
            .iter()
            .map(|id| Source::new(id, Platform::Reddit, None).into())
            .collect();
        let rec = Recorder::default();
        let report = fetch_all(&entries, &Echo, FetchPlan::default(), &rec).await;

        let heads: Vec<_> = report.posts.iter().map(|p| p.headline.as_str()).collect();
        assert_eq!(heads, vec!["r/a", "r/b", "r/c", "r/d", "r/e"]);
        assert_eq!(report.batches, 2);
        assert_eq!(*rec.0.lock().unwrap(), vec![Duration::from_secs(5)]);
    }

    #[tokio::test]
    async fn empty_input_does_nothing() {
        let rec = Recorder::default();
        let report = fetch_all(&[], &Echo, FetchPlan::default(), &rec).await;
        assert!(report.posts.is_empty());
        assert_eq!(report.batches, 0);
        assert!(rec.0.lock().unwrap().is_empty());
    }
}
