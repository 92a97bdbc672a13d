// tests/ingest_orchestrator.rs
mod common;

use std::time::Duration;

use common::{reddit, reddit_post, RecordingSleeper, ScriptedFetcher};
use finance_trends_drafter::error::FetchError;
use finance_trends_drafter::ingest::types::SourceEntry;
use finance_trends_drafter::ingest::{fetch_all, FetchPlan};

#[tokio::test]
async fn transient_failures_within_budget_still_yield_posts() {
    let fetcher = ScriptedFetcher::default()
        .with_posts("r/investing", vec![reddit_post("https://reddit.com/1")])
        .failing("r/investing", 2)
        .with_posts("r/Fire", vec![reddit_post("https://reddit.com/2")])
        .failing("r/Fire", 1);
    let sleeper = RecordingSleeper::default();

    let report = fetch_all(
        &[reddit("r/investing"), reddit("r/Fire")],
        &fetcher,
        FetchPlan::default(),
        &sleeper,
    )
    .await;

    assert_eq!(report.posts.len(), 2);
    assert!(report.failures.is_empty());
    assert_eq!(fetcher.calls("r/investing"), 3);
    assert_eq!(fetcher.calls("r/Fire"), 2);
    // three retry backoffs, no inter-batch delay
    assert_eq!(sleeper.recorded(), vec![Duration::from_secs(2); 3]);
}

#[tokio::test]
async fn exhausted_source_contributes_nothing_and_run_continues() {
    let fetcher = ScriptedFetcher::default()
        .with_posts("r/investing", vec![reddit_post("https://reddit.com/1")])
        .failing("r/investing", 3)
        .with_posts("r/Fire", vec![reddit_post("https://reddit.com/2")]);
    let sleeper = RecordingSleeper::default();

    let report = fetch_all(
        &[reddit("r/investing"), reddit("r/Fire")],
        &fetcher,
        FetchPlan::default(),
        &sleeper,
    )
    .await;

    assert_eq!(report.posts.len(), 1);
    assert_eq!(report.posts[0].link, "https://reddit.com/2");
    assert_eq!(fetcher.calls("r/investing"), 3);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].identifier, "r/investing");
    assert!(report.failures[0].error.is_transient());
}

#[tokio::test]
async fn unrecognized_source_fails_without_any_retry() {
    let fetcher = ScriptedFetcher::default();
    let sleeper = RecordingSleeper::default();

    let report = fetch_all(
        &[SourceEntry::untyped("linkedin:someone")],
        &fetcher,
        FetchPlan::default(),
        &sleeper,
    )
    .await;

    assert!(report.posts.is_empty());
    assert_eq!(fetcher.total_calls(), 0);
    assert!(sleeper.recorded().is_empty());
    assert_eq!(
        report.failures[0].error,
        FetchError::UnrecognizedSource("linkedin:someone".into())
    );
}

#[tokio::test]
async fn empty_result_is_not_retried() {
    let fetcher = ScriptedFetcher::default();
    let sleeper = RecordingSleeper::default();

    let report = fetch_all(&[reddit("r/quiet")], &fetcher, FetchPlan::default(), &sleeper).await;

    assert!(report.posts.is_empty());
    assert!(report.failures.is_empty());
    assert_eq!(fetcher.calls("r/quiet"), 1);
    assert!(sleeper.recorded().is_empty());
}

#[tokio::test]
async fn two_reddit_sources_fit_one_batch() {
    let fetcher = ScriptedFetcher::default()
        .with_posts("r/personalfinance", vec![reddit_post("https://reddit.com/a")])
        .with_posts("r/EuropeFIRE", vec![reddit_post("https://reddit.com/b")]);
    let sleeper = RecordingSleeper::default();

    let report = fetch_all(
        &[reddit("r/personalfinance"), reddit("r/EuropeFIRE")],
        &fetcher,
        FetchPlan::default(),
        &sleeper,
    )
    .await;

    assert_eq!(report.batches, 1);
    assert!(sleeper.recorded().is_empty());
    assert_eq!(report.posts.len(), 2);
    assert!(report.posts.iter().all(|p| p.media_url.is_none()));
    assert!(report.posts.iter().all(|p| p.score.is_some()));
}

#[tokio::test]
async fn four_sources_pause_once_between_batches() {
    let ids = ["r/a", "r/b", "r/c", "r/d"];
    let fetcher = ids.iter().fold(ScriptedFetcher::default(), |f, id| {
        f.with_posts(id, vec![reddit_post(&format!("https://reddit.com/{id}"))])
    });
    let sleeper = RecordingSleeper::default();
    let entries: Vec<_> = ids.iter().map(|id| reddit(id)).collect();

    let report = fetch_all(&entries, &fetcher, FetchPlan::default(), &sleeper).await;

    assert_eq!(report.batches, 2);
    assert_eq!(sleeper.recorded(), vec![Duration::from_millis(5000)]);
    assert_eq!(report.posts.len(), 4);
}

#[tokio::test]
async fn posts_keep_per_source_order() {
    let fetcher = ScriptedFetcher::default().with_posts(
        "r/a",
        vec![
            reddit_post("https://reddit.com/1"),
            reddit_post("https://reddit.com/2"),
            reddit_post("https://reddit.com/3"),
        ],
    );
    let sleeper = RecordingSleeper::default();

    let report = fetch_all(&[reddit("r/a")], &fetcher, FetchPlan::default(), &sleeper).await;

    let links: Vec<_> = report.posts.iter().map(|p| p.link.as_str()).collect();
    assert_eq!(
        links,
        vec!["https://reddit.com/1", "https://reddit.com/2", "https://reddit.com/3"]
    );
}
