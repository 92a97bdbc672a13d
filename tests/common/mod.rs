// tests/common/mod.rs
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::Utc;
use finance_trends_drafter::analyze::openai::{CompletionClient, StructuredSchema};
use finance_trends_drafter::error::{DeliveryError, ExtractionError, FetchError};
use finance_trends_drafter::ingest::retry::Sleeper;
use finance_trends_drafter::ingest::types::{Platform, Post, Source, SourceEntry, SourceFetcher};
use finance_trends_drafter::notify::{DeliveryReceipt, Notifier};
use parking_lot::Mutex;
use serde_json::Value;

pub fn reddit_post(link: &str) -> Post {
    Post {
        headline: format!("headline for {link}"),
        link: link.to_string(),
        date_posted: "2025-03-14T08:00:00Z".into(),
        content: Some("body".into()),
        score: Some(10.0),
        media_url: None,
        media_type: None,
    }
}

pub fn reddit(id: &str) -> SourceEntry {
    Source::new(id, Platform::Reddit, Some("finance")).into()
}

/// Fetcher scripted per identifier: fail `n` times with a transient error,
/// then return the configured posts. Counts every call.
#[derive(Default)]
pub struct ScriptedFetcher {
    failures: Mutex<HashMap<String, usize>>,
    posts: Mutex<HashMap<String, Vec<Post>>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl ScriptedFetcher {
    pub fn with_posts(self, id: &str, posts: Vec<Post>) -> Self {
        self.posts.lock().insert(id.to_string(), posts);
        self
    }

    pub fn failing(self, id: &str, times: usize) -> Self {
        self.failures.lock().insert(id.to_string(), times);
        self
    }

    pub fn calls(&self, id: &str) -> usize {
        self.calls.lock().get(id).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().values().sum()
    }
}

#[async_trait::async_trait]
impl SourceFetcher for ScriptedFetcher {
    async fn fetch_posts(&self, source: &Source) -> Result<Vec<Post>, FetchError> {
        let id = source.identifier.clone();
        let n = {
            let mut calls = self.calls.lock();
            let c = calls.entry(id.clone()).or_insert(0);
            *c += 1;
            *c
        };
        let fail_times = self.failures.lock().get(&id).copied().unwrap_or(0);
        if n <= fail_times {
            return Err(FetchError::Network(format!("{id}: connection reset ({n})")));
        }
        Ok(self.posts.lock().get(&id).cloned().unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Records requested delays instead of sleeping.
#[derive(Default)]
pub struct RecordingSleeper {
    pub delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn recorded(&self) -> Vec<Duration> {
        self.delays.lock().clone()
    }
}

#[async_trait::async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, d: Duration) {
        self.delays.lock().push(d);
    }
}

/// Completion stub returning a fixed JSON value (or a fixed error).
pub struct StubCompletion {
    pub answer: Result<Value, String>,
    pub prompts: Mutex<Vec<String>>,
}

impl StubCompletion {
    pub fn ok(v: Value) -> Self {
        Self {
            answer: Ok(v),
            prompts: Mutex::new(vec![]),
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            answer: Err(msg.to_string()),
            prompts: Mutex::new(vec![]),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().len()
    }
}

#[async_trait::async_trait]
impl CompletionClient for StubCompletion {
    async fn complete_structured(
        &self,
        prompt: &str,
        _schema: &StructuredSchema,
    ) -> Result<Value, ExtractionError> {
        self.prompts.lock().push(prompt.to_string());
        self.answer
            .clone()
            .map_err(ExtractionError::Request)
    }

    fn provider_name(&self) -> &'static str {
        "stub"
    }
}

/// Notifier that stores drafts, or fails every call when `fail` is set.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<String>>,
    pub fail: bool,
    attempts: AtomicUsize,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn deliver(&self, draft: &str) -> Result<DeliveryReceipt, DeliveryError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(DeliveryError::Api {
                status: 502,
                message: "bad gateway".into(),
            });
        }
        self.sent.lock().push(draft.to_string());
        Ok(DeliveryReceipt {
            channel: "recording",
            delivered_at: Utc::now(),
        })
    }

    fn channel(&self) -> &'static str {
        "recording"
    }
}
