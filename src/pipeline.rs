// src/pipeline.rs
//! One run: scrape sources, extract insights, deliver the draft.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::analyze::openai::OpenAiClient;
use crate::analyze::InsightExtractor;
use crate::config::{AppConfig, PipelineSettings};
use crate::error::{ConfigError, PipelineError};
use crate::ingest::providers::firecrawl::FirecrawlFetcher;
use crate::ingest::retry::{Sleeper, TokioSleeper};
use crate::ingest::types::{SourceEntry, SourceFetcher};
use crate::ingest::{fetch_all, FetchPlan, SourceFailure};
use crate::notify::telegram::TelegramNotifier;
use crate::notify::{DeliveryReceipt, Notifier};

#[derive(Debug)]
pub enum RunOutcome {
    /// No draft was produced; nothing was sent.
    Skipped {
        posts: usize,
        failures: Vec<SourceFailure>,
    },
    Delivered {
        posts: usize,
        failures: Vec<SourceFailure>,
        receipt: DeliveryReceipt,
    },
}

pub struct Pipeline {
    fetcher: Arc<dyn SourceFetcher>,
    extractor: InsightExtractor,
    notifier: Arc<dyn Notifier>,
    sleeper: Arc<dyn Sleeper>,
    plan: FetchPlan,
}

impl Pipeline {
    pub fn new(
        fetcher: Arc<dyn SourceFetcher>,
        extractor: InsightExtractor,
        notifier: Arc<dyn Notifier>,
        sleeper: Arc<dyn Sleeper>,
        plan: FetchPlan,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            notifier,
            sleeper,
            plan,
        }
    }

    /// Wire the production clients (Firecrawl, OpenAI, Telegram).
    pub fn from_config(cfg: &AppConfig, settings: &PipelineSettings) -> Result<Self, ConfigError> {
        let fetcher = FirecrawlFetcher::new(
            cfg.require_firecrawl()?.to_string(),
            cfg.firecrawl_base_url.as_deref(),
            settings.http_timeout_secs,
        )
        .map_err(|e| ConfigError::Invalid {
            key: "FIRECRAWL_BASE_URL",
            reason: e.to_string(),
        })?;

        let completion = OpenAiClient::new(
            cfg.require_openai()?.to_string(),
            cfg.openai_model.as_deref(),
            cfg.openai_base_url.as_deref(),
            settings.http_timeout_secs,
        )
        .map_err(|e| ConfigError::Invalid {
            key: "OPENAI_BASE_URL",
            reason: e.to_string(),
        })?;
        tracing::info!(model = completion.model(), "completion client ready");

        let extractor = InsightExtractor::new(Arc::new(completion), settings.schema, settings.tz());
        let notifier = TelegramNotifier::new(cfg.telegram());

        Ok(Self::new(
            Arc::new(fetcher),
            extractor,
            Arc::new(notifier),
            Arc::new(TokioSleeper),
            settings.fetch_plan(),
        ))
    }

    /// Run once. Per-source and extraction failures do not fail the run;
    /// delivery failures do.
    pub async fn run_once(
        &self,
        sources: &[SourceEntry],
        now: DateTime<Utc>,
    ) -> Result<RunOutcome, PipelineError> {
        let report = fetch_all(sources, self.fetcher.as_ref(), self.plan, self.sleeper.as_ref()).await;
        let posts = report.posts.len();

        let Some(draft) = self.extractor.extract_draft(&report.posts, now).await else {
            tracing::info!(posts, "no draft produced; skipping delivery");
            return Ok(RunOutcome::Skipped {
                posts,
                failures: report.failures,
            });
        };

        let receipt = self.notifier.deliver(draft.as_str()).await?;
        Ok(RunOutcome::Delivered {
            posts,
            failures: report.failures,
            receipt,
        })
    }
}
