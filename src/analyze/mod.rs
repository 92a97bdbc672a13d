// src/analyze/mod.rs
//! Insight extraction: one structured completion over the scraped posts,
//! formatted into the daily draft.

pub mod insights;
pub mod openai;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::analyze::insights::{
    date_label, format_draft, parse_insights, response_schema, Draft, Insight, SchemaVersion,
    SCHEMA_NAME,
};
use crate::analyze::openai::{CompletionClient, StructuredSchema};
use crate::error::ExtractionError;
use crate::ingest::types::Post;

/// Convenient alias used by callers.
pub type DynCompletionClient = Arc<dyn CompletionClient>;

const PROMPT_HEAD: &str = "You are given raw personal-finance posts collected from X/Twitter, Reddit and Instagram, one JSON object per line. \
We run a personal-finance education channel and want to turn these discussions into educational posts.

For every post worth covering, return its link as tweet_link and a 1-2 sentence analysis that covers:
1. the core financial insight or strategy discussed,
2. how it helps our audience,
3. content angles we could build from it.

Favour posts with data-backed advice, unusual takes on wealth building, market and investment trends, \
personal-finance tips for different life stages, risk management, tax optimisation, and passive income ideas.

List every post that qualifies and aim for at least 10. If fewer qualify, include only those that do. \
Only use links that appear in the posts below.

Posts:

";

/// Build the prompt: fixed instructions followed by one JSON line per post.
pub fn build_prompt(posts: &[Post]) -> String {
    let lines = posts
        .iter()
        .filter_map(|p| serde_json::to_string(p).ok())
        .collect::<Vec<_>>()
        .join("\n");
    format!("{PROMPT_HEAD}{lines}\n")
}

pub struct InsightExtractor {
    client: DynCompletionClient,
    schema: SchemaVersion,
    timezone: Tz,
}

impl InsightExtractor {
    pub fn new(client: DynCompletionClient, schema: SchemaVersion, timezone: Tz) -> Self {
        Self {
            client,
            schema,
            timezone,
        }
    }

    /// Produce today's draft, or `None` when there is nothing to send.
    ///
    /// Extraction failures are logged and swallowed; the caller skips
    /// delivery on `None`.
    pub async fn extract_draft(&self, posts: &[Post], now: DateTime<Utc>) -> Option<Draft> {
        if posts.is_empty() {
            tracing::warn!("no posts scraped; skipping insight extraction");
            return None;
        }

        tracing::info!(
            posts = posts.len(),
            provider = self.client.provider_name(),
            "generating draft"
        );
        let insights = match self.extract_insights(posts).await {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(error = %e, "insight extraction failed; skipping today's draft");
                return None;
            }
        };
        if insights.is_empty() {
            tracing::warn!("model returned no insights; skipping today's draft");
            return None;
        }

        let draft = format_draft(&insights, &date_label(now, self.timezone));
        tracing::info!(insights = insights.len(), "draft ready");
        tracing::debug!(draft = %draft, "draft text");
        Some(draft)
    }

    /// Ask the model for insights. At most one insight per supplied post is kept.
    pub async fn extract_insights(&self, posts: &[Post]) -> Result<Vec<Insight>, ExtractionError> {
        let schema = StructuredSchema {
            name: SCHEMA_NAME,
            schema: response_schema(self.schema),
        };
        let prompt = build_prompt(posts);
        let value = self.client.complete_structured(&prompt, &schema).await?;
        let mut insights = parse_insights(value)?;

        if insights.len() > posts.len() {
            tracing::warn!(
                insights = insights.len(),
                posts = posts.len(),
                "model returned more insights than posts; truncating"
            );
            insights.truncate(posts.len());
        }
        Ok(insights)
    }
}
