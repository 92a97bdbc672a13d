// src/ingest/providers/firecrawl.rs
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::FetchError;
use crate::ingest::normalize::normalize_posts;
use crate::ingest::types::{Platform, Post, Source, SourceFetcher};

pub const DEFAULT_BASE_URL: &str = "https://api.firecrawl.dev";

#[derive(Serialize)]
struct ScrapeRequest<'a> {
    url: &'a str,
    formats: &'a [&'a str],
    extract: ExtractOptions,
}

#[derive(Serialize)]
struct ExtractOptions {
    schema: Value,
}

#[derive(Debug, Deserialize)]
struct ScrapeResponse {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    data: Option<ScrapeData>,
}

#[derive(Debug, Deserialize)]
struct ScrapeData {
    #[serde(default, alias = "llm_extraction")]
    extract: Option<Value>,
}

/// Extraction schema sent with each scrape, one per platform.
pub fn extraction_schema(platform: Platform) -> Value {
    let (props, required): (Value, Vec<&str>) = match platform {
        Platform::Reddit => (
            json!({
                "title": { "type": "string" },
                "content": { "type": "string" },
                "score": { "type": "number" },
                "url": { "type": "string" },
                "date_posted": { "type": "string" }
            }),
            vec!["title", "content", "score", "url", "date_posted"],
        ),
        Platform::Instagram => (
            json!({
                "caption": { "type": "string" },
                "imageUrl": { "type": "string" },
                "timestamp": { "type": "string" },
                "link": { "type": "string" }
            }),
            vec!["caption", "imageUrl", "timestamp", "link"],
        ),
        Platform::Twitter => (
            json!({
                "text": { "type": "string" },
                "media_url": { "type": "string" },
                "created_at": { "type": "string" },
                "url": { "type": "string" }
            }),
            vec!["text", "media_url", "created_at", "url"],
        ),
    };
    json!({
        "type": "object",
        "properties": {
            "posts": {
                "type": "array",
                "items": { "type": "object", "properties": props, "required": required }
            }
        },
        "required": ["posts"]
    })
}

fn formats_for(platform: Platform) -> &'static [&'static str] {
    match platform {
        Platform::Instagram => &["extract", "screenshot"],
        Platform::Twitter | Platform::Reddit => &["extract"],
    }
}

/// Scrapes a source page through Firecrawl's LLM extraction and normalizes it.
#[derive(Clone)]
pub struct FirecrawlFetcher {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl FirecrawlFetcher {
    pub fn new(api_key: String, base_url: Option<&str>, timeout_secs: u64) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("finance-trends-drafter/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .build()?;
        let base_url = base_url
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string();
        Ok(Self {
            http,
            api_key,
            base_url,
        })
    }
}

#[async_trait]
impl SourceFetcher for FirecrawlFetcher {
    async fn fetch_posts(&self, source: &Source) -> Result<Vec<Post>, FetchError> {
        let target = source.target_url();
        let req = ScrapeRequest {
            url: &target,
            formats: formats_for(source.platform),
            extract: ExtractOptions {
                schema: extraction_schema(source.platform),
            },
        };

        tracing::debug!(source = %source.identifier, url = %target, "firecrawl scrape");
        let resp = self
            .http
            .post(format!("{}/v1/scrape", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.text().await?;
        let extract = match serde_json::from_str::<ScrapeResponse>(&body) {
            Ok(ScrapeResponse {
                success: Some(false),
                error,
                ..
            }) => {
                return Err(FetchError::Api {
                    status: status.as_u16(),
                    message: error.unwrap_or_else(|| "scrape reported success=false".to_string()),
                });
            }
            Ok(parsed) => parsed.data.and_then(|d| d.extract),
            Err(e) => {
                tracing::warn!(source = %source.identifier, error = %e, "unparseable scrape response");
                None
            }
        };

        Ok(normalize_posts(source.platform, extract.as_ref(), Utc::now()))
    }

    fn name(&self) -> &'static str {
        "firecrawl"
    }
}
