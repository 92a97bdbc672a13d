// src/analyze/openai.rs
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ExtractionError;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-4o-2024-08-06";

/// A named JSON schema the model must answer with.
#[derive(Debug, Clone)]
pub struct StructuredSchema {
    pub name: &'static str,
    pub schema: Value,
}

/// One-shot structured completion. Implementations return the parsed JSON
/// object the model produced.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete_structured(
        &self,
        prompt: &str,
        schema: &StructuredSchema,
    ) -> Result<Value, ExtractionError>;

    /// Provider name for diagnostics.
    fn provider_name(&self) -> &'static str;
}

/// OpenAI Chat Completions with `response_format: json_schema`.
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(
        api_key: String,
        model: Option<&str>,
        base_url: Option<&str>,
        timeout_secs: u64,
    ) -> Result<Self, ExtractionError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("finance-trends-drafter/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .build()?;
        Ok(Self {
            http,
            api_key,
            model: model.unwrap_or(DEFAULT_MODEL).to_string(),
            base_url: base_url
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct JsonSchemaFormat<'a> {
    name: &'a str,
    strict: bool,
    schema: &'a Value,
}

#[derive(Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    json_schema: JsonSchemaFormat<'a>,
}

#[derive(Serialize)]
struct Req<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
    response_format: ResponseFormat<'a>,
}

#[derive(Deserialize)]
struct Resp {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMsg,
}

#[derive(Deserialize)]
struct ChoiceMsg {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete_structured(
        &self,
        prompt: &str,
        schema: &StructuredSchema,
    ) -> Result<Value, ExtractionError> {
        let req = Req {
            model: &self.model,
            messages: vec![Msg {
                role: "user",
                content: prompt,
            }],
            response_format: ResponseFormat {
                kind: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: schema.name,
                    strict: true,
                    schema: &schema.schema,
                },
            },
        };

        let resp = self
            .http
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ExtractionError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let text = resp.text().await?;
        let body: Resp = serde_json::from_str(&text)?;
        let msg = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or(ExtractionError::Empty)?;

        if let Some(refusal) = msg.refusal.filter(|r| !r.trim().is_empty()) {
            return Err(ExtractionError::Refusal(refusal));
        }
        let content = msg.content.unwrap_or_default();
        if content.trim().is_empty() {
            return Err(ExtractionError::Empty);
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}
