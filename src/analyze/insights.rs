// src/analyze/insights.rs
//! Insight shapes returned by the model and the draft text built from them.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ExtractionError;

/// Name of the structured-output schema (and of its top-level array).
pub const SCHEMA_NAME: &str = "trendingIdeas";

/// Which structured-output schema the model is asked to fill.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVersion {
    /// `{tweet_link, description}`
    #[default]
    Basic,
    /// `{tweet_link, core_insight, audience_benefit, content_opportunities}`
    Detailed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Insight {
    pub tweet_link: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawIdea {
    Detailed {
        tweet_link: String,
        core_insight: String,
        audience_benefit: String,
        content_opportunities: String,
    },
    Basic {
        tweet_link: String,
        description: String,
    },
}

impl From<RawIdea> for Insight {
    fn from(raw: RawIdea) -> Self {
        match raw {
            RawIdea::Basic {
                tweet_link,
                description,
            } => Insight {
                tweet_link,
                description: description.trim().to_string(),
            },
            RawIdea::Detailed {
                tweet_link,
                core_insight,
                audience_benefit,
                content_opportunities,
            } => {
                let description = [core_insight, audience_benefit, content_opportunities]
                    .iter()
                    .map(|s| s.trim().trim_end_matches('.'))
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join(". ");
                Insight {
                    tweet_link,
                    description: if description.is_empty() {
                        description
                    } else {
                        format!("{description}.")
                    },
                }
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct IdeasEnvelope {
    #[serde(rename = "trendingIdeas")]
    trending_ideas: Vec<RawIdea>,
}

/// Parse the model's structured output (`{"trendingIdeas": [...]}`).
pub fn parse_insights(value: Value) -> Result<Vec<Insight>, ExtractionError> {
    let env: IdeasEnvelope = serde_json::from_value(value)?;
    Ok(env.trending_ideas.into_iter().map(Insight::from).collect())
}

/// JSON schema for OpenAI `response_format.json_schema.schema` (strict mode).
pub fn response_schema(version: SchemaVersion) -> Value {
    let item = match version {
        SchemaVersion::Basic => json!({
            "type": "object",
            "properties": {
                "tweet_link": { "type": "string" },
                "description": { "type": "string" }
            },
            "required": ["tweet_link", "description"],
            "additionalProperties": false
        }),
        SchemaVersion::Detailed => json!({
            "type": "object",
            "properties": {
                "tweet_link": { "type": "string" },
                "core_insight": { "type": "string" },
                "audience_benefit": { "type": "string" },
                "content_opportunities": { "type": "string" }
            },
            "required": ["tweet_link", "core_insight", "audience_benefit", "content_opportunities"],
            "additionalProperties": false
        }),
    };
    json!({
        "type": "object",
        "properties": { SCHEMA_NAME: { "type": "array", "items": item } },
        "required": [SCHEMA_NAME],
        "additionalProperties": false
    })
}

/// Final message text, ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft(String);

impl Draft {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Draft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Numeric month/day (`3/7`) of `now` in `tz`.
pub fn date_label(now: DateTime<Utc>, tz: Tz) -> String {
    now.with_timezone(&tz).format("%-m/%-d").to_string()
}

/// Header line plus one bullet per insight. Pure in its inputs.
pub fn format_draft(insights: &[Insight], date_label: &str) -> Draft {
    let header = format!("🚀 Finance Trends on Social Media for {date_label}\n\n");
    let body = insights
        .iter()
        .map(|i| format!("• {} \n  {}", i.description, i.tweet_link))
        .collect::<Vec<_>>()
        .join("\n\n");
    Draft(header + &body)
}
