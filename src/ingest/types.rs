// src/ingest/types.rs
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Twitter,
    Reddit,
    Instagram,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Twitter => "twitter",
            Platform::Reddit => "reddit",
            Platform::Instagram => "instagram",
        }
    }
}

/// A typed source to poll. Built once at startup, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Source {
    pub identifier: String,
    pub platform: Platform,
    pub category: Option<String>,
}

impl Source {
    pub fn new(identifier: &str, platform: Platform, category: Option<&str>) -> Self {
        Self {
            identifier: identifier.to_string(),
            platform,
            category: category.map(str::to_string),
        }
    }

    /// URL handed to the scraping service.
    pub fn target_url(&self) -> String {
        match self.platform {
            Platform::Twitter => self.identifier.clone(),
            Platform::Reddit => {
                let name = self.identifier.trim_start_matches("r/").trim_end_matches('/');
                format!("https://reddit.com/r/{name}/hot")
            }
            Platform::Instagram => {
                let handle = self.identifier.trim_start_matches('@');
                format!("https://www.instagram.com/{handle}")
            }
        }
    }
}

/// Source as written by an operator. `type` may be omitted, in which case the
/// platform is taken from the identifier shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceEntry {
    pub identifier: String,
    #[serde(rename = "type", default)]
    pub platform: Option<Platform>,
    #[serde(default)]
    pub category: Option<String>,
}

impl SourceEntry {
    pub fn untyped(identifier: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            platform: None,
            category: None,
        }
    }

    pub fn resolve(&self) -> Result<Source, FetchError> {
        let platform = match self.platform {
            Some(p) => p,
            None => platform_from_shape(&self.identifier)
                .ok_or_else(|| FetchError::UnrecognizedSource(self.identifier.clone()))?,
        };
        Ok(Source {
            identifier: self.identifier.trim().to_string(),
            platform,
            category: self.category.clone(),
        })
    }
}

impl From<Source> for SourceEntry {
    fn from(s: Source) -> Self {
        Self {
            identifier: s.identifier,
            platform: Some(s.platform),
            category: s.category,
        }
    }
}

fn platform_from_shape(identifier: &str) -> Option<Platform> {
    static RE_TWITTER: OnceCell<Regex> = OnceCell::new();
    let re_twitter = RE_TWITTER.get_or_init(|| Regex::new(r"(?i)\b(x|twitter)\.com\b").unwrap());

    let id = identifier.trim();
    if re_twitter.is_match(id) {
        Some(Platform::Twitter)
    } else if id.len() > 2 && id.starts_with("r/") {
        Some(Platform::Reddit)
    } else if id.len() > 1 && id.starts_with('@') {
        Some(Platform::Instagram)
    } else {
        None
    }
}

/// Canonical post record. Optional fields are omitted from the prompt text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    pub headline: String,
    pub link: String,
    pub date_posted: String, // RFC 3339
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
}

/// Fetches and normalizes the posts of one source.
///
/// Empty or malformed payloads are `Ok(vec![])`; only real failures are `Err`.
#[async_trait::async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch_posts(&self, source: &Source) -> Result<Vec<Post>, FetchError>;
    fn name(&self) -> &'static str;
}
