// src/ingest/normalize.rs
//! Maps scraping-service extraction payloads onto canonical [`Post`] records.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::ingest::types::{Platform, Post};

/// Normalize an extraction payload of the shape `{"posts": [...]}`.
///
/// A missing or malformed payload yields an empty list and non-object items
/// are skipped. Fields with an unexpected JSON type fall back to their
/// defaults instead of dropping the post.
pub fn normalize_posts(platform: Platform, extraction: Option<&Value>, now: DateTime<Utc>) -> Vec<Post> {
    let Some(items) = extraction
        .and_then(|v| v.get("posts"))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    let now_iso = now.to_rfc3339_opts(SecondsFormat::Millis, true);
    items
        .iter()
        .filter_map(|v| match v.as_object() {
            Some(obj) => Some(obj),
            None => {
                tracing::debug!(platform = platform.as_str(), "skipping non-object post");
                None
            }
        })
        .map(|obj| map_post(platform, obj, &now_iso))
        .collect()
}

fn map_post(platform: Platform, raw: &Map<String, Value>, now_iso: &str) -> Post {
    let field = |key: &str| text(raw.get(key)).unwrap_or_default();
    let or_now = |key: &str| text(raw.get(key)).unwrap_or_else(|| now_iso.to_string());
    match platform {
        Platform::Reddit => Post {
            headline: field("title"),
            link: field("url"),
            date_posted: or_now("date_posted"),
            content: Some(field("content")),
            score: Some(number(raw.get("score")).unwrap_or(0.0)),
            media_url: None,
            media_type: None,
        },
        Platform::Instagram => Post {
            headline: field("caption"),
            link: field("link"),
            date_posted: or_now("timestamp"),
            content: None,
            score: None,
            media_url: Some(field("imageUrl")),
            media_type: Some("image".to_string()),
        },
        Platform::Twitter => Post {
            headline: field("text"),
            link: field("url"),
            date_posted: or_now("created_at"),
            content: None,
            score: None,
            media_url: Some(field("media_url")),
            media_type: Some("image".to_string()),
        },
    }
}

/// Strings and numbers as text; anything else, or a blank string, is absent.
fn text(v: Option<&Value>) -> Option<String> {
    match v? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Numbers, or strings that parse as one.
fn number(v: Option<&Value>) -> Option<f64> {
    match v? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
