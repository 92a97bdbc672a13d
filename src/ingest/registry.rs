// src/ingest/registry.rs
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ingest::types::{Platform, Source, SourceEntry};

pub const ENV_SOURCES_PATH: &str = "SOURCES_PATH";

const TWITTER: &[&str] = &[
    "https://x.com/RiccardoTrezzi",
    "https://x.com/ramit",
    "https://x.com/GrahamStephan",
    "https://x.com/elerianm",
    "https://x.com/Nouriel",
    "https://x.com/TheStalwart",
    "https://x.com/lisaabramowicz1",
    "https://x.com/thefinanceninja",
    "https://x.com/dollarsanddata",
];

const REDDIT: &[&str] = &[
    "r/personalfinance",
    "r/ItaliaPersonalFinance",
    "r/FinancialIndependence",
    "r/investing",
    "r/Fire",
    "r/EuropeFIRE",
];

const INSTAGRAM: &[&str] = &[
    "@marcelloascani",
    "@giovannicuniberti",
    "@ilmercatodeipiccolispa",
    "@thefinancecoach",
    "@personalfinanceclub",
    "@moneywithkatie",
    "@yourrichbff",
    "@herfirst100k",
];

/// Built-in finance sources, all typed.
pub fn default_sources() -> Vec<Source> {
    let group = |ids: &'static [&'static str], platform: Platform| {
        ids.iter()
            .map(move |id| Source::new(id, platform, Some("finance")))
    };
    group(TWITTER, Platform::Twitter)
        .chain(group(REDDIT, Platform::Reddit))
        .chain(group(INSTAGRAM, Platform::Instagram))
        .collect()
}

/// Load source entries from an explicit path. Supports TOML or JSON formats.
///
/// TOML: `[[sources]]` tables with `identifier`, optional `type`, `category`.
/// JSON: an array of the same objects, or of bare identifier strings.
pub fn load_sources_from(path: &Path) -> Result<Vec<SourceEntry>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading sources from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_sources(&content, ext.as_str())
}

/// Resolve the source list:
/// 1) $SOURCES_PATH
/// 2) config/sources.toml
/// 3) config/sources.json
/// 4) built-in registry
pub fn load_sources_default() -> Result<Vec<SourceEntry>> {
    if let Ok(p) = std::env::var(ENV_SOURCES_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_sources_from(&pb);
        } else {
            return Err(anyhow!("{ENV_SOURCES_PATH} points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/sources.toml");
    if toml_p.exists() {
        return load_sources_from(&toml_p);
    }
    let json_p = PathBuf::from("config/sources.json");
    if json_p.exists() {
        return load_sources_from(&json_p);
    }
    Ok(default_sources().into_iter().map(SourceEntry::from).collect())
}

fn parse_sources(s: &str, hint_ext: &str) -> Result<Vec<SourceEntry>> {
    let try_toml = hint_ext == "toml" || s.contains("[[sources]]");
    if try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    if let Ok(v) = parse_json(s) {
        return Ok(v);
    }
    if !try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    Err(anyhow!("unsupported sources format"))
}

fn parse_toml(s: &str) -> Result<Vec<SourceEntry>> {
    #[derive(serde::Deserialize)]
    struct TomlSources {
        sources: Vec<SourceEntry>,
    }
    let v: TomlSources = toml::from_str(s)?;
    Ok(clean_list(v.sources))
}

fn parse_json(s: &str) -> Result<Vec<SourceEntry>> {
    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum JsonItem {
        Bare(String),
        Entry(SourceEntry),
    }
    let items: Vec<JsonItem> = serde_json::from_str(s)?;
    let entries = items
        .into_iter()
        .map(|it| match it {
            JsonItem::Bare(id) => SourceEntry::untyped(&id),
            JsonItem::Entry(e) => e,
        })
        .collect();
    Ok(clean_list(entries))
}

/// Trim identifiers, drop blanks and repeated identifiers, keep first-seen order.
fn clean_list(items: Vec<SourceEntry>) -> Vec<SourceEntry> {
    use std::collections::HashSet;
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(items.len());
    for mut it in items {
        it.identifier = it.identifier.trim().to_string();
        if it.identifier.is_empty() || !seen.insert(it.identifier.clone()) {
            continue;
        }
        out.push(it);
    }
    out
}
