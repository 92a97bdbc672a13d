// src/config/pipeline.rs
use anyhow::Context;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf, time::Duration};

use crate::analyze::insights::SchemaVersion;
use crate::ingest::retry::RetryPolicy;
use crate::ingest::FetchPlan;

pub const ENV_PIPELINE_CONFIG_PATH: &str = "PIPELINE_CONFIG_PATH";
const DEFAULT_PATH: &str = "config/pipeline.json";
const DEFAULT_TIMEZONE: &str = "Europe/Rome";

fn default_batch_size() -> usize {
    3
}
fn default_max_attempts() -> u32 {
    3
}
fn default_retry_backoff_ms() -> u64 {
    2_000
}
fn default_batch_delay_ms() -> u64 {
    5_000
}
fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}
fn default_http_timeout_secs() -> u64 {
    60
}

/// Tunables for a run, loaded from `config/pipeline.json` when present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineSettings {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,
    /// IANA zone for the draft header date.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub schema: SchemaVersion,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            max_attempts: default_max_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            batch_delay_ms: default_batch_delay_ms(),
            timezone: default_timezone(),
            schema: SchemaVersion::default(),
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

impl PipelineSettings {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading pipeline settings from {}", path.display()))?;
        let cfg: PipelineSettings = serde_json::from_str(&data)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(cfg.sanitized())
    }

    /// $PIPELINE_CONFIG_PATH, then `config/pipeline.json`, then defaults.
    pub fn load_default() -> anyhow::Result<Self> {
        if let Ok(p) = std::env::var(ENV_PIPELINE_CONFIG_PATH) {
            return Self::load_from_file(PathBuf::from(p));
        }
        let p = PathBuf::from(DEFAULT_PATH);
        if p.exists() {
            return Self::load_from_file(p);
        }
        Ok(Self::default())
    }

    /// Replace out-of-range values with defaults.
    pub fn sanitized(mut self) -> Self {
        if self.batch_size == 0 {
            self.batch_size = default_batch_size();
        }
        if self.max_attempts == 0 {
            self.max_attempts = default_max_attempts();
        }
        if self.http_timeout_secs == 0 {
            self.http_timeout_secs = default_http_timeout_secs();
        }
        if self.timezone.parse::<Tz>().is_err() {
            tracing::warn!(timezone = %self.timezone, "unknown timezone; using {DEFAULT_TIMEZONE}");
            self.timezone = default_timezone();
        }
        self
    }

    pub fn tz(&self) -> Tz {
        self.timezone.parse().unwrap_or(chrono_tz::Europe::Rome)
    }

    pub fn fetch_plan(&self) -> FetchPlan {
        FetchPlan {
            batch_size: self.batch_size,
            batch_delay: Duration::from_millis(self.batch_delay_ms),
            retry: RetryPolicy {
                max_attempts: self.max_attempts,
                backoff: Duration::from_millis(self.retry_backoff_ms),
            },
        }
    }
}
