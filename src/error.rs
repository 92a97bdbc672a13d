// src/error.rs
use thiserror::Error;

/// Per-source fetch failure. Only transient variants are retried.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("unrecognized source: {0}")]
    UnrecognizedSource(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("scraping API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

impl FetchError {
    pub fn is_transient(&self) -> bool {
        !matches!(self, FetchError::UnrecognizedSource(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Network(err.to_string())
    }
}

/// Anything that stops the insight step from producing a draft.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("completion request failed: {0}")]
    Request(String),

    #[error("completion API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("model refused: {0}")]
    Refusal(String),

    #[error("could not parse structured output: {0}")]
    Parse(String),

    #[error("completion returned no choices")]
    Empty,
}

impl From<reqwest::Error> for ExtractionError {
    fn from(err: reqwest::Error) -> Self {
        ExtractionError::Request(err.to_string())
    }
}

impl From<serde_json::Error> for ExtractionError {
    fn from(err: serde_json::Error) -> Self {
        ExtractionError::Parse(err.to_string())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} not set. Add it to .env.local or the environment")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("draft is empty")]
    EmptyDraft,

    #[error("missing configuration: {0}")]
    MissingConfig(#[from] ConfigError),

    #[error("telegram request failed: {0}")]
    Network(String),

    #[error("telegram API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

impl From<reqwest::Error> for DeliveryError {
    fn from(err: reqwest::Error) -> Self {
        DeliveryError::Network(err.to_string())
    }
}

/// Errors that reach the caller of a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_unrecognized_is_permanent() {
        assert!(!FetchError::UnrecognizedSource("x".into()).is_transient());
        assert!(FetchError::Network("reset".into()).is_transient());
        assert!(FetchError::Api {
            status: 500,
            message: "boom".into()
        }
        .is_transient());
    }

    #[test]
    fn missing_config_message_names_variable() {
        let e = DeliveryError::from(ConfigError::Missing("TELEGRAM_BOT_TOKEN"));
        assert!(e.to_string().contains("TELEGRAM_BOT_TOKEN"));
    }
}
