use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use serde::Serialize;

use super::{DeliveryReceipt, Notifier};
use crate::error::{ConfigError, DeliveryError};

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Bot credentials. Either may be absent; that is reported at send time.
#[derive(Debug, Clone, Default)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    pub api_base: Option<String>,
}

#[derive(Clone)]
pub struct TelegramNotifier {
    cfg: TelegramConfig,
    client: Client,
    timeout: Duration,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

impl TelegramNotifier {
    pub fn new(cfg: TelegramConfig) -> Self {
        Self {
            cfg,
            client: Client::new(),
            timeout: Duration::from_secs(15),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    fn credentials(&self) -> Result<(&str, &str), ConfigError> {
        let token = self
            .cfg
            .bot_token
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("TELEGRAM_BOT_TOKEN"))?;
        let chat = self
            .cfg
            .chat_id
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("TELEGRAM_CHAT_ID"))?;
        Ok((token, chat))
    }
}

#[async_trait::async_trait]
impl Notifier for TelegramNotifier {
    async fn deliver(&self, draft: &str) -> Result<DeliveryReceipt, DeliveryError> {
        if draft.trim().is_empty() {
            return Err(DeliveryError::EmptyDraft);
        }
        let (token, chat_id) = self.credentials()?;

        // parse_mode=HTML rejects stray `<` and `&`.
        let text = html_escape::encode_text(draft);
        let body = SendMessage {
            chat_id,
            text: &text,
            parse_mode: "HTML",
        };
        let base = self
            .cfg
            .api_base
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE)
            .trim_end_matches('/');

        let rsp = self
            .client
            .post(format!("{base}/bot{token}/sendMessage"))
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| DeliveryError::Network(e.without_url().to_string()))?;

        let status = rsp.status();
        if !status.is_success() {
            let message = rsp.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), "error sending draft to Telegram");
            return Err(DeliveryError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let delivered_at = Utc::now();
        tracing::info!(at = %delivered_at.to_rfc3339(), "draft sent to Telegram");
        Ok(DeliveryReceipt {
            channel: self.channel(),
            delivered_at,
        })
    }

    fn channel(&self) -> &'static str {
        "telegram"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn blank_draft_is_rejected_before_config_check() {
        let n = TelegramNotifier::new(TelegramConfig::default());
        let err = n.deliver("  \n\t ").await.unwrap_err();
        assert!(matches!(err, DeliveryError::EmptyDraft));
    }

    #[tokio::test]
    async fn missing_credentials_are_reported() {
        let n = TelegramNotifier::new(TelegramConfig {
            bot_token: Some("123:abc".into()),
            chat_id: Some("   ".into()),
            api_base: None,
        });
        let err = n.deliver("hello").await.unwrap_err();
        assert!(matches!(
            err,
            DeliveryError::MissingConfig(ConfigError::Missing("TELEGRAM_CHAT_ID"))
        ));
    }
}
