// src/config/app.rs
use std::env;

use crate::error::ConfigError;
use crate::notify::telegram::TelegramConfig;

/// Secrets and endpoints, read once from the environment at startup and
/// passed down explicitly. Empty values count as unset.
#[derive(Clone, Default)]
pub struct AppConfig {
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub firecrawl_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    /// Overrides the default completion model.
    pub openai_model: Option<String>,
    pub firecrawl_base_url: Option<String>,
    pub openai_base_url: Option<String>,
    pub telegram_api_base: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // secrets: presence only
        f.debug_struct("AppConfig")
            .field("telegram_bot_token", &self.telegram_bot_token.is_some())
            .field("telegram_chat_id", &self.telegram_chat_id.is_some())
            .field("firecrawl_api_key", &self.firecrawl_api_key.is_some())
            .field("openai_api_key", &self.openai_api_key.is_some())
            .field("openai_model", &self.openai_model)
            .field("firecrawl_base_url", &self.firecrawl_base_url)
            .field("openai_base_url", &self.openai_base_url)
            .field("telegram_api_base", &self.telegram_api_base)
            .finish()
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            telegram_bot_token: var("TELEGRAM_BOT_TOKEN"),
            telegram_chat_id: var("TELEGRAM_CHAT_ID"),
            firecrawl_api_key: var("FIRECRAWL_API_KEY"),
            openai_api_key: var("OPENAI_API_KEY"),
            openai_model: var("OPENAI_MODEL"),
            firecrawl_base_url: var("FIRECRAWL_BASE_URL"),
            openai_base_url: var("OPENAI_BASE_URL"),
            telegram_api_base: var("TELEGRAM_API_BASE"),
        }
    }

    pub fn require_firecrawl(&self) -> Result<&str, ConfigError> {
        self.firecrawl_api_key
            .as_deref()
            .ok_or(ConfigError::Missing("FIRECRAWL_API_KEY"))
    }

    pub fn require_openai(&self) -> Result<&str, ConfigError> {
        self.openai_api_key
            .as_deref()
            .ok_or(ConfigError::Missing("OPENAI_API_KEY"))
    }

    /// Telegram settings; missing credentials surface when a draft is sent.
    pub fn telegram(&self) -> TelegramConfig {
        TelegramConfig {
            bot_token: self.telegram_bot_token.clone(),
            chat_id: self.telegram_chat_id.clone(),
            api_base: self.telegram_api_base.clone(),
        }
    }
}
