pub mod telegram;

use chrono::{DateTime, Utc};

use crate::error::DeliveryError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub channel: &'static str,
    pub delivered_at: DateTime<Utc>,
}

/// Outbound channel for the finished draft. Single attempt, no retry.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, draft: &str) -> Result<DeliveryReceipt, DeliveryError>;
    fn channel(&self) -> &'static str;
}
