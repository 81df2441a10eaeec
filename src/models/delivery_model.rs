use serde::{Deserialize, Serialize};

use crate::models::enums::{ChannelType, FallbackReason};

/// Mensaje saliente que se quiere entregar por un canal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMessage {
    pub campaign_message_id: i64,
    pub channel: ChannelType,
    pub recipient: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub html_content: Option<String>,
    #[serde(default)]
    pub media_urls: Vec<String>,
    /// Reintentos ya consumidos; el intento actual es `retry_count + 1`.
    #[serde(default)]
    pub retry_count: i32,
    #[serde(default = "default_max_retries")]
    pub max_retries: i32,
}

fn default_max_retries() -> i32 {
    3
}

impl OutboundMessage {
    pub fn new(campaign_message_id: i64, channel: ChannelType, recipient: impl Into<String>) -> Self {
        Self {
            campaign_message_id,
            channel,
            recipient: recipient.into(),
            subject: None,
            body: None,
            html_content: None,
            media_urls: Vec::new(),
            retry_count: 0,
            max_retries: default_max_retries(),
        }
    }
}

/// Lo que devuelve un proveedor cuando acepta el mensaje.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderReceipt {
    pub external_id: Option<String>,
    pub cost: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryDecision {
    pub should_retry: bool,
    pub delay_seconds: i64,
}

impl RetryDecision {
    pub fn no_retry() -> Self {
        Self {
            should_retry: false,
            delay_seconds: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryOutcome {
    pub success: bool,
    pub external_id: Option<String>,
    pub error: Option<String>,
    pub cost: Option<f64>,
    pub attempt_number: i32,
    pub provider_name: String,
    pub fallback_reason: Option<FallbackReason>,
    pub retry: RetryDecision,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryDelayPreview {
    pub channel: ChannelType,
    pub attempt_number: i32,
    pub delay_seconds: i64,
}
