use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::enums::{ChannelType, FallbackReason};
use crate::models::routing_model::PROVIDER_NAME_MAX_LEN;

/// `error_message` se trunca a este largo; el resto de los límites se valida.
pub const ERROR_MESSAGE_MAX_LEN: usize = 2000;
pub const ERROR_CODE_MAX_LEN: usize = 100;
pub const EXTERNAL_MESSAGE_ID_MAX_LEN: usize = 200;
pub const ADDITIONAL_METADATA_MAX_LEN: usize = 4000;

/// Registro inmutable de una llamada a un proveedor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDeliveryAttempt {
    pub id: i64,
    pub campaign_message_id: i64,
    pub attempt_number: i32,
    pub channel: ChannelType,
    pub provider_name: Option<String>,
    pub attempted_at: DateTime<Utc>,
    pub success: bool,
    pub external_message_id: Option<String>,
    pub error_message: Option<String>,
    pub error_code: Option<String>,
    pub cost_amount: Option<f64>,
    pub response_time_ms: i32,
    pub fallback_reason: Option<FallbackReason>,
    pub additional_metadata: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDeliveryAttempt {
    pub campaign_message_id: i64,
    pub attempt_number: i32,
    pub channel: ChannelType,
    #[serde(default)]
    pub provider_name: Option<String>,
    /// Si falta se usa la hora del insert.
    #[serde(default)]
    pub attempted_at: Option<DateTime<Utc>>,
    pub success: bool,
    #[serde(default)]
    pub external_message_id: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub cost_amount: Option<f64>,
    #[serde(default)]
    pub response_time_ms: i32,
    #[serde(default)]
    pub fallback_reason: Option<FallbackReason>,
    #[serde(default)]
    pub additional_metadata: Option<String>,
}

impl NewDeliveryAttempt {
    pub fn new(
        campaign_message_id: i64,
        attempt_number: i32,
        channel: ChannelType,
        success: bool,
    ) -> Self {
        Self {
            campaign_message_id,
            attempt_number,
            channel,
            provider_name: None,
            attempted_at: None,
            success,
            external_message_id: None,
            error_message: None,
            error_code: None,
            cost_amount: None,
            response_time_ms: 0,
            fallback_reason: None,
            additional_metadata: None,
        }
    }

    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.attempt_number < 1 {
            errors.push("attemptNumber must be 1 or greater".to_string());
        }
        if self.response_time_ms < 0 {
            errors.push("responseTimeMs must not be negative".to_string());
        }

        let limits = [
            ("providerName", self.provider_name.as_deref(), PROVIDER_NAME_MAX_LEN),
            (
                "externalMessageId",
                self.external_message_id.as_deref(),
                EXTERNAL_MESSAGE_ID_MAX_LEN,
            ),
            ("errorCode", self.error_code.as_deref(), ERROR_CODE_MAX_LEN),
            (
                "additionalMetadata",
                self.additional_metadata.as_deref(),
                ADDITIONAL_METADATA_MAX_LEN,
            ),
        ];
        for (field, value, max) in limits {
            if value.is_some_and(|v| v.chars().count() > max) {
                errors.push(format!("{} must be at most {} characters", field, max));
            }
        }

        errors
    }
}
