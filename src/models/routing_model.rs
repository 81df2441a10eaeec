use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::enums::{ChannelType, RetryStrategy, RoutingStrategy};

pub const PROVIDER_NAME_MAX_LEN: usize = 100;
pub const ADDITIONAL_SETTINGS_MAX_LEN: usize = 4000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelRoutingConfig {
    pub id: i64,
    pub channel: ChannelType,
    pub primary_provider: String,
    pub fallback_provider: Option<String>,
    pub routing_strategy: RoutingStrategy,
    pub enable_fallback: bool,
    pub max_retries: i32,
    pub retry_strategy: RetryStrategy,
    pub initial_retry_delay_seconds: i32,
    pub max_retry_delay_seconds: i32,
    pub cost_threshold: Option<f64>,
    pub is_active: bool,
    pub priority: i32,
    pub additional_settings: Option<String>, // JSON libre
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body de POST y PUT. `channel` es obligatorio al crear; en PUT se ignora.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelRoutingConfigRequest {
    #[serde(default)]
    pub channel: Option<ChannelType>,
    pub primary_provider: String,
    #[serde(default)]
    pub fallback_provider: Option<String>,
    #[serde(default)]
    pub routing_strategy: RoutingStrategy,
    #[serde(default = "default_true")]
    pub enable_fallback: bool,
    #[serde(default = "default_max_retries")]
    pub max_retries: i32,
    #[serde(default)]
    pub retry_strategy: RetryStrategy,
    #[serde(default = "default_initial_delay")]
    pub initial_retry_delay_seconds: i32,
    #[serde(default = "default_max_delay")]
    pub max_retry_delay_seconds: i32,
    #[serde(default)]
    pub cost_threshold: Option<f64>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default)]
    pub additional_settings: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_max_retries() -> i32 {
    3
}

fn default_initial_delay() -> i32 {
    60
}

fn default_max_delay() -> i32 {
    3600
}

fn default_priority() -> i32 {
    1
}

impl ChannelRoutingConfigRequest {
    /// Config con los mismos valores por defecto que el body JSON.
    pub fn new(channel: ChannelType, primary_provider: impl Into<String>) -> Self {
        Self {
            channel: Some(channel),
            primary_provider: primary_provider.into(),
            fallback_provider: None,
            routing_strategy: RoutingStrategy::default(),
            enable_fallback: default_true(),
            max_retries: default_max_retries(),
            retry_strategy: RetryStrategy::default(),
            initial_retry_delay_seconds: default_initial_delay(),
            max_retry_delay_seconds: default_max_delay(),
            cost_threshold: None,
            is_active: default_true(),
            priority: default_priority(),
            additional_settings: None,
        }
    }

    /// Solo límites de columna; la coherencia entre campos es cosa del cliente.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.primary_provider.trim().is_empty() {
            errors.push("primaryProvider is required".to_string());
        }
        if self.primary_provider.chars().count() > PROVIDER_NAME_MAX_LEN {
            errors.push(format!(
                "primaryProvider must be at most {} characters",
                PROVIDER_NAME_MAX_LEN
            ));
        }
        if let Some(fallback) = &self.fallback_provider {
            if fallback.chars().count() > PROVIDER_NAME_MAX_LEN {
                errors.push(format!(
                    "fallbackProvider must be at most {} characters",
                    PROVIDER_NAME_MAX_LEN
                ));
            }
        }
        if let Some(settings) = &self.additional_settings {
            if settings.chars().count() > ADDITIONAL_SETTINGS_MAX_LEN {
                errors.push(format!(
                    "additionalSettings must be at most {} characters",
                    ADDITIONAL_SETTINGS_MAX_LEN
                ));
            }
        }

        errors
    }
}
