//! services/provider_service.rs
//! Proveedores de envío (mock y HTTP) y su registro por nombre.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::config::app_config::HttpProviderEntry;
use crate::models::delivery_model::{OutboundMessage, ProviderReceipt};
use crate::models::enums::ChannelType;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    /// El proveedor respondió pero rechazó el mensaje.
    #[error("{message}")]
    Rejected {
        code: Option<String>,
        message: String,
    },
    #[error("provider unavailable: {0}")]
    Unavailable(String),
    #[error("provider timeout: {0}")]
    Timeout(String),
}

impl ProviderError {
    pub fn code(&self) -> Option<&str> {
        match self {
            ProviderError::Rejected { code, .. } => code.as_deref(),
            ProviderError::Unavailable(_) => Some("ProviderUnavailable"),
            ProviderError::Timeout(_) => Some("Timeout"),
        }
    }
}

#[async_trait]
pub trait MessageProvider: Send + Sync {
    fn name(&self) -> &str;

    fn channel(&self) -> ChannelType;

    /// Costo estimado por mensaje, si se conoce. Lo usa la estrategia CostBased.
    fn estimated_cost(&self) -> Option<f64>;

    async fn send(&self, message: &OutboundMessage) -> Result<ProviderReceipt, ProviderError>;
}

/// Proveedor en memoria: acepta todo, o falla siempre con el error configurado.
#[derive(Debug, Clone)]
pub struct MockProvider {
    name: String,
    channel: ChannelType,
    cost: f64,
    failure: Option<ProviderError>,
}

impl MockProvider {
    pub fn new(name: impl Into<String>, channel: ChannelType, cost: f64) -> Self {
        Self {
            name: name.into(),
            channel,
            cost,
            failure: None,
        }
    }

    pub fn failing(name: impl Into<String>, channel: ChannelType, error: ProviderError) -> Self {
        Self {
            name: name.into(),
            channel,
            cost: 0.0,
            failure: Some(error),
        }
    }
}

#[async_trait]
impl MessageProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn channel(&self) -> ChannelType {
        self.channel
    }

    fn estimated_cost(&self) -> Option<f64> {
        Some(self.cost)
    }

    async fn send(&self, message: &OutboundMessage) -> Result<ProviderReceipt, ProviderError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }

        log::debug!(
            "({}) mock send a {} por {}",
            self.name,
            message.recipient,
            message.channel
        );
        Ok(ProviderReceipt {
            external_id: Some(format!("mock-{}", Uuid::new_v4())),
            cost: Some(self.cost),
        })
    }
}

/// Proveedor que hace POST del mensaje en JSON a una URL.
#[derive(Debug, Clone)]
pub struct HttpProvider {
    name: String,
    channel: ChannelType,
    url: String,
    http_client: Client,
}

impl HttpProvider {
    pub fn new(entry: &HttpProviderEntry, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .context("No se pudo construir el cliente HTTP")?;

        Ok(Self {
            name: entry.name.clone(),
            channel: entry.channel,
            url: entry.url.clone(),
            http_client,
        })
    }
}

fn receipt_from_body(body: &Value) -> ProviderReceipt {
    let external_id = ["externalId", "external_id", "messageId", "id"]
        .iter()
        .find_map(|key| match body.get(*key) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        });

    ProviderReceipt {
        external_id,
        cost: body.get("cost").and_then(Value::as_f64),
    }
}

#[async_trait]
impl MessageProvider for HttpProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn channel(&self) -> ChannelType {
        self.channel
    }

    fn estimated_cost(&self) -> Option<f64> {
        None
    }

    async fn send(&self, message: &OutboundMessage) -> Result<ProviderReceipt, ProviderError> {
        let payload = json!({
            "channel": message.channel,
            "recipient": message.recipient,
            "subject": message.subject,
            "body": message.body,
            "htmlContent": message.html_content,
            "mediaUrls": message.media_urls,
            "reference": message.campaign_message_id,
        });

        let resp = self
            .http_client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(e.to_string())
                } else {
                    ProviderError::Unavailable(e.to_string())
                }
            })?;

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();

        if status.is_success() {
            let body: Value = serde_json::from_str(&text).unwrap_or(Value::Null);
            return Ok(receipt_from_body(&body));
        }

        log::warn!(
            "({}) proveedor respondió {}: {}",
            self.name,
            status,
            text
        );

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::Rejected {
                code: Some(status.as_u16().to_string()),
                message: format!("rate limit exceeded ({}): {}", status, text),
            });
        }
        if status == reqwest::StatusCode::SERVICE_UNAVAILABLE {
            return Err(ProviderError::Unavailable(format!("{}: {}", status, text)));
        }

        Err(ProviderError::Rejected {
            code: Some(status.as_u16().to_string()),
            message: format!("provider returned {}: {}", status, text),
        })
    }
}

/// Proveedores disponibles, por nombre.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn MessageProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Los seis mock que usan las configs sembradas.
    pub fn with_mock_defaults() -> Self {
        let mut registry = Self::new();
        let defaults = [
            ("MockSMSProvider", ChannelType::Sms, 0.0075),
            ("BackupSMSProvider", ChannelType::Sms, 0.0090),
            ("MockMMSProvider", ChannelType::Mms, 0.0200),
            ("BackupMMSProvider", ChannelType::Mms, 0.0250),
            ("MockEmailProvider", ChannelType::Email, 0.0001),
            ("BackupEmailProvider", ChannelType::Email, 0.0002),
        ];
        for (name, channel, cost) in defaults {
            registry.register(Arc::new(MockProvider::new(name, channel, cost)));
        }
        registry
    }

    pub fn from_config(entries: &[HttpProviderEntry], timeout: Duration) -> Result<Self> {
        let mut registry = Self::with_mock_defaults();
        for entry in entries {
            let provider = HttpProvider::new(entry, timeout)?;
            log::info!(
                "Proveedor HTTP '{}' ({}) -> {}",
                entry.name,
                entry.channel,
                entry.url
            );
            registry.register(Arc::new(provider));
        }
        Ok(registry)
    }

    /// Reemplaza cualquier proveedor previo con el mismo nombre.
    pub fn register(&mut self, provider: Arc<dyn MessageProvider>) {
        self.providers.insert(provider.name().to_string(), provider);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn MessageProvider>> {
        self.providers.get(name).cloned()
    }

    pub fn estimated_cost(&self, name: &str) -> Option<f64> {
        self.providers.get(name).and_then(|p| p.estimated_cost())
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.keys().cloned().collect();
        names.sort();
        names
    }
}
