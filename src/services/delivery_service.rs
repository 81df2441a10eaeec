use std::sync::Arc;
use std::time::Instant;

use crate::errors::ServiceResult;
use crate::models::delivery_attempt_model::NewDeliveryAttempt;
use crate::models::delivery_model::{
    DeliveryOutcome, OutboundMessage, RetryDecision, RetryDelayPreview,
};
use crate::models::enums::{ChannelType, FallbackReason};
use crate::services::delivery_attempt_service::DeliveryAttemptService;
use crate::services::provider_service::ProviderRegistry;
use crate::services::routing_config_service::RoutingConfigService;
use crate::services::routing_policy::{
    alternate_provider, classify_fallback_reason, default_provider_name, retry_delay_for,
    select_provider, should_retry,
};

/// Resultado de una sola llamada a un proveedor.
#[derive(Debug, Clone)]
struct AttemptResult {
    provider_name: String,
    success: bool,
    external_id: Option<String>,
    error: Option<String>,
    cost: Option<f64>,
}

#[derive(Clone)]
pub struct DeliveryService {
    config_service: RoutingConfigService,
    attempt_service: DeliveryAttemptService,
    registry: Arc<ProviderRegistry>,
}

impl DeliveryService {
    pub fn new(
        config_service: RoutingConfigService,
        attempt_service: DeliveryAttemptService,
        registry: Arc<ProviderRegistry>,
    ) -> Self {
        Self {
            config_service,
            attempt_service,
            registry,
        }
    }

    /// Envía por el proveedor que toque y, si falla y hay fallback, lo reintenta
    /// una vez por el alternativo. Cada llamada queda registrada como intento.
    pub async fn route_message(&self, message: OutboundMessage) -> ServiceResult<DeliveryOutcome> {
        let attempt_number = message.retry_count.saturating_add(1);
        log::info!(
            "(route_message) message={} attempt={} via {}",
            message.campaign_message_id,
            attempt_number,
            message.channel
        );

        let config = self
            .config_service
            .get_active_config_for_channel(message.channel)
            .await?;

        let provider_name = match &config {
            Some(c) => select_provider(c, attempt_number, |name| {
                self.registry.estimated_cost(name)
            }),
            None => {
                log::warn!(
                    "(route_message) Sin config activa para {}, usando {}",
                    message.channel,
                    default_provider_name(message.channel)
                );
                default_provider_name(message.channel).to_string()
            }
        };

        let primary = self
            .attempt(&message, attempt_number, &provider_name, None)
            .await;
        if primary.success {
            return Ok(self.outcome(primary, attempt_number, None, RetryDecision::no_retry()));
        }

        let mut last = primary;
        let mut fallback_reason = None;

        if let Some(c) = config.as_ref().filter(|c| c.enable_fallback) {
            if let Some(alternate) = alternate_provider(c, &last.provider_name) {
                let reason = classify_fallback_reason(last.error.as_deref().unwrap_or_default());
                log::info!(
                    "(route_message) Fallback de {} a {} (motivo={})",
                    last.provider_name,
                    alternate,
                    reason
                );

                let alternate = alternate.to_string();
                let fallback = self
                    .attempt(&message, attempt_number, &alternate, Some(reason))
                    .await;
                fallback_reason = Some(reason);

                if fallback.success {
                    return Ok(self.outcome(
                        fallback,
                        attempt_number,
                        fallback_reason,
                        RetryDecision::no_retry(),
                    ));
                }
                last = fallback;
            }
        }

        let retry = should_retry(config.as_ref(), message.retry_count, message.max_retries);
        log::warn!(
            "(route_message) message={} falló en intento {}: {:?} (retry={}, delay={}s)",
            message.campaign_message_id,
            attempt_number,
            last.error,
            retry.should_retry,
            retry.delay_seconds
        );

        Ok(self.outcome(last, attempt_number, fallback_reason, retry))
    }

    pub async fn retry_delay_preview(
        &self,
        channel: ChannelType,
        attempt_number: i32,
    ) -> ServiceResult<RetryDelayPreview> {
        let config = self
            .config_service
            .get_active_config_for_channel(channel)
            .await?;

        Ok(RetryDelayPreview {
            channel,
            attempt_number,
            delay_seconds: retry_delay_for(config.as_ref(), attempt_number),
        })
    }

    async fn attempt(
        &self,
        message: &OutboundMessage,
        attempt_number: i32,
        provider_name: &str,
        fallback_reason: Option<FallbackReason>,
    ) -> AttemptResult {
        let started = Instant::now();

        let (result, error_code) = match self.registry.get(provider_name) {
            None => (
                Err(format!("provider '{}' is not registered", provider_name)),
                Some("ProviderNotFound".to_string()),
            ),
            Some(provider) if provider.channel() != message.channel => (
                Err(format!(
                    "provider '{}' serves {} not {}",
                    provider_name,
                    provider.channel(),
                    message.channel
                )),
                Some("ChannelMismatch".to_string()),
            ),
            Some(provider) => match provider.send(message).await {
                Ok(receipt) => (Ok(receipt), None),
                Err(e) => (Err(e.to_string()), e.code().map(str::to_string)),
            },
        };

        let elapsed_ms = i32::try_from(started.elapsed().as_millis()).unwrap_or(i32::MAX);

        let attempt_result = match result {
            Ok(receipt) => AttemptResult {
                provider_name: provider_name.to_string(),
                success: true,
                external_id: receipt.external_id,
                error: None,
                cost: receipt.cost,
            },
            Err(error) => AttemptResult {
                provider_name: provider_name.to_string(),
                success: false,
                external_id: None,
                error: Some(error),
                cost: None,
            },
        };

        let mut record = NewDeliveryAttempt::new(
            message.campaign_message_id,
            attempt_number,
            message.channel,
            attempt_result.success,
        );
        record.provider_name = Some(attempt_result.provider_name.clone());
        record.external_message_id = attempt_result.external_id.clone();
        record.error_message = attempt_result.error.clone();
        record.error_code = error_code;
        record.cost_amount = attempt_result.cost;
        record.response_time_ms = elapsed_ms;
        record.fallback_reason = fallback_reason;

        // Un fallo al registrar no debe cortar la entrega.
        if let Err(e) = self.attempt_service.record_attempt(record).await {
            log::error!(
                "No se pudo registrar el intento de message={}: {}",
                message.campaign_message_id,
                e
            );
        }

        attempt_result
    }

    fn outcome(
        &self,
        attempt: AttemptResult,
        attempt_number: i32,
        fallback_reason: Option<FallbackReason>,
        retry: RetryDecision,
    ) -> DeliveryOutcome {
        DeliveryOutcome {
            success: attempt.success,
            external_id: attempt.external_id,
            error: attempt.error,
            cost: attempt.cost,
            attempt_number,
            provider_name: attempt.provider_name,
            fallback_reason,
            retry,
        }
    }
}
