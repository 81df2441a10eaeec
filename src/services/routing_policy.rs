//! services/routing_policy.rs
//! Reglas puras de ruteo: elección de proveedor, backoff y clasificación de fallos.

use crate::models::delivery_model::RetryDecision;
use crate::models::enums::{ChannelType, FallbackReason, RetryStrategy, RoutingStrategy};
use crate::models::routing_model::ChannelRoutingConfig;

pub const DEFAULT_RETRY_STRATEGY: RetryStrategy = RetryStrategy::Exponential;
pub const DEFAULT_INITIAL_DELAY_SECONDS: i64 = 60;
pub const DEFAULT_MAX_DELAY_SECONDS: i64 = 3600;

/// Proveedor usado cuando el canal no tiene config activa.
pub fn default_provider_name(channel: ChannelType) -> &'static str {
    match channel {
        ChannelType::Sms => "MockSMSProvider",
        ChannelType::Mms => "MockMMSProvider",
        ChannelType::Email => "MockEmailProvider",
    }
}

/// Segundos de espera antes del intento `attempt_number` (1-based), con tope en `max_delay`.
pub fn calculate_retry_delay(
    strategy: RetryStrategy,
    attempt_number: i32,
    initial_delay: i64,
    max_delay: i64,
) -> i64 {
    let attempt = i64::from(attempt_number.max(1));
    let initial = initial_delay.max(0);

    let delay = match strategy {
        RetryStrategy::None => 0,
        RetryStrategy::Linear | RetryStrategy::Custom => initial.saturating_mul(attempt),
        RetryStrategy::Exponential => {
            let exponent = u32::try_from(attempt - 1).unwrap_or(u32::MAX);
            let factor = 2i64.checked_pow(exponent).unwrap_or(i64::MAX);
            initial.saturating_mul(factor)
        }
    };

    delay.min(max_delay.max(0))
}

pub fn retry_delay_for(config: Option<&ChannelRoutingConfig>, attempt_number: i32) -> i64 {
    match config {
        Some(c) => calculate_retry_delay(
            c.retry_strategy,
            attempt_number,
            i64::from(c.initial_retry_delay_seconds),
            i64::from(c.max_retry_delay_seconds),
        ),
        None => calculate_retry_delay(
            DEFAULT_RETRY_STRATEGY,
            attempt_number,
            DEFAULT_INITIAL_DELAY_SECONDS,
            DEFAULT_MAX_DELAY_SECONDS,
        ),
    }
}

/// `retry_count` son los reintentos ya hechos; la config manda sobre `default_max_retries`.
pub fn should_retry(
    config: Option<&ChannelRoutingConfig>,
    retry_count: i32,
    default_max_retries: i32,
) -> RetryDecision {
    let max_retries = config.map(|c| c.max_retries).unwrap_or(default_max_retries);

    if retry_count >= max_retries {
        return RetryDecision::no_retry();
    }

    RetryDecision {
        should_retry: true,
        delay_seconds: retry_delay_for(config, retry_count.saturating_add(1)),
    }
}

pub fn classify_fallback_reason(error: &str) -> FallbackReason {
    let lower = error.to_lowercase();

    if lower.contains("rate limit") || lower.contains("throttle") {
        FallbackReason::RateLimitExceeded
    } else if lower.contains("unavailable") || lower.contains("timeout") {
        FallbackReason::ProviderUnavailable
    } else if lower.contains("cost") || lower.contains("quota") {
        FallbackReason::CostThreshold
    } else {
        FallbackReason::PrimaryFailed
    }
}

fn fallback_of(config: &ChannelRoutingConfig) -> Option<&str> {
    config
        .fallback_provider
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
}

/// Proveedor para este intento según la estrategia de la config.
///
/// `estimate` devuelve el costo estimado por mensaje de un proveedor,
/// o `None` si no se conoce.
pub fn select_provider<F>(config: &ChannelRoutingConfig, attempt_number: i32, estimate: F) -> String
where
    F: Fn(&str) -> Option<f64>,
{
    let primary = config.primary_provider.as_str();
    let fallback = fallback_of(config);

    let chosen = match config.routing_strategy {
        RoutingStrategy::Primary => primary,
        RoutingStrategy::RoundRobin => match fallback {
            Some(fb) if attempt_number % 2 == 0 => fb,
            _ => primary,
        },
        RoutingStrategy::CostBased => {
            let within_threshold = |cost: f64| config.cost_threshold.map_or(true, |max| cost <= max);

            std::iter::once(primary)
                .chain(fallback)
                .filter_map(|name| estimate(name).map(|cost| (name, cost)))
                .filter(|(_, cost)| within_threshold(*cost))
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(name, _)| name)
                .unwrap_or(primary)
        }
    };

    chosen.to_string()
}

/// El "otro" proveedor para el fallback: el configurado, o el primario si ya se usó el fallback.
pub fn alternate_provider<'a>(config: &'a ChannelRoutingConfig, used: &str) -> Option<&'a str> {
    let fallback = fallback_of(config)?;

    if fallback == used {
        let primary = config.primary_provider.as_str();
        (primary != used).then_some(primary)
    } else {
        Some(fallback)
    }
}
