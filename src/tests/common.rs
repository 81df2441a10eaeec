//! tests/common.rs
//! Helpers compartidos por los tests.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};

use crate::db;
use crate::logger::init_test_logger;
use crate::models::delivery_attempt_model::NewDeliveryAttempt;
use crate::models::enums::{ChannelType, FallbackReason};
use crate::models::routing_model::ChannelRoutingConfigRequest;
use crate::services::delivery_attempt_service::DeliveryAttemptService;
use crate::services::delivery_service::DeliveryService;
use crate::services::provider_service::ProviderRegistry;
use crate::services::routing_config_service::RoutingConfigService;
use crate::services::stats_service::StatsService;

pub const ADMIN_TOKEN: &str = "admin-test-token";
pub const USER_TOKEN: &str = "user-test-token";

/// Una sola conexión: cada conexión a :memory: es una base distinta.
pub async fn memory_pool() -> Pool<Sqlite> {
    init_test_logger();

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite");

    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

#[derive(Clone)]
pub struct TestServices {
    pub config: RoutingConfigService,
    pub attempts: DeliveryAttemptService,
    pub stats: StatsService,
    pub delivery: DeliveryService,
}

pub async fn services_with(registry: ProviderRegistry) -> TestServices {
    let pool = memory_pool().await;
    let config = RoutingConfigService::new(pool.clone());
    let attempts = DeliveryAttemptService::new(pool);
    let stats = StatsService::new(attempts.clone());
    let delivery = DeliveryService::new(config.clone(), attempts.clone(), Arc::new(registry));

    TestServices {
        config,
        attempts,
        stats,
        delivery,
    }
}

pub async fn services() -> TestServices {
    services_with(ProviderRegistry::with_mock_defaults()).await
}

pub fn config_request(
    channel: ChannelType,
    primary: &str,
    priority: i32,
    is_active: bool,
) -> ChannelRoutingConfigRequest {
    let mut req = ChannelRoutingConfigRequest::new(channel, primary);
    req.priority = priority;
    req.is_active = is_active;
    req
}

pub fn attempt_at(
    message_id: i64,
    channel: ChannelType,
    success: bool,
    at: DateTime<Utc>,
) -> NewDeliveryAttempt {
    let mut attempt = NewDeliveryAttempt::new(message_id, 1, channel, success);
    attempt.attempted_at = Some(at);
    attempt.provider_name = Some("MockSMSProvider".to_string());
    attempt
}

pub fn with_cost(mut attempt: NewDeliveryAttempt, cost: f64) -> NewDeliveryAttempt {
    attempt.cost_amount = Some(cost);
    attempt
}

pub fn with_fallback(mut attempt: NewDeliveryAttempt, reason: FallbackReason) -> NewDeliveryAttempt {
    attempt.fallback_reason = Some(reason);
    attempt
}

/// Levanta la app completa con `init_service` sobre los servicios dados.
macro_rules! test_app {
    ($services:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new(crate::auth::AuthTokens::new(
                    Some(crate::tests::common::ADMIN_TOKEN.to_string()),
                    Some(crate::tests::common::USER_TOKEN.to_string()),
                )))
                .app_data(actix_web::web::Data::new($services.config.clone()))
                .app_data(actix_web::web::Data::new($services.attempts.clone()))
                .app_data(actix_web::web::Data::new($services.stats.clone()))
                .app_data(actix_web::web::Data::new($services.delivery.clone()))
                .configure(crate::app::init_app),
        )
        .await
    };
}
