use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use dotenv::dotenv;

use crate::auth::AuthTokens;
use crate::config::app_config::AppConfig;
use crate::logger::init_logger;
use crate::services::delivery_attempt_service::DeliveryAttemptService;
use crate::services::delivery_service::DeliveryService;
use crate::services::provider_service::ProviderRegistry;
use crate::services::routing_config_service::RoutingConfigService;
use crate::services::stats_service::StatsService;

mod app;
mod auth;
mod config;
mod db;
mod errors;
mod handlers;
mod logger;
mod models;
mod services;

#[cfg(test)]
mod tests;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok(); // Cargar .env al inicio
    init_logger();

    let app_config = AppConfig::from_env().context("Configuración inválida")?;

    // Conectarnos a la DB y migrar
    let db_pool = db::connect(&app_config.database_url).await?;
    db::run_migrations(&db_pool).await?;

    let config_service = RoutingConfigService::new(db_pool.clone());
    if app_config.seed_default_routing {
        config_service
            .seed_defaults()
            .await
            .context("Fallo sembrando routing configs")?;
    }

    let attempt_service = DeliveryAttemptService::new(db_pool.clone());
    let stats_service = StatsService::new(attempt_service.clone());

    let registry = ProviderRegistry::from_config(
        &app_config.http_providers,
        app_config.http_provider_timeout,
    )?;
    log::info!("Proveedores registrados: {:?}", registry.names());

    let delivery_service = DeliveryService::new(
        config_service.clone(),
        attempt_service.clone(),
        Arc::new(registry),
    );

    if app_config.admin_api_token.is_none() {
        log::warn!("ADMIN_API_TOKEN no definido: las rutas de Admin van a responder 401");
    }
    let auth_tokens = AuthTokens::new(
        app_config.admin_api_token.clone(),
        app_config.api_token.clone(),
    );

    // Levantar servidor
    log::info!(
        "Levantando servidor en {}:{}",
        app_config.host,
        app_config.port
    );
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(auth_tokens.clone()))
            .app_data(web::Data::new(config_service.clone()))
            .app_data(web::Data::new(attempt_service.clone()))
            .app_data(web::Data::new(stats_service.clone()))
            .app_data(web::Data::new(delivery_service.clone()))
            .configure(app::init_app)
    })
    .workers(app_config.workers.max(1))
    .bind((app_config.host.as_str(), app_config.port))?
    .run()
    .await?;

    Ok(())
}
