//! handlers/routing_config_handler.rs
//! Endpoints bajo /api/routingconfig.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::auth::{AdminUser, AuthenticatedUser};
use crate::db::parse_query_date;
use crate::handlers::{bad_request, service_error_response};
use crate::models::api_response::ApiResponse;
use crate::models::delivery_attempt_model::NewDeliveryAttempt;
use crate::models::enums::ChannelType;
use crate::models::routing_model::ChannelRoutingConfigRequest;
use crate::services::delivery_attempt_service::DeliveryAttemptService;
use crate::services::routing_config_service::RoutingConfigService;
use crate::services::stats_service::StatsService;

const CONFIG_NOT_FOUND: &str = "Routing configuration not found";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsQuery {
    start_date: Option<String>,
    end_date: Option<String>,
}

type DateRange = (
    Option<chrono::DateTime<chrono::Utc>>,
    Option<chrono::DateTime<chrono::Utc>>,
);

fn parse_range(query: &StatsQuery) -> Result<DateRange, Vec<String>> {
    let mut errors = Vec::new();
    let mut parse = |raw: &Option<String>, field: &str| match raw.as_deref() {
        None => None,
        Some(s) if s.trim().is_empty() => None,
        Some(s) => {
            let parsed = parse_query_date(s);
            if parsed.is_none() {
                errors.push(format!("{} is not a valid date: '{}'", field, s));
            }
            parsed
        }
    };

    let start = parse(&query.start_date, "startDate");
    let end = parse(&query.end_date, "endDate");

    if errors.is_empty() {
        Ok((start, end))
    } else {
        Err(errors)
    }
}

fn parse_channel(raw: &str) -> Result<ChannelType, HttpResponse> {
    raw.parse::<ChannelType>()
        .map_err(|e| bad_request(vec![e.to_string()]))
}

/// GET /api/routingconfig
pub async fn list_configs_endpoint(
    _admin: AdminUser,
    config_service: web::Data<RoutingConfigService>,
) -> HttpResponse {
    match config_service.list_configs().await {
        Ok(configs) => HttpResponse::Ok().json(ApiResponse::success(
            configs,
            "Routing configurations retrieved successfully",
        )),
        Err(e) => service_error_response(
            &e,
            "An error occurred while retrieving routing configurations",
        ),
    }
}

/// GET /api/routingconfig/{id}
pub async fn get_config_endpoint(
    _admin: AdminUser,
    config_service: web::Data<RoutingConfigService>,
    path: web::Path<i64>,
) -> HttpResponse {
    let id = path.into_inner();

    match config_service.get_config(id).await {
        Ok(Some(config)) => HttpResponse::Ok().json(ApiResponse::success(
            config,
            "Routing configuration retrieved successfully",
        )),
        Ok(None) => HttpResponse::NotFound().json(ApiResponse::<()>::error(CONFIG_NOT_FOUND)),
        Err(e) => service_error_response(
            &e,
            "An error occurred while retrieving the routing configuration",
        ),
    }
}

/// GET /api/routingconfig/channel/{channel}
pub async fn get_config_by_channel_endpoint(
    _admin: AdminUser,
    config_service: web::Data<RoutingConfigService>,
    path: web::Path<String>,
) -> HttpResponse {
    let channel = match parse_channel(&path.into_inner()) {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    match config_service.get_active_config_for_channel(channel).await {
        Ok(Some(config)) => HttpResponse::Ok().json(ApiResponse::success(
            config,
            "Routing configuration retrieved successfully",
        )),
        Ok(None) => HttpResponse::NotFound().json(ApiResponse::<()>::error(format!(
            "No active routing configuration found for channel: {}",
            channel
        ))),
        Err(e) => service_error_response(
            &e,
            "An error occurred while retrieving the routing configuration",
        ),
    }
}

/// POST /api/routingconfig
pub async fn create_config_endpoint(
    _admin: AdminUser,
    config_service: web::Data<RoutingConfigService>,
    body: web::Json<ChannelRoutingConfigRequest>,
) -> HttpResponse {
    match config_service.create_config(body.into_inner()).await {
        Ok(config) => HttpResponse::Ok().json(ApiResponse::success(
            config,
            "Routing configuration created successfully",
        )),
        Err(e) => service_error_response(
            &e,
            "An error occurred while creating the routing configuration",
        ),
    }
}

/// PUT /api/routingconfig/{id}
pub async fn update_config_endpoint(
    _admin: AdminUser,
    config_service: web::Data<RoutingConfigService>,
    path: web::Path<i64>,
    body: web::Json<ChannelRoutingConfigRequest>,
) -> HttpResponse {
    let id = path.into_inner();

    match config_service.update_config(id, body.into_inner()).await {
        Ok(Some(config)) => HttpResponse::Ok().json(ApiResponse::success(
            config,
            "Routing configuration updated successfully",
        )),
        Ok(None) => HttpResponse::NotFound().json(ApiResponse::<()>::error(CONFIG_NOT_FOUND)),
        Err(e) => service_error_response(
            &e,
            &format!(
                "An error occurred while updating the routing configuration {}",
                id
            ),
        ),
    }
}

/// DELETE /api/routingconfig/{id}
pub async fn delete_config_endpoint(
    _admin: AdminUser,
    config_service: web::Data<RoutingConfigService>,
    path: web::Path<i64>,
) -> HttpResponse {
    let id = path.into_inner();

    match config_service.delete_config(id).await {
        Ok(true) => HttpResponse::Ok().json(ApiResponse::success(
            true,
            "Routing configuration deleted successfully",
        )),
        Ok(false) => HttpResponse::NotFound().json(ApiResponse::<()>::error(CONFIG_NOT_FOUND)),
        Err(e) => service_error_response(
            &e,
            &format!(
                "An error occurred while deleting the routing configuration {}",
                id
            ),
        ),
    }
}

/// GET /api/routingconfig/delivery-attempts/{messageId}
/// Cualquier usuario autenticado, no solo Admin.
pub async fn list_delivery_attempts_endpoint(
    _user: AuthenticatedUser,
    attempt_service: web::Data<DeliveryAttemptService>,
    path: web::Path<i64>,
) -> HttpResponse {
    let message_id = path.into_inner();

    match attempt_service.list_attempts_for_message(message_id).await {
        Ok(attempts) => HttpResponse::Ok().json(ApiResponse::success(
            attempts,
            "Delivery attempts retrieved successfully",
        )),
        Err(e) => service_error_response(
            &e,
            "An error occurred while retrieving delivery attempts",
        ),
    }
}

/// POST /api/routingconfig/delivery-attempts
pub async fn record_delivery_attempt_endpoint(
    _admin: AdminUser,
    attempt_service: web::Data<DeliveryAttemptService>,
    body: web::Json<NewDeliveryAttempt>,
) -> HttpResponse {
    match attempt_service.record_attempt(body.into_inner()).await {
        Ok(attempt) => HttpResponse::Ok().json(ApiResponse::success(
            attempt,
            "Delivery attempt recorded successfully",
        )),
        Err(e) => service_error_response(
            &e,
            "An error occurred while recording the delivery attempt",
        ),
    }
}

/// GET /api/routingconfig/stats/channel/{channel}?startDate&endDate
pub async fn channel_stats_endpoint(
    _admin: AdminUser,
    stats_service: web::Data<StatsService>,
    path: web::Path<String>,
    query: web::Query<StatsQuery>,
) -> HttpResponse {
    let channel = match parse_channel(&path.into_inner()) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let (start, end) = match parse_range(&query) {
        Ok(range) => range,
        Err(errors) => return bad_request(errors),
    };

    match stats_service.channel_stats(channel, start, end).await {
        Ok(stats) => HttpResponse::Ok().json(ApiResponse::success(
            stats,
            "Channel statistics retrieved successfully",
        )),
        Err(e) => service_error_response(
            &e,
            "An error occurred while computing channel statistics",
        ),
    }
}

/// GET /api/routingconfig/stats/overall?startDate&endDate
pub async fn overall_stats_endpoint(
    _admin: AdminUser,
    stats_service: web::Data<StatsService>,
    query: web::Query<StatsQuery>,
) -> HttpResponse {
    let (start, end) = match parse_range(&query) {
        Ok(range) => range,
        Err(errors) => return bad_request(errors),
    };

    match stats_service.overall_stats(start, end).await {
        Ok(stats) => HttpResponse::Ok().json(ApiResponse::success(
            stats,
            "Overall statistics retrieved successfully",
        )),
        Err(e) => service_error_response(
            &e,
            "An error occurred while computing overall statistics",
        ),
    }
}
