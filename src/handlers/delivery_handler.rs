//! handlers/delivery_handler.rs
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::auth::AdminUser;
use crate::handlers::{bad_request, service_error_response};
use crate::models::api_response::ApiResponse;
use crate::models::delivery_model::OutboundMessage;
use crate::models::enums::ChannelType;
use crate::services::delivery_service::DeliveryService;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryDelayQuery {
    channel: String,
    attempt_number: Option<i32>,
}

/// POST /api/delivery/send
pub async fn send_message_endpoint(
    _admin: AdminUser,
    delivery_service: web::Data<DeliveryService>,
    body: web::Json<OutboundMessage>,
) -> HttpResponse {
    let message = body.into_inner();

    if message.recipient.trim().is_empty() {
        return bad_request(vec!["recipient is required".to_string()]);
    }

    match delivery_service.route_message(message).await {
        Ok(outcome) => {
            let text = if outcome.success {
                "Message delivered successfully"
            } else {
                "Message delivery failed"
            };
            HttpResponse::Ok().json(ApiResponse::success(outcome, text))
        }
        Err(e) => service_error_response(&e, "An error occurred while routing the message"),
    }
}

/// GET /api/delivery/retry-delay?channel=SMS&attemptNumber=2
pub async fn retry_delay_endpoint(
    _admin: AdminUser,
    delivery_service: web::Data<DeliveryService>,
    query: web::Query<RetryDelayQuery>,
) -> HttpResponse {
    let channel = match query.channel.parse::<ChannelType>() {
        Ok(c) => c,
        Err(e) => return bad_request(vec![e.to_string()]),
    };
    let attempt_number = query.attempt_number.unwrap_or(1);
    if attempt_number < 1 {
        return bad_request(vec!["attemptNumber must be 1 or greater".to_string()]);
    }

    match delivery_service
        .retry_delay_preview(channel, attempt_number)
        .await
    {
        Ok(preview) => HttpResponse::Ok().json(ApiResponse::success(
            preview,
            "Retry delay calculated successfully",
        )),
        Err(e) => service_error_response(&e, "An error occurred while calculating retry delay"),
    }
}

/// GET /health
pub async fn health_endpoint() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}
