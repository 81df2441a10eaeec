//! handlers/mod.rs
//! Módulo que agrupa los distintos handlers HTTP.

use actix_web::HttpResponse;

use crate::errors::ServiceError;
use crate::models::api_response::ApiResponse;

pub mod delivery_handler;
pub mod routing_config_handler;

/// Traduce un `ServiceError` al envelope. Los errores inesperados se loguean
/// y salen como 500 con `generic_message`.
pub fn service_error_response(err: &ServiceError, generic_message: &str) -> HttpResponse {
    match err {
        ServiceError::InvalidInput(msg) => HttpResponse::BadRequest().json(
            ApiResponse::<()>::error_with("Invalid request", vec![msg.clone()]),
        ),
        ServiceError::Database(_) | ServiceError::CorruptRow(_) => {
            log::error!("{}: {}", generic_message, err);
            HttpResponse::InternalServerError().json(ApiResponse::<()>::error(generic_message))
        }
    }
}

pub fn bad_request(errors: Vec<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::<()>::error_with("Invalid request", errors))
}
