//! app.rs
use actix_web::{error, web, HttpRequest, HttpResponse};

use crate::handlers::{delivery_handler, routing_config_handler};
use crate::models::api_response::ApiResponse;

fn json_error_handler(err: error::JsonPayloadError, _req: &HttpRequest) -> error::Error {
    let detail = err.to_string();
    let resp = HttpResponse::BadRequest()
        .json(ApiResponse::<()>::error_with("Invalid request body", vec![detail]));
    error::InternalError::from_response(err, resp).into()
}

fn path_error_handler(err: error::PathError, _req: &HttpRequest) -> error::Error {
    let detail = err.to_string();
    let resp = HttpResponse::BadRequest()
        .json(ApiResponse::<()>::error_with("Invalid path parameter", vec![detail]));
    error::InternalError::from_response(err, resp).into()
}

fn query_error_handler(err: error::QueryPayloadError, _req: &HttpRequest) -> error::Error {
    let detail = err.to_string();
    let resp = HttpResponse::BadRequest()
        .json(ApiResponse::<()>::error_with("Invalid query string", vec![detail]));
    error::InternalError::from_response(err, resp).into()
}

pub fn init_app(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .route("/health", web::get().to(delivery_handler::health_endpoint))
        .service(
            web::scope("/api")
                .service(
                    // Rutas literales antes de "/{id}"
                    web::scope("/routingconfig")
                        .route(
                            "/stats/overall",
                            web::get().to(routing_config_handler::overall_stats_endpoint),
                        )
                        .route(
                            "/stats/channel/{channel}",
                            web::get().to(routing_config_handler::channel_stats_endpoint),
                        )
                        .route(
                            "/delivery-attempts",
                            web::post()
                                .to(routing_config_handler::record_delivery_attempt_endpoint),
                        )
                        .route(
                            "/delivery-attempts/{message_id}",
                            web::get()
                                .to(routing_config_handler::list_delivery_attempts_endpoint),
                        )
                        .route(
                            "/channel/{channel}",
                            web::get().to(routing_config_handler::get_config_by_channel_endpoint),
                        )
                        .route(
                            "",
                            web::get().to(routing_config_handler::list_configs_endpoint),
                        )
                        .route(
                            "",
                            web::post().to(routing_config_handler::create_config_endpoint),
                        )
                        .route(
                            "/",
                            web::get().to(routing_config_handler::list_configs_endpoint),
                        )
                        .route(
                            "/",
                            web::post().to(routing_config_handler::create_config_endpoint),
                        )
                        .route(
                            "/{id}",
                            web::get().to(routing_config_handler::get_config_endpoint),
                        )
                        .route(
                            "/{id}",
                            web::put().to(routing_config_handler::update_config_endpoint),
                        )
                        .route(
                            "/{id}",
                            web::delete().to(routing_config_handler::delete_config_endpoint),
                        ),
                )
                .service(
                    web::scope("/delivery")
                        .route(
                            "/send",
                            web::post().to(delivery_handler::send_message_endpoint),
                        )
                        .route(
                            "/retry-delay",
                            web::get().to(delivery_handler::retry_delay_endpoint),
                        ),
                ),
        );
}
