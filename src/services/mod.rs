//! services/mod.rs
//! Módulo que agrupa distintos "servicios" o "capas de negocio" de la app.

pub mod delivery_attempt_service;
pub mod delivery_service;
pub mod provider_service;
pub mod routing_config_service;
pub mod routing_policy;
pub mod stats_service;
