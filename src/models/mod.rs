//! models/mod.rs
//! Módulo raíz para modelos/estructuras compartidas.

pub mod api_response;
pub mod delivery_attempt_model;
pub mod delivery_model;
pub mod enums;
pub mod routing_model;
pub mod stats_model;
