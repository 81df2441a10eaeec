//! config/mod.rs
//! Configuración de la aplicación (variables de entorno / .env).

pub mod app_config;
