//! config/app_config.rs
//! Configuración global leída de variables de entorno (cargadas con dotenv).

use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::models::enums::ChannelType;

/// Proveedor HTTP declarado en `HTTP_PROVIDERS` como `nombre:canal=url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpProviderEntry {
    pub name: String,
    pub channel: ChannelType,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub admin_api_token: Option<String>,
    pub api_token: Option<String>,
    pub seed_default_routing: bool,
    pub http_providers: Vec<HttpProviderEntry>,
    pub http_provider_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("PORT inválido: {}", raw))?,
            None => 5022,
        };

        let workers = match get("WORKERS") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .with_context(|| format!("WORKERS inválido: {}", raw))?,
            None => 1,
        };

        let seed_default_routing = match get("SEED_DEFAULT_ROUTING") {
            Some(raw) => parse_bool(&raw)
                .ok_or_else(|| anyhow!("SEED_DEFAULT_ROUTING inválido: {}", raw))?,
            None => true,
        };

        let http_providers = match get("HTTP_PROVIDERS") {
            Some(raw) => parse_http_providers(&raw)?,
            None => Vec::new(),
        };

        let timeout_secs = match get("HTTP_PROVIDER_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("HTTP_PROVIDER_TIMEOUT_SECS inválido: {}", raw))?,
            None => 10,
        };

        Ok(AppConfig {
            database_url: get("DATABASE_URL")
                .unwrap_or_else(|| "sqlite:./data/routing.db".to_string()),
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            workers,
            admin_api_token: get("ADMIN_API_TOKEN"),
            api_token: get("API_TOKEN"),
            seed_default_routing,
            http_providers,
            http_provider_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_http_providers(raw: &str) -> Result<Vec<HttpProviderEntry>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (head, url) = entry
                .split_once('=')
                .ok_or_else(|| anyhow!("HTTP_PROVIDERS: falta '=' en '{}'", entry))?;
            let (name, channel) = head
                .split_once(':')
                .ok_or_else(|| anyhow!("HTTP_PROVIDERS: falta ':canal' en '{}'", entry))?;
            let channel = channel
                .parse::<ChannelType>()
                .with_context(|| format!("HTTP_PROVIDERS: canal inválido en '{}'", entry))?;

            if name.trim().is_empty() || url.trim().is_empty() {
                return Err(anyhow!("HTTP_PROVIDERS: entrada incompleta '{}'", entry));
            }

            Ok(HttpProviderEntry {
                name: name.trim().to_string(),
                channel,
                url: url.trim().to_string(),
            })
        })
        .collect()
}
