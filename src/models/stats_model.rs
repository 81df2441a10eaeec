//! models/stats_model.rs
//! Agregados sobre intentos de entrega.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::enums::ChannelType;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsPeriod {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptSummary {
    pub total_attempts: usize,
    pub successful_attempts: usize,
    pub failed_attempts: usize,
    /// Porcentaje 0..=100; 0 si no hay intentos.
    pub success_rate: f64,
    pub average_response_time_ms: f64,
    pub total_cost: f64,
    pub fallback_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStats {
    pub channel: ChannelType,
    #[serde(flatten)]
    pub summary: AttemptSummary,
    pub period: StatsPeriod,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelBreakdown {
    pub channel: ChannelType,
    #[serde(flatten)]
    pub summary: AttemptSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallStats {
    #[serde(flatten)]
    pub summary: AttemptSummary,
    pub by_channel: Vec<ChannelBreakdown>,
    pub period: StatsPeriod,
}
