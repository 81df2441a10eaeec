use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

use crate::errors::{ServiceError, ServiceResult};
use crate::models::delivery_attempt_model::MessageDeliveryAttempt;
use crate::models::enums::ChannelType;
use crate::models::stats_model::{
    AttemptSummary, ChannelBreakdown, ChannelStats, OverallStats, StatsPeriod,
};
use crate::services::delivery_attempt_service::DeliveryAttemptService;

pub const DEFAULT_WINDOW_DAYS: i64 = 30;

impl AttemptSummary {
    pub fn from_attempts<'a, I>(attempts: I) -> Self
    where
        I: IntoIterator<Item = &'a MessageDeliveryAttempt>,
    {
        let mut summary = AttemptSummary::default();
        let mut response_time_total: i64 = 0;

        for attempt in attempts {
            summary.total_attempts += 1;
            if attempt.success {
                summary.successful_attempts += 1;
            }
            if let Some(cost) = attempt.cost_amount {
                summary.total_cost += cost;
            }
            if attempt.fallback_reason.is_some() {
                summary.fallback_count += 1;
            }
            response_time_total += i64::from(attempt.response_time_ms);
        }

        summary.failed_attempts = summary.total_attempts - summary.successful_attempts;
        if summary.total_attempts > 0 {
            let total = summary.total_attempts as f64;
            summary.success_rate = summary.successful_attempts as f64 / total * 100.0;
            summary.average_response_time_ms = response_time_total as f64 / total;
        }
        summary
    }
}

/// Ventana por defecto: los últimos 30 días hasta `end` (o hasta ahora).
pub fn resolve_period(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> ServiceResult<StatsPeriod> {
    let end_date = end.unwrap_or(now);
    let start_date = start.unwrap_or(end_date - Duration::days(DEFAULT_WINDOW_DAYS));

    if start_date > end_date {
        return Err(ServiceError::InvalidInput(
            "startDate must not be after endDate".to_string(),
        ));
    }

    Ok(StatsPeriod {
        start_date,
        end_date,
    })
}

pub fn compute_channel_stats(
    channel: ChannelType,
    attempts: &[MessageDeliveryAttempt],
    period: StatsPeriod,
) -> ChannelStats {
    let summary = AttemptSummary::from_attempts(attempts.iter().filter(|a| a.channel == channel));

    ChannelStats {
        channel,
        summary,
        period,
    }
}

pub fn compute_overall_stats(
    attempts: &[MessageDeliveryAttempt],
    period: StatsPeriod,
) -> OverallStats {
    let mut grouped: BTreeMap<ChannelType, Vec<&MessageDeliveryAttempt>> = BTreeMap::new();
    for attempt in attempts {
        grouped.entry(attempt.channel).or_default().push(attempt);
    }

    let by_channel = grouped
        .into_iter()
        .map(|(channel, group)| ChannelBreakdown {
            channel,
            summary: AttemptSummary::from_attempts(group),
        })
        .collect();

    OverallStats {
        summary: AttemptSummary::from_attempts(attempts),
        by_channel,
        period,
    }
}

#[derive(Clone, Debug)]
pub struct StatsService {
    attempt_service: DeliveryAttemptService,
}

impl StatsService {
    pub fn new(attempt_service: DeliveryAttemptService) -> Self {
        StatsService { attempt_service }
    }

    pub async fn channel_stats(
        &self,
        channel: ChannelType,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> ServiceResult<ChannelStats> {
        let period = resolve_period(start, end, Utc::now())?;
        let attempts = self
            .attempt_service
            .attempts_in_range(Some(channel), period.start_date, period.end_date)
            .await?;

        Ok(compute_channel_stats(channel, &attempts, period))
    }

    pub async fn overall_stats(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> ServiceResult<OverallStats> {
        let period = resolve_period(start, end, Utc::now())?;
        let attempts = self
            .attempt_service
            .attempts_in_range(None, period.start_date, period.end_date)
            .await?;

        Ok(compute_overall_stats(&attempts, period))
    }
}
