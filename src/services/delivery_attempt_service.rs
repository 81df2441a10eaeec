use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite};

use crate::db::{format_timestamp, parse_timestamp};
use crate::errors::{ServiceError, ServiceResult};
use crate::models::delivery_attempt_model::{
    MessageDeliveryAttempt, NewDeliveryAttempt, ERROR_MESSAGE_MAX_LEN,
};
use crate::models::enums::{ChannelType, FallbackReason};
use crate::services::routing_config_service::narrow;

const SELECT_COLUMNS: &str = r#"
    id, campaign_message_id, attempt_number, channel, provider_name, attempted_at,
    success, external_message_id, error_message, error_code, cost_amount,
    response_time_ms, fallback_reason, additional_metadata, created_at
"#;

#[derive(sqlx::FromRow)]
struct AttemptRow {
    id: i64,
    campaign_message_id: i64,
    attempt_number: i64,
    channel: i64,
    provider_name: Option<String>,
    attempted_at: String,
    success: bool,
    external_message_id: Option<String>,
    error_message: Option<String>,
    error_code: Option<String>,
    cost_amount: Option<f64>,
    response_time_ms: i64,
    fallback_reason: Option<i64>,
    additional_metadata: Option<String>,
    created_at: String,
}

impl TryFrom<AttemptRow> for MessageDeliveryAttempt {
    type Error = ServiceError;

    fn try_from(r: AttemptRow) -> Result<Self, Self::Error> {
        let fallback_reason = match r.fallback_reason {
            Some(raw) => Some(
                FallbackReason::from_i64(raw)
                    .ok_or_else(|| ServiceError::CorruptRow(format!("fallback_reason={}", raw)))?,
            ),
            None => None,
        };

        Ok(MessageDeliveryAttempt {
            id: r.id,
            campaign_message_id: r.campaign_message_id,
            attempt_number: narrow(r.attempt_number, "attempt_number")?,
            channel: ChannelType::from_i64(r.channel)
                .ok_or_else(|| ServiceError::CorruptRow(format!("channel={}", r.channel)))?,
            provider_name: r.provider_name,
            attempted_at: parse_timestamp(&r.attempted_at)?,
            success: r.success,
            external_message_id: r.external_message_id,
            error_message: r.error_message,
            error_code: r.error_code,
            cost_amount: r.cost_amount,
            response_time_ms: narrow(r.response_time_ms, "response_time_ms")?,
            fallback_reason,
            additional_metadata: r.additional_metadata,
            created_at: parse_timestamp(&r.created_at)?,
        })
    }
}

fn truncate_chars(text: String, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text,
    }
}

/// Log append-only de intentos de entrega.
#[derive(Clone, Debug)]
pub struct DeliveryAttemptService {
    db_pool: Pool<Sqlite>,
}

impl DeliveryAttemptService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        DeliveryAttemptService { db_pool }
    }

    pub async fn record_attempt(
        &self,
        attempt: NewDeliveryAttempt,
    ) -> ServiceResult<MessageDeliveryAttempt> {
        let errors = attempt.validate();
        if !errors.is_empty() {
            return Err(ServiceError::InvalidInput(errors.join("; ")));
        }

        let now = Utc::now();
        let attempted_at = format_timestamp(&attempt.attempted_at.unwrap_or(now));
        let created_at = format_timestamp(&now);
        let error_message = attempt
            .error_message
            .map(|m| truncate_chars(m, ERROR_MESSAGE_MAX_LEN));

        let sql = format!(
            r#"
            INSERT INTO message_delivery_attempts (
                campaign_message_id, attempt_number, channel, provider_name, attempted_at,
                success, external_message_id, error_message, error_code, cost_amount,
                response_time_ms, fallback_reason, additional_metadata, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            RETURNING {SELECT_COLUMNS}
            "#
        );

        let row: AttemptRow = sqlx::query_as(&sql)
            .bind(attempt.campaign_message_id)
            .bind(attempt.attempt_number)
            .bind(attempt.channel.as_i64())
            .bind(&attempt.provider_name)
            .bind(&attempted_at)
            .bind(attempt.success)
            .bind(&attempt.external_message_id)
            .bind(&error_message)
            .bind(&attempt.error_code)
            .bind(attempt.cost_amount)
            .bind(attempt.response_time_ms)
            .bind(attempt.fallback_reason.map(|r| r.as_i64()))
            .bind(&attempt.additional_metadata)
            .bind(&created_at)
            .fetch_one(&self.db_pool)
            .await?;

        let recorded = MessageDeliveryAttempt::try_from(row)?;
        log::debug!(
            "Intento registrado: message={} attempt={} success={} time={}ms",
            recorded.campaign_message_id,
            recorded.attempt_number,
            recorded.success,
            recorded.response_time_ms
        );
        Ok(recorded)
    }

    pub async fn list_attempts_for_message(
        &self,
        campaign_message_id: i64,
    ) -> ServiceResult<Vec<MessageDeliveryAttempt>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM message_delivery_attempts
             WHERE campaign_message_id = ?1
             ORDER BY attempt_number ASC, id ASC"
        );
        let rows: Vec<AttemptRow> = sqlx::query_as(&sql)
            .bind(campaign_message_id)
            .fetch_all(&self.db_pool)
            .await?;

        rows.into_iter().map(MessageDeliveryAttempt::try_from).collect()
    }

    /// Rango inclusivo sobre `attempted_at`; `channel = None` trae todos los canales.
    pub async fn attempts_in_range(
        &self,
        channel: Option<ChannelType>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ServiceResult<Vec<MessageDeliveryAttempt>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM message_delivery_attempts
             WHERE attempted_at >= ?1 AND attempted_at <= ?2
               AND (?3 IS NULL OR channel = ?3)
             ORDER BY attempted_at ASC, id ASC"
        );
        let rows: Vec<AttemptRow> = sqlx::query_as(&sql)
            .bind(format_timestamp(&start))
            .bind(format_timestamp(&end))
            .bind(channel.map(|c| c.as_i64()))
            .fetch_all(&self.db_pool)
            .await?;

        rows.into_iter().map(MessageDeliveryAttempt::try_from).collect()
    }
}
