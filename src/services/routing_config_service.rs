use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::db::{format_timestamp, parse_timestamp};
use crate::errors::{ServiceError, ServiceResult};
use crate::models::enums::{ChannelType, RetryStrategy, RoutingStrategy};
use crate::models::routing_model::{ChannelRoutingConfig, ChannelRoutingConfigRequest};

const SELECT_COLUMNS: &str = r#"
    id, channel, primary_provider, fallback_provider, routing_strategy,
    enable_fallback, max_retries, retry_strategy, initial_retry_delay_seconds,
    max_retry_delay_seconds, cost_threshold, is_active, priority,
    additional_settings, created_at, updated_at
"#;

#[derive(sqlx::FromRow)]
struct ConfigRow {
    id: i64,
    channel: i64,
    primary_provider: String,
    fallback_provider: Option<String>,
    routing_strategy: i64,
    enable_fallback: bool,
    max_retries: i64,
    retry_strategy: i64,
    initial_retry_delay_seconds: i64,
    max_retry_delay_seconds: i64,
    cost_threshold: Option<f64>,
    is_active: bool,
    priority: i64,
    additional_settings: Option<String>,
    created_at: String,
    updated_at: Option<String>,
}

impl TryFrom<ConfigRow> for ChannelRoutingConfig {
    type Error = ServiceError;

    fn try_from(r: ConfigRow) -> Result<Self, Self::Error> {
        Ok(ChannelRoutingConfig {
            id: r.id,
            channel: ChannelType::from_i64(r.channel)
                .ok_or_else(|| ServiceError::CorruptRow(format!("channel={}", r.channel)))?,
            primary_provider: r.primary_provider,
            fallback_provider: r.fallback_provider,
            routing_strategy: RoutingStrategy::from_i64(r.routing_strategy).ok_or_else(|| {
                ServiceError::CorruptRow(format!("routing_strategy={}", r.routing_strategy))
            })?,
            enable_fallback: r.enable_fallback,
            max_retries: narrow(r.max_retries, "max_retries")?,
            retry_strategy: RetryStrategy::from_i64(r.retry_strategy).ok_or_else(|| {
                ServiceError::CorruptRow(format!("retry_strategy={}", r.retry_strategy))
            })?,
            initial_retry_delay_seconds: narrow(
                r.initial_retry_delay_seconds,
                "initial_retry_delay_seconds",
            )?,
            max_retry_delay_seconds: narrow(r.max_retry_delay_seconds, "max_retry_delay_seconds")?,
            cost_threshold: r.cost_threshold,
            is_active: r.is_active,
            priority: narrow(r.priority, "priority")?,
            additional_settings: r.additional_settings,
            created_at: parse_timestamp(&r.created_at)?,
            updated_at: r.updated_at.as_deref().map(parse_timestamp).transpose()?,
        })
    }
}

pub(crate) fn narrow(value: i64, column: &str) -> ServiceResult<i32> {
    i32::try_from(value).map_err(|_| ServiceError::CorruptRow(format!("{}={}", column, value)))
}

#[derive(Clone, Debug)]
pub struct RoutingConfigService {
    db_pool: Pool<Sqlite>,
}

impl RoutingConfigService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        RoutingConfigService { db_pool }
    }

    /// Ordenadas por canal y luego prioridad descendente.
    pub async fn list_configs(&self) -> ServiceResult<Vec<ChannelRoutingConfig>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM channel_routing_configs ORDER BY channel ASC, priority DESC, id ASC"
        );
        let rows: Vec<ConfigRow> = sqlx::query_as(&sql).fetch_all(&self.db_pool).await?;

        rows.into_iter().map(ChannelRoutingConfig::try_from).collect()
    }

    pub async fn get_config(&self, id: i64) -> ServiceResult<Option<ChannelRoutingConfig>> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM channel_routing_configs WHERE id = ?1");
        let row: Option<ConfigRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?;

        row.map(ChannelRoutingConfig::try_from).transpose()
    }

    /// La activa de mayor prioridad; a igual prioridad gana el id más bajo.
    pub async fn get_active_config_for_channel(
        &self,
        channel: ChannelType,
    ) -> ServiceResult<Option<ChannelRoutingConfig>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM channel_routing_configs
             WHERE channel = ?1 AND is_active = 1
             ORDER BY priority DESC, id ASC
             LIMIT 1"
        );
        let row: Option<ConfigRow> = sqlx::query_as(&sql)
            .bind(channel.as_i64())
            .fetch_optional(&self.db_pool)
            .await?;

        row.map(ChannelRoutingConfig::try_from).transpose()
    }

    pub async fn create_config(
        &self,
        req: ChannelRoutingConfigRequest,
    ) -> ServiceResult<ChannelRoutingConfig> {
        let mut errors = req.validate();
        if req.channel.is_none() {
            errors.insert(0, "channel is required".to_string());
        }
        let Some(channel) = req.channel.filter(|_| errors.is_empty()) else {
            return Err(ServiceError::InvalidInput(errors.join("; ")));
        };

        let now = format_timestamp(&Utc::now());
        let sql = format!(
            r#"
            INSERT INTO channel_routing_configs (
                channel, primary_provider, fallback_provider, routing_strategy,
                enable_fallback, max_retries, retry_strategy, initial_retry_delay_seconds,
                max_retry_delay_seconds, cost_threshold, is_active, priority,
                additional_settings, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, NULL)
            RETURNING {SELECT_COLUMNS}
            "#
        );

        let row: ConfigRow = sqlx::query_as(&sql)
            .bind(channel.as_i64())
            .bind(&req.primary_provider)
            .bind(&req.fallback_provider)
            .bind(req.routing_strategy.as_i64())
            .bind(req.enable_fallback)
            .bind(req.max_retries)
            .bind(req.retry_strategy.as_i64())
            .bind(req.initial_retry_delay_seconds)
            .bind(req.max_retry_delay_seconds)
            .bind(req.cost_threshold)
            .bind(req.is_active)
            .bind(req.priority)
            .bind(&req.additional_settings)
            .bind(&now)
            .fetch_one(&self.db_pool)
            .await?;

        let created = ChannelRoutingConfig::try_from(row)?;
        log::info!(
            "Routing config {} creada para canal {} (primary={}, priority={})",
            created.id,
            created.channel,
            created.primary_provider,
            created.priority
        );
        Ok(created)
    }

    /// Sobrescribe solo los campos editables; `channel` y `created_at` quedan igual.
    pub async fn update_config(
        &self,
        id: i64,
        req: ChannelRoutingConfigRequest,
    ) -> ServiceResult<Option<ChannelRoutingConfig>> {
        let errors = req.validate();
        if !errors.is_empty() {
            return Err(ServiceError::InvalidInput(errors.join("; ")));
        }

        let now = format_timestamp(&Utc::now());
        let sql = format!(
            r#"
            UPDATE channel_routing_configs
            SET primary_provider = ?2,
                fallback_provider = ?3,
                routing_strategy = ?4,
                enable_fallback = ?5,
                max_retries = ?6,
                retry_strategy = ?7,
                initial_retry_delay_seconds = ?8,
                max_retry_delay_seconds = ?9,
                cost_threshold = ?10,
                is_active = ?11,
                priority = ?12,
                additional_settings = ?13,
                updated_at = ?14
            WHERE id = ?1
            RETURNING {SELECT_COLUMNS}
            "#
        );

        let row: Option<ConfigRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(&req.primary_provider)
            .bind(&req.fallback_provider)
            .bind(req.routing_strategy.as_i64())
            .bind(req.enable_fallback)
            .bind(req.max_retries)
            .bind(req.retry_strategy.as_i64())
            .bind(req.initial_retry_delay_seconds)
            .bind(req.max_retry_delay_seconds)
            .bind(req.cost_threshold)
            .bind(req.is_active)
            .bind(req.priority)
            .bind(&req.additional_settings)
            .bind(&now)
            .fetch_optional(&self.db_pool)
            .await?;

        if row.is_some() {
            log::info!("Routing config {} actualizada", id);
        }
        row.map(ChannelRoutingConfig::try_from).transpose()
    }

    pub async fn delete_config(&self, id: i64) -> ServiceResult<bool> {
        let result = sqlx::query("DELETE FROM channel_routing_configs WHERE id = ?1")
            .bind(id)
            .execute(&self.db_pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            log::info!("Routing config {} eliminada", id);
        }
        Ok(deleted)
    }

    /// Inserta las configs por defecto si la tabla está vacía. Devuelve cuántas insertó.
    pub async fn seed_defaults(&self) -> ServiceResult<usize> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM channel_routing_configs")
            .fetch_one(&self.db_pool)
            .await?;
        if count > 0 {
            return Ok(0);
        }

        let defaults = default_configs();
        let inserted = defaults.len();
        for req in defaults {
            self.create_config(req).await?;
        }

        log::info!("Sembradas {} routing configs por defecto", inserted);
        Ok(inserted)
    }
}

fn default_configs() -> Vec<ChannelRoutingConfigRequest> {
    let seed = |channel, primary: &str, fallback: &str, initial, max| {
        let mut req = ChannelRoutingConfigRequest::new(channel, primary);
        req.fallback_provider = Some(fallback.to_string());
        req.routing_strategy = RoutingStrategy::Primary;
        req.retry_strategy = RetryStrategy::Exponential;
        req.initial_retry_delay_seconds = initial;
        req.max_retry_delay_seconds = max;
        req
    };

    vec![
        seed(ChannelType::Sms, "MockSMSProvider", "BackupSMSProvider", 60, 3600),
        seed(ChannelType::Mms, "MockMMSProvider", "BackupMMSProvider", 60, 3600),
        seed(ChannelType::Email, "MockEmailProvider", "BackupEmailProvider", 120, 7200),
    ]
}
