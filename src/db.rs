//! PostgreSQL 存储后端
//! 连接池、内嵌迁移与连通性探测

use crate::config::DatabaseConfig;
use secrecy::ExposeSecret;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

/// 数据库错误类型
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database.url is not set")]
    MissingUrl,

    #[error("cannot connect to database: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("cannot apply migrations: {0}")]
    Migrate(#[source] sqlx::migrate::MigrateError),
}

/// 探测结果；失败细节只写入日志
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
}

/// 建立连接池，URL 缺失时直接失败
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, DbError> {
    let url = config.url.as_ref().ok_or(DbError::MissingUrl)?;

    let pool = pool_options(config)
        .connect(url.expose_secret())
        .await
        .map_err(DbError::Connect)?;

    tracing::info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Connected to PostgreSQL"
    );

    Ok(pool)
}

/// 执行 `./migrations` 下的迁移（编译期内嵌）
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(DbError::Migrate)?;

    tracing::info!("Schema is up to date");
    Ok(())
}

/// `SELECT 1` 连通性探测，同时上报连接池指标
pub async fn health_check(pool: &PgPool) -> HealthStatus {
    metrics::gauge!("db_pool_size").set(pool.size() as f64);
    metrics::gauge!("db_pool_idle").set(pool.num_idle() as f64);

    match sqlx::query("SELECT 1").execute(pool).await {
        Ok(_) => HealthStatus::Healthy,
        Err(e) => {
            tracing::warn!(error = %e, "Database ping failed");
            HealthStatus::Unhealthy
        }
    }
}
