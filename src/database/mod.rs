use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::info;

pub mod models;

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

static POOL: OnceCell<PgPool> = OnceCell::const_new();

/// Get the shared connection pool, creating it lazily on first use
pub async fn pool() -> Result<PgPool, DbError> {
    let pool = POOL.get_or_try_init(connect).await?;
    Ok(pool.clone())
}

async fn connect() -> Result<PgPool, DbError> {
    let url =
        std::env::var("DATABASE_URL").map_err(|_| DbError::ConfigMissing("DATABASE_URL"))?;
    let settings = &crate::config::config().database;

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(Duration::from_secs(settings.connect_timeout_secs))
        .connect(&url)
        .await?;

    info!("Created database pool");
    Ok(pool)
}

/// Apply pending migrations; called once at startup
pub async fn migrate() -> Result<(), DbError> {
    let pool = pool().await?;
    MIGRATOR
        .run(&pool)
        .await
        .map_err(|e| DbError::Migration(e.to_string()))?;
    info!("Database migrations up to date");
    Ok(())
}

/// Pings the pool to ensure connectivity
pub async fn health_check() -> Result<(), DbError> {
    let pool = pool().await?;
    sqlx::query("SELECT 1").execute(&pool).await?;
    Ok(())
}
