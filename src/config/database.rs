use anyhow::Context;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use super::Config;

/// Opens the repository pool sized from `DATABASE_MAX_CONNECTIONS`. A single
/// scenario run holds one connection at a time, so none are kept warm.
pub async fn create_pool(config: &Config) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .min_connections(0)
        .acquire_timeout(config.external_api_timeout())
        .connect(&config.database_url)
        .await
        .context("failed to connect to DATABASE_URL")?;

    info!(
        max_connections = config.database_max_connections,
        "Database pool ready"
    );
    Ok(pool)
}
