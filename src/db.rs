use anyhow::Result;
use sqlx::postgres::PgPoolOptions;

pub type DbPool = sqlx::PgPool;

/// Create the Postgres pool that is injected into every component as router
/// state. Opened once at startup; dropped (and closed) at shutdown.
pub async fn create_pool(database_url: &str) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;
    Ok(pool)
}
