use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// Builds a pool that connects on first use, so the monitor starts even when
/// the database is still coming up. Pool stats read as idle until then.
pub fn create_pool(database_url: &str, max_connections: u32, acquire_timeout: Duration) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .connect_lazy(database_url)?;
    Ok(pool)
}
