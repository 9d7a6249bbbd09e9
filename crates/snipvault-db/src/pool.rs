//! Database connection pooling.

use std::time::{Duration, Instant};

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use snipvault_core::{Error, Result};

/// Maximum number of pooled connections. Sized for a single-process
/// personal server, not a fleet.
pub const MAX_CONNECTIONS: u32 = 10;

/// How long to wait for a free connection before failing the request.
pub const ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// Idle connections are closed after this long.
pub const IDLE_TIMEOUT_SECS: u64 = 600;

/// Connect a PostgreSQL pool with the server's standard settings.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    let start = Instant::now();

    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(ACQUIRE_TIMEOUT_SECS))
        .idle_timeout(Duration::from_secs(IDLE_TIMEOUT_SECS))
        .connect(database_url)
        .await
        .map_err(Error::Database)?;

    info!(
        subsystem = "db",
        component = "pool",
        op = "create",
        pool_size = pool.size(),
        max_connections = MAX_CONNECTIONS,
        duration_ms = start.elapsed().as_millis() as u64,
        "Database connection pool established"
    );
    Ok(pool)
}
