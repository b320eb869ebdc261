//! Database connection pool management
//!
//! Uses sqlx PgPool with explicit connection limits.

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;

/// Default maximum connections for the pool.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Create a PostgreSQL connection pool.
///
/// # Errors
///
/// Returns an error if the connection fails.
///
/// # Example
///
/// ```ignore
/// let options = DatabaseConfig::from_env()?.connect_options()?;
/// let pool = create_pool(options).await?;
/// ```
pub async fn create_pool(options: PgConnectOptions) -> Result<PgPool, sqlx::Error> {
    create_pool_with_options(options, DEFAULT_MAX_CONNECTIONS).await
}

/// Create a PostgreSQL connection pool with custom options.
///
/// The first connection is established eagerly, so an unreachable database
/// fails here rather than on the first request.
pub async fn create_pool_with_options(
    options: PgConnectOptions,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    tracing::info!(max_connections, "Successfully connected to the database");
    Ok(pool)
}
