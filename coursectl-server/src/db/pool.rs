//! PostgreSQL pool for the records database
//!
//! One pool backs every [`PgStore`](crate::PgStore) repo. Enroll and drop
//! each hold a connection for a single short transaction, so the default
//! cap stays small; `[database] max_connections` raises it.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Connection cap when the config file does not set one
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Connect with [`DEFAULT_MAX_CONNECTIONS`]; used by `coursectl migrate`
/// and the database-backed tests.
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    create_pool_with_options(database_url, DEFAULT_MAX_CONNECTIONS).await
}

/// Connect with an explicit cap. Fails fast when the server is unreachable
/// so `coursectl serve` exits before binding its listener.
pub async fn create_pool_with_options(
    database_url: &str,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    tracing::debug!(max_connections, "connecting to database");
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}
