//! Connection pool setup and sqlx error mapping shared by the Postgres adapters.
//!
//! Every sqlx failure surfaces as [`AuthError::StoreUnavailable`]: callers treat
//! it as transient and verification fails closed on it.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use identity_auth::AuthError;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Open a pool. `acquire_timeout` should not exceed the auth store timeout,
/// otherwise a saturated pool turns into a deadline error upstream anyway.
pub async fn connect(url: &str, acquire_timeout: Duration) -> Result<PgPool, AuthError> {
    PgPoolOptions::new()
        .max_connections(DEFAULT_MAX_CONNECTIONS)
        .acquire_timeout(acquire_timeout)
        .connect(url)
        .await
        .map_err(|e| map_sqlx_error("connect", e))
}

pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> AuthError {
    match err {
        sqlx::Error::Database(db_err) => AuthError::store_unavailable(format!(
            "database error in {}: {} ({})",
            operation,
            db_err.message(),
            db_err.code().as_deref().unwrap_or("no code")
        )),
        sqlx::Error::PoolClosed => {
            AuthError::store_unavailable(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::PoolTimedOut => {
            AuthError::store_unavailable(format!("connection pool timed out in {operation}"))
        }
        _ => AuthError::store_unavailable(format!("sqlx error in {operation}: {err}")),
    }
}
