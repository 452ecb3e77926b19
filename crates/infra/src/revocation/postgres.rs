//! Postgres-backed revocation store.
//!
//! ## Schema
//!
//! ```sql
//! CREATE TABLE invalidated_tokens (
//!     jti        TEXT PRIMARY KEY,
//!     expires_at TIMESTAMPTZ NOT NULL
//! );
//! ```
//!
//! The primary key makes `add` idempotent (`ON CONFLICT DO NOTHING`) and keeps
//! `contains` a single index probe. Each statement autocommits, so a completed
//! `add` is visible to every later `contains` on any connection.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use identity_auth::{AuthResult, RevocationStore, RevokedTokenRecord};
use identity_core::TokenId;

use crate::db::map_sqlx_error;

#[derive(Debug, Clone)]
pub struct PostgresRevocationStore {
    pool: Arc<PgPool>,
}

impl PostgresRevocationStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create the table and its expiry index if missing.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> AuthResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS invalidated_tokens (
                jti        TEXT PRIMARY KEY,
                expires_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_invalidated_tokens", e))?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS invalidated_tokens_expires_at_idx
                ON invalidated_tokens (expires_at)
            "#,
        )
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_invalidated_tokens_index", e))?;

        Ok(())
    }
}

#[async_trait]
impl RevocationStore for PostgresRevocationStore {
    #[instrument(skip(self), fields(jti = %record.jti), err)]
    async fn add(&self, record: RevokedTokenRecord) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO invalidated_tokens (jti, expires_at)
            VALUES ($1, $2)
            ON CONFLICT (jti) DO NOTHING
            "#,
        )
        .bind(record.jti.to_string())
        .bind(record.expires_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_invalidated_token", e))?;

        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn contains(&self, jti: TokenId) -> AuthResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM invalidated_tokens WHERE jti = $1)",
        )
        .bind(jti.to_string())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("contains_invalidated_token", e))?;

        Ok(exists)
    }

    #[instrument(skip(self), err)]
    async fn prune_expired(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let result = sqlx::query("DELETE FROM invalidated_tokens WHERE expires_at <= $1")
            .bind(now)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("prune_invalidated_tokens", e))?;

        Ok(result.rows_affected())
    }
}
