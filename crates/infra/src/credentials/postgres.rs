//! Postgres-backed credential lookup.
//!
//! Reads the user/role/permission graph and folds it into the ordered
//! [`Identity`] snapshot the token core consumes: roles sorted by name, each
//! role's permissions sorted by name.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use identity_auth::{
    AuthError, AuthResult, CredentialLookup, Identity, Permission, Role, StoredCredential,
};
use identity_core::UserId;

use crate::db::map_sqlx_error;

const SCHEMA: &[(&str, &str)] = &[
    (
        "create_users",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id            UUID PRIMARY KEY,
            username      TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL
        )
        "#,
    ),
    (
        "create_roles",
        r#"
        CREATE TABLE IF NOT EXISTS roles (
            name        TEXT PRIMARY KEY,
            description TEXT
        )
        "#,
    ),
    (
        "create_permissions",
        r#"
        CREATE TABLE IF NOT EXISTS permissions (
            name        TEXT PRIMARY KEY,
            description TEXT
        )
        "#,
    ),
    (
        "create_user_roles",
        r#"
        CREATE TABLE IF NOT EXISTS user_roles (
            user_id   UUID NOT NULL REFERENCES users (id) ON DELETE CASCADE,
            role_name TEXT NOT NULL REFERENCES roles (name) ON DELETE CASCADE,
            PRIMARY KEY (user_id, role_name)
        )
        "#,
    ),
    (
        "create_role_permissions",
        r#"
        CREATE TABLE IF NOT EXISTS role_permissions (
            role_name       TEXT NOT NULL REFERENCES roles (name) ON DELETE CASCADE,
            permission_name TEXT NOT NULL REFERENCES permissions (name) ON DELETE CASCADE,
            PRIMARY KEY (role_name, permission_name)
        )
        "#,
    ),
];

#[derive(Debug, Clone)]
pub struct PostgresCredentialStore {
    pool: Arc<PgPool>,
}

impl PostgresCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> AuthResult<()> {
        for (operation, ddl) in SCHEMA {
            sqlx::query(ddl)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error(operation, e))?;
        }
        Ok(())
    }

    /// Insert or replace a user together with its roles and their permissions.
    ///
    /// Role and permission rows are shared: existing ones are kept, and a
    /// role's permission set only ever grows through this call.
    #[instrument(skip(self, identity, password_hash), fields(username = identity.username()), err)]
    pub async fn upsert(&self, identity: &Identity, password_hash: &str) -> AuthResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        sqlx::query(
            r#"
            INSERT INTO users (id, username, password_hash)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET
                username = EXCLUDED.username,
                password_hash = EXCLUDED.password_hash
            "#,
        )
        .bind(*identity.id().as_uuid())
        .bind(identity.username())
        .bind(password_hash)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("upsert_user", e))?;

        sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
            .bind(*identity.id().as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("clear_user_roles", e))?;

        for role in identity.roles() {
            sqlx::query("INSERT INTO roles (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
                .bind(role.name())
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("insert_role", e))?;

            for permission in role.permissions() {
                sqlx::query(
                    "INSERT INTO permissions (name) VALUES ($1) ON CONFLICT (name) DO NOTHING",
                )
                .bind(permission.as_str())
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("insert_permission", e))?;

                sqlx::query(
                    r#"
                    INSERT INTO role_permissions (role_name, permission_name)
                    VALUES ($1, $2)
                    ON CONFLICT DO NOTHING
                    "#,
                )
                .bind(role.name())
                .bind(permission.as_str())
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("insert_role_permission", e))?;
            }

            sqlx::query(
                "INSERT INTO user_roles (user_id, role_name) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(*identity.id().as_uuid())
            .bind(role.name())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert_user_role", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))
    }
}

#[async_trait]
impl CredentialLookup for PostgresCredentialStore {
    #[instrument(skip(self), err)]
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<StoredCredential>> {
        let rows = sqlx::query(
            r#"
            SELECT
                u.id,
                u.username,
                u.password_hash,
                ur.role_name,
                rp.permission_name
            FROM users u
            LEFT JOIN user_roles ur ON ur.user_id = u.id
            LEFT JOIN role_permissions rp ON rp.role_name = ur.role_name
            WHERE u.username = $1
            ORDER BY ur.role_name ASC NULLS FIRST, rp.permission_name ASC NULLS FIRST
            "#,
        )
        .bind(username)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_by_username", e))?;

        let mut folded = Vec::with_capacity(rows.len());
        for row in rows {
            folded.push(CredentialRow {
                id: row.try_get("id").map_err(|e| map_sqlx_error("decode_user", e))?,
                username: row.try_get("username").map_err(|e| map_sqlx_error("decode_user", e))?,
                password_hash: row
                    .try_get("password_hash")
                    .map_err(|e| map_sqlx_error("decode_user", e))?,
                role_name: row.try_get("role_name").map_err(|e| map_sqlx_error("decode_user", e))?,
                permission_name: row
                    .try_get("permission_name")
                    .map_err(|e| map_sqlx_error("decode_user", e))?,
            });
        }

        fold_rows(folded)
    }
}

/// One row of the user/role/permission join.
#[derive(Clone)]
struct CredentialRow {
    id: Uuid,
    username: String,
    password_hash: String,
    role_name: Option<String>,
    permission_name: Option<String>,
}

/// Fold join rows (already ordered by role, then permission) into one credential.
fn fold_rows(rows: Vec<CredentialRow>) -> AuthResult<Option<StoredCredential>> {
    let mut rows = rows.into_iter().peekable();
    let Some(first) = rows.peek().cloned() else {
        return Ok(None);
    };

    let mut roles: Vec<(String, Vec<Permission>)> = Vec::new();
    for row in rows {
        let Some(role_name) = row.role_name else {
            continue;
        };
        if roles.last().map(|(name, _)| name != &role_name).unwrap_or(true) {
            roles.push((role_name, Vec::new()));
        }
        if let (Some(permission), Some((_, permissions))) = (row.permission_name, roles.last_mut()) {
            permissions.push(Permission::new(permission));
        }
    }

    let roles = roles
        .into_iter()
        .map(|(name, permissions)| Role::with_permissions(name, permissions))
        .collect();

    let identity = Identity::new(UserId::from_uuid(first.id), first.username, roles)
        .map_err(|e| AuthError::store_unavailable(format!("invalid user record: {e}")))?;

    Ok(Some(StoredCredential {
        identity,
        password_hash: first.password_hash,
    }))
}
