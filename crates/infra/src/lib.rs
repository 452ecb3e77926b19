//! Infrastructure layer: durable stores and background housekeeping.

pub mod credentials;
pub mod db;
pub mod revocation;
pub mod workers;

pub use credentials::PostgresCredentialStore;
pub use revocation::PostgresRevocationStore;
pub use workers::{PrunerHandle, RevocationPruner};

#[cfg(test)]
pub(crate) mod testing {
    use std::time::Duration;

    use sqlx::PgPool;

    /// Database used by the Postgres adapter tests. Unset means "skip".
    pub const TEST_DATABASE_URL: &str = "IDENTITY_TEST_DATABASE_URL";

    pub async fn test_pool() -> Option<PgPool> {
        let url = std::env::var(TEST_DATABASE_URL).ok()?;
        Some(
            crate::db::connect(&url, Duration::from_secs(5))
                .await
                .unwrap(),
        )
    }
}
