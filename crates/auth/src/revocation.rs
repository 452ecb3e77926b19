//! Revoked-token (blacklist) boundary.
//!
//! A token id present in the store is rejected by verification, whatever the
//! record's own expiry says. Records are never mutated; the expiry only tells
//! housekeeping when a record has become safe to delete.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use identity_core::TokenId;

use crate::{AuthError, AuthResult, TokenClaims};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevokedTokenRecord {
    pub jti: TokenId,

    #[serde(with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

impl RevokedTokenRecord {
    pub fn new(jti: TokenId, expires_at: DateTime<Utc>) -> Self {
        Self { jti, expires_at }
    }

    pub fn from_claims(claims: &TokenClaims) -> Self {
        Self::new(claims.jti, claims.exp)
    }

    /// Once the token itself has expired, verification rejects it on expiry
    /// alone and the record is no longer needed.
    pub fn is_prunable(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Durable set of revoked token ids.
///
/// Implementations must:
/// - make `add` idempotent (re-adding a revoked id is not an error)
/// - make every completed `add` visible to any later `contains`, from any caller
/// - report I/O failures as [`AuthError::StoreUnavailable`], never as "not revoked"
#[async_trait]
pub trait RevocationStore: Send + Sync {
    async fn add(&self, record: RevokedTokenRecord) -> AuthResult<()>;

    async fn contains(&self, jti: TokenId) -> AuthResult<bool>;

    /// Delete records whose expiry is at or before `now`. Returns the number deleted.
    ///
    /// Housekeeping only; correctness of `contains` never depends on it.
    async fn prune_expired(&self, now: DateTime<Utc>) -> AuthResult<u64>;
}

#[async_trait]
impl<S> RevocationStore for Arc<S>
where
    S: RevocationStore + ?Sized,
{
    async fn add(&self, record: RevokedTokenRecord) -> AuthResult<()> {
        (**self).add(record).await
    }

    async fn contains(&self, jti: TokenId) -> AuthResult<bool> {
        (**self).contains(jti).await
    }

    async fn prune_expired(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        (**self).prune_expired(now).await
    }
}

/// In-memory revocation store.
///
/// Intended for tests/dev: records do not survive a restart.
#[derive(Debug, Default)]
pub struct InMemoryRevocationStore {
    records: RwLock<HashMap<TokenId, DateTime<Utc>>>,
}

impl InMemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RevocationStore for InMemoryRevocationStore {
    async fn add(&self, record: RevokedTokenRecord) -> AuthResult<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| AuthError::store_unavailable("revocation store lock poisoned"))?;
        records.entry(record.jti).or_insert(record.expires_at);
        Ok(())
    }

    async fn contains(&self, jti: TokenId) -> AuthResult<bool> {
        let records = self
            .records
            .read()
            .map_err(|_| AuthError::store_unavailable("revocation store lock poisoned"))?;
        Ok(records.contains_key(&jti))
    }

    async fn prune_expired(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let mut records = self
            .records
            .write()
            .map_err(|_| AuthError::store_unavailable("revocation store lock poisoned"))?;
        let before = records.len();
        records.retain(|_, expires_at| *expires_at > now);
        Ok((before - records.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn add_is_idempotent() {
        let store = InMemoryRevocationStore::new();
        let record = RevokedTokenRecord::new(TokenId::new(), Utc::now() + Duration::hours(1));

        store.add(record.clone()).await.unwrap();
        store.add(record.clone()).await.unwrap();

        assert!(store.contains(record.jti).await.unwrap());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn unknown_ids_are_not_revoked() {
        let store = InMemoryRevocationStore::new();
        assert!(!store.contains(TokenId::new()).await.unwrap());
    }

    #[tokio::test]
    async fn presence_alone_means_revoked_even_past_record_expiry() {
        let store = InMemoryRevocationStore::new();
        let record = RevokedTokenRecord::new(TokenId::new(), Utc::now() - Duration::hours(1));

        store.add(record.clone()).await.unwrap();
        assert!(store.contains(record.jti).await.unwrap());
    }

    #[tokio::test]
    async fn prune_removes_only_expired_records() {
        let store = InMemoryRevocationStore::new();
        let now = Utc::now();
        let stale = RevokedTokenRecord::new(TokenId::new(), now - Duration::minutes(5));
        let boundary = RevokedTokenRecord::new(TokenId::new(), now);
        let live = RevokedTokenRecord::new(TokenId::new(), now + Duration::minutes(5));

        for r in [&stale, &boundary, &live] {
            store.add(r.clone()).await.unwrap();
        }

        assert_eq!(store.prune_expired(now).await.unwrap(), 2);
        assert!(!store.contains(stale.jti).await.unwrap());
        assert!(!store.contains(boundary.jti).await.unwrap());
        assert!(store.contains(live.jti).await.unwrap());
    }

    #[tokio::test]
    async fn concurrent_adds_for_distinct_ids_all_land() {
        let store = Arc::new(InMemoryRevocationStore::new());
        let expires_at = Utc::now() + Duration::hours(1);
        let ids: Vec<TokenId> = (0..64).map(|_| TokenId::new()).collect();

        let mut tasks = Vec::new();
        for jti in ids.clone() {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                store.add(RevokedTokenRecord::new(jti, expires_at)).await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        for jti in ids {
            assert!(store.contains(jti).await.unwrap());
        }
        assert_eq!(store.len(), 64);
    }

    #[test]
    fn record_is_prunable_at_expiry() {
        let now = Utc::now();
        let record = RevokedTokenRecord::new(TokenId::new(), now);
        assert!(record.is_prunable(now));
        assert!(!record.is_prunable(now - Duration::seconds(1)));
    }
}
