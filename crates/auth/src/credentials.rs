//! Credential lookup boundary (the user store as seen by login).

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::{AuthError, AuthResult, Identity, password};

/// Identity snapshot plus the stored password hash (PHC string).
#[derive(Clone, PartialEq, Eq)]
pub struct StoredCredential {
    pub identity: Identity,
    pub password_hash: String,
}

impl core::fmt::Debug for StoredCredential {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StoredCredential")
            .field("identity", &self.identity)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

#[async_trait]
pub trait CredentialLookup: Send + Sync {
    /// `Ok(None)` when no user has this username. I/O failures are
    /// [`AuthError::StoreUnavailable`].
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<StoredCredential>>;
}

#[async_trait]
impl<S> CredentialLookup for Arc<S>
where
    S: CredentialLookup + ?Sized,
{
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<StoredCredential>> {
        (**self).find_by_username(username).await
    }
}

/// In-memory credential store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    users: RwLock<HashMap<String, StoredCredential>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) a user with an already-hashed password.
    pub fn insert(&self, identity: Identity, password_hash: impl Into<String>) {
        if let Ok(mut users) = self.users.write() {
            users.insert(
                identity.username().to_string(),
                StoredCredential {
                    identity,
                    password_hash: password_hash.into(),
                },
            );
        }
    }

    /// Hash `password` and insert the user.
    pub fn register(
        &self,
        identity: Identity,
        password: &str,
    ) -> Result<(), argon2::password_hash::Error> {
        let hashword = password::hash(password)?;
        self.insert(identity, hashword);
        Ok(())
    }
}

#[async_trait]
impl CredentialLookup for InMemoryCredentialStore {
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<StoredCredential>> {
        let users = self
            .users
            .read()
            .map_err(|_| AuthError::store_unavailable("credential store lock poisoned"))?;
        Ok(users.get(username).cloned())
    }
}
