use std::collections::HashSet;

use chrono::{DateTime, Utc};
use thiserror::Error;

use identity_core::TokenId;

use crate::{ROLE_PREFIX, TokenClaims};

/// The caller behind a verified token, for authorization decisions.
///
/// Built from claims only; no store is consulted. Authorities are the scope
/// tokens verbatim: roles keep their `ROLE_` prefix, permissions are bare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
    pub token_id: TokenId,
    pub expires_at: DateTime<Utc>,
    authorities: HashSet<String>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing authority '{0}'")]
    Forbidden(String),
}

impl Principal {
    pub fn from_claims(claims: &TokenClaims) -> Self {
        Self {
            username: claims.sub.clone(),
            token_id: claims.jti,
            expires_at: claims.exp,
            authorities: claims.scope.authorities().map(str::to_owned).collect(),
        }
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.contains(authority)
    }

    /// `role` is the bare role name (`ADMIN`, not `ROLE_ADMIN`).
    pub fn has_role(&self, role: &str) -> bool {
        self.has_authority(&format!("{ROLE_PREFIX}{role}"))
    }

    pub fn authorities(&self) -> impl Iterator<Item = &str> {
        self.authorities.iter().map(String::as_str)
    }
}

/// Require `authority` (a permission or a `ROLE_`-prefixed role).
///
/// - No IO
/// - No panics
pub fn authorize(principal: &Principal, authority: &str) -> Result<(), AuthzError> {
    if principal.has_authority(authority) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(authority.to_string()))
    }
}
