use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use identity_core::TokenId;

use crate::{AuthError, AuthResult, Scope};

/// Claim set embedded in a signed access token.
///
/// Immutable once signed. Timestamps travel as JWT NumericDate (whole seconds).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the username the token was issued to.
    pub sub: String,

    pub iss: String,

    #[serde(with = "chrono::serde::ts_seconds")]
    pub iat: DateTime<Utc>,

    #[serde(with = "chrono::serde::ts_seconds")]
    pub exp: DateTime<Utc>,

    /// Revocation key.
    pub jti: TokenId,

    #[serde(default)]
    pub scope: Scope,
}

impl TokenClaims {
    pub fn username(&self) -> &str {
        &self.sub
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now
    }
}

/// Reject claims whose expiry is at or before `now`.
pub fn check_expiry(claims: &TokenClaims, now: DateTime<Utc>) -> AuthResult<()> {
    if claims.is_expired_at(now) {
        return Err(AuthError::Expired);
    }
    Ok(())
}

/// A freshly signed token together with the claims it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub claims: TokenClaims,
}
