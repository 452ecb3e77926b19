//! Token issuance: claim construction and HS512 signing.

use chrono::{DateTime, TimeDelta, Timelike, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use tracing::error;

use identity_core::TokenId;

use crate::{AuthConfig, AuthError, AuthResult, Identity, IssuedToken, Scope, TokenClaims};

pub(crate) const SIGNING_ALGORITHM: Algorithm = Algorithm::HS512;

/// Builds and signs access tokens.
///
/// Constructed once from [`AuthConfig`]; holds no mutable state.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    header: Header,
    issuer: String,
    lifetime: std::time::Duration,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret().as_bytes()),
            header: Header::new(SIGNING_ALGORITHM),
            issuer: config.issuer().to_string(),
            lifetime: config.token_lifetime(),
        }
    }

    pub fn issue(&self, identity: &Identity) -> AuthResult<IssuedToken> {
        self.issue_at(identity, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(&self, identity: &Identity, now: DateTime<Utc>) -> AuthResult<IssuedToken> {
        // NumericDate has whole-second resolution; truncate so the returned
        // claims equal what a verifier decodes.
        let iat = now.with_nanosecond(0).unwrap_or(now);
        let exp = self.expiry_for(iat)?;

        let claims = TokenClaims {
            sub: identity.username().to_string(),
            iss: self.issuer.clone(),
            iat,
            exp,
            jti: TokenId::new(),
            scope: Scope::for_identity(identity),
        };

        let token = jsonwebtoken::encode(&self.header, &claims, &self.encoding).map_err(|e| {
            error!(username = %claims.sub, error = %e, "cannot sign token");
            AuthError::SigningFailure(e.to_string())
        })?;

        Ok(IssuedToken { token, claims })
    }

    fn expiry_for(&self, iat: DateTime<Utc>) -> AuthResult<DateTime<Utc>> {
        TimeDelta::from_std(self.lifetime)
            .ok()
            .and_then(|lifetime| iat.checked_add_signed(lifetime))
            .ok_or_else(|| {
                error!(lifetime = ?self.lifetime, "token lifetime out of range");
                AuthError::SigningFailure("token lifetime out of range".to_string())
            })
    }
}

impl core::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("algorithm", &self.header.alg)
            .field("issuer", &self.issuer)
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}
