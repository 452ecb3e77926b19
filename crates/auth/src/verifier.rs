//! Token verification: signature, then expiry, then revocation.
//!
//! The order is load-bearing. No claim value (the `jti` included) is read
//! before the signature has been checked, so a forged claim set can never be
//! used to query revocation state.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, Validation};
use tracing::{debug, warn};

use crate::bounded::bounded;
use crate::issuer::SIGNING_ALGORITHM;
use crate::{AuthConfig, AuthError, AuthResult, RevocationStore, TokenClaims, check_expiry};

/// Validates presented tokens.
///
/// Built once at startup and shared by handle; verification never mutates
/// state.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding: DecodingKey,
    validation: Validation,
    revocations: Arc<dyn RevocationStore>,
    store_timeout: Duration,
}

impl TokenVerifier {
    pub fn new(config: &AuthConfig, revocations: Arc<dyn RevocationStore>) -> Self {
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        // Expiry is compared against an explicit `now` in `verify_at`.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);

        Self {
            decoding: DecodingKey::from_secret(config.secret().as_bytes()),
            validation,
            revocations,
            store_timeout: config.store_timeout(),
        }
    }

    pub async fn verify(&self, token: &str) -> AuthResult<TokenClaims> {
        self.verify_at(token, Utc::now()).await
    }

    /// Verify as if the current time were `now`.
    pub async fn verify_at(&self, token: &str, now: DateTime<Utc>) -> AuthResult<TokenClaims> {
        let claims = self.decode(token)?;
        check_expiry(&claims, now)?;

        let revoked = bounded(
            self.store_timeout,
            "revocation lookup",
            self.revocations.contains(claims.jti),
        )
        .await
        .inspect_err(|e| {
            warn!(jti = %claims.jti, error = %e, "revocation lookup failed; rejecting token");
        })?;
        if revoked {
            debug!(jti = %claims.jti, "token is revoked");
            return Err(AuthError::Revoked);
        }

        debug!(jti = %claims.jti, username = %claims.sub, "token verified");
        Ok(claims)
    }

    /// Parse and check the signature only.
    fn decode(&self, token: &str) -> AuthResult<TokenClaims> {
        jsonwebtoken::decode::<TokenClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(decode_failure)
    }
}

impl core::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("algorithms", &self.validation.algorithms)
            .field("store_timeout", &self.store_timeout)
            .finish_non_exhaustive()
    }
}

fn decode_failure(err: jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        // A token declaring another algorithm cannot be authenticated with our key.
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => AuthError::BadSignature,
        ErrorKind::ExpiredSignature => AuthError::Expired,
        _ => AuthError::Malformed(err.to_string()),
    }
}
