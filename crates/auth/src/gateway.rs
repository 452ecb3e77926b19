//! Login, introspection and logout over shared issuer/verifier/store handles.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::bounded::bounded;
use crate::{
    AuthConfig, AuthError, AuthResult, AuthenticationRequest, AuthenticationResponse,
    CredentialLookup, IntrospectRequest, IntrospectResponse, IssuedToken, LogoutRequest,
    RevocationStore, RevokedTokenRecord, TokenClaims, TokenIssuer, TokenVerifier, password,
};

/// Entry point for the authentication operations.
///
/// Cheap to clone; every clone shares the same issuer, verifier and stores.
#[derive(Clone)]
pub struct AuthenticationGateway {
    credentials: Arc<dyn CredentialLookup>,
    revocations: Arc<dyn RevocationStore>,
    issuer: Arc<TokenIssuer>,
    verifier: Arc<TokenVerifier>,
    store_timeout: Duration,
}

impl AuthenticationGateway {
    pub fn new(
        config: &AuthConfig,
        credentials: Arc<dyn CredentialLookup>,
        revocations: Arc<dyn RevocationStore>,
    ) -> Self {
        Self {
            issuer: Arc::new(TokenIssuer::new(config)),
            verifier: Arc::new(TokenVerifier::new(config, revocations.clone())),
            credentials,
            revocations,
            store_timeout: config.store_timeout(),
        }
    }

    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    /// Check credentials and issue a token for the user.
    pub async fn login(&self, username: &str, password: &str) -> AuthResult<IssuedToken> {
        let stored = bounded(
            self.store_timeout,
            "credential lookup",
            self.credentials.find_by_username(username),
        )
        .await
        .inspect_err(|e| warn!(username, error = %e, "credential lookup failed"))?;

        let Some(stored) = stored else {
            warn!(username, failure = ?AuthError::UserNotFound.kind(), "login rejected");
            return Err(AuthError::UserNotFound);
        };
        if !password::verify(password, &stored.password_hash) {
            warn!(username, failure = ?AuthError::BadCredentials.kind(), "login rejected");
            return Err(AuthError::BadCredentials);
        }

        let issued = self.issuer.issue(&stored.identity)?;
        info!(username, jti = %issued.claims.jti, exp = %issued.claims.exp, "token issued");
        Ok(issued)
    }

    pub async fn authenticate_request(
        &self,
        request: &AuthenticationRequest,
    ) -> AuthResult<AuthenticationResponse> {
        let issued = self.login(&request.username, &request.password).await?;
        Ok(AuthenticationResponse {
            token: issued.token,
            authenticated: true,
        })
    }

    /// Verify a token presented on a protected request.
    pub async fn authenticate(&self, token: &str) -> AuthResult<TokenClaims> {
        self.verifier.verify(token).await
    }

    /// `true` only for an active token. Never fails.
    pub async fn introspect(&self, token: &str) -> bool {
        match self.verifier.verify(token).await {
            Ok(claims) => {
                debug!(jti = %claims.jti, valid = true, "introspected token");
                true
            }
            Err(e) => {
                debug!(failure = ?e.kind(), valid = false, "introspected token");
                false
            }
        }
    }

    pub async fn introspect_request(&self, request: &IntrospectRequest) -> IntrospectResponse {
        IntrospectResponse {
            valid: self.introspect(&request.token).await,
        }
    }

    /// Revoke an active token.
    ///
    /// A token that is already revoked counts as logged out. Any other
    /// verification failure is returned unchanged and nothing is recorded.
    pub async fn logout(&self, token: &str) -> AuthResult<()> {
        let claims = match self.verifier.verify(token).await {
            Ok(claims) => claims,
            Err(AuthError::Revoked) => {
                debug!("logout of an already revoked token");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let record = RevokedTokenRecord::from_claims(&claims);
        bounded(self.store_timeout, "revocation insert", self.revocations.add(record))
            .await
            .inspect_err(|e| warn!(jti = %claims.jti, error = %e, "cannot record revocation"))?;

        info!(username = %claims.sub, jti = %claims.jti, "token revoked");
        Ok(())
    }

    pub async fn logout_request(&self, request: &LogoutRequest) -> AuthResult<()> {
        self.logout(&request.token).await
    }
}

impl core::fmt::Debug for AuthenticationGateway {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthenticationGateway")
            .field("issuer", &self.issuer)
            .field("verifier", &self.verifier)
            .field("store_timeout", &self.store_timeout)
            .finish_non_exhaustive()
    }
}
