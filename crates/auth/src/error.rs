//! Failure kinds for login, verification, logout and issuance.

use serde::Serialize;
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication failure.
///
/// Variants stay distinct internally (logs, metrics, tests). Use
/// [`AuthError::public_code`] when rendering a response to an external caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid credentials")]
    BadCredentials,

    #[error("user not found")]
    UserNotFound,

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token signature is invalid")]
    BadSignature,

    #[error("token has expired")]
    Expired,

    #[error("token has been revoked")]
    Revoked,

    /// Issuance failed. Indicates a deployment defect, not bad input.
    #[error("token signing failed: {0}")]
    SigningFailure(String),

    /// A backing store call failed or timed out. Transient.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

/// Payload-free discriminant of [`AuthError`], suitable for structured log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthErrorKind {
    BadCredentials,
    UserNotFound,
    Malformed,
    BadSignature,
    Expired,
    Revoked,
    SigningFailure,
    StoreUnavailable,
}

impl AuthError {
    pub fn store_unavailable(msg: impl Into<String>) -> Self {
        Self::StoreUnavailable(msg.into())
    }

    pub fn kind(&self) -> AuthErrorKind {
        match self {
            AuthError::BadCredentials => AuthErrorKind::BadCredentials,
            AuthError::UserNotFound => AuthErrorKind::UserNotFound,
            AuthError::Malformed(_) => AuthErrorKind::Malformed,
            AuthError::BadSignature => AuthErrorKind::BadSignature,
            AuthError::Expired => AuthErrorKind::Expired,
            AuthError::Revoked => AuthErrorKind::Revoked,
            AuthError::SigningFailure(_) => AuthErrorKind::SigningFailure,
            AuthError::StoreUnavailable(_) => AuthErrorKind::StoreUnavailable,
        }
    }

    /// True for the failures a token verification can produce because of the
    /// token itself (as opposed to an outage).
    pub fn is_token_rejection(&self) -> bool {
        matches!(
            self,
            AuthError::Malformed(_) | AuthError::BadSignature | AuthError::Expired | AuthError::Revoked
        )
    }

    /// True when the caller's input caused the failure.
    pub fn is_client_error(&self) -> bool {
        self.is_token_rejection() || matches!(self, AuthError::BadCredentials | AuthError::UserNotFound)
    }

    /// Code exposed at the API boundary.
    ///
    /// Every client-attributable failure collapses to `"unauthenticated"` so an
    /// external caller cannot probe for usernames or learn why a token was refused.
    pub fn public_code(&self) -> &'static str {
        match self {
            AuthError::SigningFailure(_) => "internal_error",
            AuthError::StoreUnavailable(_) => "service_unavailable",
            _ => "unauthenticated",
        }
    }
}
