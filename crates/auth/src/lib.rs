//! `identity-auth`: token lifecycle for a stateless identity service.
//!
//! Issues HS512-signed access tokens, verifies them (signature, expiry,
//! revocation), and revokes them on logout. Storage sits behind the
//! [`CredentialLookup`] and [`RevocationStore`] traits; this crate carries no
//! HTTP or database code.

pub mod authorize;
pub mod claims;
pub mod config;
pub mod credentials;
pub mod dto;
pub mod error;
pub mod gateway;
pub mod identity;
pub mod issuer;
pub mod password;
pub mod permissions;
pub mod revocation;
pub mod roles;
pub mod scope;
pub mod verifier;

mod bounded;

pub use authorize::{AuthzError, Principal, authorize};
pub use claims::{IssuedToken, TokenClaims, check_expiry};
pub use config::{AuthConfig, ConfigError, SigningSecret};
pub use credentials::{CredentialLookup, InMemoryCredentialStore, StoredCredential};
pub use dto::{
    AuthenticationRequest, AuthenticationResponse, IntrospectRequest, IntrospectResponse,
    LogoutRequest,
};
pub use error::{AuthError, AuthErrorKind, AuthResult};
pub use gateway::AuthenticationGateway;
pub use identity::Identity;
pub use issuer::TokenIssuer;
pub use permissions::Permission;
pub use revocation::{InMemoryRevocationStore, RevocationStore, RevokedTokenRecord};
pub use roles::{ROLE_PREFIX, Role};
pub use scope::{Scope, build_scope};
pub use verifier::TokenVerifier;
