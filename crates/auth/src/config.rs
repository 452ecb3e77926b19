//! Process-wide token configuration.
//!
//! Loaded once at startup and shared read-only afterwards; nothing in here is
//! mutated after construction.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// HMAC-SHA512 security margin: the key should be at least as long as the hash block.
pub const MIN_SECRET_LEN: usize = 64;

pub const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_ISSUER: &str = "identity-service";
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(2);

pub const ENV_SIGNER_KEY: &str = "IDENTITY_SIGNER_KEY";
pub const ENV_ISSUER: &str = "IDENTITY_ISSUER";
pub const ENV_TOKEN_TTL_SECS: &str = "IDENTITY_TOKEN_TTL_SECS";
pub const ENV_STORE_TIMEOUT_MS: &str = "IDENTITY_STORE_TIMEOUT_MS";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("signing secret must be at least {min} bytes, got {actual}")]
    SecretTooShort { min: usize, actual: usize },

    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Shared HMAC secret. Its `Debug` output never includes the key material.
#[derive(Clone)]
pub struct SigningSecret(Arc<[u8]>);

impl SigningSecret {
    pub fn new(bytes: impl AsRef<[u8]>) -> Result<Self, ConfigError> {
        let bytes = bytes.as_ref();
        if bytes.len() < MIN_SECRET_LEN {
            return Err(ConfigError::SecretTooShort {
                min: MIN_SECRET_LEN,
                actual: bytes.len(),
            });
        }
        Ok(Self(Arc::from(bytes)))
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl core::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SigningSecret(<redacted>)")
    }
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    secret: SigningSecret,
    issuer: String,
    token_lifetime: Duration,
    store_timeout: Duration,
}

impl AuthConfig {
    pub fn new(secret: SigningSecret) -> Self {
        Self {
            secret,
            issuer: DEFAULT_ISSUER.to_string(),
            token_lifetime: DEFAULT_TOKEN_LIFETIME,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    pub fn with_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.token_lifetime = lifetime;
        self
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup(ENV_SIGNER_KEY).ok_or(ConfigError::Missing(ENV_SIGNER_KEY))?;
        let mut config = Self::new(SigningSecret::new(secret)?);

        if let Some(issuer) = lookup(ENV_ISSUER) {
            if issuer.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    key: ENV_ISSUER,
                    message: "must not be blank".to_string(),
                });
            }
            config = config.with_issuer(issuer);
        }
        if let Some(raw) = lookup(ENV_TOKEN_TTL_SECS) {
            let secs = parse_positive(ENV_TOKEN_TTL_SECS, &raw)?;
            config = config.with_token_lifetime(Duration::from_secs(secs));
        }
        if let Some(raw) = lookup(ENV_STORE_TIMEOUT_MS) {
            let millis = parse_positive(ENV_STORE_TIMEOUT_MS, &raw)?;
            config = config.with_store_timeout(Duration::from_millis(millis));
        }

        Ok(config)
    }

    pub fn secret(&self) -> &SigningSecret {
        &self.secret
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn token_lifetime(&self) -> Duration {
        self.token_lifetime
    }

    pub fn store_timeout(&self) -> Duration {
        self.store_timeout
    }
}

fn parse_positive(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::Invalid {
            key,
            message: "must be greater than zero".to_string(),
        }),
        Ok(v) => Ok(v),
        Err(e) => Err(ConfigError::Invalid {
            key,
            message: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn long_secret() -> String {
        "k".repeat(MIN_SECRET_LEN)
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let secret = long_secret();
        let config = AuthConfig::from_lookup(lookup(&[(ENV_SIGNER_KEY, &secret)])).unwrap();

        assert_eq!(config.issuer(), DEFAULT_ISSUER);
        assert_eq!(config.token_lifetime(), Duration::from_secs(3600));
        assert_eq!(config.store_timeout(), DEFAULT_STORE_TIMEOUT);
    }

    #[test]
    fn overrides_are_read() {
        let secret = long_secret();
        let config = AuthConfig::from_lookup(lookup(&[
            (ENV_SIGNER_KEY, &secret),
            (ENV_ISSUER, "auth.example.com"),
            (ENV_TOKEN_TTL_SECS, "900"),
            (ENV_STORE_TIMEOUT_MS, "250"),
        ]))
        .unwrap();

        assert_eq!(config.issuer(), "auth.example.com");
        assert_eq!(config.token_lifetime(), Duration::from_secs(900));
        assert_eq!(config.store_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn missing_secret_is_an_error() {
        let err = AuthConfig::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err, ConfigError::Missing(ENV_SIGNER_KEY));
    }

    #[test]
    fn short_secret_is_rejected() {
        let err = SigningSecret::new("too-short").unwrap_err();
        assert_eq!(
            err,
            ConfigError::SecretTooShort {
                min: MIN_SECRET_LEN,
                actual: 9
            }
        );
    }

    #[test]
    fn zero_or_garbage_durations_are_rejected() {
        let secret = long_secret();
        for raw in ["0", "abc", "-5"] {
            let err = AuthConfig::from_lookup(lookup(&[
                (ENV_SIGNER_KEY, &secret),
                (ENV_TOKEN_TTL_SECS, raw),
            ]))
            .unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { key: ENV_TOKEN_TTL_SECS, .. }));
        }
    }

    #[test]
    fn secret_is_redacted_in_debug_output() {
        let secret = long_secret();
        let config = AuthConfig::new(SigningSecret::new(&secret).unwrap());
        let rendered = format!("{config:?}");
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains(&secret));
    }
}
