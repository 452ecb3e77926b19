//! Transport-agnostic request/response shapes for the gateway.

use serde::{Deserialize, Serialize};

/// Login request. No `Debug`: it carries a plaintext password.
#[derive(Clone, Deserialize)]
pub struct AuthenticationRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationResponse {
    pub token: String,
    pub authenticated: bool,
}

#[derive(Clone, Deserialize)]
pub struct IntrospectRequest {
    pub token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntrospectResponse {
    pub valid: bool,
}

#[derive(Clone, Deserialize)]
pub struct LogoutRequest {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_request_reads_plain_field_names() {
        let request: AuthenticationRequest =
            serde_json::from_str(r#"{"username":"john12","password":"12345678"}"#).unwrap();
        assert_eq!(request.username, "john12");
        assert_eq!(request.password, "12345678");
    }

    #[test]
    fn responses_serialize_flat() {
        let login = AuthenticationResponse {
            token: "a.b.c".to_string(),
            authenticated: true,
        };
        assert_eq!(
            serde_json::to_value(&login).unwrap(),
            serde_json::json!({"token": "a.b.c", "authenticated": true})
        );
        assert_eq!(
            serde_json::to_value(IntrospectResponse { valid: false }).unwrap(),
            serde_json::json!({"valid": false})
        );
    }

    #[test]
    fn token_requests_require_the_token_field() {
        assert!(serde_json::from_str::<LogoutRequest>("{}").is_err());
        let introspect: IntrospectRequest = serde_json::from_str(r#"{"token":""}"#).unwrap();
        assert!(introspect.token.is_empty());
    }
}
