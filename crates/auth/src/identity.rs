use identity_core::{DomainError, DomainResult, UserId};

use crate::Role;

/// Read-only snapshot of a user as seen by the token core.
///
/// The credential store owns the live user/role/permission graph; this is the
/// projection it hands over (username plus ordered roles, each with ordered
/// permissions).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    id: UserId,
    username: String,
    roles: Vec<Role>,
}

impl Identity {
    pub fn new(id: UserId, username: impl Into<String>, roles: Vec<Role>) -> DomainResult<Self> {
        let username = username.into();
        if username.trim().is_empty() {
            return Err(DomainError::validation("username must not be blank"));
        }
        Ok(Self { id, username, roles })
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_username_is_rejected() {
        let err = Identity::new(UserId::new(), "   ", vec![]).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn roles_keep_their_order() {
        let identity = Identity::new(
            UserId::new(),
            "john12",
            vec![Role::new("VIEWER"), Role::new("ADMIN")],
        )
        .unwrap();

        let names: Vec<_> = identity.roles().iter().map(Role::name).collect();
        assert_eq!(names, ["VIEWER", "ADMIN"]);
    }
}
