use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::Permission;

/// Prefix that distinguishes role authorities from permission authorities in a scope.
pub const ROLE_PREFIX: &str = "ROLE_";

/// A named role and the permissions it grants, in the order the credential
/// store returned them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Role {
    name: Cow<'static, str>,
    permissions: Vec<Permission>,
}

impl Role {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            permissions: Vec::new(),
        }
    }

    pub fn with_permissions(
        name: impl Into<Cow<'static, str>>,
        permissions: impl IntoIterator<Item = Permission>,
    ) -> Self {
        Self {
            name: name.into(),
            permissions: permissions.into_iter().collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }

    /// The authority this role contributes to a scope (`ROLE_<name>`).
    pub fn authority(&self) -> String {
        format!("{ROLE_PREFIX}{}", self.name)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.name)
    }
}
