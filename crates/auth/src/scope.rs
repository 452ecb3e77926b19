//! Authorization scope carried in the `scope` claim.

use serde::{Deserialize, Serialize};

use crate::{Identity, Role};

/// Space-separated authorities: `ROLE_<name>` for each role, followed
/// immediately by that role's bare permission names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scope(String);

impl Scope {
    pub fn for_identity(identity: &Identity) -> Self {
        build_scope(identity.roles())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn authorities(&self) -> impl Iterator<Item = &str> {
        self.0.split(' ').filter(|a| !a.is_empty())
    }

    pub fn contains(&self, authority: &str) -> bool {
        self.authorities().any(|a| a == authority)
    }
}

impl core::fmt::Display for Scope {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the scope for an ordered list of roles.
///
/// Pure: roles in collection order, each role's permissions right after its
/// role authority. No roles yields an empty scope.
pub fn build_scope(roles: &[Role]) -> Scope {
    let mut authorities: Vec<String> = Vec::new();
    for role in roles {
        authorities.push(role.authority());
        authorities.extend(role.permissions().iter().map(|p| p.as_str().to_owned()));
    }
    Scope(authorities.join(" "))
}
