use std::fmt;

use serde::{Deserialize, Serialize};

/// Role name as stored on the user record.
///
/// Roles are owned by the user store, so this stays an open set. Gates compare
/// against an explicit allow-list (exact, case-sensitive match).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    pub const ADMIN: &'static str = "admin";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_one_of(&self, allowed: &[Role]) -> bool {
        allowed.iter().any(|r| r == self)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_list_is_exact_match() {
        let allowed = [Role::from("admin"), Role::from("moderator")];

        assert!(Role::from("admin").is_one_of(&allowed));
        assert!(!Role::from("Admin").is_one_of(&allowed));
        assert!(!Role::from("member").is_one_of(&allowed));
        assert!(!Role::from("admin").is_one_of(&[]));
    }
}
