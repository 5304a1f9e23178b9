//! Permission tiers for library users.
//!
//! Roles are a closed set. Every authorization check in libdesk matches on
//! [`Role`] exhaustively, so a misspelled role string is rejected at parse
//! time rather than silently denying access later.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Coarse permission tier gating features and routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum Role {
    /// Regular member: browse books, view own loans.
    User,
    /// Staff: manage books, members and loans.
    Librarian,
    /// Everything, including user administration.
    Admin,
}

impl Role {
    /// Returns all roles, lowest privilege first.
    pub fn all() -> &'static [Role] {
        &[Self::User, Self::Librarian, Self::Admin]
    }

    /// Wire representation (`USER`, `LIBRARIAN`, `ADMIN`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Librarian => "LIBRARIAN",
            Self::Admin => "ADMIN",
        }
    }

    /// Roles allowed to manage the catalogue, members and loans.
    pub fn staff() -> &'static [Role] {
        &[Self::Librarian, Self::Admin]
    }

}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    /// Parses a role case-insensitively; a Spring-style `ROLE_` prefix is
    /// accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let upper = trimmed.to_ascii_uppercase();
        let name = upper.strip_prefix("ROLE_").unwrap_or(&upper);
        match name {
            "USER" => Ok(Self::User),
            "LIBRARIAN" => Ok(Self::Librarian),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(CoreError::invalid_role(trimmed)),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A set of roles, as declared by a route or endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoleSet {
    bits: u8,
}

impl RoleSet {
    /// Creates an empty set.
    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    /// Creates a set from the given roles.
    pub fn of(roles: &[Role]) -> Self {
        roles.iter().fold(Self::empty(), |set, role| set.with(*role))
    }

    /// Returns the set with `role` added.
    #[must_use]
    pub fn with(self, role: Role) -> Self {
        Self {
            bits: self.bits | Self::bit(role),
        }
    }

    pub fn contains(&self, role: Role) -> bool {
        self.bits & Self::bit(role) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Iterates the roles in the set, lowest privilege first.
    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        Role::all().iter().copied().filter(|r| self.contains(*r))
    }

    const fn bit(role: Role) -> u8 {
        match role {
            Role::User => 0b001,
            Role::Librarian => 0b010,
            Role::Admin => 0b100,
        }
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(|r| r.as_str()).collect();
        write!(f, "{}", names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roles() {
        assert_eq!("USER".parse::<Role>().unwrap(), Role::User);
        assert_eq!("librarian".parse::<Role>().unwrap(), Role::Librarian);
        assert_eq!("ROLE_ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(" Admin ".parse::<Role>().unwrap(), Role::Admin);
    }

    #[test]
    fn test_parse_unknown_role() {
        let err = "SUPERUSER".parse::<Role>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid role: SUPERUSER");
        assert!("ADMINS".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn test_serde_roundtrip_uses_wire_names() {
        let json = serde_json::to_string(&Role::Librarian).unwrap();
        assert_eq!(json, "\"LIBRARIAN\"");
        let role: Role = serde_json::from_str("\"ROLE_USER\"").unwrap();
        assert_eq!(role, Role::User);
        assert!(serde_json::from_str::<Role>("\"GUEST\"").is_err());
    }

    #[test]
    fn test_staff() {
        assert_eq!(Role::staff(), &[Role::Librarian, Role::Admin]);
    }

    #[test]
    fn test_role_set() {
        let set = RoleSet::of(&[Role::Librarian, Role::Admin]);
        assert!(set.contains(Role::Admin));
        assert!(set.contains(Role::Librarian));
        assert!(!set.contains(Role::User));
        assert!(!set.is_empty());
        assert!(RoleSet::empty().is_empty());
        assert_eq!(set.to_string(), "LIBRARIAN, ADMIN");
        assert_eq!(RoleSet::empty().with(Role::User).to_string(), "USER");
    }
}
