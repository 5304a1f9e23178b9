//! Role checks derived from the loaded profile.
//!
//! Nothing here looks at stored tokens: a user counts as authenticated only
//! once their profile has been fetched from the server.

use libdesk_core::{Role, RoleSet, UserProfile};

pub fn is_authenticated(profile: Option<&UserProfile>) -> bool {
    profile.is_some()
}

pub fn has_role(profile: Option<&UserProfile>, role: Role) -> bool {
    profile.is_some_and(|p| p.role == role)
}

pub fn has_any_role(profile: Option<&UserProfile>, roles: RoleSet) -> bool {
    profile.is_some_and(|p| roles.contains(p.role))
}

/// Owned snapshot of the session's profile for role checks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Authorization {
    profile: Option<UserProfile>,
}

impl Authorization {
    pub fn new(profile: Option<UserProfile>) -> Self {
        Self { profile }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn role(&self) -> Option<Role> {
        self.profile.as_ref().map(|p| p.role)
    }

    pub fn is_authenticated(&self) -> bool {
        is_authenticated(self.profile())
    }

    pub fn has_role(&self, role: Role) -> bool {
        has_role(self.profile(), role)
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        has_any_role(self.profile(), RoleSet::of(roles))
    }
}
