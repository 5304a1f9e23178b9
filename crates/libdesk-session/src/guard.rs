//! Per-navigation access decisions.
//!
//! Each destination path is looked up in a [`RouteTable`] by longest prefix
//! on segment boundaries (`/loans` covers `/loans/12` but not `/loansx`).
//! Paths with no entry are protected with no role requirement.

use libdesk_core::{Role, RoleSet};

use crate::context::SessionState;

pub const ROOT_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";
/// Where authenticated users land by default.
pub const DEFAULT_LANDING: &str = "/dashboard";

/// Who may open a destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Anyone, logged in or not.
    Public,
    /// Only anonymous users; others are sent to the landing page.
    PublicOnly,
    /// Logged-in users whose role is in the set. An empty set admits any role.
    Protected(RoleSet),
}

impl Access {
    pub fn authenticated() -> Self {
        Self::Protected(RoleSet::empty())
    }

    pub fn roles(roles: &[Role]) -> Self {
        Self::Protected(RoleSet::of(roles))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// The session has not been resolved yet; render nothing.
    Loading,
    Allowed,
    /// Send to the login page and come back to `from` afterwards.
    RedirectLogin { from: String },
    RedirectUnauthorized,
    /// Already logged in; go to the landing page.
    RedirectHome,
}

impl GuardDecision {
    /// Path to navigate to instead of the requested one.
    pub fn redirect_target(&self) -> Option<&'static str> {
        match self {
            Self::RedirectLogin { .. } => Some(LOGIN_PATH),
            Self::RedirectUnauthorized => Some(UNAUTHORIZED_PATH),
            Self::RedirectHome => Some(DEFAULT_LANDING),
            Self::Loading | Self::Allowed => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub path: String,
    pub access: Access,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl Default for RouteTable {
    fn default() -> Self {
        let staff = Access::roles(Role::staff());
        Self::empty()
            .with_route(ROOT_PATH, Access::authenticated())
            .with_route(DEFAULT_LANDING, Access::authenticated())
            .with_route("/books", Access::authenticated())
            .with_route("/loans/my-loans", Access::authenticated())
            .with_route("/profile", Access::authenticated())
            .with_route("/members", staff)
            .with_route("/loans", staff)
            .with_route("/loans/overdue", staff)
            .with_route("/admin/users", Access::roles(&[Role::Admin]))
            .with_route(LOGIN_PATH, Access::PublicOnly)
            .with_route(REGISTER_PATH, Access::PublicOnly)
            .with_route(UNAUTHORIZED_PATH, Access::Public)
    }
}

impl RouteTable {
    pub fn empty() -> Self {
        Self { routes: Vec::new() }
    }

    /// Add or replace the entry for `path`.
    #[must_use]
    pub fn with_route(mut self, path: &str, access: Access) -> Self {
        let path = normalize(path).to_string();
        self.routes.retain(|r| r.path != path);
        self.routes.push(Route { path, access });
        self
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Access rule for `path`.
    pub fn access_for(&self, path: &str) -> Access {
        let path = normalize(path);
        self.routes
            .iter()
            .filter(|r| covers(&r.path, path))
            .max_by_key(|r| r.path.len())
            .map(|r| r.access)
            .unwrap_or_else(Access::authenticated)
    }

    pub fn decide(&self, path: &str, state: &SessionState) -> GuardDecision {
        if !state.resolved {
            return GuardDecision::Loading;
        }
        match self.access_for(path) {
            Access::Public => GuardDecision::Allowed,
            Access::PublicOnly if state.is_authenticated() => GuardDecision::RedirectHome,
            Access::PublicOnly => GuardDecision::Allowed,
            Access::Protected(roles) => match state.role() {
                None => GuardDecision::RedirectLogin {
                    from: path.to_string(),
                },
                Some(role) if !roles.is_empty() && !roles.contains(role) => {
                    GuardDecision::RedirectUnauthorized
                }
                Some(_) => GuardDecision::Allowed,
            },
        }
    }
}

/// Strip query and fragment and any trailing slash.
fn normalize(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let path = path[..end].trim_end_matches('/');
    if path.is_empty() { ROOT_PATH } else { path }
}

/// `/` only covers itself; other prefixes cover their sub-paths.
fn covers(route: &str, path: &str) -> bool {
    if route == ROOT_PATH {
        return path == ROOT_PATH;
    }
    path == route
        || path
            .strip_prefix(route)
            .is_some_and(|rest| rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use libdesk_core::UserProfile;

    fn state(role: Option<Role>) -> SessionState {
        SessionState {
            resolved: true,
            profile: role.map(|role| UserProfile {
                id: 1,
                username: "u".into(),
                email: "u@example.com".into(),
                first_name: String::new(),
                last_name: String::new(),
                role,
                enabled: true,
                created_at: None,
                updated_at: None,
            }),
        }
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("/books/"), "/books");
        assert_eq!(normalize("/books?page=2"), "/books");
        assert_eq!(normalize("/books#top"), "/books");
        assert_eq!(normalize(""), "/");
        assert_eq!(normalize("/"), "/");
    }

    #[test]
    fn test_longest_prefix_on_segment_boundaries() {
        let table = RouteTable::default();
        let staff = Access::roles(Role::staff());
        assert_eq!(table.access_for("/loans"), staff);
        assert_eq!(table.access_for("/loans/12"), staff);
        assert_eq!(table.access_for("/loans/my-loans"), Access::authenticated());
        assert_eq!(table.access_for("/loans/overdue"), staff);
        assert_eq!(table.access_for("/admin/users/3"), Access::roles(&[Role::Admin]));
        // Not a segment boundary, so unknown.
        assert_eq!(table.access_for("/membersx"), Access::authenticated());
        assert_eq!(table.access_for("/reports"), Access::authenticated());
    }

    #[test]
    fn test_loading_before_resolution() {
        let table = RouteTable::default();
        let unresolved = SessionState::default();
        assert_eq!(table.decide("/login", &unresolved), GuardDecision::Loading);
        assert_eq!(table.decide("/books", &unresolved), GuardDecision::Loading);
    }

    #[test]
    fn test_anonymous_is_sent_to_login() {
        let table = RouteTable::default();
        assert_eq!(
            table.decide("/members", &state(None)),
            GuardDecision::RedirectLogin {
                from: "/members".into()
            }
        );
        assert_eq!(table.decide("/login", &state(None)), GuardDecision::Allowed);
        assert_eq!(table.decide("/unauthorized", &state(None)), GuardDecision::Allowed);
    }

    #[test]
    fn test_role_requirements() {
        let table = RouteTable::default();
        let user = state(Some(Role::User));
        let librarian = state(Some(Role::Librarian));
        let admin = state(Some(Role::Admin));

        assert_eq!(table.decide("/members", &user), GuardDecision::RedirectUnauthorized);
        assert_eq!(table.decide("/members", &librarian), GuardDecision::Allowed);
        assert_eq!(table.decide("/members", &admin), GuardDecision::Allowed);
        assert_eq!(table.decide("/admin/users", &librarian), GuardDecision::RedirectUnauthorized);
        assert_eq!(table.decide("/admin/users", &admin), GuardDecision::Allowed);
        assert_eq!(table.decide("/loans/my-loans", &user), GuardDecision::Allowed);
        assert_eq!(table.decide("/books", &user), GuardDecision::Allowed);
    }

    #[test]
    fn test_public_only_redirects_home() {
        let table = RouteTable::default();
        let decision = table.decide("/register", &state(Some(Role::User)));
        assert_eq!(decision, GuardDecision::RedirectHome);
        assert_eq!(decision.redirect_target(), Some(DEFAULT_LANDING));
    }

    #[test]
    fn test_with_route_replaces_entry() {
        let table = RouteTable::default().with_route("/books/", Access::Public);
        assert_eq!(table.access_for("/books/5"), Access::Public);
        assert_eq!(
            table.routes().iter().filter(|r| r.path == "/books").count(),
            1
        );
    }
}
