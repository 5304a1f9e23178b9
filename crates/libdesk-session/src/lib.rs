//! Session lifecycle for libdesk front ends.
//!
//! [`SessionContext`] owns the session state and drives login, logout and
//! startup restoration. [`RouteTable`] decides who may open which screen and
//! [`Navigator`] applies those decisions, including the redirect to the
//! login page when the session expires.

pub mod context;
pub mod guard;
pub mod navigator;
pub mod oracle;

pub use context::{SessionContext, SessionState, requires_login};
pub use guard::{
    Access, DEFAULT_LANDING, GuardDecision, LOGIN_PATH, REGISTER_PATH, Route, RouteTable,
    UNAUTHORIZED_PATH,
};
pub use navigator::Navigator;
pub use oracle::{Authorization, has_any_role, has_role, is_authenticated};
