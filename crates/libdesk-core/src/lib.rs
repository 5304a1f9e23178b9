//! Domain types shared by the libdesk client crates.

pub mod admin;
pub mod auth;
pub mod error;
pub mod library;
pub mod role;

pub use admin::{
    Acknowledgement, AdminUserInput, ChangePassword, DashboardData, NavigationData,
    PasswordReset, ProfileUpdate, RoleChange, StatusChange, UserStats,
};
pub use auth::{Credentials, LoginRequest, RefreshTokenRequest, RegisterRequest, StoredCredentials, UserProfile};
pub use error::{ApiErrorBody, CoreError, ErrorCategory, Result};
pub use library::{
    Book, BookInput, BookSearch, Loan, LoanInput, LoanStatus, Member, MemberInput, MemberSearch,
    parse_date,
};
pub use role::{Role, RoleSet};
