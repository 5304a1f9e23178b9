//! Typed wrappers over [`SessionClient`], one per REST area.
//!
//! Each wrapper borrows the client, so all of them share its credential
//! store and refresh gate.

mod admin;
mod books;
mod loans;
mod members;
mod user;

pub use admin::AdminApi;
pub use books::BooksApi;
pub use loans::LoansApi;
pub use members::MembersApi;
pub use user::UserApi;

use crate::client::SessionClient;

impl SessionClient {
    pub fn books(&self) -> BooksApi<'_> {
        BooksApi::new(self)
    }

    pub fn members(&self) -> MembersApi<'_> {
        MembersApi::new(self)
    }

    pub fn loans(&self) -> LoansApi<'_> {
        LoansApi::new(self)
    }

    pub fn admin(&self) -> AdminApi<'_> {
        AdminApi::new(self)
    }

    pub fn user(&self) -> UserApi<'_> {
        UserApi::new(self)
    }
}
