//! Authenticated client for the library management API.
//!
//! - [`SessionClient`] attaches bearer tokens and renews them on 401
//! - [`CredentialStore`] persists the token pair between runs
//! - [`SessionEvents`] tells the presentation layer when a session ends
//! - [`api`] holds typed wrappers for books, members, loans, admin and user
//!   endpoints
//! - [`Listing`] filters and pages fetched collections locally

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod listing;
pub mod store;

pub use api::{AdminApi, BooksApi, LoansApi, MembersApi, UserApi};
pub use client::{ApiResponse, PendingRequest, SessionClient, query_pairs};
pub use config::{ClientConfig, ConfigError};
pub use error::{ClientError, Result, StoreError};
pub use events::{SessionEvent, SessionEvents};
pub use listing::{DEFAULT_PAGE_SIZE, ListItem, Listing, Page};
pub use store::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
