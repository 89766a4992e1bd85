//! # Folio Core
//!
//! Core library for Folio - the admin backend of a portfolio site.
//!
//! This crate provides the persistence and authentication layers that every
//! route handler builds on, independent of any HTTP framework.
//!
//! ## Architecture
//!
//! - **store**: File-backed document collections with equality filters,
//!   sort, limit and upsert, persisted as whole JSON snapshots
//! - **auth**: Password hashing and revocable, version-checked session tokens
//! - **models**: Typed records for each collection (services, projects, ...)
//! - **accounts**: Admin login, bootstrap and password rotation
//! - **stats**: Dashboard counters

pub mod accounts;
pub mod auth;
pub mod error;
pub mod fs;
pub mod models;
pub mod stats;
pub mod store;

pub use accounts::{AdminAccounts, BootstrapAdmin, LoginSession};
pub use auth::{Identity, SessionClaims, TokenSigner};
pub use error::{FolioError, Result};
pub use stats::DashboardStats;
pub use store::{Collection, CollectionName, Cursor, Document, Filter, SortOrder, Store, Update};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
