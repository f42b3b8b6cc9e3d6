//! # TownDesk Shared Library
//!
//! Shared types and business logic used by the TownDesk API server and
//! the client list view.
//!
//! ## Module Organization
//!
//! - `models`: Database models (tasks, user references)
//! - `lifecycle`: Validation gate, completion flips, write attribution
//! - `presentation`: Viewer-local rendering of stored UTC values
//! - `db`: Connection pool and migrations

pub mod db;
pub mod lifecycle;
pub mod models;
pub mod presentation;

/// Current version of the TownDesk shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
