//! # Ticklist Shared Library
//!
//! This crate contains the types and business logic shared by the ticklist
//! API server and the ticklist client.
//!
//! ## Module Organization
//!
//! - `models`: Database models and per-user repositories
//! - `auth`: Password hashing, JWT tokens, and auth middleware types
//! - `db`: Connection pool and migration runner

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the ticklist shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
