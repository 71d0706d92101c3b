//! # Paytrack Shared Library
//!
//! Shared domain logic for the paytrack payment-tracking service, used by
//! the API server and its tests.
//!
//! ## Module Organization
//!
//! - `models`: Database models and persistence operations
//! - `auth`: JWT issuance/validation, password hashing, token blocklist
//! - `db`: Connection pool and migration runner

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the paytrack shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
