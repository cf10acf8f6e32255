//! # Taskboard Shared Library
//!
//! This crate contains the domain types and business logic shared between the
//! Taskboard API server and the dashboard client.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `workflow`: Task status workflow engine (transition graph + forward advance)
//! - `reconcile`: Audit-log reconciliation into human-readable change history
//! - `auth`: JWT and password hashing utilities
//! - `db`: PostgreSQL pool and migration runner

pub mod auth;
pub mod db;
pub mod models;
pub mod reconcile;
pub mod workflow;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
