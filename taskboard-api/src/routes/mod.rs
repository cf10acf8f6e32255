/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (signup, login, me)
/// - `projects`: Project CRUD and membership management
/// - `tasks`: Task CRUD with workflow validation and audit recording
/// - `comments`: Task comments
/// - `users`: User profiles and role management
/// - `audit_logs`: Audit log views with resolved user references

use serde::{Deserialize, Deserializer};

/// Deserializes a field where absence and explicit null mean different things
///
/// Serde collapses both to `None` for an `Option<Option<T>>` by default;
/// wrapping the parsed value in `Some` keeps the distinction: a missing field
/// stays `None` (leave unchanged), `null` becomes `Some(None)` (clear).
pub(crate) fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

pub mod audit_logs;
pub mod auth;
pub mod comments;
pub mod health;
pub mod projects;
pub mod tasks;
pub mod users;
