/// Database models for Taskboard
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts, profiles, and role assignments
/// - `project`: Projects and project memberships
/// - `task`: Tasks with status, priority, assignee, and due date
/// - `comment`: Free-text comments attached to tasks
/// - `audit_log`: Immutable before/after snapshots of mutating operations
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::user::{User, CreateUser};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let new_user = CreateUser {
///     username: "jdoe".to_string(),
///     email: "user@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     full_name: None,
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// # Ok(())
/// # }
/// ```

pub mod audit_log;
pub mod comment;
pub mod project;
pub mod task;
pub mod user;
