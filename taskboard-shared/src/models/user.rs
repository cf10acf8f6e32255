/// User model and database operations
///
/// This module provides the User model, the public Profile projection, and
/// the role assignment operations. Authorization is a binary split: a user
/// either holds the admin role (via a row in `user_roles`) or is a regular
/// user. Absence of a role row means regular user.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE app_role AS ENUM ('admin', 'user');
///
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     username VARCHAR(50) NOT NULL UNIQUE,
///     email CITEXT NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     full_name VARCHAR(255),
///     avatar_url VARCHAR(512),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     is_deleted BOOLEAN NOT NULL DEFAULT FALSE
/// );
///
/// CREATE TABLE user_roles (
///     user_id UUID PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
///     role app_role NOT NULL DEFAULT 'user'
/// );
/// ```
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
///     full_name: Some("John Doe".to_string()),
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// println!("Created user: {}", user.id);
///
/// // Find by email for login
/// let found = User::find_by_email(&pool, "user@example.com").await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Application role
///
/// Binary authorization model. Admins see all projects and tasks, may
/// soft-delete tasks, read the audit log, and manage roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "app_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AppRole {
    Admin,
    User,
}

impl AppRole {
    /// Converts role to its wire/database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            AppRole::Admin => "admin",
            AppRole::User => "user",
        }
    }

    /// True for the admin role
    pub fn is_admin(&self) -> bool {
        matches!(self, AppRole::Admin)
    }
}

/// User account
///
/// Passwords are stored as Argon2id hashes, never in plaintext. Accounts are
/// soft-deleted so that audit records and comments keep resolving.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Unique handle used for display fallbacks
    pub username: String,

    /// Email address (case-insensitive via CITEXT)
    ///
    /// Must be unique across all users
    pub email: String,

    /// Argon2id password hash
    ///
    /// Never store plaintext passwords!
    /// Use `argon2` crate for hashing/verification
    pub password_hash: String,

    /// Optional display name
    pub full_name: Option<String>,

    /// Optional avatar/profile picture URL
    pub avatar_url: Option<String>,

    /// When the user account was created
    pub created_at: DateTime<Utc>,

    /// When the user account was last updated
    pub updated_at: DateTime<Utc>,

    /// Soft-delete flag; deleted accounts cannot log in
    pub is_deleted: bool,
}

/// Public projection of a user account
///
/// Everything in [`User`] except the password hash and the soft-delete flag.
/// This is what API responses carry and what the reconciler resolves
/// assignee references against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    /// Unique user ID
    pub id: Uuid,

    /// Unique handle
    pub username: String,

    /// Email address
    pub email: String,

    /// Optional display name
    pub full_name: Option<String>,

    /// Optional avatar URL
    pub avatar_url: Option<String>,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Preferred display name: full name, falling back to the username
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.username)
    }
}

impl From<User> for Profile {
    fn from(user: User) -> Self {
        Profile {
            id: user.id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            avatar_url: user.avatar_url,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Unique handle
    pub username: String,

    /// Email address
    pub email: String,

    /// Argon2id password hash (NOT plaintext password!)
    pub password_hash: String,

    /// Optional display name
    pub full_name: Option<String>,
}

/// Input for updating an existing user
///
/// All fields are optional. Only non-None fields will be updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    /// New email address
    pub email: Option<String>,

    /// New password hash
    pub password_hash: Option<String>,

    /// New display name (use Some(None) to clear)
    pub full_name: Option<Option<String>>,

    /// New avatar URL (use Some(None) to clear)
    pub avatar_url: Option<Option<String>>,
}

const USER_COLUMNS: &str = "id, username, email, password_hash, full_name, avatar_url, \
                            created_at, updated_at, is_deleted";

const PROFILE_COLUMNS: &str = "id, username, email, full_name, avatar_url, created_at, updated_at";

impl User {
    /// Creates a new user account
    ///
    /// # Errors
    ///
    /// Returns an error if the username or email already exists (unique
    /// constraint violation) or the database operation fails.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, password_hash, full_name)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(data.username)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.full_name)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a non-deleted user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE id = $1 AND is_deleted = FALSE
            "#,
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a non-deleted user by email address
    ///
    /// Lookup is case-insensitive (via CITEXT column type). Used for login.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE email = $1 AND is_deleted = FALSE
            "#,
        ))
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a non-deleted user by username
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE username = $1 AND is_deleted = FALSE
            "#,
        ))
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Updates an existing user
    ///
    /// Only non-None fields in `data` will be updated. The `updated_at`
    /// timestamp is automatically set to the current time.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.email.is_some() {
            bind_count += 1;
            query.push_str(&format!(", email = ${}", bind_count));
        }
        if data.password_hash.is_some() {
            bind_count += 1;
            query.push_str(&format!(", password_hash = ${}", bind_count));
        }
        if data.full_name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", full_name = ${}", bind_count));
        }
        if data.avatar_url.is_some() {
            bind_count += 1;
            query.push_str(&format!(", avatar_url = ${}", bind_count));
        }

        query.push_str(&format!(
            " WHERE id = $1 AND is_deleted = FALSE RETURNING {USER_COLUMNS}"
        ));

        let mut q = sqlx::query_as::<_, User>(&query).bind(id);

        if let Some(email) = data.email {
            q = q.bind(email);
        }
        if let Some(password_hash) = data.password_hash {
            q = q.bind(password_hash);
        }
        if let Some(full_name) = data.full_name {
            q = q.bind(full_name);
        }
        if let Some(avatar_url) = data.avatar_url {
            q = q.bind(avatar_url);
        }

        let user = q.fetch_optional(pool).await?;

        Ok(user)
    }

    /// Lists profiles of all non-deleted users, ordered by username
    ///
    /// Used to populate assignee pickers and the admin user table.
    pub async fn list_profiles(pool: &PgPool) -> Result<Vec<Profile>, sqlx::Error> {
        let profiles = sqlx::query_as::<_, Profile>(&format!(
            r#"
            SELECT {PROFILE_COLUMNS}
            FROM users
            WHERE is_deleted = FALSE
            ORDER BY username
            "#,
        ))
        .fetch_all(pool)
        .await?;

        Ok(profiles)
    }

    /// Fetches the profiles for a set of user ids
    ///
    /// Soft-deleted users are included here on purpose: audit history must
    /// keep resolving names for accounts that no longer exist.
    pub async fn profiles_by_ids(
        pool: &PgPool,
        ids: &[Uuid],
    ) -> Result<Vec<Profile>, sqlx::Error> {
        let profiles = sqlx::query_as::<_, Profile>(&format!(
            r#"
            SELECT {PROFILE_COLUMNS}
            FROM users
            WHERE id = ANY($1)
            "#,
        ))
        .bind(ids)
        .fetch_all(pool)
        .await?;

        Ok(profiles)
    }

    /// Returns the role of a user
    ///
    /// A user without a `user_roles` row is a regular user.
    pub async fn role(pool: &PgPool, user_id: Uuid) -> Result<AppRole, sqlx::Error> {
        let role: Option<AppRole> =
            sqlx::query_scalar("SELECT role FROM user_roles WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(pool)
                .await?;

        Ok(role.unwrap_or(AppRole::User))
    }

    /// Assigns a role to a user, replacing any existing assignment
    pub async fn set_role(pool: &PgPool, user_id: Uuid, role: AppRole) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET role = EXCLUDED.role
            "#,
        )
        .bind(user_id)
        .bind(role)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Soft-deletes a user account
    pub async fn soft_delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET is_deleted = TRUE, updated_at = NOW()
            WHERE id = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "jdoe".to_string(),
            email: "jdoe@example.com".to_string(),
            password_hash: "hash".to_string(),
            full_name: Some("John Doe".to_string()),
            avatar_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            is_deleted: false,
        }
    }

    #[test]
    fn test_role_as_str() {
        assert_eq!(AppRole::Admin.as_str(), "admin");
        assert_eq!(AppRole::User.as_str(), "user");
        assert!(AppRole::Admin.is_admin());
        assert!(!AppRole::User.is_admin());
    }

    #[test]
    fn test_profile_drops_password_hash() {
        let profile = Profile::from(user());
        let json = serde_json::to_value(&profile).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "jdoe");
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        let mut profile = Profile::from(user());
        assert_eq!(profile.display_name(), "John Doe");

        profile.full_name = None;
        assert_eq!(profile.display_name(), "jdoe");
    }

    #[test]
    fn test_update_user_default() {
        let update = UpdateUser::default();
        assert!(update.email.is_none());
        assert!(update.password_hash.is_none());
        assert!(update.full_name.is_none());
        assert!(update.avatar_url.is_none());
    }
}
