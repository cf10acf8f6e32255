/// Comment model and database operations
///
/// Free-text comments attached to tasks. Comments are immutable once
/// created; the only mutation is deletion by the author.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE comments (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     task_id UUID NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     user_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     content TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Comment on a task
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    /// Unique comment ID
    pub id: Uuid,

    /// Task this comment belongs to
    pub task_id: Uuid,

    /// Author (nullable if user deleted)
    pub user_id: Option<Uuid>,

    /// Comment text
    pub content: String,

    /// When the comment was created
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// True when the given user wrote this comment
    ///
    /// A comment whose author account was deleted belongs to nobody.
    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.user_id == Some(user_id)
    }
}

/// Input for creating a comment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateComment {
    /// Task to attach the comment to
    pub task_id: Uuid,

    /// Author
    pub user_id: Option<Uuid>,

    /// Comment text
    pub content: String,
}

const COMMENT_COLUMNS: &str = "id, task_id, user_id, content, created_at";

impl Comment {
    /// Creates a new comment
    pub async fn create(pool: &PgPool, data: CreateComment) -> Result<Self, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            r#"
            INSERT INTO comments (task_id, user_id, content)
            VALUES ($1, $2, $3)
            RETURNING {COMMENT_COLUMNS}
            "#,
        ))
        .bind(data.task_id)
        .bind(data.user_id)
        .bind(data.content)
        .fetch_one(pool)
        .await?;

        Ok(comment)
    }

    /// Finds a comment by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM comments
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(comment)
    }

    /// Lists comments on a task, oldest first
    pub async fn list_for_task(pool: &PgPool, task_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let comments = sqlx::query_as::<_, Comment>(&format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM comments
            WHERE task_id = $1
            ORDER BY created_at
            "#,
        ))
        .bind(task_id)
        .fetch_all(pool)
        .await?;

        Ok(comments)
    }

    /// Deletes a comment
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(user_id: Option<Uuid>) -> Comment {
        Comment {
            id: Uuid::new_v4(),
            task_id: Uuid::new_v4(),
            user_id,
            content: "Looks good".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_only_the_author_owns_a_comment() {
        let author = Uuid::new_v4();
        let c = comment(Some(author));

        assert!(c.is_authored_by(author));
        assert!(!c.is_authored_by(Uuid::new_v4()));
    }

    #[test]
    fn test_orphaned_comment_has_no_author() {
        let c = comment(None);
        assert!(!c.is_authored_by(Uuid::new_v4()));
    }
}
