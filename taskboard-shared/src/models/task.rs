/// Task model and database operations
///
/// Tasks are the central entity of the dashboard. Each task belongs to a
/// project, carries a workflow status, a priority, an optional assignee, and
/// an optional due date. Every mutation of a task is mirrored by an audit
/// record (see [`crate::models::audit_log`]).
///
/// The status transition rules live in [`crate::workflow`]; this module only
/// defines the closed status domain and the persistence operations.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('to_do', 'in_progress', 'under_review', 'completed');
/// CREATE TYPE task_priority AS ENUM ('low', 'medium', 'high');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     status task_status NOT NULL DEFAULT 'to_do',
///     priority task_priority NOT NULL DEFAULT 'medium',
///     assigned_to UUID REFERENCES users(id) ON DELETE SET NULL,
///     due_date DATE,
///     created_by UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     is_deleted BOOLEAN NOT NULL DEFAULT FALSE
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Task workflow status
///
/// The status domain is closed: every stored status is one of these four
/// values, and strings outside the set fail to parse instead of silently
/// producing an unknown state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started
    ToDo,

    /// Being worked on
    InProgress,

    /// Waiting for review
    UnderReview,

    /// Done
    Completed,
}

impl TaskStatus {
    /// All statuses in canonical forward order
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::ToDo,
        TaskStatus::InProgress,
        TaskStatus::UnderReview,
        TaskStatus::Completed,
    ];

    /// Converts status to its wire/database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::ToDo => "to_do",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::UnderReview => "under_review",
            TaskStatus::Completed => "completed",
        }
    }

    /// Human-readable label for column headers and tags
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::ToDo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::UnderReview => "Under Review",
            TaskStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the four known status codes
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown task status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for TaskStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "to_do" => Ok(TaskStatus::ToDo),
            "in_progress" => Ok(TaskStatus::InProgress),
            "under_review" => Ok(TaskStatus::UnderReview),
            "completed" => Ok(TaskStatus::Completed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    /// Converts priority to its wire/database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            TaskPriority::Low => "Low",
            TaskPriority::Medium => "Medium",
            TaskPriority::High => "High",
        }
    }
}

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Project this task belongs to
    pub project_id: Uuid,

    /// Task title (unique among non-deleted tasks)
    pub title: String,

    /// Optional longer description
    pub description: Option<String>,

    /// Current workflow status
    pub status: TaskStatus,

    /// Priority
    pub priority: TaskPriority,

    /// Assigned user (None = unassigned)
    pub assigned_to: Option<Uuid>,

    /// Optional due date
    pub due_date: Option<NaiveDate>,

    /// User who created the task (nullable if user deleted)
    pub created_by: Option<Uuid>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,

    /// Soft-delete flag; deleted tasks are excluded from all listings
    pub is_deleted: bool,
}

/// Input for creating a new task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// Project ID
    pub project_id: Uuid,

    /// Task title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Initial status (defaults to ToDo)
    #[serde(default = "default_status")]
    pub status: TaskStatus,

    /// Priority (defaults to Medium)
    #[serde(default = "default_priority")]
    pub priority: TaskPriority,

    /// Optional assignee
    pub assigned_to: Option<Uuid>,

    /// Optional due date
    pub due_date: Option<NaiveDate>,

    /// User creating the task
    pub created_by: Option<Uuid>,
}

fn default_status() -> TaskStatus {
    TaskStatus::ToDo
}

fn default_priority() -> TaskPriority {
    TaskPriority::Medium
}

/// Input for updating a task
///
/// All fields are optional. The inner `Option` on `assigned_to` and
/// `due_date` distinguishes "clear the value" (`Some(None)`) from
/// "leave unchanged" (`None`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New status (must be a valid transition from the current status)
    pub status: Option<TaskStatus>,

    /// New priority
    pub priority: Option<TaskPriority>,

    /// New assignee (use Some(None) to unassign)
    pub assigned_to: Option<Option<Uuid>>,

    /// New due date (use Some(None) to clear)
    pub due_date: Option<Option<NaiveDate>>,
}

impl UpdateTask {
    /// True if no field is set
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.assigned_to.is_none()
            && self.due_date.is_none()
    }
}

const TASK_COLUMNS: &str = "id, project_id, title, description, status, priority, \
                            assigned_to, due_date, created_by, created_at, updated_at, is_deleted";

impl Task {
    /// Creates a new task
    ///
    /// # Errors
    ///
    /// Returns an error if the project doesn't exist or the database
    /// operation fails. Title uniqueness is checked by the caller via
    /// [`Task::title_exists`] so it can surface a friendly error.
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (project_id, title, description, status, priority, assigned_to, due_date, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(data.project_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.status)
        .bind(data.priority)
        .bind(data.assigned_to)
        .bind(data.due_date)
        .bind(data.created_by)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a non-deleted task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE id = $1 AND is_deleted = FALSE
            "#,
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists non-deleted tasks for a project, newest first
    pub async fn list_by_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE project_id = $1 AND is_deleted = FALSE
            ORDER BY created_at DESC
            "#,
        ))
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Lists non-deleted tasks assigned to a user, newest first
    pub async fn list_assigned_to(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE assigned_to = $1 AND is_deleted = FALSE
            ORDER BY created_at DESC
            "#,
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Lists all non-deleted tasks (admin view), newest first
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE is_deleted = FALSE
            ORDER BY created_at DESC
            "#,
        ))
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Lists non-deleted tasks in projects the user can access
    ///
    /// A project is accessible when the user created it or is a member of it.
    /// Admins bypass this and use [`Task::list_all`].
    pub async fn list_accessible(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE is_deleted = FALSE
              AND project_id IN (
                  SELECT id FROM projects WHERE created_by = $1
                  UNION
                  SELECT project_id FROM project_members WHERE user_id = $1
              )
            ORDER BY created_at DESC
            "#,
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Checks whether a non-deleted task with this title already exists
    ///
    /// Pass `exclude_id` when updating so the task doesn't collide with itself.
    pub async fn title_exists(
        pool: &PgPool,
        title: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM tasks
                WHERE title = $1 AND is_deleted = FALSE AND ($2::uuid IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(title)
        .bind(exclude_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Updates a task
    ///
    /// Only set fields are written. The `updated_at` timestamp is always
    /// refreshed. Status transition validity is the caller's responsibility
    /// (validated in the API handler against the workflow graph before this
    /// is called).
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        if data.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(", priority = ${}", bind_count));
        }
        if data.assigned_to.is_some() {
            bind_count += 1;
            query.push_str(&format!(", assigned_to = ${}", bind_count));
        }
        if data.due_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", due_date = ${}", bind_count));
        }

        query.push_str(&format!(
            " WHERE id = $1 AND is_deleted = FALSE RETURNING {TASK_COLUMNS}"
        ));

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }
        if let Some(priority) = data.priority {
            q = q.bind(priority);
        }
        if let Some(assigned_to) = data.assigned_to {
            q = q.bind(assigned_to);
        }
        if let Some(due_date) = data.due_date {
            q = q.bind(due_date);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Soft-deletes a task
    ///
    /// The row stays in place so its audit trail keeps resolving; it simply
    /// disappears from listings.
    pub async fn soft_delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE tasks
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

    #[test]
    fn test_status_as_str_round_trip() {
        for status in TaskStatus::ALL {
            assert_eq!(status.as_str().parse::<TaskStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_status_parse_rejects_unknown() {
        assert_eq!(
            "archived".parse::<TaskStatus>(),
            Err(UnknownStatus("archived".to_string()))
        );
        assert!("".parse::<TaskStatus>().is_err());
        // Display labels are not wire codes
        assert!("To Do".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(TaskStatus::ToDo.label(), "To Do");
        assert_eq!(TaskStatus::UnderReview.label(), "Under Review");
    }

    #[test]
    fn test_status_serde_uses_snake_case() {
        let json = serde_json::to_string(&TaskStatus::UnderReview).unwrap();
        assert_eq!(json, "\"under_review\"");
        let back: TaskStatus = serde_json::from_str("\"in_progress\"").unwrap();
        assert_eq!(back, TaskStatus::InProgress);
    }

    #[test]
    fn test_priority_as_str() {
        assert_eq!(TaskPriority::Low.as_str(), "low");
        assert_eq!(TaskPriority::Medium.as_str(), "medium");
        assert_eq!(TaskPriority::High.as_str(), "high");
    }

    #[test]
    fn test_update_task_is_empty() {
        assert!(UpdateTask::default().is_empty());

        let update = UpdateTask {
            status: Some(TaskStatus::InProgress),
            ..Default::default()
        };
        assert!(!update.is_empty());

        // Clearing a field still counts as a change
        let clear = UpdateTask {
            assigned_to: Some(None),
            ..Default::default()
        };
        assert!(!clear.is_empty());
    }
}
