/// Task endpoints
///
/// # Endpoints
///
/// - `GET    /api/tasks` - List visible tasks (optional project/assignee filter)
/// - `POST   /api/tasks` - Create a task
/// - `GET    /api/tasks/:id` - Fetch one task
/// - `PUT    /api/tasks/:id` - Update a task (validates workflow transitions)
/// - `DELETE /api/tasks/:id` - Soft-delete a task (admin only)
///
/// Every mutation writes an audit record. Updates store partial before/after
/// value bags holding only the columns that changed; creates store a full
/// `new_values` snapshot and deletes a full `old_values` snapshot. The
/// reconciler in `taskboard_shared::reconcile` consumes these bags to render
/// change history.
///
/// A status change is validated against the workflow transition graph before
/// anything is persisted; an illegal move is rejected with `409 Conflict`
/// and no audit record is written.

use crate::{
    app::{require_admin, AppState, AuthUser},
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Map, Value};
use taskboard_shared::{
    models::{
        audit_log::{AuditLog, CreateAuditLog, Operation},
        project::Project,
        task::{CreateTask, Task, TaskPriority, TaskStatus, UpdateTask},
    },
    workflow::validate_transition,
};
use uuid::Uuid;
use validator::Validate;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Project the task belongs to
    pub project_id: Uuid,

    /// Task title (unique among live tasks)
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,

    /// Optional description
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    /// Initial status (defaults to to_do)
    pub status: Option<TaskStatus>,

    /// Priority (defaults to medium)
    pub priority: Option<TaskPriority>,

    /// Optional assignee
    pub assigned_to: Option<Uuid>,

    /// Optional due date
    pub due_date: Option<NaiveDate>,
}

/// Update task request
///
/// Omitted fields are left unchanged; `null` clears a nullable field.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    /// New title
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: Option<String>,

    /// New description
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    /// New status (must be a legal transition from the current status)
    pub status: Option<TaskStatus>,

    /// New priority
    pub priority: Option<TaskPriority>,

    /// New assignee (null unassigns)
    #[serde(default, deserialize_with = "super::double_option")]
    pub assigned_to: Option<Option<Uuid>>,

    /// New due date (null clears)
    #[serde(default, deserialize_with = "super::double_option")]
    pub due_date: Option<Option<NaiveDate>>,
}

/// Filters for the task listing
#[derive(Debug, Default, Deserialize)]
pub struct TaskListQuery {
    /// Only tasks in this project
    pub project_id: Option<Uuid>,

    /// Only tasks assigned to this user
    pub assigned_to: Option<Uuid>,
}

/// Builds the audit snapshot of a task's tracked columns
///
/// Values are stored in their wire form: status codes and priority codes as
/// strings, ids as UUID strings, dates as ISO `YYYY-MM-DD`. Nullable columns
/// appear as explicit JSON nulls so the reconciler's missing-equals-null
/// convention holds either way.
fn snapshot(task: &Task) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("title".to_string(), Value::String(task.title.clone()));
    map.insert(
        "description".to_string(),
        task.description
            .clone()
            .map(Value::String)
            .unwrap_or(Value::Null),
    );
    map.insert(
        "status".to_string(),
        Value::String(task.status.as_str().to_string()),
    );
    map.insert(
        "priority".to_string(),
        Value::String(task.priority.as_str().to_string()),
    );
    map.insert(
        "assigned_to".to_string(),
        task.assigned_to
            .map(|id| Value::String(id.to_string()))
            .unwrap_or(Value::Null),
    );
    map.insert(
        "due_date".to_string(),
        task.due_date
            .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
            .unwrap_or(Value::Null),
    );
    map
}

/// Reduces two snapshots to partial before/after bags of changed columns
///
/// Returns `None` when nothing differs, so no-op updates produce no audit
/// record.
fn changed_values(
    before: &Map<String, Value>,
    after: &Map<String, Value>,
) -> Option<(Map<String, Value>, Map<String, Value>)> {
    let mut old_values = Map::new();
    let mut new_values = Map::new();

    for (key, old) in before {
        let new = after.get(key).unwrap_or(&Value::Null);
        if old != new {
            old_values.insert(key.clone(), old.clone());
            new_values.insert(key.clone(), new.clone());
        }
    }

    if old_values.is_empty() {
        None
    } else {
        Some((old_values, new_values))
    }
}

/// Checks the caller can see the project a task lives in
async fn check_project_access(
    state: &AppState,
    auth: &AuthUser,
    project_id: Uuid,
) -> ApiResult<()> {
    if require_admin(state, auth).await.is_ok() {
        return Ok(());
    }

    if Project::is_accessible_by(&state.db, project_id, auth.id).await? {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "Not a member of this project".to_string(),
        ))
    }
}

/// Lists tasks visible to the caller
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<TaskListQuery>,
) -> ApiResult<Json<Vec<Task>>> {
    if let Some(project_id) = query.project_id {
        check_project_access(&state, &auth, project_id).await?;
        return Ok(Json(Task::list_by_project(&state.db, project_id).await?));
    }

    if let Some(assignee) = query.assigned_to {
        return Ok(Json(Task::list_assigned_to(&state.db, assignee).await?));
    }

    let tasks = if require_admin(&state, &auth).await.is_ok() {
        Task::list_all(&state.db).await?
    } else {
        Task::list_accessible(&state.db, auth.id).await?
    };

    Ok(Json(tasks))
}

/// Creates a task and records its audit snapshot
///
/// # Errors
///
/// - `409 Conflict`: A live task with this title already exists
/// - `403 Forbidden`: Caller cannot access the project
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    req.validate()?;
    check_project_access(&state, &auth, req.project_id).await?;

    if Task::title_exists(&state.db, &req.title, None).await? {
        return Err(ApiError::Conflict(
            "A task with this title already exists".to_string(),
        ));
    }

    let task = Task::create(
        &state.db,
        CreateTask {
            project_id: req.project_id,
            title: req.title,
            description: req.description,
            status: req.status.unwrap_or(TaskStatus::ToDo),
            priority: req.priority.unwrap_or(TaskPriority::Medium),
            assigned_to: req.assigned_to,
            due_date: req.due_date,
            created_by: Some(auth.id),
        },
    )
    .await?;

    AuditLog::create(
        &state.db,
        CreateAuditLog {
            table_name: "tasks".to_string(),
            record_id: task.id,
            operation: Operation::Insert,
            old_values: None,
            new_values: Some(Value::Object(snapshot(&task))),
            user_id: Some(auth.id),
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// Fetches a single task
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Task>> {
    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    check_project_access(&state, &auth, task.project_id).await?;

    Ok(Json(task))
}

/// Updates a task, validating workflow transitions and recording the diff
///
/// # Errors
///
/// - `409 Conflict`: The status change is not a legal transition, or the
///   new title collides with another live task
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate()?;

    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    check_project_access(&state, &auth, task.project_id).await?;

    if let Some(ref title) = req.title {
        if title != &task.title && Task::title_exists(&state.db, title, Some(id)).await? {
            return Err(ApiError::Conflict(
                "A task with this title already exists".to_string(),
            ));
        }
    }

    // Reject illegal moves before touching the database. Sending the current
    // status back is treated as no change, not a self-transition.
    if let Some(new_status) = req.status {
        if new_status != task.status {
            validate_transition(task.status, new_status)?;
        }
    }

    let update = UpdateTask {
        title: req.title,
        description: req.description,
        status: req.status,
        priority: req.priority,
        assigned_to: req.assigned_to,
        due_date: req.due_date,
    };

    if update.is_empty() {
        return Err(ApiError::BadRequest("No fields to update".to_string()));
    }

    let before = snapshot(&task);

    let updated = Task::update(&state.db, id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let after = snapshot(&updated);

    if let Some((old_values, new_values)) = changed_values(&before, &after) {
        AuditLog::create(
            &state.db,
            CreateAuditLog {
                table_name: "tasks".to_string(),
                record_id: updated.id,
                operation: Operation::Update,
                old_values: Some(Value::Object(old_values)),
                new_values: Some(Value::Object(new_values)),
                user_id: Some(auth.id),
            },
        )
        .await?;
    }

    Ok(Json(updated))
}

/// Soft-deletes a task (admin only)
///
/// The audit record keeps a full snapshot so the history view can still
/// describe the task after it disappears from listings.
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    require_admin(&state, &auth).await?;

    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Task::soft_delete(&state.db, id).await?;

    AuditLog::create(
        &state.db,
        CreateAuditLog {
            table_name: "tasks".to_string(),
            record_id: task.id,
            operation: Operation::Delete,
            old_values: Some(Value::Object(snapshot(&task))),
            new_values: None,
            user_id: Some(auth.id),
        },
    )
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn task() -> Task {
        Task {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            title: "Write release notes".to_string(),
            description: None,
            status: TaskStatus::ToDo,
            priority: TaskPriority::Medium,
            assigned_to: None,
            due_date: None,
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            is_deleted: false,
        }
    }

    #[test]
    fn test_snapshot_uses_wire_values() {
        let mut t = task();
        t.assigned_to = Some(Uuid::nil());
        t.due_date = NaiveDate::from_ymd_opt(2024, 3, 1);

        let snap = snapshot(&t);
        assert_eq!(snap["status"], "to_do");
        assert_eq!(snap["priority"], "medium");
        assert_eq!(snap["assigned_to"], Uuid::nil().to_string());
        assert_eq!(snap["due_date"], "2024-03-01");
        assert_eq!(snap["description"], Value::Null);
    }

    #[test]
    fn test_changed_values_are_partial() {
        let before_task = task();
        let mut after_task = before_task.clone();
        after_task.status = TaskStatus::InProgress;

        let (old_values, new_values) =
            changed_values(&snapshot(&before_task), &snapshot(&after_task))
                .expect("status changed");

        // Only the changed column is present
        assert_eq!(old_values.len(), 1);
        assert_eq!(new_values.len(), 1);
        assert_eq!(old_values["status"], "to_do");
        assert_eq!(new_values["status"], "in_progress");
    }

    #[test]
    fn test_changed_values_none_when_identical() {
        let t = task();
        assert!(changed_values(&snapshot(&t), &snapshot(&t)).is_none());
    }

    #[test]
    fn test_changed_values_records_cleared_fields_as_null() {
        let mut before_task = task();
        before_task.due_date = NaiveDate::from_ymd_opt(2024, 3, 1);
        let mut after_task = before_task.clone();
        after_task.due_date = None;

        let (old_values, new_values) =
            changed_values(&snapshot(&before_task), &snapshot(&after_task))
                .expect("due date cleared");

        assert_eq!(old_values["due_date"], "2024-03-01");
        assert_eq!(new_values["due_date"], Value::Null);
    }
}
