/// Comment endpoints
///
/// # Endpoints
///
/// - `GET    /api/tasks/:id/comments` - List comments on a task
/// - `POST   /api/tasks/:id/comments` - Add a comment
/// - `DELETE /api/comments/:id` - Delete a comment (author only)
///
/// Comments are immutable once created; deletion by the author is the only
/// mutation.

use crate::{
    app::{require_admin, AppState, AuthUser},
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use taskboard_shared::models::{
    comment::{Comment, CreateComment},
    project::Project,
    task::Task,
};
use uuid::Uuid;
use validator::Validate;

/// Create comment request
#[derive(Debug, Deserialize, Validate)]
pub struct CommentRequest {
    /// Comment text
    #[validate(length(
        min = 1,
        max = 1000,
        message = "Comment must be between 1 and 1000 characters"
    ))]
    pub content: String,
}

/// Loads a task and verifies the caller can see its project
async fn check_task_access(state: &AppState, auth: &AuthUser, task_id: Uuid) -> ApiResult<Task> {
    let task = Task::find_by_id(&state.db, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    if require_admin(state, auth).await.is_err()
        && !Project::is_accessible_by(&state.db, task.project_id, auth.id).await?
    {
        return Err(ApiError::Forbidden(
            "Not a member of this project".to_string(),
        ));
    }

    Ok(task)
}

/// Lists comments on a task, oldest first
pub async fn list_comments(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Comment>>> {
    check_task_access(&state, &auth, task_id).await?;
    let comments = Comment::list_for_task(&state.db, task_id).await?;
    Ok(Json(comments))
}

/// Adds a comment to a task
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<CommentRequest>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    req.validate()?;
    check_task_access(&state, &auth, task_id).await?;

    let comment = Comment::create(
        &state.db,
        CreateComment {
            task_id,
            user_id: Some(auth.id),
            content: req.content,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

/// Deletes a comment; only the author may delete
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let comment = Comment::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;

    if !comment.is_authored_by(auth.id) {
        return Err(ApiError::Forbidden(
            "Only the author can delete a comment".to_string(),
        ));
    }

    Comment::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
