/// Project endpoints
///
/// # Endpoints
///
/// - `GET    /api/projects` - List accessible projects
/// - `POST   /api/projects` - Create a project
/// - `GET    /api/projects/:id` - Fetch one project
/// - `PUT    /api/projects/:id` - Update a project
/// - `DELETE /api/projects/:id` - Delete a project (creator or admin)
/// - `GET    /api/projects/:id/members` - List members
/// - `POST   /api/projects/:id/members` - Add a member
/// - `DELETE /api/projects/:id/members/:user_id` - Remove a member
///
/// Regular users see projects they created or belong to; admins see all.

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
use taskboard_shared::models::project::{
    CreateProject, Project, ProjectMember, UpdateProject,
};
use uuid::Uuid;
use validator::Validate;

/// Create project request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    /// Project title
    #[validate(length(min = 1, max = 100, message = "Title must be between 1 and 100 characters"))]
    pub title: String,

    /// Optional description
    pub description: Option<String>,
}

/// Update project request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    /// New title
    #[validate(length(min = 1, max = 100, message = "Title must be between 1 and 100 characters"))]
    pub title: Option<String>,

    /// New description (null clears it)
    #[serde(default, deserialize_with = "super::double_option")]
    pub description: Option<Option<String>>,
}

/// Add member request
#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    /// User to add
    pub user_id: Uuid,
}

/// Checks that the caller can see a project, admin or otherwise
async fn check_access(state: &AppState, auth: &AuthUser, project_id: Uuid) -> ApiResult<Project> {
    let project = Project::find_by_id(&state.db, project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    if require_admin(state, auth).await.is_ok() {
        return Ok(project);
    }

    if Project::is_accessible_by(&state.db, project_id, auth.id).await? {
        Ok(project)
    } else {
        Err(ApiError::Forbidden(
            "Not a member of this project".to_string(),
        ))
    }
}

/// Lists projects visible to the caller
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<Vec<Project>>> {
    let projects = if require_admin(&state, &auth).await.is_ok() {
        Project::list_all(&state.db).await?
    } else {
        Project::list_accessible(&state.db, auth.id).await?
    };

    Ok(Json(projects))
}

/// Creates a project with the caller as creator
pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    req.validate()?;

    let project = Project::create(
        &state.db,
        CreateProject {
            title: req.title,
            description: req.description,
            created_by: Some(auth.id),
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(project)))
}

/// Fetches a single project
pub async fn get_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Project>> {
    let project = check_access(&state, &auth, id).await?;
    Ok(Json(project))
}

/// Updates a project
pub async fn update_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProjectRequest>,
) -> ApiResult<Json<Project>> {
    req.validate()?;
    check_access(&state, &auth, id).await?;

    let project = Project::update(
        &state.db,
        id,
        UpdateProject {
            title: req.title,
            description: req.description,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    Ok(Json(project))
}

/// Deletes a project
///
/// Only the creator or an admin may delete; deletion cascades to tasks and
/// memberships.
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let project = Project::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    let is_creator = project.created_by == Some(auth.id);
    if !is_creator {
        require_admin(&state, &auth)
            .await
            .map_err(|_| ApiError::Forbidden("Only the creator or an admin can delete a project".to_string()))?;
    }

    Project::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Lists project members
pub async fn list_members(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<ProjectMember>>> {
    check_access(&state, &auth, id).await?;
    let members = ProjectMember::list_for_project(&state.db, id).await?;
    Ok(Json(members))
}

/// Adds a member to a project
pub async fn add_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<AddMemberRequest>,
) -> ApiResult<StatusCode> {
    check_access(&state, &auth, id).await?;
    ProjectMember::add(&state.db, id, req.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Removes a member from a project
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    check_access(&state, &auth, id).await?;

    let removed = ProjectMember::remove(&state.db, id, user_id).await?;
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Member not found".to_string()))
    }
}
