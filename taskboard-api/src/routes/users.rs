/// User endpoints
///
/// # Endpoints
///
/// - `GET    /api/users` - List user profiles (for assignee pickers)
/// - `PUT    /api/users/me` - Update own profile
/// - `GET    /api/users/:id` - Fetch one profile
/// - `DELETE /api/users/:id` - Soft-delete an account (admin only)
/// - `PUT    /api/users/:id/role` - Assign a role (admin only)

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
use taskboard_shared::models::user::{AppRole, Profile, UpdateUser, User};
use uuid::Uuid;
use validator::Validate;

/// Role assignment request
#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    /// Role to assign
    pub role: AppRole,
}

/// Profile update request
///
/// Omitted fields are left unchanged; `null` clears a nullable field.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    /// New display name (null clears it)
    #[serde(default, deserialize_with = "super::double_option")]
    pub full_name: Option<Option<String>>,

    /// New avatar URL (null clears it)
    #[serde(default, deserialize_with = "super::double_option")]
    pub avatar_url: Option<Option<String>>,
}

/// Lists all user profiles
pub async fn list_users(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthUser>,
) -> ApiResult<Json<Vec<Profile>>> {
    let profiles = User::list_profiles(&state.db).await?;
    Ok(Json(profiles))
}

/// Fetches one user profile
pub async fn get_user(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Profile>> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(Profile::from(user)))
}

/// Updates the caller's own profile
pub async fn update_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<Profile>> {
    req.validate()?;

    if req.full_name.is_none() && req.avatar_url.is_none() {
        return Err(ApiError::BadRequest("No fields to update".to_string()));
    }

    let user = User::update(
        &state.db,
        auth.id,
        UpdateUser {
            full_name: req.full_name,
            avatar_url: req.avatar_url,
            ..Default::default()
        },
    )
    .await?
    .ok_or_else(|| ApiError::Unauthorized("Account no longer exists".to_string()))?;

    Ok(Json(Profile::from(user)))
}

/// Soft-deletes an account (admin only)
///
/// Admins cannot delete themselves. The account disappears from listings but
/// keeps resolving in audit history and old comments.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    require_admin(&state, &auth).await?;

    if id == auth.id {
        return Err(ApiError::BadRequest(
            "Cannot delete your own account".to_string(),
        ));
    }

    let deleted = User::soft_delete(&state.db, id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("User not found".to_string()))
    }
}

/// Assigns a role to a user (admin only)
///
/// Admins cannot demote themselves; this keeps the system from ending up
/// with no admin at all.
pub async fn set_role(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetRoleRequest>,
) -> ApiResult<StatusCode> {
    require_admin(&state, &auth).await?;

    if id == auth.id && req.role != AppRole::Admin {
        return Err(ApiError::BadRequest(
            "Cannot remove your own admin role".to_string(),
        ));
    }

    User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    User::set_role(&state.db, id, req.role).await?;
    Ok(StatusCode::NO_CONTENT)
}
