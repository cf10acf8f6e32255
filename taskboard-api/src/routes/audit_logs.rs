/// Audit log endpoints
///
/// # Endpoints
///
/// - `GET /api/audit-logs?limit=N` - Flat audit view, newest first (admin only)
/// - `GET /api/tasks/:id/audit-logs` - Change history of one task
///
/// Records are returned with resolved user references: the acting user and,
/// when the record changed `assigned_to`, the profiles of the old and new
/// assignees. Soft-deleted accounts still resolve, so old history keeps its
/// names. Consumers render the records through
/// `taskboard_shared::reconcile`.

use crate::{
    app::{require_admin, AppState, AuthUser},
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::HashMap;
use taskboard_shared::models::{
    audit_log::AuditLog,
    project::Project,
    task::Task,
    user::{Profile, User},
};
use uuid::Uuid;

/// Default number of records in the flat view
const DEFAULT_LIMIT: i64 = 50;

/// Hard cap on records per request
const MAX_LIMIT: i64 = 1000;

/// Query parameters for the flat audit view
#[derive(Debug, Default, Deserialize)]
pub struct AuditLogQuery {
    /// Maximum records to return (default 50, capped at 1000)
    pub limit: Option<i64>,
}

/// An audit record with its user references resolved
#[derive(Debug, Serialize)]
pub struct AuditLogEntry {
    /// The raw audit record
    #[serde(flatten)]
    pub log: AuditLog,

    /// Profile of the acting user
    pub user: Option<Profile>,

    /// Profile of the assignee before the change, when `assigned_to` changed
    pub old_assignee: Option<Profile>,

    /// Profile of the assignee after the change, when `assigned_to` changed
    pub new_assignee: Option<Profile>,
}

/// Attaches user and assignee profiles to a batch of audit records
///
/// Profiles are fetched in one query and joined in memory; ids that no
/// longer resolve simply come back as `None`.
async fn resolve_entries(
    pool: &PgPool,
    logs: Vec<AuditLog>,
) -> Result<Vec<AuditLogEntry>, sqlx::Error> {
    let mut ids: Vec<Uuid> = Vec::new();
    for log in &logs {
        if let Some(user_id) = log.user_id {
            ids.push(user_id);
        }
        let (old_id, new_id) = log.assignee_change();
        ids.extend(old_id);
        ids.extend(new_id);
    }
    ids.sort_unstable();
    ids.dedup();

    let profiles: HashMap<Uuid, Profile> = if ids.is_empty() {
        HashMap::new()
    } else {
        User::profiles_by_ids(pool, &ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect()
    };

    let entries = logs
        .into_iter()
        .map(|log| {
            let user = log.user_id.and_then(|id| profiles.get(&id).cloned());
            let (old_id, new_id) = log.assignee_change();
            AuditLogEntry {
                user,
                old_assignee: old_id.and_then(|id| profiles.get(&id).cloned()),
                new_assignee: new_id.and_then(|id| profiles.get(&id).cloned()),
                log,
            }
        })
        .collect();

    Ok(entries)
}

/// Flat audit view across all tracked entities (admin only)
pub async fn list_audit_logs(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<AuditLogQuery>,
) -> ApiResult<Json<Vec<AuditLogEntry>>> {
    require_admin(&state, &auth).await?;

    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let logs = AuditLog::list(&state.db, limit).await?;
    let entries = resolve_entries(&state.db, logs).await?;

    Ok(Json(entries))
}

/// Change history of one task
///
/// Visible to anyone who can see the task's project. Soft-deleted tasks are
/// excluded from listings, so their history is only reachable by admins via
/// the flat view.
pub async fn list_for_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<Vec<AuditLogEntry>>> {
    let task = Task::find_by_id(&state.db, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    if require_admin(&state, &auth).await.is_err()
        && !Project::is_accessible_by(&state.db, task.project_id, auth.id).await?
    {
        return Err(ApiError::Forbidden(
            "Not a member of this project".to_string(),
        ));
    }

    let logs = AuditLog::list_for_task(&state.db, task_id, MAX_LIMIT).await?;
    let entries = resolve_entries(&state.db, logs).await?;

    Ok(Json(entries))
}
