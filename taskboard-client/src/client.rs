/// Typed API client
///
/// One method per server operation, grouped by resource. All authenticated
/// calls read the bearer token from the injected
/// [`TokenStore`](crate::store::TokenStore); signup and login write it.
///
/// The one-click advance ([`ApiClient::advance_task`]) runs the workflow
/// pre-flight locally: it computes the forward target for the task's current
/// status and validates it against the transition graph before issuing the
/// update, so an illegal move never leaves the process.

use crate::{
    error::{ApiErrorBody, ClientError, ClientResult},
    session::AuthSession,
    store::TokenStore,
};
use chrono::NaiveDate;
use reqwest::{Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use taskboard_shared::{
    models::{
        audit_log::AuditLog,
        comment::Comment,
        project::{Project, ProjectMember},
        task::{Task, TaskPriority, TaskStatus},
        user::{AppRole, Profile},
    },
    workflow::advance_target,
};
use uuid::Uuid;

/// Input for creating a task
#[derive(Debug, Clone, Serialize)]
pub struct NewTask {
    /// Project the task belongs to
    pub project_id: Uuid,

    /// Task title
    pub title: String,

    /// Optional description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Initial status (server defaults to to_do)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,

    /// Priority (server defaults to medium)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,

    /// Optional assignee
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Uuid>,

    /// Optional due date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

/// Partial task update
///
/// Omitted fields are left unchanged. For the nullable fields the inner
/// `Option` distinguishes clearing (`Some(None)`, sent as JSON null) from
/// leaving alone (`None`, omitted).
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskPatch {
    /// New title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// New description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// New status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,

    /// New priority
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,

    /// New assignee (Some(None) unassigns)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Option<Uuid>>,

    /// New due date (Some(None) clears)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<NaiveDate>>,
}

/// Input for creating a project
#[derive(Debug, Clone, Serialize)]
pub struct NewProject {
    /// Project title
    pub title: String,

    /// Optional description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Partial project update
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectPatch {
    /// New title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// New description (Some(None) clears)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
}

/// The current user as reported by the server
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentUser {
    /// Profile
    pub user: Profile,

    /// Current role, read fresh from the database
    pub role: AppRole,
}

/// An audit record with resolved user references
#[derive(Debug, Clone, Deserialize)]
pub struct AuditLogEntry {
    /// The raw audit record
    #[serde(flatten)]
    pub log: AuditLog,

    /// Profile of the acting user
    pub user: Option<Profile>,

    /// Assignee before the change, when `assigned_to` changed
    pub old_assignee: Option<Profile>,

    /// Assignee after the change, when `assigned_to` changed
    pub new_assignee: Option<Profile>,
}

/// Taskboard API client
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    store: Arc<dyn TokenStore>,
}

impl ApiClient {
    /// Creates a client for the given server
    ///
    /// `base_url` is the server origin (e.g. `http://localhost:8080`); the
    /// `/api` prefix is added internally.
    pub fn new(base_url: impl Into<String>, store: Arc<dyn TokenStore>) -> ClientResult<Self> {
        let http = reqwest::Client::builder().build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            http,
            base_url,
            store,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn token(&self) -> ClientResult<String> {
        self.store.get().ok_or(ClientError::NotAuthenticated)
    }

    /// Turns a response into a typed value or a typed error
    async fn handle<T: DeserializeOwned>(&self, resp: Response) -> ClientResult<T> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json().await?);
        }
        Err(self.error_from(status, resp).await)
    }

    /// Like [`Self::handle`] but for endpoints that return no body
    async fn handle_empty(&self, resp: Response) -> ClientResult<()> {
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        Err(self.error_from(status, resp).await)
    }

    /// A 401 invalidates whatever token we hold, so drop it
    async fn error_from(&self, status: StatusCode, resp: Response) -> ClientError {
        if status == StatusCode::UNAUTHORIZED {
            self.store.clear();
        }
        let message = resp.text().await.unwrap_or_default();
        match serde_json::from_str::<ApiErrorBody>(&message) {
            Ok(body) => ClientError::Api {
                status: status.as_u16(),
                code: body.error,
                message: body.message,
            },
            Err(_) => ClientError::Api {
                status: status.as_u16(),
                code: "unknown".to_string(),
                message,
            },
        }
    }

    // --- Auth ---

    /// Creates an account and stores the issued token
    pub async fn signup(
        &self,
        username: &str,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> ClientResult<AuthSession> {
        let resp = self
            .http
            .post(self.url("/auth/signup"))
            .json(&json!({
                "username": username,
                "email": email,
                "password": password,
                "full_name": full_name,
            }))
            .send()
            .await?;

        let session: AuthSession = self.handle(resp).await?;
        self.store.set(&session.access_token);
        Ok(session)
    }

    /// Logs in and stores the issued token
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<AuthSession> {
        let resp = self
            .http
            .post(self.url("/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let session: AuthSession = self.handle(resp).await?;
        self.store.set(&session.access_token);
        tracing::debug!(user = %session.user.username, "Logged in");
        Ok(session)
    }

    /// Drops the stored token
    ///
    /// Purely local; the server keeps no session state to invalidate.
    pub fn logout(&self) {
        self.store.clear();
    }

    /// Fetches the current user's profile and role
    pub async fn me(&self) -> ClientResult<CurrentUser> {
        let resp = self
            .http
            .get(self.url("/auth/me"))
            .bearer_auth(self.token()?)
            .send()
            .await?;
        self.handle(resp).await
    }

    /// Validates a previously stored token against the server
    ///
    /// Returns the current user when the stored token is still good, `None`
    /// when no token is stored or the server rejects it. A rejected token is
    /// cleared from the store.
    pub async fn restore_session(&self) -> ClientResult<Option<CurrentUser>> {
        if self.store.get().is_none() {
            return Ok(None);
        }

        match self.me().await {
            Ok(user) => Ok(Some(user)),
            Err(e) if e.is_auth_error() => Ok(None),
            Err(e) => Err(e),
        }
    }

    // --- Projects ---

    /// Lists projects visible to the current user
    pub async fn list_projects(&self) -> ClientResult<Vec<Project>> {
        let resp = self
            .http
            .get(self.url("/projects"))
            .bearer_auth(self.token()?)
            .send()
            .await?;
        self.handle(resp).await
    }

    /// Creates a project
    pub async fn create_project(&self, project: &NewProject) -> ClientResult<Project> {
        let resp = self
            .http
            .post(self.url("/projects"))
            .bearer_auth(self.token()?)
            .json(project)
            .send()
            .await?;
        self.handle(resp).await
    }

    /// Fetches one project
    pub async fn get_project(&self, id: Uuid) -> ClientResult<Project> {
        let resp = self
            .http
            .get(self.url(&format!("/projects/{}", id)))
            .bearer_auth(self.token()?)
            .send()
            .await?;
        self.handle(resp).await
    }

    /// Updates a project
    pub async fn update_project(&self, id: Uuid, patch: &ProjectPatch) -> ClientResult<Project> {
        let resp = self
            .http
            .put(self.url(&format!("/projects/{}", id)))
            .bearer_auth(self.token()?)
            .json(patch)
            .send()
            .await?;
        self.handle(resp).await
    }

    /// Deletes a project
    pub async fn delete_project(&self, id: Uuid) -> ClientResult<()> {
        let resp = self
            .http
            .delete(self.url(&format!("/projects/{}", id)))
            .bearer_auth(self.token()?)
            .send()
            .await?;
        self.handle_empty(resp).await
    }

    /// Lists project members
    pub async fn list_members(&self, project_id: Uuid) -> ClientResult<Vec<ProjectMember>> {
        let resp = self
            .http
            .get(self.url(&format!("/projects/{}/members", project_id)))
            .bearer_auth(self.token()?)
            .send()
            .await?;
        self.handle(resp).await
    }

    /// Adds a member to a project
    pub async fn add_member(&self, project_id: Uuid, user_id: Uuid) -> ClientResult<()> {
        let resp = self
            .http
            .post(self.url(&format!("/projects/{}/members", project_id)))
            .bearer_auth(self.token()?)
            .json(&json!({ "user_id": user_id }))
            .send()
            .await?;
        self.handle_empty(resp).await
    }

    /// Removes a member from a project
    pub async fn remove_member(&self, project_id: Uuid, user_id: Uuid) -> ClientResult<()> {
        let resp = self
            .http
            .delete(self.url(&format!("/projects/{}/members/{}", project_id, user_id)))
            .bearer_auth(self.token()?)
            .send()
            .await?;
        self.handle_empty(resp).await
    }

    // --- Tasks ---

    /// Lists tasks visible to the current user
    pub async fn list_tasks(&self) -> ClientResult<Vec<Task>> {
        let resp = self
            .http
            .get(self.url("/tasks"))
            .bearer_auth(self.token()?)
            .send()
            .await?;
        self.handle(resp).await
    }

    /// Lists tasks in one project
    pub async fn list_project_tasks(&self, project_id: Uuid) -> ClientResult<Vec<Task>> {
        let resp = self
            .http
            .get(self.url("/tasks"))
            .query(&[("project_id", project_id.to_string())])
            .bearer_auth(self.token()?)
            .send()
            .await?;
        self.handle(resp).await
    }

    /// Creates a task
    pub async fn create_task(&self, task: &NewTask) -> ClientResult<Task> {
        let resp = self
            .http
            .post(self.url("/tasks"))
            .bearer_auth(self.token()?)
            .json(task)
            .send()
            .await?;
        self.handle(resp).await
    }

    /// Fetches one task
    pub async fn get_task(&self, id: Uuid) -> ClientResult<Task> {
        let resp = self
            .http
            .get(self.url(&format!("/tasks/{}", id)))
            .bearer_auth(self.token()?)
            .send()
            .await?;
        self.handle(resp).await
    }

    /// Updates a task
    ///
    /// The server validates any status change against the transition graph
    /// and answers 409 for an illegal move. [`ApiClient::advance_task`]
    /// performs that check locally first.
    pub async fn update_task(&self, id: Uuid, patch: &TaskPatch) -> ClientResult<Task> {
        let resp = self
            .http
            .put(self.url(&format!("/tasks/{}", id)))
            .bearer_auth(self.token()?)
            .json(patch)
            .send()
            .await?;
        self.handle(resp).await
    }

    /// Advances a task one step along the forward progression
    ///
    /// Fetches the task, computes the forward target for its current status,
    /// validates the move against the transition graph locally, then commits
    /// it. A completed task fails the pre-flight with
    /// [`WorkflowError::AlreadyTerminal`](taskboard_shared::workflow::WorkflowError)
    /// without any write being attempted.
    pub async fn advance_task(&self, id: Uuid) -> ClientResult<Task> {
        let task = self.get_task(id).await?;
        let next = advance_target(task.status)?;
        tracing::debug!(task_id = %id, from = %task.status, to = %next, "Advancing task");

        self.update_task(
            id,
            &TaskPatch {
                status: Some(next),
                ..Default::default()
            },
        )
        .await
    }

    /// Soft-deletes a task (admin only)
    pub async fn delete_task(&self, id: Uuid) -> ClientResult<()> {
        let resp = self
            .http
            .delete(self.url(&format!("/tasks/{}", id)))
            .bearer_auth(self.token()?)
            .send()
            .await?;
        self.handle_empty(resp).await
    }

    // --- Comments ---

    /// Lists comments on a task, oldest first
    pub async fn list_comments(&self, task_id: Uuid) -> ClientResult<Vec<Comment>> {
        let resp = self
            .http
            .get(self.url(&format!("/tasks/{}/comments", task_id)))
            .bearer_auth(self.token()?)
            .send()
            .await?;
        self.handle(resp).await
    }

    /// Adds a comment to a task
    pub async fn add_comment(&self, task_id: Uuid, content: &str) -> ClientResult<Comment> {
        let resp = self
            .http
            .post(self.url(&format!("/tasks/{}/comments", task_id)))
            .bearer_auth(self.token()?)
            .json(&json!({ "content": content }))
            .send()
            .await?;
        self.handle(resp).await
    }

    /// Deletes a comment (author only)
    pub async fn delete_comment(&self, id: Uuid) -> ClientResult<()> {
        let resp = self
            .http
            .delete(self.url(&format!("/comments/{}", id)))
            .bearer_auth(self.token()?)
            .send()
            .await?;
        self.handle_empty(resp).await
    }

    // --- Users ---

    /// Lists all user profiles
    pub async fn list_users(&self) -> ClientResult<Vec<Profile>> {
        let resp = self
            .http
            .get(self.url("/users"))
            .bearer_auth(self.token()?)
            .send()
            .await?;
        self.handle(resp).await
    }

    /// Updates the caller's own profile
    ///
    /// `Some(None)` clears a field, `None` leaves it unchanged.
    pub async fn update_profile(
        &self,
        full_name: Option<Option<&str>>,
        avatar_url: Option<Option<&str>>,
    ) -> ClientResult<Profile> {
        let mut body = serde_json::Map::new();
        if let Some(name) = full_name {
            body.insert("full_name".to_string(), json!(name));
        }
        if let Some(url) = avatar_url {
            body.insert("avatar_url".to_string(), json!(url));
        }

        let resp = self
            .http
            .put(self.url("/users/me"))
            .bearer_auth(self.token()?)
            .json(&body)
            .send()
            .await?;
        self.handle(resp).await
    }

    /// Soft-deletes an account (admin only)
    pub async fn delete_user(&self, user_id: Uuid) -> ClientResult<()> {
        let resp = self
            .http
            .delete(self.url(&format!("/users/{}", user_id)))
            .bearer_auth(self.token()?)
            .send()
            .await?;
        self.handle_empty(resp).await
    }

    /// Assigns a role to a user (admin only)
    pub async fn set_role(&self, user_id: Uuid, role: AppRole) -> ClientResult<()> {
        let resp = self
            .http
            .put(self.url(&format!("/users/{}/role", user_id)))
            .bearer_auth(self.token()?)
            .json(&json!({ "role": role }))
            .send()
            .await?;
        self.handle_empty(resp).await
    }

    // --- Audit logs ---

    /// Flat audit view, newest first (admin only)
    pub async fn list_audit_logs(&self, limit: Option<i64>) -> ClientResult<Vec<AuditLogEntry>> {
        let mut req = self
            .http
            .get(self.url("/audit-logs"))
            .bearer_auth(self.token()?);

        if let Some(limit) = limit {
            req = req.query(&[("limit", limit.to_string())]);
        }

        let resp = req.send().await?;
        self.handle(resp).await
    }

    /// Change history of one task
    pub async fn task_history(&self, task_id: Uuid) -> ClientResult<Vec<AuditLogEntry>> {
        let resp = self
            .http
            .get(self.url(&format!("/tasks/{}/audit-logs", task_id)))
            .bearer_auth(self.token()?)
            .send()
            .await?;
        self.handle(resp).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryTokenStore;

    fn client() -> ApiClient {
        ApiClient::new("http://localhost:8080/", Arc::new(MemoryTokenStore::new())).unwrap()
    }

    #[test]
    fn test_url_joining_strips_trailing_slash() {
        let c = client();
        assert_eq!(c.url("/tasks"), "http://localhost:8080/api/tasks");
    }

    #[test]
    fn test_token_required_for_authenticated_calls() {
        let c = client();
        assert!(matches!(c.token(), Err(ClientError::NotAuthenticated)));

        c.store.set("tok");
        assert_eq!(c.token().unwrap(), "tok");

        c.logout();
        assert!(c.token().is_err());
    }

    #[test]
    fn test_task_patch_omits_unset_and_nulls_cleared() {
        let patch = TaskPatch {
            status: Some(TaskStatus::InProgress),
            due_date: Some(None),
            ..Default::default()
        };

        let value = serde_json::to_value(&patch).unwrap();
        let obj = value.as_object().unwrap();

        // Unset fields are absent entirely
        assert!(!obj.contains_key("title"));
        assert!(!obj.contains_key("assigned_to"));

        // Set fields serialize to their value; cleared fields to null
        assert_eq!(obj["status"], "in_progress");
        assert_eq!(obj["due_date"], serde_json::Value::Null);
    }
}
