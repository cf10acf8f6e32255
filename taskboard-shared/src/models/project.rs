/// Project model and membership operations
///
/// Projects group tasks and carry a membership list. Access control is
/// derived from membership: a regular user sees a project when they created
/// it or are a member; admins see everything.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(100) NOT NULL,
///     description TEXT,
///     created_by UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE project_members (
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     added_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (project_id, user_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Project model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    /// Unique project ID
    pub id: Uuid,

    /// Project title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// User who created the project (nullable if user deleted)
    pub created_by: Option<Uuid>,

    /// When the project was created
    pub created_at: DateTime<Utc>,

    /// When the project was last updated
    pub updated_at: DateTime<Utc>,
}

/// Membership row linking a user to a project
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectMember {
    /// Project ID
    pub project_id: Uuid,

    /// Member user ID
    pub user_id: Uuid,

    /// When the member was added
    pub added_at: DateTime<Utc>,
}

/// Input for creating a new project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    /// Project title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// User creating the project
    pub created_by: Option<Uuid>,
}

/// Input for updating a project
///
/// All fields are optional. Only non-None fields will be updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProject {
    /// New title
    pub title: Option<String>,

    /// New description (use Some(None) to clear)
    pub description: Option<Option<String>>,
}

const PROJECT_COLUMNS: &str = "id, title, description, created_by, created_at, updated_at";

impl Project {
    /// Creates a new project
    ///
    /// The creator is not auto-enrolled as a member; `created_by` alone
    /// already grants access.
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(&format!(
            r#"
            INSERT INTO projects (title, description, created_by)
            VALUES ($1, $2, $3)
            RETURNING {PROJECT_COLUMNS}
            "#,
        ))
        .bind(data.title)
        .bind(data.description)
        .bind(data.created_by)
        .fetch_one(pool)
        .await?;

        Ok(project)
    }

    /// Finds a project by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(&format!(
            r#"
            SELECT {PROJECT_COLUMNS}
            FROM projects
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Lists all projects, newest first (admin view)
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let projects = sqlx::query_as::<_, Project>(&format!(
            r#"
            SELECT {PROJECT_COLUMNS}
            FROM projects
            ORDER BY created_at DESC
            "#,
        ))
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }

    /// Lists projects the user created or is a member of, newest first
    pub async fn list_accessible(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let projects = sqlx::query_as::<_, Project>(&format!(
            r#"
            SELECT {PROJECT_COLUMNS}
            FROM projects
            WHERE created_by = $1
               OR id IN (SELECT project_id FROM project_members WHERE user_id = $1)
            ORDER BY created_at DESC
            "#,
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }

    /// Checks whether a user can access a project
    ///
    /// True when the user created the project or is a member. Admin bypass
    /// happens at the API layer, not here.
    pub async fn is_accessible_by(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let accessible: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM projects
                WHERE id = $1
                  AND (created_by = $2
                       OR id IN (SELECT project_id FROM project_members WHERE user_id = $2))
            )
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(accessible)
    }

    /// Updates a project
    ///
    /// Only non-None fields are written. The `updated_at` timestamp is
    /// always refreshed.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE projects SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {PROJECT_COLUMNS}"));

        let mut q = sqlx::query_as::<_, Project>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }

        let project = q.fetch_optional(pool).await?;

        Ok(project)
    }

    /// Deletes a project and, via cascade, its memberships and tasks
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl ProjectMember {
    /// Adds a member to a project (no-op if already a member)
    pub async fn add(pool: &PgPool, project_id: Uuid, user_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO project_members (project_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (project_id, user_id) DO NOTHING
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Removes a member from a project
    pub async fn remove(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM project_members WHERE project_id = $1 AND user_id = $2")
                .bind(project_id)
                .bind(user_id)
                .execute(pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists the members of a project, oldest first
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let members = sqlx::query_as::<_, ProjectMember>(
            r#"
            SELECT project_id, user_id, added_at
            FROM project_members
            WHERE project_id = $1
            ORDER BY added_at
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_serializes_title_field() {
        let project = Project {
            id: Uuid::new_v4(),
            title: "Website redesign".to_string(),
            description: None,
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(json["title"], "Website redesign");
        assert!(json.get("name").is_none());
    }

    #[test]
    fn test_update_project_default() {
        let update = UpdateProject::default();
        assert!(update.title.is_none());
        assert!(update.description.is_none());
    }

    #[test]
    fn test_clearing_description_is_a_change() {
        let update = UpdateProject {
            description: Some(None),
            ..Default::default()
        };
        assert!(update.description.is_some());
    }
}
