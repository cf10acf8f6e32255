/// AuditLog model and database operations
///
/// Audit records capture a before/after snapshot of every mutating operation
/// on a tracked entity (currently tasks). A record is written exactly once
/// per mutation and never updated or deleted afterwards; the change history
/// shown in the UI is reconstructed from these snapshots by
/// [`crate::reconcile`].
///
/// `old_values` / `new_values` are partial JSON maps holding only the columns
/// that changed (insert carries no `old_values`, delete no `new_values`).
/// Consumers must not assume the maps are complete snapshots.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE operation_type AS ENUM ('insert', 'update', 'delete');
///
/// CREATE TABLE audit_logs (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     table_name VARCHAR(100) NOT NULL,
///     record_id UUID NOT NULL,
///     operation operation_type NOT NULL,
///     old_values JSONB,
///     new_values JSONB,
///     user_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::PgPool;
use uuid::Uuid;

/// Kind of mutation an audit record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "operation_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Insert,
    Update,
    Delete,
}

impl Operation {
    /// Converts operation to its wire/database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Insert => "insert",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

/// Immutable audit record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuditLog {
    /// Unique record ID
    pub id: Uuid,

    /// Entity type that changed (e.g. "tasks")
    pub table_name: String,

    /// ID of the changed row
    pub record_id: Uuid,

    /// Mutation kind
    pub operation: Operation,

    /// Field values before the change (absent on insert)
    pub old_values: Option<Value>,

    /// Field values after the change (absent on delete)
    pub new_values: Option<Value>,

    /// Acting user (None = system-initiated change)
    pub user_id: Option<Uuid>,

    /// When the change happened
    pub created_at: DateTime<Utc>,
}

/// Input for writing a new audit record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuditLog {
    /// Entity type
    pub table_name: String,

    /// Changed row ID
    pub record_id: Uuid,

    /// Mutation kind
    pub operation: Operation,

    /// Values before the change
    pub old_values: Option<Value>,

    /// Values after the change
    pub new_values: Option<Value>,

    /// Acting user
    pub user_id: Option<Uuid>,
}

impl AuditLog {
    /// The `old_values` bag as a JSON object, if present and well-formed
    pub fn old_map(&self) -> Option<&Map<String, Value>> {
        self.old_values.as_ref().and_then(Value::as_object)
    }

    /// The `new_values` bag as a JSON object, if present and well-formed
    pub fn new_map(&self) -> Option<&Map<String, Value>> {
        self.new_values.as_ref().and_then(Value::as_object)
    }

    /// Extracts the old/new assignee ids when this record changed `assigned_to`
    ///
    /// Used by the API to attach resolved assignee profiles alongside the
    /// record. Returns `(old, new)`; each side is `None` unless the bag holds
    /// a parseable user id.
    pub fn assignee_change(&self) -> (Option<Uuid>, Option<Uuid>) {
        let parse = |map: Option<&Map<String, Value>>| {
            map.and_then(|m| m.get("assigned_to"))
                .and_then(Value::as_str)
                .and_then(|s| Uuid::parse_str(s).ok())
        };
        (parse(self.old_map()), parse(self.new_map()))
    }

    /// Writes a new audit record
    ///
    /// Records are append-only; there is deliberately no update or delete
    /// operation in this model.
    pub async fn create(pool: &PgPool, data: CreateAuditLog) -> Result<Self, sqlx::Error> {
        let log = sqlx::query_as::<_, AuditLog>(
            r#"
            INSERT INTO audit_logs (table_name, record_id, operation, old_values, new_values, user_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, table_name, record_id, operation, old_values, new_values, user_id, created_at
            "#,
        )
        .bind(data.table_name)
        .bind(data.record_id)
        .bind(data.operation)
        .bind(data.old_values)
        .bind(data.new_values)
        .bind(data.user_id)
        .fetch_one(pool)
        .await?;

        Ok(log)
    }

    /// Lists audit records, newest first, bounded by `limit`
    pub async fn list(pool: &PgPool, limit: i64) -> Result<Vec<Self>, sqlx::Error> {
        let logs = sqlx::query_as::<_, AuditLog>(
            r#"
            SELECT id, table_name, record_id, operation, old_values, new_values, user_id, created_at
            FROM audit_logs
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(logs)
    }

    /// Lists audit records for one task, newest first, bounded by `limit`
    pub async fn list_for_task(
        pool: &PgPool,
        task_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let logs = sqlx::query_as::<_, AuditLog>(
            r#"
            SELECT id, table_name, record_id, operation, old_values, new_values, user_id, created_at
            FROM audit_logs
            WHERE record_id = $1 AND table_name = 'tasks'
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(task_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(logs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(old: Option<Value>, new: Option<Value>) -> AuditLog {
        AuditLog {
            id: Uuid::new_v4(),
            table_name: "tasks".to_string(),
            record_id: Uuid::new_v4(),
            operation: Operation::Update,
            old_values: old,
            new_values: new,
            user_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_operation_as_str() {
        assert_eq!(Operation::Insert.as_str(), "insert");
        assert_eq!(Operation::Update.as_str(), "update");
        assert_eq!(Operation::Delete.as_str(), "delete");
    }

    #[test]
    fn test_value_bags_as_maps() {
        let log = record(Some(json!({"status": "to_do"})), None);
        assert!(log.old_map().is_some());
        assert!(log.new_map().is_none());

        // Non-object JSON is treated as absent, not an error
        let odd = record(Some(json!("scalar")), Some(json!(3)));
        assert!(odd.old_map().is_none());
        assert!(odd.new_map().is_none());
    }

    #[test]
    fn test_assignee_change_extraction() {
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let log = record(
            Some(json!({ "assigned_to": alice.to_string() })),
            Some(json!({ "assigned_to": bob.to_string() })),
        );
        assert_eq!(log.assignee_change(), (Some(alice), Some(bob)));

        // Null and missing ids both come back as None
        let unassigned = record(
            Some(json!({ "assigned_to": null })),
            Some(json!({ "status": "completed" })),
        );
        assert_eq!(unassigned.assignee_change(), (None, None));
    }
}
