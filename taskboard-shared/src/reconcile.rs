/// Audit-log reconciliation
///
/// Turns the before/after value bags of an audit record into human-readable
/// change descriptions. Two consumers exist with deliberately different
/// precision:
///
/// - [`diff`] produces an itemized, per-field change list (status, assignee,
///   due date) for the task activity timeline.
/// - [`classify`] produces a one-line summary for the flat admin log table,
///   which only itemizes status and collapses the other tracked fields to
///   "Assignee changed" / "Due date changed".
///
/// The value bags are untyped and may be partial: the audit writer records
/// only the columns that changed, so a missing key must be treated the same
/// as an explicit null. Fields outside the tracked set (title, description,
/// priority, ...) are intentionally not itemized; a record that only touches
/// them classifies as plain "Updated".
///
/// Both functions are pure, never mutate their inputs, and degrade to
/// fallback text on malformed records rather than failing the view.

use crate::models::audit_log::AuditLog;
use crate::models::user::Profile;
use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::fmt;

/// Tracked fields, in the fixed order they are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackedField {
    Status,
    Assignee,
    DueDate,
}

impl TrackedField {
    /// Display name used as the row label in the timeline
    pub fn display_name(&self) -> &'static str {
        match self {
            TrackedField::Status => "Status",
            TrackedField::Assignee => "Assignee",
            TrackedField::DueDate => "Due Date",
        }
    }

    /// Key of this field inside the audit value bags
    pub fn key(&self) -> &'static str {
        match self {
            TrackedField::Status => "status",
            TrackedField::Assignee => "assigned_to",
            TrackedField::DueDate => "due_date",
        }
    }
}

impl fmt::Display for TrackedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One rendered field change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    /// Which tracked field changed
    pub field: TrackedField,

    /// Display text of the prior value
    pub from: String,

    /// Display text of the new value
    pub to: String,
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} → {}", self.field, self.from, self.to)
    }
}

/// Resolved user references accompanying a task audit record
///
/// The API attaches these when the record changed `assigned_to`, so the
/// timeline can show names instead of ids. Both sides are optional; an
/// unresolvable id simply renders as "Unassigned".
#[derive(Debug, Clone, Copy, Default)]
pub struct AssigneeRefs<'a> {
    /// Profile of the previous assignee
    pub old_assignee: Option<&'a Profile>,

    /// Profile of the new assignee
    pub new_assignee: Option<&'a Profile>,
}

/// Looks a key up in an optional bag, treating a missing key as null
///
/// This is the load-bearing convention of the reconciler: the audit writer
/// may store partial maps or full snapshots, and both shapes must compare
/// identically.
fn lookup<'m>(bag: Option<&'m Map<String, Value>>, key: &str) -> &'m Value {
    bag.and_then(|m| m.get(key)).unwrap_or(&Value::Null)
}

/// Renders a raw status code for the timeline ("to_do" → "to do", null → "-")
fn status_display(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(code) => code.replace('_', " "),
        // Malformed status values degrade to their JSON text
        other => other.to_string(),
    }
}

/// Renders an assignee side: name, falling back to email, then "Unassigned"
fn assignee_display(id: &Value, profile: Option<&Profile>) -> String {
    if id.is_null() {
        return "Unassigned".to_string();
    }
    profile
        .and_then(|p| p.full_name.clone().or_else(|| Some(p.email.clone())))
        .unwrap_or_else(|| "Unassigned".to_string())
}

/// Renders a due date ("2024-01-01" → "Jan 1, 2024", null → "None")
fn due_date_display(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::String(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(|d| d.format("%b %-d, %Y").to_string())
            // Unparseable dates degrade to the stored text
            .unwrap_or_else(|_| raw.clone()),
        other => other.to_string(),
    }
}

/// Computes the itemized field-level diff of an audit record
///
/// Compares raw values (ids for the assignee, codes for status, date strings
/// for the due date), then renders each side for display. Untracked fields
/// never appear in the result, so a title-only edit yields an empty diff.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use taskboard_shared::reconcile::{diff, AssigneeRefs, TrackedField};
///
/// let old = json!({ "status": "to_do" });
/// let new = json!({ "status": "in_progress" });
/// let changes = diff(old.as_object(), new.as_object(), &AssigneeRefs::default());
///
/// assert_eq!(changes.len(), 1);
/// assert_eq!(changes[0].field, TrackedField::Status);
/// assert_eq!(changes[0].from, "to do");
/// assert_eq!(changes[0].to, "in progress");
/// ```
pub fn diff(
    old_values: Option<&Map<String, Value>>,
    new_values: Option<&Map<String, Value>>,
    refs: &AssigneeRefs<'_>,
) -> Vec<FieldChange> {
    let mut changes = Vec::new();

    // Status: compare raw codes, display with underscores replaced
    let old_status = lookup(old_values, "status");
    let new_status = lookup(new_values, "status");
    if old_status != new_status {
        changes.push(FieldChange {
            field: TrackedField::Status,
            from: status_display(old_status),
            to: status_display(new_status),
        });
    }

    // Assignee: compare raw ids, never display names. Two distinct ids are
    // a change even if their resolved names happen to collide.
    let old_assignee = lookup(old_values, "assigned_to");
    let new_assignee = lookup(new_values, "assigned_to");
    if old_assignee != new_assignee {
        changes.push(FieldChange {
            field: TrackedField::Assignee,
            from: assignee_display(old_assignee, refs.old_assignee),
            to: assignee_display(new_assignee, refs.new_assignee),
        });
    }

    // Due date: compare raw date strings
    let old_due = lookup(old_values, "due_date");
    let new_due = lookup(new_values, "due_date");
    if old_due != new_due {
        changes.push(FieldChange {
            field: TrackedField::DueDate,
            from: due_date_display(old_due),
            to: due_date_display(new_due),
        });
    }

    changes
}

/// Classifies an audit record into a one-line summary for the flat log view
///
/// Less precise than [`diff`] on purpose: only status is itemized (with raw
/// codes), assignee and due date collapse to a fixed phrase, and anything
/// else, including a record where no tracked field moved, reads "Updated".
pub fn classify(
    old_values: Option<&Map<String, Value>>,
    new_values: Option<&Map<String, Value>>,
) -> String {
    if old_values.is_none() && new_values.is_some() {
        return "Task created".to_string();
    }
    if old_values.is_some() && new_values.is_none() {
        return "Task deleted".to_string();
    }

    let mut parts = Vec::new();

    let old_status = lookup(old_values, "status");
    let new_status = lookup(new_values, "status");
    if old_status != new_status {
        let raw = |v: &Value| match v {
            Value::String(code) => code.clone(),
            Value::Null => "-".to_string(),
            other => other.to_string(),
        };
        parts.push(format!("Status: {} → {}", raw(old_status), raw(new_status)));
    }

    if lookup(old_values, "assigned_to") != lookup(new_values, "assigned_to") {
        parts.push("Assignee changed".to_string());
    }

    if lookup(old_values, "due_date") != lookup(new_values, "due_date") {
        parts.push("Due date changed".to_string());
    }

    if parts.is_empty() {
        "Updated".to_string()
    } else {
        parts.join(", ")
    }
}

/// Classifies a full audit record
///
/// Convenience wrapper over [`classify`] for callers holding an
/// [`AuditLog`]. Records with malformed (non-object) value bags degrade to
/// the same fallbacks as absent ones.
pub fn classify_record(log: &AuditLog) -> String {
    classify(log.old_map(), log.new_map())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::audit_log::Operation;
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    fn profile(full_name: Option<&str>, email: &str) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            username: "user".to_string(),
            email: email.to_string(),
            full_name: full_name.map(|s| s.to_string()),
            avatar_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_change_display() {
        let old = json!({ "status": "to_do" });
        let new = json!({ "status": "in_progress" });
        let changes = diff(old.as_object(), new.as_object(), &AssigneeRefs::default());

        assert_eq!(
            changes,
            vec![FieldChange {
                field: TrackedField::Status,
                from: "to do".to_string(),
                to: "in progress".to_string(),
            }]
        );
    }

    #[test]
    fn test_status_absent_renders_dash() {
        let new = json!({ "status": "under_review" });
        let changes = diff(None, new.as_object(), &AssigneeRefs::default());

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].from, "-");
        assert_eq!(changes[0].to, "under review");
    }

    #[test]
    fn test_assignment_resolves_full_name() {
        let alice = profile(Some("Alice"), "alice@example.com");
        let old = json!({ "assigned_to": null });
        let new = json!({ "assigned_to": "u1" });
        let refs = AssigneeRefs {
            old_assignee: None,
            new_assignee: Some(&alice),
        };

        let changes = diff(old.as_object(), new.as_object(), &refs);
        assert_eq!(
            changes,
            vec![FieldChange {
                field: TrackedField::Assignee,
                from: "Unassigned".to_string(),
                to: "Alice".to_string(),
            }]
        );
    }

    #[test]
    fn test_assignment_falls_back_to_email_then_unassigned() {
        let no_name = profile(None, "bob@example.com");
        let old = json!({ "assigned_to": "u1" });
        let new = json!({ "assigned_to": "u2" });

        let refs = AssigneeRefs {
            old_assignee: Some(&no_name),
            new_assignee: None,
        };
        let changes = diff(old.as_object(), new.as_object(), &refs);
        assert_eq!(changes[0].from, "bob@example.com");
        // Id present but unresolvable still renders the fallback
        assert_eq!(changes[0].to, "Unassigned");
    }

    #[test]
    fn test_assignment_compares_ids_not_names() {
        // Two different users who happen to share a display name
        let a = profile(Some("Alex"), "a@example.com");
        let b = profile(Some("Alex"), "b@example.com");
        let old = json!({ "assigned_to": "u1" });
        let new = json!({ "assigned_to": "u2" });
        let refs = AssigneeRefs {
            old_assignee: Some(&a),
            new_assignee: Some(&b),
        };

        let changes = diff(old.as_object(), new.as_object(), &refs);
        assert_eq!(changes.len(), 1, "id change must be reported even when names collide");
        assert_eq!(changes[0].from, "Alex");
        assert_eq!(changes[0].to, "Alex");
    }

    #[test]
    fn test_due_date_formatting() {
        let old = json!({ "due_date": "2024-01-01" });
        let new = json!({ "due_date": null });
        let changes = diff(old.as_object(), new.as_object(), &AssigneeRefs::default());

        assert_eq!(
            changes,
            vec![FieldChange {
                field: TrackedField::DueDate,
                from: "Jan 1, 2024".to_string(),
                to: "None".to_string(),
            }]
        );
    }

    #[test]
    fn test_unparseable_due_date_degrades_to_raw_text() {
        let old = json!({ "due_date": "sometime" });
        let new = json!({ "due_date": null });
        let changes = diff(old.as_object(), new.as_object(), &AssigneeRefs::default());
        assert_eq!(changes[0].from, "sometime");
    }

    #[test]
    fn test_untracked_fields_are_ignored() {
        let old = json!({ "title": "A" });
        let new = json!({ "title": "B" });
        assert!(diff(old.as_object(), new.as_object(), &AssigneeRefs::default()).is_empty());
    }

    #[test]
    fn test_missing_key_equals_explicit_null() {
        // Partial map on one side, explicit null on the other: no change
        let old = json!({ "status": "to_do", "due_date": null });
        let new = json!({ "status": "to_do" });
        assert!(diff(old.as_object(), new.as_object(), &AssigneeRefs::default()).is_empty());
    }

    #[test]
    fn test_fixed_rendering_order() {
        let old = json!({ "due_date": "2024-01-01", "assigned_to": null, "status": "to_do" });
        let new = json!({ "due_date": "2024-02-01", "assigned_to": "u1", "status": "in_progress" });
        let changes = diff(old.as_object(), new.as_object(), &AssigneeRefs::default());

        let fields: Vec<TrackedField> = changes.iter().map(|c| c.field).collect();
        assert_eq!(
            fields,
            vec![TrackedField::Status, TrackedField::Assignee, TrackedField::DueDate]
        );
    }

    #[test]
    fn test_diff_is_deterministic() {
        let old = json!({ "status": "to_do", "assigned_to": "u1" });
        let new = json!({ "status": "in_progress", "assigned_to": "u2" });
        let refs = AssigneeRefs::default();

        let first = diff(old.as_object(), new.as_object(), &refs);
        let second = diff(old.as_object(), new.as_object(), &refs);
        assert_eq!(first, second);

        // Inputs are untouched
        assert_eq!(old, json!({ "status": "to_do", "assigned_to": "u1" }));
    }

    #[test]
    fn test_classify_created_and_deleted() {
        let snapshot = json!({ "title": "Ship it", "status": "to_do" });
        assert_eq!(classify(None, snapshot.as_object()), "Task created");
        assert_eq!(classify(snapshot.as_object(), None), "Task deleted");
    }

    #[test]
    fn test_classify_uses_raw_status_codes() {
        let old = json!({ "status": "to_do" });
        let new = json!({ "status": "in_progress" });
        assert_eq!(
            classify(old.as_object(), new.as_object()),
            "Status: to_do → in_progress"
        );
    }

    #[test]
    fn test_classify_joins_multiple_changes() {
        let old = json!({ "status": "to_do", "assigned_to": null, "due_date": null });
        let new = json!({ "status": "in_progress", "assigned_to": "u1", "due_date": "2024-03-01" });
        assert_eq!(
            classify(old.as_object(), new.as_object()),
            "Status: to_do → in_progress, Assignee changed, Due date changed"
        );
    }

    #[test]
    fn test_classify_untracked_change_reads_updated() {
        let old = json!({ "title": "A" });
        let new = json!({ "title": "B" });
        assert_eq!(classify(old.as_object(), new.as_object()), "Updated");
    }

    #[test]
    fn test_classify_malformed_record_degrades() {
        // Both bags absent: not a crash, just the generic summary
        assert_eq!(classify(None, None), "Updated");
    }

    #[test]
    fn test_classify_record_wrapper() {
        let log = AuditLog {
            id: Uuid::new_v4(),
            table_name: "tasks".to_string(),
            record_id: Uuid::new_v4(),
            operation: Operation::Insert,
            old_values: None,
            new_values: Some(json!({ "title": "New task", "status": "to_do" })),
            user_id: None,
            created_at: Utc::now(),
        };
        assert_eq!(classify_record(&log), "Task created");
    }
}
