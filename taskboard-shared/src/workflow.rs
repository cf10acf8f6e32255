/// Task status workflow engine
///
/// This module owns the finite-state machine governing task status changes.
/// Two distinct views of the workflow exist and must not be conflated:
///
/// - The **transition graph**: the full set of permitted moves, including
///   backward edges (e.g. sending a reviewed task back to in-progress).
/// - The **forward advance**: the single canonical linear progression used by
///   the one-click "advance" action. It is a strict subset of the graph and
///   never uses a backward edge.
///
/// # Transition graph
///
/// ```text
/// to_do        → in_progress
/// in_progress  → under_review | to_do
/// under_review → completed | in_progress
/// completed    → under_review
/// ```
///
/// Both the client (pre-flight) and the API server (before persisting)
/// validate against this graph, so a stale UI can never commit an illegal
/// move.
///
/// # Example
///
/// ```
/// use taskboard_shared::models::task::TaskStatus;
///
/// assert!(TaskStatus::ToDo.can_transition_to(TaskStatus::InProgress));
/// assert!(!TaskStatus::ToDo.can_transition_to(TaskStatus::Completed));
///
/// // One-click advance: suggested next status and its button label
/// assert_eq!(TaskStatus::UnderReview.next_forward(), Some(TaskStatus::Completed));
/// assert_eq!(TaskStatus::UnderReview.advance_label(), Some("Mark Complete"));
/// assert_eq!(TaskStatus::Completed.next_forward(), None);
/// ```

use crate::models::task::TaskStatus;

/// Error type for rejected workflow operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    /// The requested move is not an edge of the transition graph
    #[error("cannot move task from '{from}' to '{to}'")]
    InvalidTransition { from: TaskStatus, to: TaskStatus },

    /// The task is already at the end of the forward progression
    #[error("task is already completed")]
    AlreadyTerminal,
}

impl TaskStatus {
    /// Checks if a transition to the target status is permitted
    ///
    /// Pure predicate over the transition graph. Self-transitions are never
    /// permitted.
    pub fn can_transition_to(&self, target: TaskStatus) -> bool {
        match (self, target) {
            (TaskStatus::ToDo, TaskStatus::InProgress) => true,

            (TaskStatus::InProgress, TaskStatus::UnderReview) => true,
            (TaskStatus::InProgress, TaskStatus::ToDo) => true,

            (TaskStatus::UnderReview, TaskStatus::Completed) => true,
            (TaskStatus::UnderReview, TaskStatus::InProgress) => true,

            (TaskStatus::Completed, TaskStatus::UnderReview) => true,

            _ => false,
        }
    }

    /// The next status in the canonical forward progression
    ///
    /// to_do → in_progress → under_review → completed. Returns `None` when
    /// the task is already completed. Every result is also a legal edge of
    /// the transition graph; callers still re-validate with
    /// [`TaskStatus::can_transition_to`] before committing.
    pub fn next_forward(&self) -> Option<TaskStatus> {
        match self {
            TaskStatus::ToDo => Some(TaskStatus::InProgress),
            TaskStatus::InProgress => Some(TaskStatus::UnderReview),
            TaskStatus::UnderReview => Some(TaskStatus::Completed),
            TaskStatus::Completed => None,
        }
    }

    /// Button label for the one-click advance action
    ///
    /// `None` when the task is completed (no advance offered).
    pub fn advance_label(&self) -> Option<&'static str> {
        match self {
            TaskStatus::ToDo => Some("Start Progress"),
            TaskStatus::InProgress => Some("Submit for Review"),
            TaskStatus::UnderReview => Some("Mark Complete"),
            TaskStatus::Completed => None,
        }
    }

    /// True when no forward advance remains
    pub fn is_terminal(&self) -> bool {
        self.next_forward().is_none()
    }
}

/// Validates a requested transition, turning a rejected move into an error
///
/// Convenience for call sites that want a `Result` rather than a boolean.
pub fn validate_transition(from: TaskStatus, to: TaskStatus) -> Result<(), WorkflowError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(WorkflowError::InvalidTransition { from, to })
    }
}

/// Computes the advance target for a task, validated against the full graph
///
/// Returns the status the one-click advance should commit, or an error when
/// the task is terminal. The result is re-checked against the transition
/// graph before being returned.
pub fn advance_target(current: TaskStatus) -> Result<TaskStatus, WorkflowError> {
    let next = current.next_forward().ok_or(WorkflowError::AlreadyTerminal)?;
    validate_transition(current, next)?;
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_self_transitions() {
        for status in TaskStatus::ALL {
            assert!(
                !status.can_transition_to(status),
                "{status} must not transition to itself"
            );
        }
    }

    #[test]
    fn test_forward_edges() {
        assert!(TaskStatus::ToDo.can_transition_to(TaskStatus::InProgress));
        assert!(TaskStatus::InProgress.can_transition_to(TaskStatus::UnderReview));
        assert!(TaskStatus::UnderReview.can_transition_to(TaskStatus::Completed));
    }

    #[test]
    fn test_backward_edges() {
        assert!(TaskStatus::InProgress.can_transition_to(TaskStatus::ToDo));
        assert!(TaskStatus::UnderReview.can_transition_to(TaskStatus::InProgress));
        assert!(TaskStatus::Completed.can_transition_to(TaskStatus::UnderReview));
    }

    #[test]
    fn test_forbidden_edges() {
        // No skipping stages
        assert!(!TaskStatus::ToDo.can_transition_to(TaskStatus::UnderReview));
        assert!(!TaskStatus::ToDo.can_transition_to(TaskStatus::Completed));
        assert!(!TaskStatus::InProgress.can_transition_to(TaskStatus::Completed));
        // No jumping back more than one stage
        assert!(!TaskStatus::UnderReview.can_transition_to(TaskStatus::ToDo));
        assert!(!TaskStatus::Completed.can_transition_to(TaskStatus::ToDo));
        assert!(!TaskStatus::Completed.can_transition_to(TaskStatus::InProgress));
    }

    #[test]
    fn test_next_forward() {
        assert_eq!(TaskStatus::ToDo.next_forward(), Some(TaskStatus::InProgress));
        assert_eq!(
            TaskStatus::InProgress.next_forward(),
            Some(TaskStatus::UnderReview)
        );
        assert_eq!(
            TaskStatus::UnderReview.next_forward(),
            Some(TaskStatus::Completed)
        );
        assert_eq!(TaskStatus::Completed.next_forward(), None);
    }

    #[test]
    fn test_forward_progression_is_subset_of_graph() {
        for status in TaskStatus::ALL {
            if let Some(next) = status.next_forward() {
                assert!(
                    status.can_transition_to(next),
                    "forward advance {status} → {next} must be a graph edge"
                );
            }
        }
    }

    #[test]
    fn test_advance_labels() {
        assert_eq!(TaskStatus::ToDo.advance_label(), Some("Start Progress"));
        assert_eq!(
            TaskStatus::InProgress.advance_label(),
            Some("Submit for Review")
        );
        assert_eq!(TaskStatus::UnderReview.advance_label(), Some("Mark Complete"));
        assert_eq!(TaskStatus::Completed.advance_label(), None);
    }

    #[test]
    fn test_label_exists_iff_advance_exists() {
        for status in TaskStatus::ALL {
            assert_eq!(
                status.advance_label().is_some(),
                status.next_forward().is_some()
            );
        }
    }

    #[test]
    fn test_validate_transition() {
        assert!(validate_transition(TaskStatus::ToDo, TaskStatus::InProgress).is_ok());
        assert_eq!(
            validate_transition(TaskStatus::Completed, TaskStatus::ToDo),
            Err(WorkflowError::InvalidTransition {
                from: TaskStatus::Completed,
                to: TaskStatus::ToDo,
            })
        );
    }

    #[test]
    fn test_advance_target() {
        assert_eq!(
            advance_target(TaskStatus::ToDo),
            Ok(TaskStatus::InProgress)
        );
        assert_eq!(
            advance_target(TaskStatus::Completed),
            Err(WorkflowError::AlreadyTerminal)
        );
    }

    #[test]
    fn test_only_completed_is_terminal() {
        assert!(TaskStatus::Completed.is_terminal());
        assert!(!TaskStatus::ToDo.is_terminal());
        assert!(!TaskStatus::InProgress.is_terminal());
        assert!(!TaskStatus::UnderReview.is_terminal());
    }
}
