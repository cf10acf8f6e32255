/// Client error types
///
/// Server-side rejections and local pre-flight failures surface through the
/// same enum, so a caller handles an invalid workflow move identically
/// whether the client or the server caught it.

use serde::Deserialize;
use taskboard_shared::workflow::WorkflowError;

/// Result alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Error type for all client operations
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level failure (connection refused, timeout, TLS)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server rejected the request
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,

        /// Machine-readable error code from the server
        code: String,

        /// Human-readable message
        message: String,
    },

    /// No token in the store for an authenticated call
    #[error("Not authenticated")]
    NotAuthenticated,

    /// A workflow move rejected before any request was sent
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// Response body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Error body returned by the API server
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub error: String,
    pub message: String,
}

impl ClientError {
    /// True when the server rejected the request with the given status
    pub fn is_status(&self, status: u16) -> bool {
        matches!(self, ClientError::Api { status: s, .. } if *s == status)
    }

    /// True for 401 responses and missing-token failures
    pub fn is_auth_error(&self) -> bool {
        matches!(self, ClientError::NotAuthenticated) || self.is_status(401)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskboard_shared::models::task::TaskStatus;

    #[test]
    fn test_is_status() {
        let err = ClientError::Api {
            status: 409,
            code: "conflict".to_string(),
            message: "duplicate title".to_string(),
        };
        assert!(err.is_status(409));
        assert!(!err.is_status(404));
    }

    #[test]
    fn test_is_auth_error() {
        assert!(ClientError::NotAuthenticated.is_auth_error());
        let unauthorized = ClientError::Api {
            status: 401,
            code: "unauthorized".to_string(),
            message: "Token expired".to_string(),
        };
        assert!(unauthorized.is_auth_error());
    }

    #[test]
    fn test_workflow_error_passes_through() {
        let err: ClientError = WorkflowError::InvalidTransition {
            from: TaskStatus::Completed,
            to: TaskStatus::ToDo,
        }
        .into();
        assert!(err.to_string().contains("completed"));
    }
}
