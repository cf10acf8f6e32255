/// Authenticated session
///
/// Value object returned by signup and login: the token the server issued
/// plus the authenticated user's profile and role. The token is also placed
/// in the client's [`crate::store::TokenStore`]; this struct is a snapshot
/// for the caller, not the source of truth.

use serde::Deserialize;
use taskboard_shared::models::user::{AppRole, Profile};

/// Result of a successful signup or login
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    /// Bearer token for subsequent requests
    pub access_token: String,

    /// The authenticated user
    pub user: Profile,

    /// The user's role at login time
    pub role: AppRole,
}

impl AuthSession {
    /// True when the session belongs to an admin
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_session() {
        let json = serde_json::json!({
            "access_token": "eyJ...",
            "user": {
                "id": "7f1f9f6e-9f5d-4a6b-8d8e-2b1a0c3d4e5f",
                "username": "jdoe",
                "email": "jdoe@example.com",
                "full_name": "John Doe",
                "avatar_url": null,
                "created_at": "2024-01-01T00:00:00Z",
                "updated_at": "2024-01-01T00:00:00Z"
            },
            "role": "admin"
        });

        let session: AuthSession = serde_json::from_value(json).unwrap();
        assert_eq!(session.user.username, "jdoe");
        assert!(session.is_admin());
    }
}
