/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/auth/signup` - Create a new account
/// - `POST /api/auth/login` - Login and get a token
/// - `GET  /api/auth/me` - Current user profile and role

use crate::{
    app::{AppState, AuthUser},
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::{jwt, password},
    models::user::{AppRole, CreateUser, Profile, User},
};
use validator::Validate;

/// Signup request
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    /// Unique handle
    #[validate(length(
        min = 3,
        max = 50,
        message = "Username must be between 3 and 50 characters"
    ))]
    pub username: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password (validated for strength separately)
    pub password: String,

    /// Optional display name
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub full_name: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Response for signup and login
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// Access token (24h)
    pub access_token: String,

    /// The authenticated user
    pub user: Profile,

    /// The user's role
    pub role: AppRole,
}

/// Response for the `me` endpoint
#[derive(Debug, Serialize)]
pub struct MeResponse {
    /// The authenticated user
    pub user: Profile,

    /// The user's current role
    pub role: AppRole,
}

/// Create a new account
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/signup
/// Content-Type: application/json
///
/// {
///   "username": "jdoe",
///   "email": "user@example.com",
///   "password": "SecurePass123",
///   "full_name": "John Doe"
/// }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
/// - `409 Conflict`: Username or email already exists
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<Json<TokenResponse>> {
    req.validate()?;

    password::validate_password_strength(&req.password).map_err(|e| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "password".to_string(),
            message: e,
        }])
    })?;

    // Friendly duplicate check; the unique constraint still backstops races
    if User::find_by_username(&state.db, &req.username)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict("Username already exists".to_string()));
    }

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            username: req.username,
            email: req.email,
            password_hash,
            full_name: req.full_name,
        },
    )
    .await?;

    // New accounts are regular users; absence of a role row means exactly that
    let role = AppRole::User;

    let claims = jwt::Claims::new(user.id, role);
    let access_token = jwt::create_token(&claims, state.jwt_secret())?;

    Ok(Json(TokenResponse {
        access_token,
        user: Profile::from(user),
        role,
    }))
}

/// Login with email and password
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/login
/// Content-Type: application/json
///
/// {
///   "email": "user@example.com",
///   "password": "SecurePass123"
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid credentials
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    req.validate()?;

    // Same error for unknown email and wrong password
    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let role = User::role(&state.db, user.id).await?;

    let claims = jwt::Claims::new(user.id, role);
    let access_token = jwt::create_token(&claims, state.jwt_secret())?;

    Ok(Json(TokenResponse {
        access_token,
        user: Profile::from(user),
        role,
    }))
}

/// Returns the current user's profile and role
///
/// The role is read fresh from the database, so a promotion or demotion is
/// visible without re-login.
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<MeResponse>> {
    let user = User::find_by_id(&state.db, auth.id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Account no longer exists".to_string()))?;

    let role = User::role(&state.db, user.id).await?;

    Ok(Json(MeResponse {
        user: Profile::from(user),
        role,
    }))
}
