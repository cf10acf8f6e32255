/// Application state and router builder
///
/// This module defines the shared application state, the JWT authentication
/// middleware, and the function that builds the Axum router with all routes
/// and middleware.
///
/// # Example
///
/// ```no_run
/// use taskboard_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = taskboard_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskboard_shared::{
    auth::jwt,
    models::user::{AppRole, User},
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use uuid::Uuid;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor. Uses Arc
/// internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Authenticated user extracted from a validated JWT
///
/// `role` is the role claim from the token; admin-gated handlers must call
/// [`require_admin`], which re-reads the role from the database.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    /// User ID (token subject)
    pub id: Uuid,

    /// Role claim at token issue time
    pub role: AppRole,
}

/// Verifies the user currently holds the admin role
///
/// Reads the role fresh from the database rather than trusting the token
/// claim, so revoking admin takes effect immediately.
pub async fn require_admin(state: &AppState, user: &AuthUser) -> ApiResult<()> {
    let role = User::role(&state.db, user.id).await?;
    if role.is_admin() {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Admin role required".to_string()))
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /api
/// ├── GET  /health                          # Health check (public)
/// ├── /auth
/// │   ├── POST /signup                      # Create account (public)
/// │   ├── POST /login                       # Login (public)
/// │   └── GET  /me                          # Current user (authenticated)
/// ├── /projects                             # Project CRUD + members
/// ├── /tasks                                # Task CRUD, comments, history
/// ├── /comments                             # Comment delete (author only)
/// ├── /users                                # Profiles and role management
/// └── /audit-logs                           # Flat audit view (admin)
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Authentication (per-route-group)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Public routes
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let public_auth_routes = Router::new()
        .route("/signup", post(routes::auth::signup))
        .route("/login", post(routes::auth::login));

    // Authenticated routes
    let me_routes = Router::new().route("/me", get(routes::auth::me));

    let project_routes = Router::new()
        .route("/", get(routes::projects::list_projects))
        .route("/", post(routes::projects::create_project))
        .route("/:id", get(routes::projects::get_project))
        .route("/:id", put(routes::projects::update_project))
        .route("/:id", delete(routes::projects::delete_project))
        .route("/:id/members", get(routes::projects::list_members))
        .route("/:id/members", post(routes::projects::add_member))
        .route(
            "/:id/members/:user_id",
            delete(routes::projects::remove_member),
        );

    let task_routes = Router::new()
        .route("/", get(routes::tasks::list_tasks))
        .route("/", post(routes::tasks::create_task))
        .route("/:id", get(routes::tasks::get_task))
        .route("/:id", put(routes::tasks::update_task))
        .route("/:id", delete(routes::tasks::delete_task))
        .route("/:id/comments", get(routes::comments::list_comments))
        .route("/:id/comments", post(routes::comments::create_comment))
        .route("/:id/audit-logs", get(routes::audit_logs::list_for_task));

    let comment_routes =
        Router::new().route("/:id", delete(routes::comments::delete_comment));

    let user_routes = Router::new()
        .route("/", get(routes::users::list_users))
        .route("/me", put(routes::users::update_me))
        .route("/:id", get(routes::users::get_user))
        .route("/:id", delete(routes::users::delete_user))
        .route("/:id/role", put(routes::users::set_role));

    let audit_log_routes = Router::new().route("/", get(routes::audit_logs::list_audit_logs));

    let authenticated = Router::new()
        .nest("/auth", me_routes)
        .nest("/projects", project_routes)
        .nest("/tasks", task_routes)
        .nest("/comments", comment_routes)
        .nest("/users", user_routes)
        .nest("/audit-logs", audit_log_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let api = Router::new()
        .merge(health_routes)
        .nest("/auth", public_auth_routes)
        .merge(authenticated);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .nest("/api", api)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Extracts and validates the Bearer token from the Authorization header,
/// then injects [`AuthUser`] into request extensions.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::BadRequest("Expected Bearer token".to_string()))?;

    let claims = jwt::validate_token(token, state.jwt_secret())?;

    let auth_user = AuthUser {
        id: claims.sub,
        role: claims.role,
    };

    req.extensions_mut().insert(auth_user);

    Ok(next.run(req).await)
}
