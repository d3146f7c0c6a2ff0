/// Application state and router builder
///
/// Defines the shared application state and builds the Axum router with all
/// routes and middleware.
///
/// # Example
///
/// ```no_run
/// use worklog_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = worklog_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use worklog_shared::auth::{jwt, middleware::AuthContext};

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor; Arc keeps
/// the clone cheap.
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

    /// Gets the public base URL for building log paths
    pub fn base_url(&self) -> &str {
        &self.config.api.base_url
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                       # Health check (public)
/// └── /v1/                          # API v1 (versioned)
///     ├── /auth/                    # Authentication (public)
///     │   ├── POST /register
///     │   ├── POST /login
///     │   └── POST /refresh
///     ├── /logs/                    # Log entries (authenticated)
///     │   ├── GET    /              # Search + paginated listing
///     │   ├── POST   /              # Create
///     │   ├── GET    /:slug         # Detail
///     │   ├── PUT    /:slug         # Update
///     │   └── DELETE /:slug         # Delete
///     ├── /clients/                 # Clients + membership (authenticated)
///     │   ├── GET    /
///     │   ├── POST   /
///     │   ├── GET    /:id
///     │   ├── PUT    /:id
///     │   ├── DELETE /:id
///     │   ├── POST   /:id/members
///     │   └── DELETE /:id/members/:user_id
///     └── /users/                   # Profile + colleagues (authenticated)
///         ├── GET /                 # Users sharing a client with the caller
///         ├── GET /me
///         └── PUT /me
/// ```
///
/// Authenticated routes require a `Authorization: Bearer <access-token>`
/// header; the middleware inserts an [`AuthContext`] into request
/// extensions for handlers to consume.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public, no auth required)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    // Log routes (require JWT authentication)
    let log_routes = Router::new()
        .route("/", get(routes::logs::list_logs))
        .route("/", post(routes::logs::create_log))
        .route("/:slug", get(routes::logs::get_log))
        .route("/:slug", put(routes::logs::update_log))
        .route("/:slug", axum::routing::delete(routes::logs::delete_log))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Client + membership routes (require JWT authentication)
    let client_routes = Router::new()
        .route("/", get(routes::clients::list_clients))
        .route("/", post(routes::clients::create_client))
        .route("/:id", get(routes::clients::get_client))
        .route("/:id", put(routes::clients::update_client))
        .route("/:id", axum::routing::delete(routes::clients::delete_client))
        .route("/:id/members", post(routes::clients::add_member))
        .route(
            "/:id/members/:user_id",
            axum::routing::delete(routes::clients::remove_member),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Profile routes (require JWT authentication)
    let user_routes = Router::new()
        .route("/", get(routes::users::colleagues))
        .route("/me", get(routes::users::me))
        .route("/me", put(routes::users::update_me))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Build complete v1 API
    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/logs", log_routes)
        .nest("/clients", client_routes)
        .nest("/users", user_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
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
        .merge(health_routes)
        .nest("/v1", v1_routes)
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
/// then injects [`AuthContext`] into request extensions.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            crate::error::ApiError::Unauthorized("Missing authorization header".to_string())
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        crate::error::ApiError::BadRequest("Expected Bearer token".to_string())
    })?;

    let claims = jwt::validate_access_token(token, state.jwt_secret())?;

    let auth_context = AuthContext::from_claims(&claims);
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
