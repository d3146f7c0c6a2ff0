/// Common test utilities for integration tests
///
/// Shared infrastructure:
/// - Test database setup and cleanup
/// - Test user/client creation with membership
/// - JWT token generation
/// - Request helpers against the in-process router

use axum::body::Body;
use axum::http::{Request, StatusCode};
use sqlx::PgPool;
use tower::Service as _;
use uuid::Uuid;
use worklog_api::app::{build_router, AppState};
use worklog_api::config::Config;
use worklog_shared::auth::jwt::{create_token, Claims, TokenType};
use worklog_shared::models::client::{Client, CreateClient};
use worklog_shared::models::client_user::ClientUser;
use worklog_shared::models::log::{CreateLog, Log};
use worklog_shared::models::user::{CreateUser, User};

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub client: Client,
    pub user: User,
    pub jwt_token: String,
}

impl TestContext {
    /// Creates a new test context: fresh user and client, with membership
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;

        // Run migrations (path relative to this crate's Cargo.toml)
        sqlx::migrate!("../worklog-shared/migrations").run(&db).await?;

        let user = create_test_user(&db).await?;

        let client = Client::create(
            &db,
            CreateClient {
                company: format!("Test Client {}", Uuid::new_v4()),
                first_name: None,
                last_name: None,
                email: None,
                contact_number: None,
                building_number: None,
                street_address: None,
                postcode: None,
                city: None,
            },
        )
        .await?;

        ClientUser::assign(&db, client.id, user.id).await?;

        let jwt_token = token_for(user.id, &config)?;

        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            client,
            user,
            jwt_token,
        })
    }

    /// Returns authorization header value for the context user
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.jwt_token)
    }

    /// Cleans up test data
    ///
    /// Deleting the client cascades to its logs and membership rows.
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        Client::delete(&self.db, self.client.id).await?;
        User::delete(&self.db, self.user.id).await?;
        Ok(())
    }
}

/// Creates a user with unique username/email
pub async fn create_test_user(db: &PgPool) -> anyhow::Result<User> {
    let suffix = Uuid::new_v4();
    let user = User::create(
        db,
        CreateUser {
            username: format!("test-{}", suffix),
            email: format!("test-{}@example.com", suffix),
            password_hash: "test_hash".to_string(), // not exercised here
            first_name: Some("Test".to_string()),
            last_name: Some("User".to_string()),
        },
    )
    .await?;

    Ok(user)
}

/// Generates an access token for an arbitrary user
pub fn token_for(user_id: Uuid, config: &Config) -> anyhow::Result<String> {
    let claims = Claims::new(user_id, TokenType::Access);
    Ok(create_token(&claims, &config.jwt.secret)?)
}

/// Creates a log directly through the model layer
pub async fn create_test_log(
    ctx: &TestContext,
    title: &str,
    description: &str,
    body: &str,
) -> anyhow::Result<Log> {
    let log = Log::create(
        &ctx.db,
        CreateLog {
            client_id: ctx.client.id,
            user_created: ctx.user.id,
            title: title.to_string(),
            description: description.to_string(),
            body: body.to_string(),
            notes: None,
        },
    )
    .await?;

    Ok(log)
}

/// Sends a GET request with a bearer token and parses the JSON body
pub async fn get_json(
    app: &axum::Router,
    uri: &str,
    token: &str,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Sends a request with a JSON body and parses the JSON response
pub async fn send_json(
    app: &axum::Router,
    method: &str,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    send(app, request).await
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().call(request).await.unwrap();
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };

    (status, json)
}
