//! Common test utilities for integration tests
//!
//! Shared setup for DB-backed tests plus fixture helpers for the
//! lockout/authorization scenarios (SQL time travel, role promotion,
//! ad ownership).

use amlak_backend::{config::AppConfig, routes, state::AppState};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

/// Test application wrapper
pub struct TestApp {
    pub app: Router,
    pub pool: PgPool,
}

impl TestApp {
    /// Create a new test application with a real database
    pub async fn new() -> Self {
        let config = test_config();
        let pool = create_test_pool(&config.database.url).await;

        // Run migrations
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        let state = AppState::new(pool.clone(), config);
        let app = routes::create_router(state);

        Self { app, pool }
    }

    /// Make a request with optional bearer token and JSON body
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        token: Option<&str>,
        body: Option<&str>,
    ) -> (StatusCode, String) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body_str = String::from_utf8(bytes.to_vec()).unwrap();

        (status, body_str)
    }

    /// Make an unauthenticated POST request with JSON body
    pub async fn post(&self, path: &str, body: &str) -> (StatusCode, String) {
        self.request("POST", path, None, Some(body)).await
    }

    /// Register a fresh user and return (user_id, access_token)
    pub async fn register_user(&self, username: &str, phone: &str, password: &str) -> (Uuid, String) {
        let body = serde_json::json!({
            "name": "Test User",
            "phone": phone,
            "username": username,
            "password": password,
        });
        let (status, response) = self.post("/api/users/register", &body.to_string()).await;
        assert_eq!(status, StatusCode::CREATED, "registration failed: {response}");

        let response: serde_json::Value = serde_json::from_str(&response).unwrap();
        let user_id = Uuid::parse_str(response["user"]["id"].as_str().unwrap()).unwrap();
        let token = response["access_token"].as_str().unwrap().to_string();
        (user_id, token)
    }

    /// Login and return the access token
    pub async fn login(&self, username: &str, password: &str) -> String {
        let body = serde_json::json!({ "username": username, "password": password });
        let (status, response) = self.post("/api/users/login", &body.to_string()).await;
        assert_eq!(status, StatusCode::OK, "login failed: {response}");

        let response: serde_json::Value = serde_json::from_str(&response).unwrap();
        response["access_token"].as_str().unwrap().to_string()
    }

    /// Promote a user to admin directly in the database.
    /// The caller must log in again afterwards: role lives in the token.
    pub async fn promote_to_admin(&self, user_id: Uuid) {
        sqlx::query("UPDATE users SET role = 'admin' WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .expect("Failed to promote user");
    }

    /// Backdate a user's lockout window so it has already passed
    pub async fn expire_lock(&self, user_id: Uuid) {
        sqlx::query("UPDATE users SET lock_until = NOW() - INTERVAL '1 minute' WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .expect("Failed to expire lock");
    }

    /// Current lockout counters for a user
    pub async fn lockout_state(&self, user_id: Uuid) -> (i32, bool) {
        let row: (i32, Option<chrono::DateTime<chrono::Utc>>) = sqlx::query_as(
            "SELECT login_attempts, lock_until FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .expect("Failed to read lockout state");
        (row.0, row.1.is_some())
    }

    /// Create an ad owned by a user, returning its id
    pub async fn create_ad(&self, owner: Uuid, title: &str) -> Uuid {
        let (id,): (Uuid,) =
            sqlx::query_as("INSERT INTO ads (user_id, title) VALUES ($1, $2) RETURNING id")
                .bind(owner)
                .bind(title)
                .fetch_one(&self.pool)
                .await
                .expect("Failed to create ad");
        id
    }
}

fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    if let Ok(url) = std::env::var("TEST_DATABASE_URL") {
        config.database.url = url;
    }
    config
}

async fn create_test_pool(url: &str) -> PgPool {
    PgPool::connect(url).await.expect("Failed to connect to test database")
}

/// Unique username for this test run
pub fn unique_username(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4().simple())
}

/// Unique phone number in the accepted 09xxxxxxxxx format
pub fn unique_phone() -> String {
    let n = u32::from_le_bytes(Uuid::new_v4().as_bytes()[..4].try_into().unwrap());
    format!("09{:09}", n % 1_000_000_000)
}
