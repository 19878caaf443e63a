//! Integration tests for registration, login and the lockout policy

mod common;

use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
#[ignore = "requires database"]
async fn test_register_success_with_user_role() {
    let app = common::TestApp::new().await;

    let body = json!({
        "name": "Alice",
        "phone": common::unique_phone(),
        "username": common::unique_username("alice"),
        "password": "secret1",
    });
    let (status, response) = app.post("/api/users/register", &body.to_string()).await;

    assert_eq!(status, StatusCode::CREATED);

    let response: serde_json::Value = serde_json::from_str(&response).unwrap();
    assert!(!response["access_token"].as_str().unwrap().is_empty());
    assert!(!response["refresh_token"].as_str().unwrap().is_empty());
    assert_eq!(response["token_type"], "Bearer");
    // Self-service registration can never mint anything but a user
    assert_eq!(response["user"]["role"], "user");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_register_duplicate_phone_conflicts() {
    let app = common::TestApp::new().await;
    let phone = common::unique_phone();

    let first = json!({
        "name": "Alice",
        "phone": phone,
        "username": common::unique_username("alice"),
        "password": "secret1",
    });
    let (status, _) = app.post("/api/users/register", &first.to_string()).await;
    assert_eq!(status, StatusCode::CREATED);

    // Same phone, different username
    let second = json!({
        "name": "Mallory",
        "phone": phone,
        "username": common::unique_username("mallory"),
        "password": "secret1",
    });
    let (status, response) = app.post("/api/users/register", &second.to_string()).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let response: serde_json::Value = serde_json::from_str(&response).unwrap();
    assert_eq!(response["error"]["field"], "phone");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_register_duplicate_username_conflicts() {
    let app = common::TestApp::new().await;
    let username = common::unique_username("bob");

    let first = json!({
        "name": "Bob",
        "phone": common::unique_phone(),
        "username": username,
        "password": "secret1",
    });
    let (status, _) = app.post("/api/users/register", &first.to_string()).await;
    assert_eq!(status, StatusCode::CREATED);

    let second = json!({
        "name": "Bobby",
        "phone": common::unique_phone(),
        "username": username,
        "password": "secret1",
    });
    let (status, response) = app.post("/api/users/register", &second.to_string()).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let response: serde_json::Value = serde_json::from_str(&response).unwrap();
    assert_eq!(response["error"]["field"], "username");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_register_rejects_malformed_phone() {
    let app = common::TestApp::new().await;

    let body = json!({
        "name": "Alice",
        "phone": "12345",
        "username": common::unique_username("alice"),
        "password": "secret1",
    });
    let (status, _) = app.post("/api/users/register", &body.to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_register_rejects_role_smuggling() {
    let app = common::TestApp::new().await;
    let username = common::unique_username("sneaky");

    // Unknown fields are ignored; role stays user
    let body = json!({
        "name": "Sneaky",
        "phone": common::unique_phone(),
        "username": username,
        "password": "secret1",
        "role": "admin",
    });
    let (status, response) = app.post("/api/users/register", &body.to_string()).await;
    assert_eq!(status, StatusCode::CREATED);

    let response: serde_json::Value = serde_json::from_str(&response).unwrap();
    assert_eq!(response["user"]["role"], "user");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_login_wrong_password_then_success() {
    let app = common::TestApp::new().await;
    let username = common::unique_username("carol");
    let (user_id, _) = app
        .register_user(&username, &common::unique_phone(), "secret1")
        .await;

    let wrong = json!({ "username": username, "password": "wrong" });
    let (status, _) = app.post("/api/users/login", &wrong.to_string()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // The failure was counted
    let (attempts, locked) = app.lockout_state(user_id).await;
    assert_eq!(attempts, 1);
    assert!(!locked);

    // A correct login succeeds and resets the counter
    app.login(&username, "secret1").await;
    let (attempts, locked) = app.lockout_state(user_id).await;
    assert_eq!(attempts, 0);
    assert!(!locked);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_unknown_username_gets_generic_401() {
    let app = common::TestApp::new().await;

    let body = json!({ "username": "no_such_user_ever", "password": "whatever" });
    let (status, response) = app.post("/api/users/login", &body.to_string()).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let response: serde_json::Value = serde_json::from_str(&response).unwrap();
    assert_eq!(response["error"]["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_lockout_after_five_failures_refuses_correct_password() {
    let app = common::TestApp::new().await;
    let username = common::unique_username("dave");
    let (user_id, _) = app
        .register_user(&username, &common::unique_phone(), "secret1")
        .await;

    let wrong = json!({ "username": username, "password": "wrong" }).to_string();
    for _ in 0..5 {
        let (status, _) = app.post("/api/users/login", &wrong).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    let (attempts, locked) = app.lockout_state(user_id).await;
    assert_eq!(attempts, 5);
    assert!(locked);

    // Sixth attempt with the CORRECT password is still refused
    let correct = json!({ "username": username, "password": "secret1" });
    let (status, response) = app.post("/api/users/login", &correct.to_string()).await;
    assert_eq!(status, StatusCode::LOCKED);

    let response: serde_json::Value = serde_json::from_str(&response).unwrap();
    assert_eq!(response["error"]["code"], "ACCOUNT_LOCKED");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_login_succeeds_after_lockout_window_passes() {
    let app = common::TestApp::new().await;
    let username = common::unique_username("erin");
    let (user_id, _) = app
        .register_user(&username, &common::unique_phone(), "secret1")
        .await;

    let wrong = json!({ "username": username, "password": "wrong" }).to_string();
    for _ in 0..5 {
        app.post("/api/users/login", &wrong).await;
    }

    // Time travel: the window has passed
    app.expire_lock(user_id).await;

    app.login(&username, "secret1").await;
    let (attempts, locked) = app.lockout_state(user_id).await;
    assert_eq!(attempts, 0);
    assert!(!locked);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_banned_user_cannot_login() {
    let app = common::TestApp::new().await;
    let username = common::unique_username("frank");
    let (user_id, _) = app
        .register_user(&username, &common::unique_phone(), "secret1")
        .await;

    sqlx::query("UPDATE users SET is_banned = TRUE WHERE id = $1")
        .bind(user_id)
        .execute(&app.pool)
        .await
        .unwrap();

    let body = json!({ "username": username, "password": "secret1" });
    let (status, response) = app.post("/api/users/login", &body.to_string()).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    let response: serde_json::Value = serde_json::from_str(&response).unwrap();
    assert_eq!(response["error"]["code"], "ACCOUNT_DISABLED");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_profile_requires_token() {
    let app = common::TestApp::new().await;
    let username = common::unique_username("grace");
    let (_, token) = app
        .register_user(&username, &common::unique_phone(), "secret1")
        .await;

    let (status, _) = app.request("GET", "/api/users/profile", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, response) = app
        .request("GET", "/api/users/profile", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let response: serde_json::Value = serde_json::from_str(&response).unwrap();
    assert_eq!(response["username"], username);
    assert!(response.get("password_hash").is_none());
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_refresh_rotates_the_token_pair() {
    let app = common::TestApp::new().await;
    let username = common::unique_username("heidi");

    let body = json!({
        "name": "Heidi",
        "phone": common::unique_phone(),
        "username": username,
        "password": "secret1",
    });
    let (_, response) = app.post("/api/users/register", &body.to_string()).await;
    let response: serde_json::Value = serde_json::from_str(&response).unwrap();
    let refresh_token = response["refresh_token"].as_str().unwrap();

    let body = json!({ "refresh_token": refresh_token });
    let (status, response) = app.post("/api/users/refresh", &body.to_string()).await;
    assert_eq!(status, StatusCode::OK);

    let response: serde_json::Value = serde_json::from_str(&response).unwrap();
    assert!(!response["access_token"].as_str().unwrap().is_empty());

    // An access token is not accepted as a refresh token
    let access = response["access_token"].as_str().unwrap();
    let body = json!({ "refresh_token": access });
    let (status, _) = app.post("/api/users/refresh", &body.to_string()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
