//! User routes: registration, login, refresh, profile and the admin
//! moderation surface
//!
//! Password hashing and verification run on the blocking thread pool; the
//! JWT keys come pre-computed from AppState.

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::{ModerationService, UserService};
use crate::state::AppState;
use amlak_shared::types::{
    AuthResponse, AuthTokens, LoginRequest, ProfileResponse, RefreshRequest, RegisterRequest,
    UpdateUserStatusRequest, UserListResponse,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use uuid::Uuid;

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/profile", get(profile))
        .route("/admin", get(list_users))
        .route("/admin/:user_id", patch(update_user_status).delete(delete_user))
}

/// Register a new user
///
/// POST /api/users/register
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let response = UserService::register(&state.db, state.jwt(), &req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Login with username and password
///
/// POST /api/users/login
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let response = UserService::login(&state.db, state.jwt(), &req).await?;
    Ok(Json(response))
}

/// Exchange a refresh token for a new token pair
///
/// POST /api/users/refresh
async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<AuthTokens>> {
    let tokens = UserService::refresh(&state.db, state.jwt(), &req.refresh_token).await?;
    Ok(Json(tokens))
}

/// Get current user profile (requires authentication)
///
/// GET /api/users/profile
async fn profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> ApiResult<Json<ProfileResponse>> {
    let profile = UserService::get_profile(&state.db, auth_user.user_id).await?;
    Ok(Json(profile))
}

/// Admin: list all users
///
/// GET /api/users/admin
async fn list_users(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> ApiResult<Json<UserListResponse>> {
    let users = ModerationService::list_users(&state.db, &auth_user).await?;
    Ok(Json(UserListResponse { users }))
}

/// Admin: update a user's moderation fields
///
/// PATCH /api/users/admin/:user_id
async fn update_user_status(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(user_id): Path<Uuid>,
    Json(req): Json<UpdateUserStatusRequest>,
) -> ApiResult<StatusCode> {
    ModerationService::set_user_status(&state.db, &auth_user, user_id, &req).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Admin: delete a user (refused while they own ads)
///
/// DELETE /api/users/admin/:user_id
async fn delete_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(user_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    ModerationService::delete_user(&state.db, &auth_user, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
