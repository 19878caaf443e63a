//! Ad routes: the mutation/moderation endpoints gated by the
//! authorization guard
//!
//! The public catalog and ad creation forms are outside this core; these
//! routes exist because they are the guard's consumers.

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::AdService;
use crate::state::AppState;
use amlak_shared::types::{RateAdRequest, UpdateAdStatusRequest};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, patch, post},
    Json, Router,
};
use uuid::Uuid;

/// Create ad routes
pub fn ad_routes() -> Router<AppState> {
    Router::new()
        .route("/:ad_id", delete(delete_ad))
        .route("/:ad_id/status", patch(update_ad_status))
        .route("/:ad_id/rate", post(rate_ad))
}

/// Delete an ad (owner or admin)
///
/// DELETE /api/ads/:ad_id
async fn delete_ad(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(ad_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    AdService::delete(&state.db, &auth_user, ad_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Admin: approve or reject an ad
///
/// PATCH /api/ads/:ad_id/status
async fn update_ad_status(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(ad_id): Path<Uuid>,
    Json(req): Json<UpdateAdStatusRequest>,
) -> ApiResult<StatusCode> {
    AdService::set_status(&state.db, &auth_user, ad_id, &req).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Admin: rate an ad 1-5 stars
///
/// POST /api/ads/:ad_id/rate
async fn rate_ad(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(ad_id): Path<Uuid>,
    Json(req): Json<RateAdRequest>,
) -> ApiResult<StatusCode> {
    AdService::rate(&state.db, &auth_user, ad_id, req.stars).await?;
    Ok(StatusCode::NO_CONTENT)
}
