//! Ad moderation and mutation service
//!
//! The in-scope slice of the ads domain: operations whose whole point is
//! exercising the authorization guard. Catalog, search and ad creation
//! forms live outside this core.

use crate::auth::{guard, AuthUser};
use crate::error::ApiError;
use crate::repositories::AdRepository;
use amlak_shared::types::UpdateAdStatusRequest;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

/// Ad-side operations gated by the guard
pub struct AdService;

impl AdService {
    /// Moderation: approve/reject/reset an ad (admin only)
    pub async fn set_status(
        pool: &PgPool,
        auth: &AuthUser,
        ad_id: Uuid,
        req: &UpdateAdStatusRequest,
    ) -> Result<(), ApiError> {
        guard::admin_only(auth.role).into_result()?;

        if !AdRepository::set_status(pool, ad_id, req.status, req.admin_notes.as_deref())
            .await
            .map_err(ApiError::Internal)?
        {
            return Err(ApiError::NotFound("Ad not found".to_string()));
        }

        info!(admin = %auth.username, ad = %ad_id, status = ?req.status, "ad status updated");
        Ok(())
    }

    /// Moderation: rate an ad 1-5 stars (admin only)
    pub async fn rate(
        pool: &PgPool,
        auth: &AuthUser,
        ad_id: Uuid,
        stars: i16,
    ) -> Result<(), ApiError> {
        guard::admin_only(auth.role).into_result()?;

        if !(1..=5).contains(&stars) {
            return Err(ApiError::Validation(
                "Rating must be between 1 and 5".to_string(),
            ));
        }

        if !AdRepository::set_rating(pool, ad_id, stars)
            .await
            .map_err(ApiError::Internal)?
        {
            return Err(ApiError::NotFound("Ad not found".to_string()));
        }

        Ok(())
    }

    /// Delete an ad: the owner or any admin
    pub async fn delete(pool: &PgPool, auth: &AuthUser, ad_id: Uuid) -> Result<(), ApiError> {
        let ad = AdRepository::find_by_id(pool, ad_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Ad not found".to_string()))?;

        guard::ad_mutation(auth.user_id, auth.role, ad.user_id).into_result()?;

        if !AdRepository::delete(pool, ad_id)
            .await
            .map_err(ApiError::Internal)?
        {
            return Err(ApiError::NotFound("Ad not found".to_string()));
        }

        info!(requester = %auth.username, ad = %ad_id, "ad deleted");
        Ok(())
    }
}
