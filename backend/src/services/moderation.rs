//! User moderation service (admin surface)
//!
//! Every operation here is gated by the authorization guard; the deletion
//! path additionally consults the ad store so a user who still owns ads is
//! never deleted out from under them.

use crate::auth::{guard, AuthUser};
use crate::error::ApiError;
use crate::repositories::{AdRepository, UpdateModeration, UserRepository};
use amlak_shared::types::{UpdateUserStatusRequest, UserSummary};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

/// Admin-side user moderation
pub struct ModerationService;

impl ModerationService {
    /// All users for the moderation listing
    pub async fn list_users(pool: &PgPool, auth: &AuthUser) -> Result<Vec<UserSummary>, ApiError> {
        guard::admin_only(auth.role).into_result()?;

        let users = UserRepository::list_all(pool).await.map_err(ApiError::Internal)?;

        Ok(users
            .iter()
            .map(|u| UserSummary {
                id: u.id.to_string(),
                name: u.name.clone(),
                phone: u.phone.clone(),
                username: u.username.clone(),
                role: u.role(),
                is_active: u.is_active,
                is_banned: u.is_banned,
                last_login: u.last_login,
                created_at: u.created_at,
            })
            .collect())
    }

    /// Partial update of moderation fields (active/banned/role)
    pub async fn set_user_status(
        pool: &PgPool,
        auth: &AuthUser,
        target: Uuid,
        req: &UpdateUserStatusRequest,
    ) -> Result<(), ApiError> {
        guard::admin_only(auth.role).into_result()?;

        if req.is_empty() {
            return Err(ApiError::BadRequest(
                "No fields specified for update".to_string(),
            ));
        }

        let updated = UserRepository::update_moderation(
            pool,
            target,
            UpdateModeration {
                is_active: req.is_active,
                is_banned: req.is_banned,
                role: req.role,
            },
        )
        .await
        .map_err(ApiError::Internal)?;

        match updated {
            Some(user) => {
                info!(
                    admin = %auth.username,
                    target = %user.username,
                    "user moderation fields updated"
                );
                Ok(())
            }
            None => Err(ApiError::NotFound("User not found".to_string())),
        }
    }

    /// Delete a user, refused while they own any ad
    pub async fn delete_user(pool: &PgPool, auth: &AuthUser, target: Uuid) -> Result<(), ApiError> {
        guard::admin_only(auth.role).into_result()?;

        let owned_ads = AdRepository::count_by_owner(pool, target)
            .await
            .map_err(ApiError::Internal)?;
        guard::user_deletion(auth.role, owned_ads).into_result()?;

        if !UserRepository::delete(pool, target)
            .await
            .map_err(ApiError::Internal)?
        {
            return Err(ApiError::NotFound("User not found".to_string()));
        }

        info!(admin = %auth.username, target = %target, "user deleted");
        Ok(())
    }
}
