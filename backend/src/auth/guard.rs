//! Authorization guard
//!
//! Pure allow/deny decisions over verified claims. Handlers translate a
//! denial into the response status via `Decision::into_result`; nothing
//! here touches the database or mutates state.

use crate::error::ApiError;
use amlak_shared::errors::AuthError;
use amlak_shared::types::Role;
use uuid::Uuid;

/// Outcome of an authorization check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

/// Why a request was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// Route is admin-only and the requester is not an admin
    AdminRequired,
    /// Resource belongs to someone else and the requester is not an admin
    NotOwner,
    /// Target user still owns ads; deletion would orphan them
    TargetOwnsAds,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Convert into the error the HTTP layer responds with
    pub fn into_result(self) -> Result<(), ApiError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(DenyReason::AdminRequired) | Decision::Deny(DenyReason::NotOwner) => {
                Err(AuthError::Forbidden.into())
            }
            Decision::Deny(DenyReason::TargetOwnsAds) => Err(ApiError::conflict(
                "Cannot delete a user who still owns ads",
            )),
        }
    }
}

/// Admin-only surfaces: user moderation, ad moderation, stats
pub fn admin_only(role: Role) -> Decision {
    match role {
        Role::Admin => Decision::Allow,
        Role::User => Decision::Deny(DenyReason::AdminRequired),
    }
}

/// Ad mutation/deletion: the owner or any admin
pub fn ad_mutation(requester: Uuid, role: Role, owner: Uuid) -> Decision {
    if requester == owner || role.is_admin() {
        Decision::Allow
    } else {
        Decision::Deny(DenyReason::NotOwner)
    }
}

/// User deletion: admin-only, and refused while the target owns ads
pub fn user_deletion(role: Role, owned_ads: i64) -> Decision {
    match admin_only(role) {
        Decision::Allow if owned_ads > 0 => Decision::Deny(DenyReason::TargetOwnsAds),
        decision => decision,
    }
}
