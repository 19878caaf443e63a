//! API request and response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User role carried in tokens and moderation payloads
///
/// The authorization guard pattern-matches on this tag; it never probes
/// any other part of the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => f.write_str("user"),
            Role::Admin => f.write_str("admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Registration request
///
/// `role` is deliberately absent: self-service registration always
/// creates a `user`-role account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub phone: String,
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Token refresh request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Authentication tokens response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Successful login/registration payload: tokens plus the public profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(flatten)]
    pub tokens: AuthTokens,
    pub user: PublicUser,
}

/// Public view of a user: everything the client may cache.
/// The password hash never appears here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: String,
    pub name: String,
    pub username: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: Role,
}

/// Own-profile response (adds login metadata)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: PublicUser,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Moderation listing row (admin user list)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub username: String,
    pub role: Role,
    pub is_active: bool,
    pub is_banned: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Partial moderation update; at least one field must be present
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserStatusRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_banned: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl UpdateUserStatusRequest {
    pub fn is_empty(&self) -> bool {
        self.is_active.is_none() && self.is_banned.is_none() && self.role.is_none()
    }
}

/// Moderation listing response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserListResponse {
    pub users: Vec<UserSummary>,
}

/// Ad moderation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdStatus {
    Pending,
    Approved,
    Rejected,
}

/// Admin ad status update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAdStatusRequest {
    pub status: AdStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,
}

/// Admin ad rating (1-5 stars)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateAdRequest {
    pub stars: i16,
}

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
    }

    #[test]
    fn role_roundtrips() {
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert!(role.is_admin());
        let role: Role = serde_json::from_str("\"user\"").unwrap();
        assert!(!role.is_admin());
    }

    #[test]
    fn auth_response_flattens_tokens() {
        let response = AuthResponse {
            tokens: AuthTokens {
                access_token: "a".to_string(),
                refresh_token: "r".to_string(),
                token_type: "Bearer".to_string(),
                expires_in: 604800,
            },
            user: PublicUser {
                id: "1".to_string(),
                name: "Alice".to_string(),
                username: "alice".to_string(),
                phone: "09120000000".to_string(),
                email: None,
                role: Role::User,
            },
        };

        let json: serde_json::Value = serde_json::to_value(&response).unwrap();
        assert_eq!(json["access_token"], "a");
        assert_eq!(json["user"]["username"], "alice");
        // email is omitted, never serialized as null
        assert!(json["user"].get("email").is_none());
    }

    #[test]
    fn update_status_request_emptiness() {
        assert!(UpdateUserStatusRequest::default().is_empty());
        let req = UpdateUserStatusRequest {
            is_banned: Some(true),
            ..Default::default()
        };
        assert!(!req.is_empty());
    }

    #[test]
    fn public_user_never_contains_password_fields() {
        let json = serde_json::to_string(&PublicUser {
            id: "1".to_string(),
            name: "Bob".to_string(),
            username: "bob".to_string(),
            phone: "09121111111".to_string(),
            email: Some("bob@example.com".to_string()),
            role: Role::User,
        })
        .unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("hash"));
    }
}
