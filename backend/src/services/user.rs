//! User service: registration, login, token refresh and profile
//!
//! The login flow is the one place lockout state changes: locked is checked
//! before the password so a locked account leaks nothing about password
//! correctness, a failed check increments the counter atomically, and a
//! success resets it while stamping the login time.

use crate::auth::{lockout, JwtService, PasswordService};
use crate::error::ApiError;
use crate::repositories::{NewUser, UserRecord, UserRepository};
use amlak_shared::errors::AuthError;
use amlak_shared::types::{
    AuthResponse, AuthTokens, LoginRequest, ProfileResponse, PublicUser, RegisterRequest, Role,
};
use amlak_shared::validation;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;
use validator::ValidateEmail;

/// User service for authentication operations
pub struct UserService;

impl UserService {
    /// Register a new user
    ///
    /// Self-service registration always creates a `user`-role account; the
    /// request cannot carry a role at all.
    pub async fn register(
        pool: &PgPool,
        jwt_service: &JwtService,
        req: &RegisterRequest,
    ) -> Result<AuthResponse, ApiError> {
        validation::validate_name(&req.name).map_err(ApiError::Validation)?;
        validation::validate_phone(&req.phone).map_err(ApiError::Validation)?;
        validation::validate_username(&req.username).map_err(ApiError::Validation)?;
        validation::validate_password(&req.password).map_err(ApiError::Validation)?;

        if let Some(email) = req.email.as_deref() {
            if !email.validate_email() {
                return Err(ApiError::Validation("Invalid email format".to_string()));
            }
        }

        if UserRepository::username_exists(pool, &req.username)
            .await
            .map_err(ApiError::Internal)?
        {
            return Err(ApiError::conflict_on(
                "username",
                "This username is already taken",
            ));
        }

        if UserRepository::phone_exists(pool, &req.phone)
            .await
            .map_err(ApiError::Internal)?
        {
            return Err(ApiError::conflict_on(
                "phone",
                "This phone number is already registered",
            ));
        }

        // Hash on the blocking thread pool (CPU-intensive)
        let password_hash = PasswordService::hash_async(req.password.clone())
            .await
            .map_err(ApiError::Internal)?;

        let user = UserRepository::create(
            pool,
            NewUser {
                name: &req.name,
                phone: &req.phone,
                username: &req.username,
                email: req.email.as_deref(),
                password_hash: &password_hash,
                role: Role::User,
            },
        )
        .await
        .map_err(ApiError::Internal)?;

        info!(username = %user.username, "user registered");

        let tokens = Self::issue_tokens(jwt_service, &user)?;
        Ok(AuthResponse {
            tokens,
            user: Self::public_user(&user),
        })
    }

    /// Login with username and password
    pub async fn login(
        pool: &PgPool,
        jwt_service: &JwtService,
        req: &LoginRequest,
    ) -> Result<AuthResponse, ApiError> {
        if req.username.is_empty() || req.password.is_empty() {
            return Err(ApiError::Validation(
                "Username and password are required".to_string(),
            ));
        }

        // An unknown username gets the same generic failure as a wrong
        // password, and creates no lockout state.
        let user = UserRepository::find_by_username(pool, &req.username)
            .await
            .map_err(ApiError::Internal)?
            .ok_or(AuthError::InvalidCredentials)?;

        // Lockout is decided before the password is even looked at
        if lockout::is_locked(user.lock_until, Utc::now()) {
            warn!(username = %user.username, "login refused: account locked");
            return Err(AuthError::AccountLocked.into());
        }

        if user.is_banned || !user.is_active {
            return Err(AuthError::AccountDisabled.into());
        }

        // Verify on the blocking thread pool (CPU-intensive)
        let valid = PasswordService::verify_async(req.password.clone(), user.password_hash.clone())
            .await
            .map_err(ApiError::Internal)?;

        if !valid {
            let state = UserRepository::record_failed_login(pool, user.id)
                .await
                .map_err(ApiError::Internal)?;
            if let Some(state) = state {
                warn!(
                    username = %user.username,
                    attempts = state.login_attempts,
                    locked = state.lock_until.is_some(),
                    "failed login attempt"
                );
            }
            return Err(AuthError::InvalidCredentials.into());
        }

        UserRepository::reset_login_attempts(pool, user.id)
            .await
            .map_err(ApiError::Internal)?;

        info!(username = %user.username, "login successful");

        let tokens = Self::issue_tokens(jwt_service, &user)?;
        Ok(AuthResponse {
            tokens,
            user: Self::public_user(&user),
        })
    }

    /// Exchange a refresh token for a new token pair
    ///
    /// Re-reads the user so role changes and bans take effect here rather
    /// than persisting for the whole access-token lifetime.
    pub async fn refresh(
        pool: &PgPool,
        jwt_service: &JwtService,
        refresh_token: &str,
    ) -> Result<AuthTokens, ApiError> {
        let claims = jwt_service.validate_refresh_token(refresh_token)?;
        let user_id = claims.user_id()?;

        let user = UserRepository::find_by_id(pool, user_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or(AuthError::InvalidToken)?;

        if user.is_banned || !user.is_active {
            return Err(AuthError::AccountDisabled.into());
        }

        Self::issue_tokens(jwt_service, &user)
    }

    /// Get the requester's own profile
    pub async fn get_profile(pool: &PgPool, user_id: Uuid) -> Result<ProfileResponse, ApiError> {
        let user = UserRepository::find_by_id(pool, user_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        Ok(ProfileResponse {
            user: Self::public_user(&user),
            last_login: user.last_login,
            created_at: user.created_at,
        })
    }

    /// Mint an access/refresh pair for a user row
    pub(crate) fn issue_tokens(
        jwt_service: &JwtService,
        user: &UserRecord,
    ) -> Result<AuthTokens, ApiError> {
        let role = user.role();
        let access_token = jwt_service.generate_access_token(user.id, &user.username, role)?;
        let refresh_token = jwt_service.generate_refresh_token(user.id, &user.username, role)?;

        Ok(AuthTokens {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: jwt_service.access_token_expiry_secs(),
        })
    }

    /// Strip a user row down to the fields the client may see
    pub(crate) fn public_user(user: &UserRecord) -> PublicUser {
        PublicUser {
            id: user.id.to_string(),
            name: user.name.clone(),
            username: user.username.clone(),
            phone: user.phone.clone(),
            email: user.email.clone(),
            role: user.role(),
        }
    }
}
