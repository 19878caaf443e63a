//! User repository for database operations
//!
//! The lockout counters live on the user row; `record_failed_login` is a
//! single UPDATE so concurrent failed logins for one user serialize on the
//! row lock and no increment is ever lost.

use crate::auth::lockout;
use amlak_shared::types::Role;
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::str::FromStr;
use uuid::Uuid;

/// User record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
    pub is_banned: bool,
    pub login_attempts: i32,
    pub lock_until: Option<DateTime<Utc>>,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// Role column as the shared tagged enum.
    /// The CHECK constraint keeps the column in range; an unknown value
    /// degrades to the least-privileged role.
    pub fn role(&self) -> Role {
        Role::from_str(&self.role).unwrap_or(Role::User)
    }
}

/// Input for creating a user
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub name: &'a str,
    pub phone: &'a str,
    pub username: &'a str,
    pub email: Option<&'a str>,
    pub password_hash: &'a str,
    pub role: Role,
}

/// Lockout columns returned by the atomic failed-login update
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LockoutState {
    pub login_attempts: i32,
    pub lock_until: Option<DateTime<Utc>>,
}

/// Input for partial moderation updates; None leaves the column untouched
#[derive(Debug, Clone, Default)]
pub struct UpdateModeration {
    pub is_active: Option<bool>,
    pub is_banned: Option<bool>,
    pub role: Option<Role>,
}

const USER_COLUMNS: &str = "id, name, phone, username, email, password_hash, role, \
     is_active, is_banned, login_attempts, lock_until, last_login, created_at, updated_at";

/// User repository for database operations
pub struct UserRepository;

impl UserRepository {
    /// Create a new user
    pub async fn create(pool: &PgPool, new_user: NewUser<'_>) -> Result<UserRecord> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            INSERT INTO users (name, phone, username, email, password_hash, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(new_user.name)
        .bind(new_user.phone)
        .bind(new_user.username)
        .bind(new_user.email)
        .bind(new_user.password_hash)
        .bind(new_user.role.to_string())
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Find user by username
    pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1",
        ))
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Find user by phone
    pub async fn find_by_phone(pool: &PgPool, phone: &str) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE phone = $1",
        ))
        .bind(phone)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Find user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Find any admin user (bootstrap idempotence check)
    pub async fn find_admin(pool: &PgPool) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE role = 'admin' LIMIT 1",
        ))
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// All users, newest first (moderation listing)
    pub async fn list_all(pool: &PgPool) -> Result<Vec<UserRecord>> {
        let users = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC",
        ))
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Check if username exists
    pub async fn username_exists(pool: &PgPool, username: &str) -> Result<bool> {
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)",
        )
        .bind(username)
        .fetch_one(pool)
        .await?;

        Ok(result)
    }

    /// Check if phone exists
    pub async fn phone_exists(pool: &PgPool, phone: &str) -> Result<bool> {
        let result =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE phone = $1)")
                .bind(phone)
                .fetch_one(pool)
                .await?;

        Ok(result)
    }

    /// Register one failed password check.
    ///
    /// Increment and lock decision happen in one statement so the per-user
    /// row lock serializes concurrent attempts; the lock engages when the
    /// updated counter reaches the policy threshold. Returns the resulting
    /// lockout state, or None for an unknown id.
    pub async fn record_failed_login(pool: &PgPool, id: Uuid) -> Result<Option<LockoutState>> {
        let state = sqlx::query_as::<_, LockoutState>(
            r#"
            UPDATE users
            SET login_attempts = login_attempts + 1,
                lock_until = CASE
                    WHEN login_attempts + 1 >= $2
                    THEN NOW() + make_interval(secs => $3)
                    ELSE lock_until
                END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING login_attempts, lock_until
            "#,
        )
        .bind(id)
        .bind(lockout::MAX_FAILED_ATTEMPTS)
        .bind(lockout::lockout_duration().num_seconds() as f64)
        .fetch_optional(pool)
        .await?;

        Ok(state)
    }

    /// Reset lockout state and stamp the login time, atomically
    pub async fn reset_login_attempts(pool: &PgPool, id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET login_attempts = 0, lock_until = NULL, last_login = NOW(), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Partial moderation update; unspecified columns keep their values
    pub async fn update_moderation(
        pool: &PgPool,
        id: Uuid,
        updates: UpdateModeration,
    ) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            UPDATE users SET
                is_active = COALESCE($2, is_active),
                is_banned = COALESCE($3, is_banned),
                role = COALESCE($4, role),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(updates.is_active)
        .bind(updates.is_banned)
        .bind(updates.role.map(|r| r.to_string()))
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Delete a user; returns false for an unknown id
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
