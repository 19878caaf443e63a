//! Ad repository
//!
//! Only the slice of the ads table the identity core consumes: ownership
//! lookups for the authorization guard, the per-owner count backing the
//! user-deletion refusal, and the moderation mutations the guard gates.

use amlak_shared::types::AdStatus;
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Ad record (moderation view)
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub status: String,
    pub admin_notes: Option<String>,
    pub stars: Option<i16>,
    pub created_at: DateTime<Utc>,
}

fn status_str(status: AdStatus) -> &'static str {
    match status {
        AdStatus::Pending => "pending",
        AdStatus::Approved => "approved",
        AdStatus::Rejected => "rejected",
    }
}

/// Ad repository for database operations
pub struct AdRepository;

impl AdRepository {
    /// Create an ad owned by a user (pending until moderated)
    pub async fn create(pool: &PgPool, user_id: Uuid, title: &str) -> Result<AdRecord> {
        let ad = sqlx::query_as::<_, AdRecord>(
            r#"
            INSERT INTO ads (user_id, title)
            VALUES ($1, $2)
            RETURNING id, user_id, title, status, admin_notes, stars, created_at
            "#,
        )
        .bind(user_id)
        .bind(title)
        .fetch_one(pool)
        .await?;

        Ok(ad)
    }

    /// Find an ad by id
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<AdRecord>> {
        let ad = sqlx::query_as::<_, AdRecord>(
            r#"
            SELECT id, user_id, title, status, admin_notes, stars, created_at
            FROM ads
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(ad)
    }

    /// Number of ads a user owns (consulted before user deletion)
    pub async fn count_by_owner(pool: &PgPool, user_id: Uuid) -> Result<i64> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM ads WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }

    /// Moderation: set status and notes; returns false for an unknown id
    pub async fn set_status(
        pool: &PgPool,
        id: Uuid,
        status: AdStatus,
        admin_notes: Option<&str>,
    ) -> Result<bool> {
        let result = sqlx::query("UPDATE ads SET status = $2, admin_notes = $3 WHERE id = $1")
            .bind(id)
            .bind(status_str(status))
            .bind(admin_notes)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Moderation: rate an ad; returns false for an unknown id
    pub async fn set_rating(pool: &PgPool, id: Uuid, stars: i16) -> Result<bool> {
        let result = sqlx::query("UPDATE ads SET stars = $2 WHERE id = $1")
            .bind(id)
            .bind(stars)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete an ad; returns false for an unknown id
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM ads WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
