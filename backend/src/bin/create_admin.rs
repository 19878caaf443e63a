//! Admin bootstrap binary
//!
//! Seeds the first admin account from the `bootstrap` config section.
//! Idempotent: exits quietly if any admin already exists, so it is safe to
//! run on every deploy.

use amlak_backend::auth::PasswordService;
use amlak_backend::repositories::{NewUser, UserRepository};
use amlak_backend::{config, db};
use amlak_shared::types::Role;
use anyhow::Result;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "create_admin=info".into()),
        )
        .init();

    let config = config::AppConfig::load()?;

    let pool = db::create_pool(&config.database.url, 2).await?;
    db::run_migrations(&pool).await?;

    if let Some(admin) = UserRepository::find_admin(&pool).await? {
        info!(username = %admin.username, "Admin user already exists");
        return Ok(());
    }

    let bootstrap = &config.bootstrap;
    let password_hash = PasswordService::hash_async(bootstrap.admin_password.clone()).await?;

    let admin = UserRepository::create(
        &pool,
        NewUser {
            name: &bootstrap.admin_name,
            phone: &bootstrap.admin_phone,
            username: &bootstrap.admin_username,
            email: bootstrap.admin_email.as_deref(),
            password_hash: &password_hash,
            role: Role::Admin,
        },
    )
    .await?;

    info!(username = %admin.username, id = %admin.id, "Admin user created");
    Ok(())
}
