//! Database migration command.
//!
//! Applies `crates/storefront/migrations/` (the `storefront` schema: product,
//! upsell, cart and setting documents). Migrations never run on server
//! startup; deploys run this command first.
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

use thiserror::Error;

use cherlygood_storefront::db;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run storefront database migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails or
/// a migration fails to apply.
pub async fn storefront() -> Result<(), MigrationError> {
    let database_url = super::database_url().map_err(MigrationError::MissingEnvVar)?;

    tracing::info!("Connecting to storefront database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running storefront migrations...");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;

    tracing::info!("Storefront migrations complete!");
    Ok(())
}
