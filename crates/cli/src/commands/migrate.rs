//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! plateful-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `MARKETPLACE_DATABASE_URL` - `PostgreSQL` connection string

use sqlx::PgPool;
use thiserror::Error;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration error.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run the marketplace database migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the database is unreachable or a migration
/// fails to apply.
pub async fn run() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("MARKETPLACE_DATABASE_URL")
        .map_err(|_| MigrationError::MissingEnvVar("MARKETPLACE_DATABASE_URL"))?;

    tracing::info!("Connecting to marketplace database...");
    let pool = PgPool::connect(&database_url).await?;

    tracing::info!("Running marketplace migrations...");
    sqlx::migrate!("../marketplace/migrations").run(&pool).await?;

    tracing::info!("Marketplace migrations complete!");
    Ok(())
}
