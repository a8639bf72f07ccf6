//! Database operations for the marketplace `PostgreSQL`.
//!
//! # Tables
//!
//! - `users` - Accounts with role flags and password hashes
//! - `user_profiles` - Address / geolocation extension, one per user
//! - `vendors` - Seller entities, one per user + profile pair
//! - `opening_hours` - Per-vendor weekly opening windows
//! - `tower_sessions.session` - Session storage (managed by the store)
//!
//! # Migrations
//!
//! Migrations live in `crates/marketplace/migrations/` and run via:
//! ```bash
//! cargo run -p plateful-cli -- migrate
//! ```
//!
//! All queries go through the repository types in the submodules; rows are
//! decoded into plain row structs and then converted into validated domain
//! types, with invalid stored data surfacing as
//! [`RepositoryError::DataCorruption`].

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub mod opening_hours;
pub mod profiles;
pub mod users;
pub mod vendors;

/// Errors surfaced by the repository layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The referenced row does not exist.
    #[error("not found")]
    NotFound,

    /// A stored value failed domain validation.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

impl RepositoryError {
    /// Map a sqlx error onto `Conflict` when it is a unique violation,
    /// keeping everything else as `Database`.
    pub(crate) fn from_unique_violation(e: sqlx::Error, message: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return Self::Conflict(message.to_owned());
        }
        Self::Database(e)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
