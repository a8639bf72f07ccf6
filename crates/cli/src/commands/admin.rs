//! Superadmin account management commands.
//!
//! # Usage
//!
//! ```bash
//! plateful-cli admin create -e admin@example.com -u admin -f Ada -l Lovelace
//! ```
//!
//! # Environment Variables
//!
//! - `MARKETPLACE_DATABASE_URL` - `PostgreSQL` connection string

use rand::Rng;
use rand::distr::Alphanumeric;
use sqlx::PgPool;
use thiserror::Error;

use plateful_core::{Email, EmailError};
use plateful_marketplace::db::RepositoryError;
use plateful_marketplace::db::users::{NewUser, UserRepository};
use plateful_marketplace::services::auth::hash_password;

/// Generated password length when none is supplied.
const GENERATED_PASSWORD_LENGTH: usize = 24;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid email address.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Account already exists.
    #[error("Account already exists with this email or username")]
    UserExists,

    /// Password hashing failure.
    #[error("Password hashing failed")]
    PasswordHash,

    /// Repository error.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Create a new superadmin account.
///
/// Superadmins are active immediately, carry no marketplace role, and land
/// on the admin area after login. When no password is given, a random one
/// is generated and printed once.
///
/// # Errors
///
/// Returns `AdminError` if the email is invalid, the account exists, or
/// the database is unreachable.
#[allow(clippy::print_stdout)] // the generated password goes to stdout on purpose
pub async fn create_superadmin(
    email: &str,
    username: &str,
    first_name: &str,
    last_name: &str,
    password: Option<&str>,
) -> Result<i32, AdminError> {
    dotenvy::dotenv().ok();

    let email = Email::parse(email)?;

    let database_url = std::env::var("MARKETPLACE_DATABASE_URL")
        .map_err(|_| AdminError::MissingEnvVar("MARKETPLACE_DATABASE_URL"))?;

    tracing::info!("Connecting to marketplace database...");
    let pool = PgPool::connect(&database_url).await?;

    let generated = password.is_none();
    let password = password.map_or_else(generate_password, str::to_owned);

    let password_hash = hash_password(&password).map_err(|_| AdminError::PasswordHash)?;

    let users = UserRepository::new(&pool);
    let user = users
        .create_superadmin(&NewUser {
            first_name,
            last_name,
            username,
            email: &email,
            password_hash: &password_hash,
            role: None,
        })
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => AdminError::UserExists,
            other => AdminError::Repository(other),
        })?;

    tracing::info!(
        "Superadmin created! ID: {}, Email: {}",
        user.id,
        user.email
    );
    if generated {
        println!("Generated password (shown once): {password}");
    }

    Ok(user.id.as_i32())
}

fn generate_password() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_PASSWORD_LENGTH)
        .map(char::from)
        .collect()
}
