//! Seed the database with demo data for local development.
//!
//! Creates one active customer, one approved vendor with a weekday
//! schedule, and one pending vendor awaiting approval. Safe to run only
//! against an empty development database; reruns fail on the unique
//! constraints.

use sqlx::PgPool;
use thiserror::Error;

use plateful_core::{Role, Slug, TimeSlot, Weekday};
use plateful_marketplace::db::RepositoryError;
use plateful_marketplace::db::opening_hours::{NewOpeningHour, OpeningHourRepository};
use plateful_marketplace::db::profiles::ProfileRepository;
use plateful_marketplace::db::users::{NewUser, UserRepository};
use plateful_marketplace::db::vendors::{NewVendor, VendorRepository};
use plateful_marketplace::services::auth::hash_password;

/// Password shared by every seeded account.
const DEMO_PASSWORD: &str = "platefuldemo";

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Repository error.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing failure.
    #[error("Password hashing failed")]
    PasswordHash,

    /// A seeded value failed validation.
    #[error("Invalid seed data: {0}")]
    InvalidData(String),
}

/// Seed demo accounts and vendors.
///
/// # Errors
///
/// Returns `SeedError` if the database is unreachable or a row conflicts
/// with existing data.
pub async fn run() -> Result<(), SeedError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("MARKETPLACE_DATABASE_URL")
        .map_err(|_| SeedError::MissingEnvVar("MARKETPLACE_DATABASE_URL"))?;

    tracing::info!("Connecting to marketplace database...");
    let pool = PgPool::connect(&database_url).await?;

    let password_hash = hash_password(DEMO_PASSWORD).map_err(|_| SeedError::PasswordHash)?;

    seed_customer(&pool, &password_hash).await?;
    seed_vendor(
        &pool,
        &password_hash,
        "Spice Route",
        "rahul",
        "rahul@plateful.test",
        true,
    )
    .await?;
    seed_vendor(
        &pool,
        &password_hash,
        "Mama's Tandoori Kitchen",
        "meera",
        "meera@plateful.test",
        false,
    )
    .await?;

    tracing::info!("Seed complete! Demo password for all accounts: {DEMO_PASSWORD}");
    Ok(())
}

async fn seed_customer(pool: &PgPool, password_hash: &str) -> Result<(), SeedError> {
    let users = UserRepository::new(pool);
    let profiles = ProfileRepository::new(pool);

    let email = plateful_core::Email::parse("asha@plateful.test")
        .map_err(|e| SeedError::InvalidData(e.to_string()))?;

    let user = users
        .create(&NewUser {
            first_name: "Asha",
            last_name: "Nair",
            username: "asha",
            email: &email,
            password_hash,
            role: Some(Role::Customer),
        })
        .await?;
    users.activate(user.id).await?;
    profiles.create_empty(user.id).await?;

    tracing::info!("Seeded customer {} ({})", user.username, user.email);
    Ok(())
}

async fn seed_vendor(
    pool: &PgPool,
    password_hash: &str,
    vendor_name: &str,
    username: &str,
    email: &str,
    approved: bool,
) -> Result<(), SeedError> {
    let users = UserRepository::new(pool);
    let profiles = ProfileRepository::new(pool);
    let vendors = VendorRepository::new(pool);
    let hours = OpeningHourRepository::new(pool);

    let email =
        plateful_core::Email::parse(email).map_err(|e| SeedError::InvalidData(e.to_string()))?;

    let user = users
        .create(&NewUser {
            first_name: vendor_name.split_whitespace().next().unwrap_or("Vendor"),
            last_name: "Kitchen",
            username,
            email: &email,
            password_hash,
            role: Some(Role::Vendor),
        })
        .await?;
    users.activate(user.id).await?;
    let profile = profiles.create_empty(user.id).await?;

    let slug = Slug::slugify(&format!("{vendor_name} {}", user.id))
        .map_err(|e| SeedError::InvalidData(e.to_string()))?;
    let vendor = vendors
        .create(&NewVendor {
            user_id: user.id,
            profile_id: profile.id,
            vendor_name,
            vendor_slug: &slug,
        })
        .await?;

    if approved {
        vendors.set_approval(vendor.id, true).await?;
    }

    let open = TimeSlot::parse("09:00 AM").map_err(|e| SeedError::InvalidData(e.to_string()))?;
    let close = TimeSlot::parse("05:00 PM").map_err(|e| SeedError::InvalidData(e.to_string()))?;
    for day in [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
    ] {
        hours
            .create(NewOpeningHour {
                vendor_id: vendor.id,
                day,
                from_hour: open,
                to_hour: close,
                is_closed: false,
            })
            .await?;
    }

    tracing::info!(
        "Seeded vendor {} ({}, approved: {})",
        vendor.vendor_name,
        vendor.vendor_slug,
        approved
    );
    Ok(())
}
