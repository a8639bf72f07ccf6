//! HTTP route handlers for the marketplace.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                         - Health check
//!
//! # Auth
//! POST /auth/register                  - Register a customer account
//! POST /auth/register-vendor           - Register a vendor account + listing
//! GET  /auth/activate/{uid}/{token}    - Activate an account from an email link
//! POST /auth/login                     - Login action
//! POST /auth/logout                    - Logout action
//!
//! # Account (requires auth)
//! GET  /account                        - Redirect to the role dashboard
//! GET  /account/customer               - Customer dashboard (account + profile)
//! GET  /account/vendor                 - Vendor dashboard (listing, hours, availability)
//! GET  /api/account/me                 - Current account details
//! GET  /api/account/profile            - Current profile
//! PUT  /api/account/profile            - Update profile (recomputes location)
//! POST /api/account/profile/media      - Upload profile picture / cover photo
//!
//! # Vendor (requires vendor role)
//! GET  /api/vendor                     - Own listing, hours, availability
//! GET  /api/vendor/hours/slots         - The 48 half-hour slot labels
//! POST /api/vendor/hours               - Add an opening-hours row
//! DELETE /api/vendor/hours/{id}        - Remove an opening-hours row
//! POST /api/vendor/license             - Upload a license image
//!
//! # Marketplace (public)
//! GET  /api/marketplace                - Approved vendors with availability
//! GET  /api/marketplace/{slug}         - One vendor with weekly hours
//! GET  /api/client-config              - Browser-side integration keys
//!
//! # Admin (requires superadmin)
//! GET  /api/admin/vendors              - Every vendor, newest first
//! POST /api/admin/vendors/{id}/approval - Set the approval flag
//! ```

pub mod account;
pub mod admin;
pub mod auth;
pub mod marketplace;
pub mod vendor;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/register-vendor", post(auth::register_vendor))
        .route("/activate/{uid}/{token}", get(auth::activate))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the account API routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(account::me))
        .route(
            "/profile",
            get(account::profile).put(account::update_profile),
        )
        .route("/profile/media", post(account::upload_media))
}

/// Create the vendor API routes router.
pub fn vendor_routes() -> Router<AppState> {
    use axum::routing::delete;

    Router::new()
        .route("/", get(vendor::show))
        .route("/hours/slots", get(vendor::hour_slots))
        .route("/hours", post(vendor::add_hours))
        .route("/hours/{id}", delete(vendor::remove_hours))
        .route("/license", post(vendor::upload_license))
}

/// Create the admin API routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/vendors", get(admin::list_vendors))
        .route("/vendors/{id}/approval", post(admin::set_approval))
}

/// Create all routes for the marketplace.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(marketplace::health))
        .route("/account", get(account::dashboard))
        .route("/account/customer", get(account::customer_dashboard))
        .route("/account/vendor", get(vendor::show))
        .nest("/auth", auth_routes())
        .nest("/api/account", account_routes())
        .nest("/api/vendor", vendor_routes())
        .nest("/api/admin", admin_routes())
        .route("/api/marketplace", get(marketplace::index))
        .route("/api/marketplace/{slug}", get(marketplace::show))
        .route("/api/client-config", get(marketplace::client_config))
}
