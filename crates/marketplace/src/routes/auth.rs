//! Authentication routes: registration, activation, login, logout.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use plateful_core::Role;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::{AuthService, Registration, encode_uid};
use crate::services::vendors::VendorService;
use crate::state::AppState;

/// Request body for customer registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request body for vendor registration.
#[derive(Debug, Deserialize)]
pub struct RegisterVendorRequest {
    #[serde(flatten)]
    pub account: RegisterRequest,
    pub vendor_name: String,
}

/// Response for a successful registration.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: i32,
    pub email: String,
    pub message: &'static str,
}

/// Response for a successful vendor registration.
#[derive(Debug, Serialize)]
pub struct RegisterVendorResponse {
    pub user_id: i32,
    pub vendor_id: i32,
    pub vendor_slug: String,
    pub message: &'static str,
}

/// Register a customer account.
///
/// POST /auth/register
///
/// The account starts inactive; an activation link goes out by email.
///
/// # Errors
///
/// Returns `AppError` if validation fails or the email/username is taken.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    let auth = AuthService::new(state.pool());

    let user = auth
        .register(&Registration {
            first_name: &req.first_name,
            last_name: &req.last_name,
            username: &req.username,
            email: &req.email,
            password: &req.password,
            role: Role::Customer,
        })
        .await?;

    send_activation(&state, &user).await;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: user.id.as_i32(),
            email: user.email.to_string(),
            message: "Check your email to activate your account",
        }),
    ))
}

/// Register a vendor account together with its listing.
///
/// POST /auth/register-vendor
///
/// # Errors
///
/// Returns `AppError` if validation fails or the account/listing conflicts.
pub async fn register_vendor(
    State(state): State<AppState>,
    Json(req): Json<RegisterVendorRequest>,
) -> Result<(StatusCode, Json<RegisterVendorResponse>)> {
    let vendors = VendorService::new(state.pool());

    let (user, vendor) = vendors
        .onboard(
            Registration {
                first_name: &req.account.first_name,
                last_name: &req.account.last_name,
                username: &req.account.username,
                email: &req.account.email,
                password: &req.account.password,
                role: Role::Vendor,
            },
            &req.vendor_name,
        )
        .await?;

    send_activation(&state, &user).await;

    Ok((
        StatusCode::CREATED,
        Json(RegisterVendorResponse {
            user_id: user.id.as_i32(),
            vendor_id: vendor.id.as_i32(),
            vendor_slug: vendor.vendor_slug.to_string(),
            message: "Check your email to activate your account",
        }),
    ))
}

/// Send the activation email for a freshly created account.
///
/// The account row is already committed at this point; a delivery failure
/// is logged rather than rolling the registration back.
async fn send_activation(state: &AppState, user: &crate::models::User) {
    let uid = encode_uid(user.id);
    let token = state.tokens().generate(user);
    let activation_url = format!(
        "{}/auth/activate/{uid}/{token}",
        state.config().base_url.trim_end_matches('/')
    );

    if let Err(e) = state
        .email()
        .send_activation_email(user.email.as_str(), &user.full_name(), &activation_url)
        .await
    {
        tracing::error!(error = %e, user_id = %user.id, "Failed to send activation email");
    }
}

/// Response for a successful activation.
#[derive(Debug, Serialize)]
pub struct ActivateResponse {
    pub message: &'static str,
    pub login_url: &'static str,
}

/// Activate an account from an emailed link.
///
/// GET /auth/activate/{uid}/{token}
///
/// # Errors
///
/// Returns `AppError` if the link is malformed, expired, or already used.
pub async fn activate(
    State(state): State<AppState>,
    Path((uid, token)): Path<(String, String)>,
) -> Result<Json<ActivateResponse>> {
    let auth = AuthService::new(state.pool());

    let user = auth.activate(state.tokens(), &uid, &token).await?;

    tracing::info!(user_id = %user.id, "Account activated");

    Ok(Json(ActivateResponse {
        message: "Your account is now active",
        login_url: "/auth/login",
    }))
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response for a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Where the client should send the user next, based on their role.
    pub redirect: &'static str,
}

/// Login with email and password.
///
/// POST /auth/login
///
/// On success the session holds the user identity and the response carries
/// the role-appropriate dashboard path.
///
/// # Errors
///
/// Returns `AppError` for bad credentials or an inactive account.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let auth = AuthService::new(state.pool());

    let user = auth.login(&req.email, &req.password).await?;

    let current = CurrentUser {
        id: user.id,
        email: user.email.clone(),
        role: user.role,
        is_superadmin: user.is_superadmin,
    };

    set_current_user(&session, &current)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;

    set_sentry_user(&user.id, Some(user.email.as_str()));

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(LoginResponse {
        redirect: user.dashboard_path(),
    }))
}

/// Logout the current user.
///
/// POST /auth/logout
///
/// # Errors
///
/// Returns `AppError` if the session cannot be cleared.
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;

    clear_sentry_user();

    Ok(StatusCode::NO_CONTENT)
}
