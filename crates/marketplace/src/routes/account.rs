//! Account routes: dashboard redirect and profile management.

use axum::{
    Json,
    extract::{Multipart, State},
    response::Redirect,
};
use serde::{Deserialize, Serialize};

use plateful_core::dashboard_path;

use crate::error::{AppError, Result};
use crate::middleware::{RequireAuth, RequireCustomer};
use crate::models::{User, UserProfile};
use crate::services::auth::AuthService;
use crate::services::profiles::{MediaUpload, ProfileError, ProfileInput, ProfileService};
use crate::services::vendors::validate_license_filename;
use crate::state::AppState;

/// Account details exposed to the client.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub role: Option<plateful_core::Role>,
    pub is_superadmin: bool,
}

impl From<User> for AccountResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.as_i32(),
            first_name: user.first_name,
            last_name: user.last_name,
            username: user.username,
            email: user.email.to_string(),
            phone_number: user.phone_number,
            role: user.role,
            is_superadmin: user.is_superadmin,
        }
    }
}

/// Profile details exposed to the client.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub address: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub pin_code: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    /// WKT form of the derived point, when coordinates are set.
    pub location: Option<String>,
    pub profile_picture: Option<String>,
    pub cover_photo: Option<String>,
}

impl From<UserProfile> for ProfileResponse {
    fn from(profile: UserProfile) -> Self {
        Self {
            address: profile.address,
            country: profile.country,
            state: profile.state,
            city: profile.city,
            pin_code: profile.pin_code,
            latitude: profile.latitude,
            longitude: profile.longitude,
            location: profile.location.map(|p| p.to_string()),
            profile_picture: profile.profile_picture,
            cover_photo: profile.cover_photo,
        }
    }
}

/// Redirect the logged-in user to their role's dashboard.
///
/// GET /account
///
/// Customers land on the customer dashboard, vendors on the vendor
/// dashboard, superadmins on the admin area.
pub async fn dashboard(RequireAuth(user): RequireAuth) -> Redirect {
    Redirect::to(dashboard_path(user.role, user.is_superadmin))
}

/// Customer dashboard data: the account together with its profile.
#[derive(Debug, Serialize)]
pub struct CustomerDashboardResponse {
    pub account: AccountResponse,
    /// `None` when the profile row is missing; absence is not an error here.
    pub profile: Option<ProfileResponse>,
}

/// The customer dashboard.
///
/// GET /account/customer
///
/// # Errors
///
/// Returns `AppError` if the account row is gone.
pub async fn customer_dashboard(
    State(state): State<AppState>,
    RequireCustomer(current): RequireCustomer,
) -> Result<Json<CustomerDashboardResponse>> {
    let auth = AuthService::new(state.pool());
    let user = auth.get_user(current.id).await?;

    let profiles = ProfileService::new(state.pool());
    let profile = match profiles.get(current.id).await {
        Ok(profile) => Some(ProfileResponse::from(profile)),
        Err(ProfileError::NotFound) => None,
        Err(e) => return Err(e.into()),
    };

    Ok(Json(CustomerDashboardResponse {
        account: user.into(),
        profile,
    }))
}

/// Current account details.
///
/// GET /api/account/me
///
/// # Errors
///
/// Returns `AppError` if the account row is gone.
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<AccountResponse>> {
    let auth = AuthService::new(state.pool());
    let user = auth.get_user(current.id).await?;

    Ok(Json(user.into()))
}

/// Current profile.
///
/// GET /api/account/profile
///
/// # Errors
///
/// Returns `AppError` if the profile row is gone.
pub async fn profile(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<ProfileResponse>> {
    let profiles = ProfileService::new(state.pool());
    let profile = profiles.get(current.id).await?;

    Ok(Json(profile.into()))
}

/// Request body for a profile update.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub address: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub pin_code: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

/// Update the profile; the stored point is recomputed from the coordinate
/// strings on every save.
///
/// PUT /api/account/profile
///
/// # Errors
///
/// Returns `AppError` for invalid or incomplete coordinates.
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>> {
    let profiles = ProfileService::new(state.pool());

    let profile = profiles
        .update(
            current.id,
            ProfileInput {
                address: req.address,
                country: req.country,
                state: req.state,
                city: req.city,
                pin_code: req.pin_code,
                latitude: req.latitude,
                longitude: req.longitude,
            },
        )
        .await?;

    Ok(Json(profile.into()))
}

/// One written-to-disk upload, kept until the database paths are set.
struct StoredUpload {
    filename: String,
    stored_path: String,
}

impl StoredUpload {
    fn as_media(&self) -> MediaUpload<'_> {
        MediaUpload {
            filename: &self.filename,
            stored_path: &self.stored_path,
        }
    }
}

/// Upload the profile picture and/or cover photo (multipart fields
/// `profile_picture`, `cover_photo`).
///
/// POST /api/account/profile/media
///
/// Only png/jpg/jpeg files are accepted; the files are stored under the
/// configured media root with generated names.
///
/// # Errors
///
/// Returns `AppError` for a missing field, disallowed extension, or a
/// storage failure.
pub async fn upload_media(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    mut multipart: Multipart,
) -> Result<Json<ProfileResponse>> {
    let mut picture: Option<StoredUpload> = None;
    let mut cover: Option<StoredUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        let slot = match field.name() {
            Some("profile_picture") => &mut picture,
            Some("cover_photo") => &mut cover,
            _ => continue,
        };

        let filename = field
            .file_name()
            .ok_or_else(|| AppError::BadRequest("media upload has no filename".to_owned()))?
            .to_owned();

        validate_license_filename(&filename)?;

        // Extension is validated above, so the fallback never fires.
        let extension = std::path::Path::new(&filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("png")
            .to_ascii_lowercase();

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("failed to read upload: {e}")))?;

        let relative = format!("profile_media/{}.{extension}", uuid::Uuid::new_v4());
        let full_path = state.config().media_root.join(&relative);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Internal(format!("failed to create media dir: {e}")))?;
        }
        tokio::fs::write(&full_path, &bytes)
            .await
            .map_err(|e| AppError::Internal(format!("failed to store upload: {e}")))?;

        *slot = Some(StoredUpload {
            filename,
            stored_path: relative,
        });
    }

    if picture.is_none() && cover.is_none() {
        return Err(AppError::BadRequest(
            "expected multipart field 'profile_picture' or 'cover_photo'".to_owned(),
        ));
    }

    let profiles = ProfileService::new(state.pool());
    profiles
        .store_media(
            current.id,
            picture.as_ref().map(StoredUpload::as_media),
            cover.as_ref().map(StoredUpload::as_media),
        )
        .await?;

    tracing::info!(user_id = %current.id, "Profile media uploaded");

    let profile = profiles.get(current.id).await?;
    Ok(Json(profile.into()))
}
