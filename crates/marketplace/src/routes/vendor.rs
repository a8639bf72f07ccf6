//! Vendor routes: own listing, opening hours, and license upload.

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use plateful_core::{Availability, OpeningHourId, TimeSlot, Weekday};

use crate::error::{AppError, Result};
use crate::middleware::RequireVendor;
use crate::models::{OpeningHour, Vendor};
use crate::services::vendors::{VendorService, validate_license_filename};
use crate::state::AppState;

/// One opening-hours row as exposed to the client.
#[derive(Debug, Serialize)]
pub struct OpeningHourResponse {
    pub id: i32,
    pub day: Weekday,
    pub day_name: &'static str,
    pub from_hour: TimeSlot,
    pub to_hour: TimeSlot,
    pub is_closed: bool,
}

impl From<&OpeningHour> for OpeningHourResponse {
    fn from(hour: &OpeningHour) -> Self {
        Self {
            id: hour.id.as_i32(),
            day: hour.day,
            day_name: hour.day.name(),
            from_hour: hour.from_hour,
            to_hour: hour.to_hour,
            is_closed: hour.is_closed,
        }
    }
}

/// The vendor's own listing.
#[derive(Debug, Serialize)]
pub struct VendorResponse {
    pub id: i32,
    pub vendor_name: String,
    pub vendor_slug: String,
    pub vendor_license: Option<String>,
    pub is_approved: bool,
    pub availability: Availability,
    pub opening_hours: Vec<OpeningHourResponse>,
}

impl VendorResponse {
    fn new(vendor: Vendor, hours: &[OpeningHour], availability: Availability) -> Self {
        Self {
            id: vendor.id.as_i32(),
            vendor_name: vendor.vendor_name,
            vendor_slug: vendor.vendor_slug.to_string(),
            vendor_license: vendor.vendor_license,
            is_approved: vendor.is_approved,
            availability,
            opening_hours: hours.iter().map(OpeningHourResponse::from).collect(),
        }
    }
}

/// The vendor's own listing with its week and current availability.
///
/// GET /api/vendor, also served as the vendor dashboard at
/// GET /account/vendor
///
/// # Errors
///
/// Returns `AppError` if the account has no vendor record.
pub async fn show(
    State(state): State<AppState>,
    RequireVendor(current): RequireVendor,
) -> Result<Json<VendorResponse>> {
    let vendors = VendorService::new(state.pool());

    let vendor = vendors.for_user(current.id).await?;
    let hours = vendors.weekly_hours(vendor.id).await?;
    let availability = vendors
        .availability_at(vendor.id, chrono::Local::now().naive_local())
        .await?;

    Ok(Json(VendorResponse::new(vendor, &hours, availability)))
}

/// The 48 half-hour slot labels, in day order.
///
/// GET /api/vendor/hours/slots
pub async fn hour_slots(RequireVendor(_current): RequireVendor) -> Json<Vec<String>> {
    Json(TimeSlot::all().map(|s| s.to_string()).collect())
}

/// Request body for adding an opening-hours row.
#[derive(Debug, Deserialize)]
pub struct AddHoursRequest {
    pub day: Weekday,
    pub from_hour: TimeSlot,
    pub to_hour: TimeSlot,
    #[serde(default)]
    pub is_closed: bool,
}

/// Add an opening-hours row to the vendor's week.
///
/// POST /api/vendor/hours
///
/// # Errors
///
/// Returns `AppError` if an identical row already exists for the day.
pub async fn add_hours(
    State(state): State<AppState>,
    RequireVendor(current): RequireVendor,
    Json(req): Json<AddHoursRequest>,
) -> Result<(StatusCode, Json<OpeningHourResponse>)> {
    let vendors = VendorService::new(state.pool());

    let vendor = vendors.for_user(current.id).await?;
    let hour = vendors
        .add_hours(vendor.id, req.day, req.from_hour, req.to_hour, req.is_closed)
        .await?;

    Ok((StatusCode::CREATED, Json(OpeningHourResponse::from(&hour))))
}

/// Remove one of the vendor's opening-hours rows.
///
/// DELETE /api/vendor/hours/{id}
///
/// # Errors
///
/// Returns `AppError` if the row doesn't exist or belongs to another vendor.
pub async fn remove_hours(
    State(state): State<AppState>,
    RequireVendor(current): RequireVendor,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    let vendors = VendorService::new(state.pool());

    let vendor = vendors.for_user(current.id).await?;
    vendors
        .remove_hours(vendor.id, OpeningHourId::new(id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Response for a license upload.
#[derive(Debug, Serialize)]
pub struct UploadLicenseResponse {
    pub vendor_license: String,
}

/// Upload a license image (multipart field `license`).
///
/// POST /api/vendor/license
///
/// Only png/jpg/jpeg files are accepted; the file is stored under the
/// configured media root with a generated name.
///
/// # Errors
///
/// Returns `AppError` for a missing field, disallowed extension, or a
/// storage failure.
pub async fn upload_license(
    State(state): State<AppState>,
    RequireVendor(current): RequireVendor,
    mut multipart: Multipart,
) -> Result<Json<UploadLicenseResponse>> {
    let vendors = VendorService::new(state.pool());
    let vendor = vendors.for_user(current.id).await?;

    let field = loop {
        match multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {e}")))?
        {
            Some(field) if field.name() == Some("license") => break field,
            Some(_) => {}
            None => {
                return Err(AppError::BadRequest(
                    "missing multipart field 'license'".to_owned(),
                ));
            }
        }
    };

    let filename = field
        .file_name()
        .ok_or_else(|| AppError::BadRequest("license upload has no filename".to_owned()))?
        .to_owned();

    validate_license_filename(&filename)?;

    // Extension is validated above, so the unwrap-ish default never fires.
    let extension = std::path::Path::new(&filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("png")
        .to_ascii_lowercase();

    let bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::BadRequest(format!("failed to read upload: {e}")))?;

    let relative = format!("vendor_licenses/{}.{extension}", uuid::Uuid::new_v4());
    let full_path = state.config().media_root.join(&relative);

    if let Some(parent) = full_path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| AppError::Internal(format!("failed to create media dir: {e}")))?;
    }
    tokio::fs::write(&full_path, &bytes)
        .await
        .map_err(|e| AppError::Internal(format!("failed to store upload: {e}")))?;

    vendors
        .store_license(vendor.id, &filename, &relative)
        .await?;

    tracing::info!(vendor_id = %vendor.id, path = %relative, "License uploaded");

    Ok(Json(UploadLicenseResponse {
        vendor_license: relative,
    }))
}
