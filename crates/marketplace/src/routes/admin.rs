//! Admin routes: vendor oversight and approval.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use plateful_core::VendorId;

use crate::db::vendors::ApprovalOutcome;
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::Vendor;
use crate::services::vendors::VendorService;
use crate::state::AppState;

/// One vendor in the admin listing.
#[derive(Debug, Serialize)]
pub struct AdminVendorResponse {
    pub id: i32,
    pub user_id: i32,
    pub vendor_name: String,
    pub vendor_slug: String,
    pub vendor_license: Option<String>,
    pub is_approved: bool,
}

impl From<Vendor> for AdminVendorResponse {
    fn from(vendor: Vendor) -> Self {
        Self {
            id: vendor.id.as_i32(),
            user_id: vendor.user_id.as_i32(),
            vendor_name: vendor.vendor_name,
            vendor_slug: vendor.vendor_slug.to_string(),
            vendor_license: vendor.vendor_license,
            is_approved: vendor.is_approved,
        }
    }
}

/// Every vendor, newest first.
///
/// GET /api/admin/vendors
///
/// # Errors
///
/// Returns `AppError` if the query fails.
pub async fn list_vendors(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<AdminVendorResponse>>> {
    let vendors = VendorService::new(state.pool());

    let all = vendors.list_all().await?;

    Ok(Json(all.into_iter().map(AdminVendorResponse::from).collect()))
}

/// Request body for an approval update.
#[derive(Debug, Deserialize)]
pub struct SetApprovalRequest {
    pub approved: bool,
}

/// Response for an approval update.
#[derive(Debug, Serialize)]
pub struct SetApprovalResponse {
    pub id: i32,
    pub is_approved: bool,
    /// Whether this request actually flipped the flag. Repeat saves of the
    /// same value report `false` and send no notification.
    pub changed: bool,
}

/// Set a vendor's approval flag, notifying the owner on a real change.
///
/// POST /api/admin/vendors/{id}/approval
///
/// # Errors
///
/// Returns `AppError::NotFound` for an unknown vendor, `AppError` if the
/// notification cannot be sent.
pub async fn set_approval(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i32>,
    Json(req): Json<SetApprovalRequest>,
) -> Result<Json<SetApprovalResponse>> {
    let vendors = VendorService::new(state.pool());

    let (vendor, outcome) = vendors
        .set_approval(state.email(), VendorId::new(id), req.approved)
        .await?;

    let changed = outcome == ApprovalOutcome::Transitioned;
    if changed {
        tracing::info!(
            vendor_id = %vendor.id,
            approved = req.approved,
            admin_id = %admin.id,
            "Vendor approval changed"
        );
    }

    Ok(Json(SetApprovalResponse {
        id: vendor.id.as_i32(),
        is_approved: vendor.is_approved,
        changed,
    }))
}
