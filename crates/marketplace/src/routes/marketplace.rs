//! Public marketplace routes: vendor listing, detail, and client config.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;

use plateful_core::{Availability, Slug};

use crate::error::{AppError, Result};
use crate::models::UserProfile;
use crate::routes::vendor::OpeningHourResponse;
use crate::services::profiles::{ProfileError, ProfileService};
use crate::services::vendors::VendorService;
use crate::state::AppState;

/// Health check endpoint.
///
/// GET /health
pub async fn health() -> &'static str {
    "ok"
}

/// One marketplace listing entry.
#[derive(Debug, Serialize)]
pub struct ListingResponse {
    pub vendor_name: String,
    pub vendor_slug: String,
    pub availability: Availability,
}

/// Approved vendors with their availability at request time.
///
/// GET /api/marketplace
///
/// Vendors whose owning account is inactive are left out entirely.
///
/// # Errors
///
/// Returns `AppError` if the listing query fails.
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<ListingResponse>>> {
    let vendors = VendorService::new(state.pool());
    let now = chrono::Local::now().naive_local();

    let mut listings = Vec::new();
    for vendor in vendors.list_marketplace().await? {
        let availability = vendors.availability_at(vendor.id, now).await?;
        listings.push(ListingResponse {
            vendor_name: vendor.vendor_name,
            vendor_slug: vendor.vendor_slug.to_string(),
            availability,
        });
    }

    Ok(Json(listings))
}

/// Location fields of a vendor's public detail, drawn from the owner's
/// profile. All nullable: a vendor without a filled-in profile still lists.
#[derive(Debug, Default, Serialize)]
pub struct VendorLocationResponse {
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub pin_code: Option<String>,
    /// WKT form of the derived point, when coordinates are set.
    pub location: Option<String>,
}

impl From<UserProfile> for VendorLocationResponse {
    fn from(profile: UserProfile) -> Self {
        Self {
            address: profile.address,
            city: profile.city,
            state: profile.state,
            country: profile.country,
            pin_code: profile.pin_code,
            location: profile.location.map(|p| p.to_string()),
        }
    }
}

/// One vendor's public detail.
#[derive(Debug, Serialize)]
pub struct VendorDetailResponse {
    pub vendor_name: String,
    pub vendor_slug: String,
    pub availability: Availability,
    pub location: VendorLocationResponse,
    pub opening_hours: Vec<OpeningHourResponse>,
}

/// A single vendor's public page data.
///
/// GET /api/marketplace/{slug}
///
/// # Errors
///
/// Returns `AppError::NotFound` for an unknown slug or an unapproved vendor.
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<VendorDetailResponse>> {
    let slug = Slug::parse(&slug)
        .map_err(|_| AppError::NotFound(format!("vendor {slug}")))?;

    let vendors = VendorService::new(state.pool());
    let vendor = vendors.by_slug(&slug).await?;

    if !vendor.is_approved {
        return Err(AppError::NotFound(format!("vendor {slug}")));
    }

    let hours = vendors.weekly_hours(vendor.id).await?;
    let availability = vendors
        .availability_at(vendor.id, chrono::Local::now().naive_local())
        .await?;

    // A missing profile is "no location", never an error on the public page.
    let profiles = ProfileService::new(state.pool());
    let location = match profiles.get(vendor.user_id).await {
        Ok(profile) => profile.into(),
        Err(ProfileError::NotFound) => VendorLocationResponse::default(),
        Err(e) => return Err(e.into()),
    };

    Ok(Json(VendorDetailResponse {
        vendor_name: vendor.vendor_name,
        vendor_slug: vendor.vendor_slug.to_string(),
        availability,
        location,
        opening_hours: hours.iter().map(OpeningHourResponse::from).collect(),
    }))
}

/// Browser-side integration keys.
#[derive(Debug, Serialize)]
pub struct ClientConfigResponse {
    pub google_api_key: Option<String>,
    pub paypal_client_id: Option<String>,
}

/// Keys the browser needs for maps and payments.
///
/// GET /api/client-config
///
/// Only publishable values are exposed here; server-side secrets never
/// pass through this endpoint.
pub async fn client_config(State(state): State<AppState>) -> Json<ClientConfigResponse> {
    let integrations = &state.config().integrations;

    Json(ClientConfigResponse {
        google_api_key: integrations.google_api_key.clone(),
        paypal_client_id: integrations.paypal_client_id.clone(),
    })
}
