//! Vendor and opening-hour domain types.

use chrono::{DateTime, Utc};

use plateful_core::{
    OpeningHourId, OpeningWindow, ProfileId, Slug, TimeSlot, UserId, VendorId, Weekday,
};

/// A seller entity in the marketplace (domain type).
///
/// Linked one-to-one to its owning user and that user's profile. The
/// approval flag gates visibility on the marketplace.
#[derive(Debug, Clone)]
pub struct Vendor {
    /// Unique vendor ID.
    pub id: VendorId,
    /// Owning user account.
    pub user_id: UserId,
    /// The owning user's profile (address, geolocation).
    pub profile_id: ProfileId,
    /// Business display name.
    pub vendor_name: String,
    /// Globally unique URL-safe identifier.
    pub vendor_slug: Slug,
    /// Stored path of the uploaded license document.
    pub vendor_license: Option<String>,
    /// Administrative approval; unapproved vendors stay off the marketplace.
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

/// One opening-hours row of a vendor's week (domain type).
///
/// The tuple `(vendor, day, from_hour, to_hour)` is unique; overlapping
/// distinct windows are allowed and resolved deterministically by the
/// availability evaluator.
#[derive(Debug, Clone)]
pub struct OpeningHour {
    /// Unique row ID.
    pub id: OpeningHourId,
    /// Owning vendor.
    pub vendor_id: VendorId,
    /// Day of week, 1 = Monday .. 7 = Sunday.
    pub day: Weekday,
    pub from_hour: TimeSlot,
    pub to_hour: TimeSlot,
    /// Marks the whole window closed (e.g. a holiday row).
    pub is_closed: bool,
}

impl OpeningHour {
    /// The row as an evaluator window.
    #[must_use]
    pub const fn window(&self) -> OpeningWindow {
        OpeningWindow {
            from: self.from_hour,
            to: self.to_hour,
            closed: self.is_closed,
        }
    }
}
