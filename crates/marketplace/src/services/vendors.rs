//! Vendor service: onboarding, approval, and availability.

use chrono::NaiveDateTime;
use sqlx::PgPool;
use thiserror::Error;

use plateful_core::{
    Availability, OpeningHourId, Role, Slug, SlugError, TimeSlot, VendorId, Weekday, evaluate,
};

use crate::db::RepositoryError;
use crate::db::opening_hours::{NewOpeningHour, OpeningHourRepository};
use crate::db::profiles::ProfileRepository;
use crate::db::users::UserRepository;
use crate::db::vendors::{ApprovalOutcome, NewVendor, VendorRepository};
use crate::models::{OpeningHour, User, Vendor};
use crate::services::auth::{AuthError, AuthService, Registration};
use crate::services::email::{EmailError, EmailService};

/// File extensions accepted for license uploads.
const ALLOWED_LICENSE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Maximum length of a vendor's business name (matches the column width).
const MAX_VENDOR_NAME_LENGTH: usize = 100;

/// Slug room reserved for the " {user id}" uniqueness suffix.
const SLUG_SUFFIX_RESERVE: usize = 11;

/// Errors from vendor operations.
#[derive(Debug, Error)]
pub enum VendorError {
    /// The referenced vendor doesn't exist.
    #[error("vendor not found")]
    NotFound,

    /// The user already owns a vendor.
    #[error("vendor already exists for this account")]
    AlreadyExists,

    /// Vendor name missing or blank.
    #[error("vendor name must not be empty")]
    EmptyName,

    /// Vendor name cannot be turned into a URL slug.
    #[error("vendor name cannot form a slug: {0}")]
    InvalidName(#[from] SlugError),

    /// Vendor name exceeds the storable length.
    #[error("vendor name must be at most {max} characters")]
    NameTooLong {
        /// Maximum allowed length.
        max: usize,
    },

    /// Uploaded file has a disallowed extension.
    #[error("unsupported file type; allowed: png, jpg, jpeg")]
    UnsupportedFileType,

    /// The new opening-hours row duplicates an existing one.
    #[error("identical opening hours already exist for this day")]
    DuplicateHours,

    /// Authentication failure during onboarding.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Notification delivery failure.
    #[error("notification failed: {0}")]
    Email(#[from] EmailError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Vendor service.
///
/// Owns the vendor lifecycle from onboarding through approval, plus the
/// weekly opening-hours schedule and the availability signal derived
/// from it.
pub struct VendorService<'a> {
    pool: &'a PgPool,
    vendors: VendorRepository<'a>,
    hours: OpeningHourRepository<'a>,
    users: UserRepository<'a>,
    profiles: ProfileRepository<'a>,
}

impl<'a> VendorService<'a> {
    /// Create a new vendor service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            vendors: VendorRepository::new(pool),
            hours: OpeningHourRepository::new(pool),
            users: UserRepository::new(pool),
            profiles: ProfileRepository::new(pool),
        }
    }

    /// Register a vendor account: the user (with the vendor role), their
    /// profile, and the vendor record with a generated slug.
    ///
    /// The slug is derived from the business name plus the user id, which
    /// keeps it unique without a retry loop. The name is validated in full
    /// before the account is created, so a bad name never leaves behind a
    /// user row without its vendor.
    ///
    /// # Errors
    ///
    /// Returns `VendorError::EmptyName` for a blank business name,
    /// `VendorError::NameTooLong` / `VendorError::InvalidName` for a name
    /// that cannot produce a storable slug, `VendorError::Auth` for
    /// registration failures.
    pub async fn onboard(
        &self,
        registration: Registration<'_>,
        vendor_name: &str,
    ) -> Result<(User, Vendor), VendorError> {
        let vendor_name = vendor_name.trim();
        validate_vendor_name(vendor_name)?;

        let auth = AuthService::new(self.pool);
        let registration = Registration {
            role: Role::Vendor,
            ..registration
        };
        let user = auth.register(&registration).await?;

        let profile = self
            .profiles
            .get_by_user(user.id)
            .await?
            .ok_or(VendorError::NotFound)?;

        let slug = Slug::slugify(&format!("{vendor_name} {}", user.id))?;

        let vendor = self
            .vendors
            .create(&NewVendor {
                user_id: user.id,
                profile_id: profile.id,
                vendor_name,
                vendor_slug: &slug,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => VendorError::AlreadyExists,
                other => VendorError::Repository(other),
            })?;

        Ok((user, vendor))
    }

    /// Get the vendor owned by a user.
    ///
    /// # Errors
    ///
    /// Returns `VendorError::NotFound` if the user has no vendor.
    pub async fn for_user(&self, user_id: plateful_core::UserId) -> Result<Vendor, VendorError> {
        self.vendors
            .get_by_user(user_id)
            .await?
            .ok_or(VendorError::NotFound)
    }

    /// Get a vendor by slug.
    ///
    /// # Errors
    ///
    /// Returns `VendorError::NotFound` if no vendor has the slug.
    pub async fn by_slug(&self, slug: &Slug) -> Result<Vendor, VendorError> {
        self.vendors
            .get_by_slug(slug)
            .await?
            .ok_or(VendorError::NotFound)
    }

    /// List marketplace-visible vendors (approved, active owner).
    ///
    /// # Errors
    ///
    /// Returns `VendorError::Repository` if the query fails.
    pub async fn list_marketplace(&self) -> Result<Vec<Vendor>, VendorError> {
        Ok(self.vendors.list_approved().await?)
    }

    /// List every vendor for the admin view.
    ///
    /// # Errors
    ///
    /// Returns `VendorError::Repository` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Vendor>, VendorError> {
        Ok(self.vendors.list_all().await?)
    }

    /// Store a validated license upload path on the vendor.
    ///
    /// # Errors
    ///
    /// Returns `VendorError::UnsupportedFileType` for a disallowed
    /// extension, `VendorError::NotFound` if the vendor doesn't exist.
    pub async fn store_license(
        &self,
        vendor_id: VendorId,
        filename: &str,
        stored_path: &str,
    ) -> Result<(), VendorError> {
        validate_license_filename(filename)?;

        self.vendors
            .set_license(vendor_id, stored_path)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => VendorError::NotFound,
                other => VendorError::Repository(other),
            })
    }

    /// Set the approval flag and notify the owner if it changed.
    ///
    /// The underlying update is a compare-and-set: saving the same value
    /// twice, or two admins racing to the same value, produces at most one
    /// notification.
    ///
    /// # Errors
    ///
    /// Returns `VendorError::NotFound` if the vendor doesn't exist,
    /// `VendorError::Email` if the notification cannot be sent.
    pub async fn set_approval(
        &self,
        email: &EmailService,
        vendor_id: VendorId,
        approved: bool,
    ) -> Result<(Vendor, ApprovalOutcome), VendorError> {
        let (vendor, outcome) = self
            .vendors
            .set_approval(vendor_id, approved)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => VendorError::NotFound,
                other => VendorError::Repository(other),
            })?;

        if outcome == ApprovalOutcome::Transitioned {
            let owner = self
                .users
                .get_by_id(vendor.user_id)
                .await?
                .ok_or(VendorError::NotFound)?;

            email
                .send_approval_notice(
                    owner.email.as_str().to_owned(),
                    &owner.full_name(),
                    &vendor.vendor_name,
                    approved,
                )
                .await?;
        }

        Ok((vendor, outcome))
    }

    /// The vendor's full week of opening hours, ordered by day then start.
    ///
    /// # Errors
    ///
    /// Returns `VendorError::Repository` if the query fails.
    pub async fn weekly_hours(&self, vendor_id: VendorId) -> Result<Vec<OpeningHour>, VendorError> {
        Ok(self.hours.list_for_vendor(vendor_id).await?)
    }

    /// Add an opening-hours row to the vendor's week.
    ///
    /// # Errors
    ///
    /// Returns `VendorError::DuplicateHours` for an identical existing row.
    pub async fn add_hours(
        &self,
        vendor_id: VendorId,
        day: Weekday,
        from_hour: TimeSlot,
        to_hour: TimeSlot,
        is_closed: bool,
    ) -> Result<OpeningHour, VendorError> {
        self.hours
            .create(NewOpeningHour {
                vendor_id,
                day,
                from_hour,
                to_hour,
                is_closed,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => VendorError::DuplicateHours,
                other => VendorError::Repository(other),
            })
    }

    /// Remove one of the vendor's opening-hours rows.
    ///
    /// # Errors
    ///
    /// Returns `VendorError::NotFound` if the row doesn't exist or belongs
    /// to another vendor.
    pub async fn remove_hours(
        &self,
        vendor_id: VendorId,
        id: OpeningHourId,
    ) -> Result<(), VendorError> {
        self.hours
            .delete(vendor_id, id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => VendorError::NotFound,
                other => VendorError::Repository(other),
            })
    }

    /// Evaluate whether a vendor is open at the given local timestamp.
    ///
    /// # Errors
    ///
    /// Returns `VendorError::Repository` if the query fails.
    pub async fn availability_at(
        &self,
        vendor_id: VendorId,
        now: NaiveDateTime,
    ) -> Result<Availability, VendorError> {
        let day = Weekday::from_date(now.date());
        let rows = self.hours.list_for_day(vendor_id, day).await?;
        let windows: Vec<_> = rows.iter().map(OpeningHour::window).collect();
        Ok(evaluate(&windows, now.time()))
    }
}

/// Validate a vendor's business name before any row is written.
///
/// Checks the column width and that the name slugifies to something that
/// still fits once the user-id suffix is appended.
fn validate_vendor_name(vendor_name: &str) -> Result<(), VendorError> {
    if vendor_name.is_empty() {
        return Err(VendorError::EmptyName);
    }

    if vendor_name.chars().count() > MAX_VENDOR_NAME_LENGTH {
        return Err(VendorError::NameTooLong {
            max: MAX_VENDOR_NAME_LENGTH,
        });
    }

    let base = Slug::slugify(vendor_name)?;
    if base.as_str().len() > Slug::MAX_LENGTH - SLUG_SUFFIX_RESERVE {
        return Err(VendorError::InvalidName(SlugError::TooLong {
            max: Slug::MAX_LENGTH - SLUG_SUFFIX_RESERVE,
        }));
    }

    Ok(())
}

/// Check that an uploaded license filename has an allowed image extension.
///
/// The check is on the extension only; content sniffing is out of scope.
///
/// # Errors
///
/// Returns `VendorError::UnsupportedFileType` for anything but
/// png/jpg/jpeg (case-insensitive).
pub fn validate_license_filename(filename: &str) -> Result<(), VendorError> {
    let extension = std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .ok_or(VendorError::UnsupportedFileType)?;

    if ALLOWED_LICENSE_EXTENSIONS.contains(&extension.as_str()) {
        Ok(())
    } else {
        Err(VendorError::UnsupportedFileType)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_license_accepts_allowed_image_extensions() {
        assert!(validate_license_filename("license.png").is_ok());
        assert!(validate_license_filename("license.jpg").is_ok());
        assert!(validate_license_filename("license.JPEG").is_ok());
    }

    #[test]
    fn test_vendor_name_validated_before_onboarding() {
        assert!(validate_vendor_name("Spice Route").is_ok());
        assert!(validate_vendor_name(&"a".repeat(89)).is_ok());

        assert!(matches!(
            validate_vendor_name(""),
            Err(VendorError::EmptyName)
        ));
        assert!(matches!(
            validate_vendor_name("!!!"),
            Err(VendorError::InvalidName(SlugError::Empty))
        ));
        assert!(matches!(
            validate_vendor_name(&"a".repeat(101)),
            Err(VendorError::NameTooLong { max: 100 })
        ));
        // 96 chars fits the column, but the 95-char slug leaves no room
        // for the user-id suffix.
        assert!(matches!(
            validate_vendor_name("ab ".repeat(32).trim()),
            Err(VendorError::InvalidName(SlugError::TooLong { .. }))
        ));
    }

    #[test]
    fn test_license_rejects_other_extensions() {
        assert!(matches!(
            validate_license_filename("license.pdf"),
            Err(VendorError::UnsupportedFileType)
        ));
        assert!(matches!(
            validate_license_filename("license"),
            Err(VendorError::UnsupportedFileType)
        ));
        assert!(matches!(
            validate_license_filename("archive.png.zip"),
            Err(VendorError::UnsupportedFileType)
        ));
    }
}
