//! Profile service: address updates and geolocation derivation.

use sqlx::PgPool;
use thiserror::Error;

use plateful_core::{GeoPoint, GeoPointError, UserId};

use crate::db::RepositoryError;
use crate::db::profiles::{ProfileRepository, ProfileUpdate};
use crate::models::UserProfile;
use crate::services::vendors::validate_license_filename;

/// Errors from profile operations.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The user has no profile row.
    #[error("profile not found")]
    NotFound,

    /// Coordinates were supplied but don't parse or are out of range.
    #[error("invalid coordinates: {0}")]
    InvalidCoordinates(#[from] GeoPointError),

    /// Only one of latitude/longitude was supplied.
    #[error("latitude and longitude must be provided together")]
    IncompleteCoordinates,

    /// Uploaded image has a disallowed extension.
    #[error("unsupported file type; allowed: png, jpg, jpeg")]
    UnsupportedFileType,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Incoming profile edit. Every field overwrites; omitted fields clear.
#[derive(Debug, Default)]
pub struct ProfileInput {
    pub address: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub pin_code: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

/// Profile service.
pub struct ProfileService<'a> {
    profiles: ProfileRepository<'a>,
}

impl<'a> ProfileService<'a> {
    /// Create a new profile service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            profiles: ProfileRepository::new(pool),
        }
    }

    /// Get the profile for a user.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::NotFound` if the user has no profile.
    pub async fn get(&self, user_id: UserId) -> Result<UserProfile, ProfileError> {
        self.profiles
            .get_by_user(user_id)
            .await?
            .ok_or(ProfileError::NotFound)
    }

    /// Save a profile edit, recomputing the stored point from the
    /// coordinate strings on every save.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::InvalidCoordinates` if a supplied coordinate
    /// doesn't parse, `ProfileError::IncompleteCoordinates` if only one of
    /// the pair is present, `ProfileError::NotFound` for a missing profile.
    pub async fn update(
        &self,
        user_id: UserId,
        input: ProfileInput,
    ) -> Result<UserProfile, ProfileError> {
        let location = derive_location(input.latitude.as_deref(), input.longitude.as_deref())?;

        let update = ProfileUpdate {
            address: input.address,
            country: input.country,
            state: input.state,
            city: input.city,
            pin_code: input.pin_code,
            latitude: input.latitude,
            longitude: input.longitude,
            location,
        };

        self.profiles
            .update(user_id, &update)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ProfileError::NotFound,
                other => ProfileError::Repository(other),
            })
    }

    /// Store the paths of uploaded profile media. A field left `None`
    /// keeps its current value.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::UnsupportedFileType` for a disallowed
    /// extension, `ProfileError::NotFound` for a missing profile.
    pub async fn store_media(
        &self,
        user_id: UserId,
        profile_picture: Option<MediaUpload<'_>>,
        cover_photo: Option<MediaUpload<'_>>,
    ) -> Result<(), ProfileError> {
        for upload in [profile_picture, cover_photo].into_iter().flatten() {
            validate_license_filename(upload.filename)
                .map_err(|_| ProfileError::UnsupportedFileType)?;
        }

        self.profiles
            .set_media(
                user_id,
                profile_picture.map(|u| u.stored_path),
                cover_photo.map(|u| u.stored_path),
            )
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ProfileError::NotFound,
                other => ProfileError::Repository(other),
            })
    }
}

/// An uploaded image: the client-supplied filename (for extension
/// validation) plus the path where the bytes were stored.
#[derive(Debug, Clone, Copy)]
pub struct MediaUpload<'a> {
    pub filename: &'a str,
    pub stored_path: &'a str,
}

/// Derive the stored point from the coordinate strings.
///
/// Both absent means no point; both present means a validated point;
/// one without the other is an error.
fn derive_location(
    latitude: Option<&str>,
    longitude: Option<&str>,
) -> Result<Option<GeoPoint>, ProfileError> {
    match (latitude, longitude) {
        (Some(lat), Some(lon)) => Ok(Some(GeoPoint::from_coordinates(lat, lon)?)),
        (None, None) => Ok(None),
        _ => Err(ProfileError::IncompleteCoordinates),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_derived_from_both_coordinates() {
        let point = derive_location(Some("12.9"), Some("77.6"))
            .expect("derives")
            .expect("point present");
        assert_eq!(point.to_string(), "POINT(77.6 12.9)");
    }

    #[test]
    fn test_no_coordinates_means_no_point() {
        assert!(derive_location(None, None).expect("derives").is_none());
    }

    #[test]
    fn test_single_coordinate_rejected() {
        assert!(matches!(
            derive_location(Some("12.9"), None),
            Err(ProfileError::IncompleteCoordinates)
        ));
    }

    #[test]
    fn test_unparseable_coordinate_rejected() {
        assert!(matches!(
            derive_location(Some("not-a-number"), Some("77.6")),
            Err(ProfileError::InvalidCoordinates(_))
        ));
    }
}
