//! User profile repository for database operations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use plateful_core::{GeoPoint, ProfileId, UserId};

use super::RepositoryError;
use crate::models::UserProfile;

const PROFILE_COLUMNS: &str = "id, user_id, profile_picture, cover_photo, address, country, \
     state, city, pin_code, latitude, longitude, location_lon, location_lat, \
     created_at, modified_at";

/// Raw profile row as stored.
#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: i32,
    user_id: i32,
    profile_picture: Option<String>,
    cover_photo: Option<String>,
    address: Option<String>,
    country: Option<String>,
    state: Option<String>,
    city: Option<String>,
    pin_code: Option<String>,
    latitude: Option<String>,
    longitude: Option<String>,
    location_lon: Option<Decimal>,
    location_lat: Option<Decimal>,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
}

impl ProfileRow {
    fn into_domain(self) -> Result<UserProfile, RepositoryError> {
        let location = match (self.location_lon, self.location_lat) {
            // NUMERIC pads to the column scale; normalize drops the
            // trailing zeros so the point reads back as entered.
            (Some(longitude), Some(latitude)) => Some(GeoPoint {
                longitude: longitude.normalize(),
                latitude: latitude.normalize(),
            }),
            (None, None) => None,
            _ => {
                return Err(RepositoryError::DataCorruption(
                    "location stored with only one coordinate".to_owned(),
                ));
            }
        };

        Ok(UserProfile {
            id: ProfileId::new(self.id),
            user_id: UserId::new(self.user_id),
            profile_picture: self.profile_picture,
            cover_photo: self.cover_photo,
            address: self.address,
            country: self.country,
            state: self.state,
            city: self.city,
            pin_code: self.pin_code,
            latitude: self.latitude,
            longitude: self.longitude,
            location,
            created_at: self.created_at,
            modified_at: self.modified_at,
        })
    }
}

/// Profile fields for an update; the derived point always accompanies the
/// coordinate strings it was computed from.
#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub address: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub pin_code: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub location: Option<GeoPoint>,
}

/// Repository for user profile database operations.
pub struct ProfileRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProfileRepository<'a> {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an empty profile for a user at registration.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already has a
    /// profile, `RepositoryError::Database` for other failures.
    pub async fn create_empty(&self, user_id: UserId) -> Result<UserProfile, RepositoryError> {
        let sql = format!(
            "INSERT INTO user_profiles (user_id) VALUES ($1) RETURNING {PROFILE_COLUMNS}"
        );

        let row: ProfileRow = sqlx::query_as(&sql)
            .bind(user_id)
            .fetch_one(self.pool)
            .await
            .map_err(|e| {
                RepositoryError::from_unique_violation(e, "profile already exists for user")
            })?;

        row.into_domain()
    }

    /// Get the profile for a user, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails,
    /// `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<UserProfile>, RepositoryError> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM user_profiles WHERE user_id = $1");

        let row: Option<ProfileRow> = sqlx::query_as(&sql)
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?;

        row.map(ProfileRow::into_domain).transpose()
    }

    /// Overwrite the profile's address and coordinates.
    ///
    /// The derived point is recomputed by the caller before every save and
    /// stored exactly as `(longitude, latitude)`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no profile,
    /// `RepositoryError::Database` for other failures.
    pub async fn update(
        &self,
        user_id: UserId,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, RepositoryError> {
        let sql = format!(
            "UPDATE user_profiles SET \
             address = $2, country = $3, state = $4, city = $5, pin_code = $6, \
             latitude = $7, longitude = $8, location_lon = $9, location_lat = $10, \
             modified_at = NOW() \
             WHERE user_id = $1 \
             RETURNING {PROFILE_COLUMNS}"
        );

        let row: Option<ProfileRow> = sqlx::query_as(&sql)
            .bind(user_id)
            .bind(update.address.as_deref())
            .bind(update.country.as_deref())
            .bind(update.state.as_deref())
            .bind(update.city.as_deref())
            .bind(update.pin_code.as_deref())
            .bind(update.latitude.as_deref())
            .bind(update.longitude.as_deref())
            .bind(update.location.map(|p| p.longitude))
            .bind(update.location.map(|p| p.latitude))
            .fetch_optional(self.pool)
            .await?;

        row.ok_or(RepositoryError::NotFound)?.into_domain()
    }

    /// Store the path of an uploaded profile picture or cover photo.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no profile,
    /// `RepositoryError::Database` for other failures.
    pub async fn set_media(
        &self,
        user_id: UserId,
        profile_picture: Option<&str>,
        cover_photo: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE user_profiles SET \
             profile_picture = COALESCE($2, profile_picture), \
             cover_photo = COALESCE($3, cover_photo), \
             modified_at = NOW() \
             WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(profile_picture)
        .bind(cover_photo)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
