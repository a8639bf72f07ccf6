//! Geographic coordinates.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when building a [`GeoPoint`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum GeoPointError {
    /// Latitude is not a decimal number.
    #[error("latitude is not a valid decimal: {0}")]
    InvalidLatitude(String),
    /// Longitude is not a decimal number.
    #[error("longitude is not a valid decimal: {0}")]
    InvalidLongitude(String),
    /// Latitude outside [-90, 90].
    #[error("latitude {0} out of range (-90..=90)")]
    LatitudeOutOfRange(Decimal),
    /// Longitude outside [-180, 180].
    #[error("longitude {0} out of range (-180..=180)")]
    LongitudeOutOfRange(Decimal),
}

/// A geographic point derived from a profile's coordinate strings.
///
/// Stored and compared in `(longitude, latitude)` order, matching the
/// WGS84 point convention the rest of the system expects. Coordinates are
/// decimals, not floats: the derived point must reflect the source strings
/// exactly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeoPoint {
    /// East-west coordinate, first by convention.
    pub longitude: Decimal,
    /// North-south coordinate.
    pub latitude: Decimal,
}

impl GeoPoint {
    /// Build a point from latitude and longitude decimal strings.
    ///
    /// # Errors
    ///
    /// Returns an error if either string is not a decimal number or is
    /// outside the valid coordinate range.
    pub fn from_coordinates(latitude: &str, longitude: &str) -> Result<Self, GeoPointError> {
        let latitude: Decimal = latitude
            .trim()
            .parse()
            .map_err(|_| GeoPointError::InvalidLatitude(latitude.to_owned()))?;
        let longitude: Decimal = longitude
            .trim()
            .parse()
            .map_err(|_| GeoPointError::InvalidLongitude(longitude.to_owned()))?;

        if latitude < Decimal::from(-90) || latitude > Decimal::from(90) {
            return Err(GeoPointError::LatitudeOutOfRange(latitude));
        }

        if longitude < Decimal::from(-180) || longitude > Decimal::from(180) {
            return Err(GeoPointError::LongitudeOutOfRange(longitude));
        }

        Ok(Self {
            longitude,
            latitude,
        })
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "POINT({} {})", self.longitude, self.latitude)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_point_reflects_coordinates_exactly() {
        let point = GeoPoint::from_coordinates("12.9", "77.6").unwrap();
        assert_eq!(point.longitude, "77.6".parse::<Decimal>().unwrap());
        assert_eq!(point.latitude, "12.9".parse::<Decimal>().unwrap());
    }

    #[test]
    fn test_coordinate_order_is_lon_lat() {
        let point = GeoPoint::from_coordinates("12.9", "77.6").unwrap();
        assert_eq!(point.to_string(), "POINT(77.6 12.9)");
    }

    #[test]
    fn test_invalid_strings() {
        assert!(matches!(
            GeoPoint::from_coordinates("north", "77.6"),
            Err(GeoPointError::InvalidLatitude(_))
        ));
        assert!(matches!(
            GeoPoint::from_coordinates("12.9", ""),
            Err(GeoPointError::InvalidLongitude(_))
        ));
    }

    #[test]
    fn test_out_of_range() {
        assert!(matches!(
            GeoPoint::from_coordinates("91", "0"),
            Err(GeoPointError::LatitudeOutOfRange(_))
        ));
        assert!(matches!(
            GeoPoint::from_coordinates("0", "-180.5"),
            Err(GeoPointError::LongitudeOutOfRange(_))
        ));
    }
}
