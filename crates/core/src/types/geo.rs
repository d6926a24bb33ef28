//! Geographic coordinates.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when parsing a [`GeoCoordinate`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeoError {
    /// The input is not of the form `lat,lon`.
    #[error("expected coordinates as `latitude,longitude`")]
    Malformed,
    /// A component is not a number.
    #[error("invalid number in coordinates: {0}")]
    InvalidNumber(String),
    /// Latitude outside `[-90, 90]`.
    #[error("latitude must be within [-90, 90]")]
    LatitudeOutOfRange,
    /// Longitude outside `[-180, 180]`.
    #[error("longitude must be within [-180, 180]")]
    LongitudeOutOfRange,
}

/// A point on the Earth's surface in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    /// Latitude in degrees, positive north.
    pub latitude: f64,
    /// Longitude in degrees, positive east.
    pub longitude: f64,
}

impl GeoCoordinate {
    /// Create a coordinate without range checks.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Create a coordinate, rejecting out-of-range or non-finite values.
    ///
    /// # Errors
    ///
    /// Returns `GeoError::LatitudeOutOfRange` or `GeoError::LongitudeOutOfRange`.
    pub fn checked(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoError::LatitudeOutOfRange);
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoError::LongitudeOutOfRange);
        }
        Ok(Self::new(latitude, longitude))
    }

    /// Great-circle distance to another point in kilometers.
    #[must_use]
    pub fn distance_km(&self, other: &Self) -> f64 {
        crate::delivery::distance_km(*self, *other)
    }
}

impl fmt::Display for GeoCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

impl FromStr for GeoCoordinate {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = s.split_once(',').ok_or(GeoError::Malformed)?;
        let parse = |part: &str| {
            part.trim()
                .parse::<f64>()
                .map_err(|_| GeoError::InvalidNumber(part.trim().to_string()))
        };
        Self::checked(parse(lat)?, parse(lon)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_coordinates() {
        let c: GeoCoordinate = "10.7769, 106.7009".parse().unwrap();
        assert!((c.latitude - 10.7769).abs() < f64::EPSILON);
        assert!((c.longitude - 106.7009).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!("10.7".parse::<GeoCoordinate>(), Err(GeoError::Malformed));
        assert!(matches!(
            "abc,1".parse::<GeoCoordinate>(),
            Err(GeoError::InvalidNumber(_))
        ));
        assert_eq!(
            "91,0".parse::<GeoCoordinate>(),
            Err(GeoError::LatitudeOutOfRange)
        );
        assert_eq!(
            "0,-181".parse::<GeoCoordinate>(),
            Err(GeoError::LongitudeOutOfRange)
        );
        assert!("NaN,0".parse::<GeoCoordinate>().is_err());
    }
}
