use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::FacilityType;
use crate::errors::CoreError;

/// WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Build validated coordinates.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidCoordinates` if either component is not
    /// finite or falls outside WGS84 bounds.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoreError> {
        let coords = Self {
            latitude,
            longitude,
        };
        if coords.is_valid() {
            Ok(coords)
        } else {
            Err(CoreError::InvalidCoordinates {
                latitude,
                longitude,
            })
        }
    }

    /// Latitude in [-90, 90], longitude in [-180, 180], both finite.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Miles per degree of latitude, rounded down so boxes err on the wide side.
const MILES_PER_DEGREE: f64 = 69.0;

/// Latitude/longitude window used to prefilter location rows in SQL.
///
/// The box always contains every point within the requested radius; exact
/// filtering happens afterwards on great-circle distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl BoundingBox {
    /// Conservative box around `center` covering `radius_miles`.
    ///
    /// Near the poles, or when the box would cross the antimeridian, the
    /// longitude range opens up to the full circle.
    #[must_use]
    pub fn around(center: Coordinates, radius_miles: f64) -> Self {
        // 1% slack absorbs the spherical approximation.
        let lat_delta = radius_miles / MILES_PER_DEGREE * 1.01;
        let min_latitude = (center.latitude - lat_delta).max(-90.0);
        let max_latitude = (center.latitude + lat_delta).min(90.0);

        let widest = min_latitude.abs().max(max_latitude.abs());
        let cos = widest.to_radians().cos();
        let (min_longitude, max_longitude) = if widest >= 89.0 || cos <= f64::EPSILON {
            (-180.0, 180.0)
        } else {
            let lon_delta = radius_miles / (MILES_PER_DEGREE * cos) * 1.01;
            let min = center.longitude - lon_delta;
            let max = center.longitude + lon_delta;
            if min < -180.0 || max > 180.0 {
                (-180.0, 180.0)
            } else {
                (min, max)
            }
        };

        Self {
            min_latitude,
            max_latitude,
            min_longitude,
            max_longitude,
        }
    }

    #[must_use]
    pub fn contains(&self, point: Coordinates) -> bool {
        (self.min_latitude..=self.max_latitude).contains(&point.latitude)
            && (self.min_longitude..=self.max_longitude).contains(&point.longitude)
    }
}

/// Postal address of a facility.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Address {
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    /// Two-letter state code.
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    /// Five-digit county FIPS code.
    #[serde(default)]
    pub county_fips: Option<String>,
}

/// A healthcare provider in the registry.
///
/// `coordinates` are the primary position; additional positions live in
/// [`FacilityLocation`] rows. A facility without any valid position never
/// appears in proximity results.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Facility {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub bed_count: Option<u32>,
    pub facility_type: FacilityType,
}

/// An additional location row joined to a facility.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct FacilityLocation {
    pub facility_id: String,
    pub coordinates: Coordinates,
}

/// A facility within range of an origin, with its great-circle distance.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ProximityResult {
    pub facility: Facility,
    pub distance_miles: f64,
}
