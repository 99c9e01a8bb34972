//! Geospatial primitives for HealthWatch event search.
//!
//! This crate provides:
//! - `Coordinate` in `{lat, lng}` form with explicit GeoJSON `[lng, lat]` conversion
//! - Lenient coordinate parsing from GeoJSON, `{lat,lng}` objects and WKT
//! - Map viewport bounds and the closed search polygon derived from them
//! - Haversine distance calculations, with optional parallel batch processing
//!
//! # Example
//!
//! ```
//! use healthwatch_geo::{haversine_distance, Coordinate};
//!
//! let accra = Coordinate::new(5.6037, -0.1870);
//! let kumasi = Coordinate::new(6.6885, -1.6244);
//!
//! let distance_km = haversine_distance(&accra, &kumasi);
//! assert!((distance_km - 200.0).abs() < 10.0);
//! ```

mod haversine;
mod geojson;
mod polygon;
pub mod batch;
mod error;

pub use haversine::{
    approximate_distance, haversine_distance, haversine_distance_meters, EARTH_RADIUS_KM,
    EARTH_RADIUS_M,
};
pub use geojson::{parse_coordinate, GeoJsonPoint};
pub use polygon::{MapBounds, Polygon, POLYGON_POINTS};
pub use batch::{distances_from, nearest_first};
pub use error::{GeoError, Result};

/// A geographic coordinate in `{lat, lng}` form.
///
/// This is the representation used everywhere in client state. The wire
/// format's GeoJSON `[lng, lat]` order only appears through
/// [`Coordinate::from_geojson`] and [`Coordinate::to_geojson`].
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees (-90 to 90)
    pub lat: f64,
    /// Longitude in degrees (-180 to 180)
    pub lng: f64,
}

impl Coordinate {
    /// Creates a new coordinate.
    ///
    /// # Arguments
    /// * `lat` - Latitude in degrees (-90 to 90)
    /// * `lng` - Longitude in degrees (-180 to 180)
    #[inline]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Builds a coordinate from a GeoJSON `[lng, lat]` pair.
    #[inline]
    pub fn from_geojson([lng, lat]: [f64; 2]) -> Self {
        Self { lat, lng }
    }

    /// Returns the GeoJSON `[lng, lat]` pair for this coordinate.
    #[inline]
    pub fn to_geojson(&self) -> [f64; 2] {
        [self.lng, self.lat]
    }

    /// Returns true if the coordinate has valid values.
    #[inline]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }

    /// Validates the coordinate, returning it unchanged when in range.
    pub fn validated(self) -> Result<Self> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(GeoError::InvalidCoordinate(format!(
                "lat {} / lng {} out of range",
                self.lat, self.lng
            )))
        }
    }

    /// Converts degrees to radians for internal calculations.
    #[inline]
    pub(crate) fn to_radians(self) -> (f64, f64) {
        (self.lat.to_radians(), self.lng.to_radians())
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self::new(lat, lng)
    }
}

impl std::str::FromStr for Coordinate {
    type Err = GeoError;

    /// Parses `"lat,lng"`, as typed on the command line.
    fn from_str(s: &str) -> Result<Self> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| GeoError::InvalidCoordinate(format!("expected 'lat,lng', got '{s}'")))?;
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| GeoError::InvalidCoordinate(format!("invalid latitude: {lat}")))?;
        let lng: f64 = lng
            .trim()
            .parse()
            .map_err(|_| GeoError::InvalidCoordinate(format!("invalid longitude: {lng}")))?;
        Coordinate::new(lat, lng).validated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_creation() {
        let coord = Coordinate::new(5.6037, -0.1870);
        assert_eq!(coord.lat, 5.6037);
        assert_eq!(coord.lng, -0.1870);
    }

    #[test]
    fn test_coordinate_validation() {
        assert!(Coordinate::new(0.0, 0.0).is_valid());
        assert!(Coordinate::new(90.0, 180.0).is_valid());
        assert!(Coordinate::new(-90.0, -180.0).is_valid());
        assert!(!Coordinate::new(91.0, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, 181.0).is_valid());
        assert!(Coordinate::new(0.0, 181.0).validated().is_err());
    }

    #[test]
    fn test_geojson_order_swap() {
        let coord = Coordinate::from_geojson([-0.18, 5.60]);
        assert_eq!(coord.lat, 5.60);
        assert_eq!(coord.lng, -0.18);
        assert_eq!(coord.to_geojson(), [-0.18, 5.60]);
    }

    #[test]
    fn test_serializes_as_lat_lng_object() {
        let json = serde_json::to_value(Coordinate::new(5.6, -0.18)).unwrap();
        assert_eq!(json, serde_json::json!({"lat": 5.6, "lng": -0.18}));
    }

    #[test]
    fn test_parse_from_str() {
        let coord: Coordinate = "5.6037, -0.1870".parse().unwrap();
        assert_eq!(coord, Coordinate::new(5.6037, -0.1870));

        assert!("5.6".parse::<Coordinate>().is_err());
        assert!("abc,1".parse::<Coordinate>().is_err());
        assert!("95,1".parse::<Coordinate>().is_err());
    }
}
