//! Map viewport bounds and the search polygon derived from them.

use crate::{approximate_distance, Coordinate, GeoError, Result};
use serde::{Deserialize, Serialize};

/// Number of points in a viewport polygon (four corners plus closing point).
pub const POLYGON_POINTS: usize = 5;

/// Rectangular map viewport given by its north-east and south-west corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapBounds {
    /// North-east corner
    pub northeast: Coordinate,
    /// South-west corner
    pub southwest: Coordinate,
}

impl MapBounds {
    /// Creates bounds after checking both corners are valid coordinates
    /// and that the north-east corner is not south of the south-west one.
    pub fn new(northeast: Coordinate, southwest: Coordinate) -> Result<Self> {
        let northeast = northeast.validated()?;
        let southwest = southwest.validated()?;
        if northeast.lat < southwest.lat {
            return Err(GeoError::InvalidBounds(format!(
                "north-east latitude {} is south of south-west latitude {}",
                northeast.lat, southwest.lat
            )));
        }
        Ok(Self {
            northeast,
            southwest,
        })
    }

    /// Whether the viewport wraps across the 180th meridian.
    pub fn crosses_antimeridian(&self) -> bool {
        self.northeast.lng < self.southwest.lng
    }

    /// Eastward longitude extent in degrees, in `[0, 360)`.
    pub fn lng_span(&self) -> f64 {
        let span = self.northeast.lng - self.southwest.lng;
        if span < 0.0 { span + 360.0 } else { span }
    }

    /// Centre of the viewport.
    pub fn center(&self) -> Coordinate {
        let mut lng = self.southwest.lng + self.lng_span() / 2.0;
        if lng > 180.0 {
            lng -= 360.0;
        }
        Coordinate::new((self.northeast.lat + self.southwest.lat) / 2.0, lng)
    }

    /// Distance from the centre to a corner, in kilometers.
    pub fn half_diagonal_km(&self) -> f64 {
        // Unwrapped longitudes keep the eastward span intact
        let half_span = self.lng_span() / 2.0;
        let center = Coordinate::new(
            (self.northeast.lat + self.southwest.lat) / 2.0,
            self.southwest.lng + half_span,
        );
        let corner = Coordinate::new(self.northeast.lat, center.lng + half_span);
        approximate_distance(&center, &corner)
    }
}

/// Closed ring of GeoJSON `[lng, lat]` points describing a viewport.
///
/// Always exactly [`POLYGON_POINTS`] points with the first equal to the last.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polygon([[f64; 2]; POLYGON_POINTS]);

impl Polygon {
    /// Builds the polygon for a viewport, walking SW → SE → NE → NW → SW.
    ///
    /// # Example
    /// ```
    /// use healthwatch_geo::{Coordinate, MapBounds, Polygon};
    ///
    /// let bounds = MapBounds {
    ///     northeast: Coordinate::new(5.70, -0.10),
    ///     southwest: Coordinate::new(5.50, -0.30),
    /// };
    /// let polygon = Polygon::from_bounds(&bounds);
    /// assert_eq!(polygon.points()[0], [-0.30, 5.50]);
    /// assert!(polygon.is_closed());
    /// ```
    pub fn from_bounds(bounds: &MapBounds) -> Self {
        let ne = bounds.northeast;
        let sw = bounds.southwest;
        Self([
            [sw.lng, sw.lat],
            [ne.lng, sw.lat],
            [ne.lng, ne.lat],
            [sw.lng, ne.lat],
            [sw.lng, sw.lat],
        ])
    }

    /// The ring's points in `[lng, lat]` order.
    pub fn points(&self) -> &[[f64; 2]; POLYGON_POINTS] {
        &self.0
    }

    /// Whether the ring is closed (first point equals last).
    pub fn is_closed(&self) -> bool {
        self.0[0] == self.0[POLYGON_POINTS - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn accra_bounds() -> MapBounds {
        MapBounds {
            northeast: Coordinate::new(5.70, -0.10),
            southwest: Coordinate::new(5.50, -0.30),
        }
    }

    #[test]
    fn test_polygon_from_bounds() {
        let polygon = Polygon::from_bounds(&accra_bounds());
        assert_eq!(
            polygon.points(),
            &[
                [-0.30, 5.50],
                [-0.10, 5.50],
                [-0.10, 5.70],
                [-0.30, 5.70],
                [-0.30, 5.50],
            ]
        );
    }

    #[test]
    fn test_polygon_serializes_as_nested_arrays() {
        let json = serde_json::to_value(Polygon::from_bounds(&accra_bounds())).unwrap();
        let ring = json.as_array().unwrap();
        assert_eq!(ring.len(), 5);
        assert_eq!(ring[2], serde_json::json!([-0.10, 5.70]));
    }

    #[test]
    fn test_bounds_validation() {
        assert!(MapBounds::new(Coordinate::new(5.7, -0.1), Coordinate::new(5.5, -0.3)).is_ok());
        assert!(MapBounds::new(Coordinate::new(5.5, -0.1), Coordinate::new(5.7, -0.3)).is_err());
        assert!(MapBounds::new(Coordinate::new(95.0, -0.1), Coordinate::new(5.7, -0.3)).is_err());
    }

    #[test]
    fn test_center_and_half_diagonal() {
        let bounds = accra_bounds();
        let center = bounds.center();
        assert!((center.lat - 5.60).abs() < 1e-9);
        assert!((center.lng - (-0.20)).abs() < 1e-9);

        // 0.1 degree each way near the equator is roughly 15.7 km
        let half = bounds.half_diagonal_km();
        assert!((half - 15.7).abs() < 0.5, "half diagonal: {}", half);
    }

    #[test]
    fn test_antimeridian_viewport() {
        let crossing = MapBounds::new(Coordinate::new(10.0, -170.0), Coordinate::new(0.0, 170.0)).unwrap();
        assert!(crossing.crosses_antimeridian());
        assert!((crossing.lng_span() - 20.0).abs() < 1e-9);

        let center = crossing.center();
        assert!((center.lat - 5.0).abs() < 1e-9);
        assert!((center.lng.abs() - 180.0).abs() < 1e-9);

        let shifted = MapBounds::new(Coordinate::new(10.0, -175.0), Coordinate::new(0.0, 165.0)).unwrap();
        assert!((shifted.center().lng - 175.0).abs() < 1e-9);

        // Same size as the equivalent viewport around Greenwich
        let greenwich = MapBounds::new(Coordinate::new(10.0, 10.0), Coordinate::new(0.0, -10.0)).unwrap();
        assert!(!greenwich.crosses_antimeridian());
        assert!((crossing.half_diagonal_km() - greenwich.half_diagonal_km()).abs() < 1e-6);
        assert!(crossing.half_diagonal_km() < 1_500.0);
    }

    proptest! {
        #[test]
        fn prop_polygon_always_closed(
            sw_lat in -90.0f64..90.0,
            sw_lng in -180.0f64..180.0,
            ne_lat in -90.0f64..90.0,
            ne_lng in -180.0f64..180.0,
        ) {
            let bounds = MapBounds {
                northeast: Coordinate::new(ne_lat, ne_lng),
                southwest: Coordinate::new(sw_lat, sw_lng),
            };
            let polygon = Polygon::from_bounds(&bounds);
            prop_assert_eq!(polygon.points().len(), POLYGON_POINTS);
            prop_assert!(polygon.is_closed());
            prop_assert_eq!(polygon.points()[2], [ne_lng, ne_lat]);
        }
    }
}
