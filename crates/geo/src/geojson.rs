//! Lenient coordinate parsing from wire formats.
//!
//! Event records reach the client with their location in several shapes:
//! - GeoJSON pair: `[lng, lat]`
//! - Plain object: `{"lat": .., "lng": ..}` or `{"latitude": .., "longitude": ..}`
//! - GeoJSON Point: `{"type": "Point", "coordinates": [lng, lat]}`
//! - WKT: `POINT(lng lat)`

use crate::{Coordinate, GeoError, Result};
use serde::{Deserialize, Serialize};

/// GeoJSON Point format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoJsonPoint {
    /// Should be "Point"
    #[serde(rename = "type")]
    pub point_type: Option<String>,
    /// [longitude, latitude] array
    pub coordinates: [f64; 2],
}

impl GeoJsonPoint {
    /// The point as a `{lat, lng}` coordinate.
    pub fn to_coordinate(&self) -> Coordinate {
        Coordinate::from_geojson(self.coordinates)
    }
}

impl From<Coordinate> for GeoJsonPoint {
    fn from(coord: Coordinate) -> Self {
        Self {
            point_type: Some("Point".to_string()),
            coordinates: coord.to_geojson(),
        }
    }
}

/// Parse a coordinate from any of the supported wire shapes.
///
/// # Returns
/// * `Some(Coordinate)` if parsing succeeds
/// * `None` if the value is null or has no recognizable shape
///
/// # Example
/// ```
/// use healthwatch_geo::parse_coordinate;
/// use serde_json::json;
///
/// let pair = parse_coordinate(&json!([-0.18, 5.60])).unwrap();
/// assert_eq!(pair.lat, 5.60);
///
/// let object = parse_coordinate(&json!({"lat": 5.60, "lng": -0.18})).unwrap();
/// assert_eq!(object, pair);
/// ```
pub fn parse_coordinate(value: &serde_json::Value) -> Option<Coordinate> {
    match value {
        serde_json::Value::Array(items) => pair(items),
        serde_json::Value::Object(map) => {
            if let Some(coords) = map.get("coordinates") {
                return parse_coordinate(coords);
            }
            let lat = map.get("lat").or_else(|| map.get("latitude"))?.as_f64()?;
            let lng = map
                .get("lng")
                .or_else(|| map.get("lon"))
                .or_else(|| map.get("longitude"))?
                .as_f64()?;
            Some(Coordinate::new(lat, lng))
        }
        serde_json::Value::String(wkt) => parse_wkt_point(wkt).ok(),
        _ => None,
    }
}

fn pair(items: &[serde_json::Value]) -> Option<Coordinate> {
    if items.len() < 2 {
        return None;
    }
    let lng = items[0].as_f64()?;
    let lat = items[1].as_f64()?;
    Some(Coordinate::from_geojson([lng, lat]))
}

/// Parse a WKT POINT string.
///
/// Format: `POINT(longitude latitude)`
fn parse_wkt_point(wkt: &str) -> Result<Coordinate> {
    let wkt = wkt.trim();

    if !wkt.starts_with("POINT(") && !wkt.starts_with("POINT (") {
        return Err(GeoError::InvalidWkt(format!("Expected POINT, got: {wkt}")));
    }

    let start = wkt.find('(').ok_or_else(|| GeoError::InvalidWkt("Missing '('".into()))?;
    let end = wkt.find(')').ok_or_else(|| GeoError::InvalidWkt("Missing ')'".into()))?;

    if start >= end {
        return Err(GeoError::InvalidWkt("Invalid parentheses".into()));
    }

    let parts: Vec<&str> = wkt[start + 1..end].split_whitespace().collect();

    if parts.len() != 2 {
        return Err(GeoError::InvalidWkt(format!(
            "Expected 2 coordinates, got {}",
            parts.len()
        )));
    }

    let lng: f64 = parts[0]
        .parse()
        .map_err(|_| GeoError::InvalidWkt(format!("Invalid longitude: {}", parts[0])))?;
    let lat: f64 = parts[1]
        .parse()
        .map_err(|_| GeoError::InvalidWkt(format!("Invalid latitude: {}", parts[1])))?;

    Ok(Coordinate::new(lat, lng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_geojson_pair() {
        let coord = parse_coordinate(&json!([-0.18, 5.60])).unwrap();
        assert_eq!(coord.lat, 5.60);
        assert_eq!(coord.lng, -0.18);
    }

    #[test]
    fn test_parse_lat_lng_object() {
        let coord = parse_coordinate(&json!({"lat": 5.60, "lng": -0.18})).unwrap();
        assert_eq!(coord, Coordinate::new(5.60, -0.18));

        let coord = parse_coordinate(&json!({"latitude": 5.60, "longitude": -0.18})).unwrap();
        assert_eq!(coord, Coordinate::new(5.60, -0.18));
    }

    #[test]
    fn test_parse_geojson_point() {
        let value = json!({"type": "Point", "coordinates": [-1.6244, 6.6885]});
        let coord = parse_coordinate(&value).unwrap();
        assert!((coord.lat - 6.6885).abs() < 0.0001);
        assert!((coord.lng - (-1.6244)).abs() < 0.0001);
    }

    #[test]
    fn test_parse_wkt_point() {
        let coord = parse_coordinate(&json!("POINT(-0.1870 5.6037)")).unwrap();
        assert!((coord.lat - 5.6037).abs() < 0.0001);

        let coord = parse_coordinate(&json!("POINT (-0.1870 5.6037)")).unwrap();
        assert!((coord.lng - (-0.1870)).abs() < 0.0001);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_coordinate(&json!(null)).is_none());
        assert!(parse_coordinate(&json!([1.0])).is_none());
        assert!(parse_coordinate(&json!({"lat": "x", "lng": 1.0})).is_none());
        assert!(parse_wkt_point("POLYGON((0 0, 1 1, 1 0, 0 0))").is_err());
    }

    #[test]
    fn test_point_round_trip_keeps_order() {
        let point = GeoJsonPoint::from(Coordinate::new(5.6, -0.18));
        assert_eq!(point.coordinates, [-0.18, 5.6]);
        assert_eq!(point.to_coordinate(), Coordinate::new(5.6, -0.18));
    }
}
