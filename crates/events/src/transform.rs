//! Wire event normalization.
//!
//! [`transform_event`] is the single place where the wire format's GeoJSON
//! `[lng, lat]` order is turned into the client's `{lat, lng}`. It is pure and
//! idempotent: feeding a serialized [`Event`] back in yields the same event.

use crate::error::{EventError, Result};
use crate::model::{Event, EventLocation, EventStatus, RawEvent};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use healthwatch_geo::{distances_from, parse_coordinate, Coordinate};
use tracing::warn;

/// Normalize one wire record into the client [`Event`] shape.
///
/// - `_id` is preferred over `id`
/// - coordinates in any supported shape become `{lat, lng}`
/// - `distance` (meters) becomes `distance_km`; an existing `distanceKm` wins
/// - unknown or missing status becomes [`EventStatus::Active`]
pub fn transform_event(raw: RawEvent) -> Result<Event> {
    let id = raw
        .object_id
        .as_ref()
        .and_then(id_string)
        .or_else(|| raw.id.as_ref().and_then(id_string))
        .ok_or(EventError::MissingId)?;

    let title = match raw.title {
        Some(title) if !title.trim().is_empty() => title,
        _ => return Err(EventError::MissingField { id, field: "title" }),
    };

    let Some(date_str) = raw.date else {
        return Err(EventError::MissingField { id, field: "date" });
    };
    let Some(date) = parse_event_date(&date_str) else {
        return Err(EventError::InvalidDate { id, value: date_str });
    };

    let location = raw.location.unwrap_or_default();
    let Some(coordinates) = parse_coordinate(&location.coordinates).filter(Coordinate::is_valid)
    else {
        return Err(EventError::InvalidCoordinates { id });
    };

    let distance_km = raw.distance_km.or(raw.distance.map(|meters| meters / 1000.0));

    Ok(Event {
        id,
        title,
        description: raw.description,
        category: raw.category,
        date,
        location: EventLocation {
            address: location.address.unwrap_or_default(),
            region: location.region,
            coordinates,
        },
        distance_km,
        organizer: raw.organizer,
        status: raw
            .status
            .as_deref()
            .map(EventStatus::parse)
            .unwrap_or_default(),
        max_participants: raw.max_participants,
        registered_participants: raw.registered_participants,
        image_url: raw.image_url,
    })
}

/// Normalize a JSON value holding one wire record.
pub fn transform_value(value: serde_json::Value) -> Result<Event> {
    let raw: RawEvent = serde_json::from_value(value)?;
    transform_event(raw)
}

/// Normalize a list of wire records, skipping the ones that cannot be used.
pub fn transform_events(values: Vec<serde_json::Value>) -> Vec<Event> {
    values
        .into_iter()
        .filter_map(|value| match transform_value(value) {
            Ok(event) => Some(event),
            Err(e) => {
                warn!(error = %e, "Skipping malformed event record");
                None
            }
        })
        .collect()
}

/// Parse an event date.
///
/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.fff]` (taken as UTC) and a
/// bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_event_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Fill in `distance_km` from `origin` for events the server left without one.
pub fn annotate_distances(events: &mut [Event], origin: &Coordinate) {
    let missing: Vec<usize> = events
        .iter()
        .enumerate()
        .filter(|(_, e)| e.distance_km.is_none())
        .map(|(i, _)| i)
        .collect();
    if missing.is_empty() {
        return;
    }

    let points: Vec<Coordinate> = missing
        .iter()
        .map(|&i| events[i].location.coordinates)
        .collect();
    let distances = distances_from(origin, &points);

    for (&i, distance) in missing.iter().zip(distances) {
        if distance.is_finite() {
            events[i].distance_km = Some(distance);
        }
    }
}

/// Order events nearest first; events without a distance go last.
pub fn sort_by_distance(events: &mut [Event]) {
    events.sort_by(|a, b| {
        let a = a.distance_km.unwrap_or(f64::INFINITY);
        let b = b.distance_km.unwrap_or(f64::INFINITY);
        a.total_cmp(&b)
    });
}

fn id_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use serde_json::json;

    fn wire_event() -> serde_json::Value {
        json!({
            "_id": "a1",
            "id": "ignored",
            "title": "Free Blood Pressure Screening",
            "date": "2025-10-16T14:00:00Z",
            "location": {
                "address": "Makola Market, Accra",
                "region": "Greater Accra",
                "coordinates": [-0.18, 5.60]
            },
            "distance": 2500.0,
            "organizer": {"name": "Ghana Health Service", "email": "info@ghs.example"},
            "status": "active",
            "maxParticipants": 100,
            "registeredParticipants": 42
        })
    }

    #[test]
    fn test_transform_wire_event() {
        let event = transform_value(wire_event()).unwrap();

        assert_eq!(event.id, "a1");
        assert_eq!(event.location.coordinates, Coordinate::new(5.60, -0.18));
        assert_eq!(event.location.region.as_deref(), Some("Greater Accra"));
        assert_eq!(event.distance_km, Some(2.5));
        assert_eq!(event.status, EventStatus::Active);
        assert_eq!(event.spots_left(), Some(58));
    }

    #[test]
    fn test_id_fallback_and_numeric_ids() {
        let event = transform_value(json!({
            "id": 42,
            "title": "Walk",
            "date": "2025-10-16",
            "location": {"coordinates": {"lat": 5.6, "lng": -0.18}}
        }))
        .unwrap();
        assert_eq!(event.id, "42");
        assert_eq!(event.location.address, "");
        assert_eq!(event.date, Utc.with_ymd_and_hms(2025, 10, 16, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_zero_distance_is_kept() {
        let mut value = wire_event();
        value["distance"] = json!(0.0);
        let event = transform_value(value).unwrap();
        assert_eq!(event.distance_km, Some(0.0));

        let mut value = wire_event();
        value.as_object_mut().unwrap().remove("distance");
        let event = transform_value(value).unwrap();
        assert_eq!(event.distance_km, None);
    }

    #[test]
    fn test_rejects_unusable_records() {
        let mut value = wire_event();
        value.as_object_mut().unwrap().remove("_id");
        value.as_object_mut().unwrap().remove("id");
        assert!(matches!(transform_value(value), Err(EventError::MissingId)));

        let mut value = wire_event();
        value["date"] = json!("next tuesday");
        assert!(matches!(transform_value(value), Err(EventError::InvalidDate { .. })));

        let mut value = wire_event();
        value["location"]["coordinates"] = json!([200.0, 5.6]);
        assert!(matches!(
            transform_value(value),
            Err(EventError::InvalidCoordinates { .. })
        ));

        assert!(matches!(transform_value(json!("nope")), Err(EventError::Malformed(_))));
    }

    #[test]
    fn test_transform_events_skips_bad_records() {
        let events = transform_events(vec![wire_event(), json!({"title": "no id"}), json!(3)]);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_transform_is_idempotent() {
        let once = transform_value(wire_event()).unwrap();
        let twice = transform_value(serde_json::to_value(&once).unwrap()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_parse_event_date_formats() {
        let expected = Utc.with_ymd_and_hms(2025, 10, 16, 14, 0, 0).unwrap();
        assert_eq!(parse_event_date("2025-10-16T14:00:00Z"), Some(expected));
        assert_eq!(parse_event_date("2025-10-16T15:00:00+01:00"), Some(expected));
        assert_eq!(parse_event_date("2025-10-16T14:00:00.000"), Some(expected));
        assert_eq!(parse_event_date("2025-10-16 14:00:00"), Some(expected));
        assert!(parse_event_date("16/10/2025").is_none());
    }

    #[test]
    fn test_annotate_and_sort_by_distance() {
        let accra = Coordinate::new(5.6037, -0.1870);
        let mut far = transform_value(wire_event()).unwrap();
        far.id = "kumasi".into();
        far.distance_km = None;
        far.location.coordinates = Coordinate::new(6.6885, -1.6244);
        let near = transform_value(wire_event()).unwrap();

        let mut events = vec![far, near];
        annotate_distances(&mut events, &accra);
        assert_eq!(events[1].distance_km, Some(2.5));
        assert!((events[0].distance_km.unwrap() - 199.5).abs() < 2.0);

        sort_by_distance(&mut events);
        assert_eq!(events[0].id, "a1");
    }

    proptest! {
        #[test]
        fn prop_geojson_order_preserved(lng in -180.0f64..=180.0, lat in -90.0f64..=90.0) {
            let event = transform_value(json!({
                "_id": "p",
                "title": "Prop",
                "date": "2025-10-16T14:00:00Z",
                "location": {"coordinates": [lng, lat], "address": "Somewhere"}
            }))
            .unwrap();
            prop_assert_eq!(event.location.coordinates.lat, lat);
            prop_assert_eq!(event.location.coordinates.lng, lng);
        }

        #[test]
        fn prop_transform_idempotent(
            lng in -180.0f64..=180.0,
            lat in -90.0f64..=90.0,
            distance in proptest::option::of(0.0f64..1_000_000.0),
            secs in 0i64..4_000_000_000,
        ) {
            let date = Utc.timestamp_opt(secs, 0).unwrap().to_rfc3339();
            let once = transform_value(json!({
                "_id": "p",
                "title": "Prop",
                "date": date,
                "distance": distance,
                "location": {"coordinates": [lng, lat], "address": "Somewhere"}
            }))
            .unwrap();
            let twice = transform_value(serde_json::to_value(&once).unwrap()).unwrap();
            prop_assert_eq!(once, twice);
        }
    }
}
