//! Built-in events shown when the API cannot be reached.

use crate::model::{Event, EventLocation, EventStatus, Organizer};
use chrono::{DateTime, Duration, Utc};
use healthwatch_geo::Coordinate;

struct Sample {
    title: &'static str,
    description: &'static str,
    category: &'static str,
    offset_hours: i64,
    address: &'static str,
    region: &'static str,
    lat: f64,
    lng: f64,
    organizer: &'static str,
    max_participants: u32,
    registered: u32,
}

const SAMPLES: &[Sample] = &[
    Sample {
        title: "Free Blood Pressure Screening",
        description: "Walk-in hypertension checks with nurses from the district clinic.",
        category: "screening",
        offset_hours: 3,
        address: "Makola Market, Accra",
        region: "Greater Accra",
        lat: 5.5502,
        lng: -0.2100,
        organizer: "Ghana Health Service",
        max_participants: 150,
        registered: 87,
    },
    Sample {
        title: "Diabetes Awareness Walk",
        description: "A 5 km community walk with free glucose testing at the finish.",
        category: "awareness",
        offset_hours: 24,
        address: "Independence Square, Accra",
        region: "Greater Accra",
        lat: 5.5486,
        lng: -0.1929,
        organizer: "Accra Diabetes Association",
        max_participants: 300,
        registered: 212,
    },
    Sample {
        title: "Childhood Vaccination Drive",
        description: "Routine immunizations for children under five. Bring the child health record book.",
        category: "vaccination",
        offset_hours: 4 * 24,
        address: "Tema General Hospital, Tema",
        region: "Greater Accra",
        lat: 5.6698,
        lng: -0.0166,
        organizer: "Tema Metro Health Directorate",
        max_participants: 200,
        registered: 64,
    },
    Sample {
        title: "Malaria Prevention Workshop",
        description: "Bed net distribution and a talk on early symptoms.",
        category: "workshop",
        offset_hours: 20 * 24,
        address: "Kejetia Market, Kumasi",
        region: "Ashanti",
        lat: 6.6950,
        lng: -1.6244,
        organizer: "Ashanti Regional Health Office",
        max_participants: 80,
        registered: 80,
    },
    Sample {
        title: "Breast Cancer Screening Day",
        description: "Clinical breast examinations and self-examination training.",
        category: "screening",
        offset_hours: 45 * 24,
        address: "Cape Coast Teaching Hospital, Cape Coast",
        region: "Central",
        lat: 5.1315,
        lng: -1.2795,
        organizer: "Central Regional Hospital Trust",
        max_participants: 120,
        registered: 30,
    },
    Sample {
        title: "Mental Health Open Forum",
        description: "Peer support session and counselling referrals.",
        category: "awareness",
        offset_hours: -3 * 24,
        address: "Komfo Anokye Teaching Hospital, Kumasi",
        region: "Ashanti",
        lat: 6.6977,
        lng: -1.6291,
        organizer: "Komfo Anokye Psychiatry Unit",
        max_participants: 60,
        registered: 41,
    },
];

/// The sample dataset, dated relative to `now`.
pub fn sample_events(now: DateTime<Utc>) -> Vec<Event> {
    SAMPLES
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let date = now + Duration::hours(s.offset_hours);
            Event {
                id: format!("sample-{}", i + 1),
                title: s.title.to_string(),
                description: Some(s.description.to_string()),
                category: Some(s.category.to_string()),
                date,
                location: EventLocation {
                    address: s.address.to_string(),
                    region: Some(s.region.to_string()),
                    coordinates: Coordinate::new(s.lat, s.lng),
                },
                distance_km: None,
                organizer: Some(Organizer {
                    name: s.organizer.to_string(),
                    email: None,
                }),
                status: if date < now {
                    EventStatus::Completed
                } else {
                    EventStatus::Active
                },
                max_participants: Some(s.max_participants),
                registered_participants: Some(s.registered),
                image_url: None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{group_by_date, transform_value, DateGroupKey};
    use chrono::TimeZone;

    #[test]
    fn test_samples_are_valid_and_unique() {
        let events = sample_events(Utc::now());
        assert_eq!(events.len(), SAMPLES.len());
        assert!(events.iter().all(|e| e.location.coordinates.is_valid()));

        let mut ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), events.len());
    }

    #[test]
    fn test_samples_span_buckets() {
        let now = Utc.with_ymd_and_hms(2025, 10, 16, 8, 0, 0).unwrap();
        let groups = group_by_date(sample_events(now), &now);
        let keys: Vec<DateGroupKey> = groups.iter().map(|g| g.key).collect();

        assert_eq!(&keys[..3], &[DateGroupKey::Today, DateGroupKey::Tomorrow, DateGroupKey::ThisWeek]);
        assert!(keys.contains(&DateGroupKey::PastEvents));
    }

    #[test]
    fn test_samples_survive_transform() {
        for event in sample_events(Utc::now()) {
            let value = serde_json::to_value(&event).unwrap();
            assert_eq!(transform_value(value).unwrap(), event);
        }
    }
}
