//! Date bucketing for sectioned event lists.

use crate::model::Event;
use chrono::{DateTime, Days, Local, NaiveDate, TimeZone, Utc};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Display bucket an event falls into relative to "now"
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DateGroupKey {
    Today,
    Tomorrow,
    /// Strictly after tomorrow and before one week from today
    ThisWeek,
    PastEvents,
    /// Anything from one week out onwards, by calendar month
    Month { year: i32, month: u32 },
}

impl DateGroupKey {
    /// Classify a calendar day relative to `today`.
    pub fn classify(day: NaiveDate, today: NaiveDate) -> Self {
        let tomorrow = today + Days::new(1);
        let week_out = today + Days::new(7);

        if day < today {
            Self::PastEvents
        } else if day == today {
            Self::Today
        } else if day == tomorrow {
            Self::Tomorrow
        } else if day < week_out {
            Self::ThisWeek
        } else {
            Self::Month {
                year: chrono::Datelike::year(&day),
                month: chrono::Datelike::month(&day),
            }
        }
    }

    /// Fixed slot for the near-term buckets; `None` for the rest
    fn priority(self) -> Option<u8> {
        match self {
            Self::Today => Some(0),
            Self::Tomorrow => Some(1),
            Self::ThisWeek => Some(2),
            Self::PastEvents | Self::Month { .. } => None,
        }
    }
}

impl fmt::Display for DateGroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Today => f.write_str("Today"),
            Self::Tomorrow => f.write_str("Tomorrow"),
            Self::ThisWeek => f.write_str("This Week"),
            Self::PastEvents => f.write_str("Past Events"),
            Self::Month { year, month } => match NaiveDate::from_ymd_opt(*year, *month, 1) {
                Some(first) => write!(f, "{}", first.format("%B %Y")),
                None => write!(f, "{year}-{month:02}"),
            },
        }
    }
}

impl Serialize for DateGroupKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One labeled section of events
#[derive(Debug, Clone, Serialize)]
pub struct EventGroup {
    pub key: DateGroupKey,
    pub events: Vec<Event>,
}

impl EventGroup {
    fn earliest(&self) -> Option<DateTime<Utc>> {
        self.events.first().map(|e| e.date)
    }
}

/// Partition `events` into date buckets relative to `now`.
///
/// Days are compared in `now`'s time zone with time of day ignored. The
/// returned order is Today, Tomorrow, This Week (whichever are non-empty),
/// then every other bucket by its earliest event. Events inside a bucket are
/// ascending by date, with input order kept for equal dates.
pub fn group_by_date<Tz: TimeZone>(events: Vec<Event>, now: &DateTime<Tz>) -> Vec<EventGroup> {
    let tz = now.timezone();
    let today = now.date_naive();

    let mut buckets: BTreeMap<DateGroupKey, Vec<Event>> = BTreeMap::new();
    for event in events {
        let day = event.date.with_timezone(&tz).date_naive();
        buckets
            .entry(DateGroupKey::classify(day, today))
            .or_default()
            .push(event);
    }

    let mut groups: Vec<EventGroup> = buckets
        .into_iter()
        .map(|(key, mut events)| {
            events.sort_by_key(|e| e.date);
            EventGroup { key, events }
        })
        .collect();

    groups.sort_by(|a, b| {
        let rank = |g: &EventGroup| g.key.priority().unwrap_or(u8::MAX);
        rank(a)
            .cmp(&rank(b))
            .then_with(|| a.earliest().cmp(&b.earliest()))
            .then_with(|| a.key.cmp(&b.key))
    });
    groups
}

/// [`group_by_date`] against the local wall clock.
pub fn group_by_date_local(events: Vec<Event>) -> Vec<EventGroup> {
    group_by_date(events, &Local::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EventLocation, EventStatus};
    use chrono::{Duration, FixedOffset};
    use healthwatch_geo::Coordinate;
    use proptest::prelude::*;

    fn event(id: &str, date: DateTime<Utc>) -> Event {
        Event {
            id: id.to_string(),
            title: format!("Event {id}"),
            description: None,
            category: None,
            date,
            location: EventLocation {
                address: "Accra".into(),
                region: None,
                coordinates: Coordinate::new(5.6, -0.18),
            },
            distance_km: None,
            organizer: None,
            status: EventStatus::Active,
            max_participants: None,
            registered_participants: None,
            image_url: None,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 16, 9, 0, 0).unwrap()
    }

    fn labels(groups: &[EventGroup]) -> Vec<String> {
        groups.iter().map(|g| g.key.to_string()).collect()
    }

    #[test]
    fn test_classify_boundaries() {
        let today = NaiveDate::from_ymd_opt(2025, 10, 16).unwrap();
        let day = |n: i64| today + Duration::days(n);

        assert_eq!(DateGroupKey::classify(day(-1), today), DateGroupKey::PastEvents);
        assert_eq!(DateGroupKey::classify(day(0), today), DateGroupKey::Today);
        assert_eq!(DateGroupKey::classify(day(1), today), DateGroupKey::Tomorrow);
        assert_eq!(DateGroupKey::classify(day(2), today), DateGroupKey::ThisWeek);
        assert_eq!(DateGroupKey::classify(day(6), today), DateGroupKey::ThisWeek);
        assert_eq!(
            DateGroupKey::classify(day(7), today),
            DateGroupKey::Month { year: 2025, month: 10 }
        );
    }

    #[test]
    fn test_today_ignores_time_of_day() {
        let early = Utc.with_ymd_and_hms(2025, 10, 16, 0, 5, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2025, 10, 16, 23, 55, 0).unwrap();
        let groups = group_by_date(vec![event("late", late), event("early", early)], &now());

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].key, DateGroupKey::Today);
        assert_eq!(groups[0].events[0].id, "early");
    }

    #[test]
    fn test_priority_ordering() {
        let events = vec![
            event("past", now() - Duration::days(30)),
            event("dec", Utc.with_ymd_and_hms(2025, 12, 1, 10, 0, 0).unwrap()),
            event("nov", Utc.with_ymd_and_hms(2025, 11, 20, 10, 0, 0).unwrap()),
            event("week", now() + Duration::days(3)),
            event("tomorrow", now() + Duration::days(1)),
            event("today", now() + Duration::hours(5)),
        ];
        let groups = group_by_date(events, &now());

        assert_eq!(
            labels(&groups),
            vec!["Today", "Tomorrow", "This Week", "Past Events", "November 2025", "December 2025"]
        );
    }

    #[test]
    fn test_priority_skips_empty_buckets() {
        let events = vec![
            event("nov", Utc.with_ymd_and_hms(2025, 11, 20, 10, 0, 0).unwrap()),
            event("tomorrow", now() + Duration::days(1)),
        ];
        assert_eq!(labels(&group_by_date(events, &now())), vec!["Tomorrow", "November 2025"]);
    }

    #[test]
    fn test_grouping_uses_now_timezone() {
        // 23:30 UTC on the 16th is already the 17th in UTC+2
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let local_now = tz.with_ymd_and_hms(2025, 10, 17, 8, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2025, 10, 16, 23, 30, 0).unwrap();

        let groups = group_by_date(vec![event("late", late)], &local_now);
        assert_eq!(groups[0].key, DateGroupKey::Today);
    }

    #[test]
    fn test_key_serializes_as_label() {
        let json = serde_json::to_string(&DateGroupKey::Month { year: 2025, month: 10 }).unwrap();
        assert_eq!(json, "\"October 2025\"");
        assert_eq!(serde_json::to_string(&DateGroupKey::ThisWeek).unwrap(), "\"This Week\"");
    }

    proptest! {
        #[test]
        fn prop_groups_partition_input(offsets in proptest::collection::vec(-2_000_000i64..8_000_000, 0..40)) {
            let events: Vec<Event> = offsets
                .iter()
                .enumerate()
                .map(|(i, secs)| event(&i.to_string(), now() + Duration::seconds(*secs)))
                .collect();
            let groups = group_by_date(events, &now());

            let mut seen: Vec<usize> = groups
                .iter()
                .flat_map(|g| g.events.iter().map(|e| e.id.parse::<usize>().unwrap()))
                .collect();
            seen.sort_unstable();
            prop_assert_eq!(seen, (0..offsets.len()).collect::<Vec<_>>());

            let mut keys: Vec<DateGroupKey> = groups.iter().map(|g| g.key).collect();
            let total = keys.len();
            keys.dedup();
            prop_assert_eq!(keys.len(), total);

            for group in &groups {
                prop_assert!(!group.events.is_empty());
                prop_assert!(group.events.windows(2).all(|w| w[0].date <= w[1].date));
            }

            let priorities: Vec<u8> = groups.iter().filter_map(|g| g.key.priority()).collect();
            let leading = groups.iter().take_while(|g| g.key.priority().is_some()).count();
            prop_assert_eq!(leading, priorities.len());
            prop_assert!(priorities.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
