//! Search filter builder: UI state to REST query parameters.

use crate::model::Event;
use chrono::{Local, NaiveDate, TimeZone};
use healthwatch_geo::{Coordinate, Polygon};
use serde::{Deserialize, Serialize};

/// Radius used when the UI label is missing or unrecognized
pub const DEFAULT_RADIUS_METERS: u32 = 25_000;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// The allowed search radii
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RadiusFilter {
    #[default]
    Km25,
    Km50,
    Km100,
}

impl RadiusFilter {
    pub const ALL: [RadiusFilter; 3] = [Self::Km25, Self::Km50, Self::Km100];

    /// Map a UI label (`"25km"`, `"50km"`, `"100km"`); anything else is 25 km.
    pub fn from_label(label: Option<&str>) -> Self {
        let Some(label) = label else {
            return Self::default();
        };
        let normalized: String = label
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "50km" | "50" => Self::Km50,
            "100km" | "100" => Self::Km100,
            _ => Self::Km25,
        }
    }

    pub fn meters(self) -> u32 {
        match self {
            Self::Km25 => 25_000,
            Self::Km50 => 50_000,
            Self::Km100 => 100_000,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Km25 => "25km",
            Self::Km50 => "50km",
            Self::Km100 => "100km",
        }
    }

    /// Smallest allowed radius covering `km`, capped at 100 km.
    pub fn snap_up(km: f64) -> Self {
        Self::ALL
            .into_iter()
            .find(|r| f64::from(r.meters()) / 1000.0 >= km)
            .unwrap_or(Self::Km100)
    }
}

/// Date selection as the UI holds it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateSelection {
    /// Only when set does any date reach the query
    pub has_date_filter: bool,
    pub date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl DateSelection {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn single(date: NaiveDate) -> Self {
        Self {
            has_date_filter: true,
            date: Some(date),
            ..Self::default()
        }
    }

    pub fn range(start: NaiveDate, end: Option<NaiveDate>) -> Self {
        Self {
            has_date_filter: true,
            start_date: Some(start),
            end_date: end,
            ..Self::default()
        }
    }

    /// Resolve into the date part of a query.
    ///
    /// A range wins over a single date. An end equal to the start is dropped,
    /// a reversed range is swapped and an end without a start is ignored.
    pub fn resolve(&self) -> Option<DateQuery> {
        if !self.has_date_filter {
            return None;
        }
        match (self.start_date, self.end_date, self.date) {
            (Some(start), end, _) => {
                let (start, end) = match end {
                    Some(end) if end < start => (end, Some(start)),
                    other => (start, other),
                };
                Some(DateQuery::Range {
                    start,
                    end: end.filter(|e| *e != start),
                })
            }
            (None, _, Some(date)) => Some(DateQuery::Single(date)),
            (None, _, None) => None,
        }
    }
}

/// Resolved date constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateQuery {
    Single(NaiveDate),
    /// `end: None` is a single-day range on `start`
    Range {
        start: NaiveDate,
        end: Option<NaiveDate>,
    },
}

impl DateQuery {
    /// Whether a calendar day falls inside this constraint
    pub fn contains(&self, day: NaiveDate) -> bool {
        match *self {
            Self::Single(date) => day == date,
            Self::Range { start, end } => start <= day && day <= end.unwrap_or(start),
        }
    }

    fn push_pairs(&self, pairs: &mut Vec<(&'static str, String)>) {
        match self {
            Self::Single(date) => pairs.push(("date", date.format(DATE_FORMAT).to_string())),
            Self::Range { start, end } => {
                pairs.push(("startDate", start.format(DATE_FORMAT).to_string()));
                if let Some(end) = end {
                    pairs.push(("endDate", end.format(DATE_FORMAT).to_string()));
                }
            }
        }
    }
}

/// The non-geographic part of a search, shared by radius and polygon queries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    pub title: Option<String>,
    pub region: Option<String>,
    pub dates: Option<DateQuery>,
}

impl SearchFilters {
    /// Apply the filters locally, as the server would.
    ///
    /// Used on the sample dataset when live search is unavailable. Dates are
    /// compared as calendar days in the local time zone, the same days the
    /// results are grouped under.
    pub fn matches(&self, event: &Event) -> bool {
        self.matches_in(event, &Local)
    }

    /// [`SearchFilters::matches`] with event dates read in `tz`
    pub fn matches_in<Tz: TimeZone>(&self, event: &Event, tz: &Tz) -> bool {
        if let Some(title) = &self.title {
            let needle = title.to_lowercase();
            let in_title = event.title.to_lowercase().contains(&needle);
            let in_description = event
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle));
            if !in_title && !in_description {
                return false;
            }
        }
        if let Some(region) = &self.region {
            let matches_region = event
                .location
                .region
                .as_deref()
                .is_some_and(|r| r.eq_ignore_ascii_case(region));
            if !matches_region {
                return false;
            }
        }
        match &self.dates {
            Some(dates) => dates.contains(event.date.with_timezone(tz).date_naive()),
            None => true,
        }
    }

    fn push_pairs(&self, pairs: &mut Vec<(&'static str, String)>) {
        if let Some(title) = &self.title {
            pairs.push(("title", title.clone()));
        }
        if let Some(region) = &self.region {
            pairs.push(("region", region.clone()));
        }
        if let Some(dates) = &self.dates {
            dates.push_pairs(pairs);
        }
    }
}

/// Search inputs as the UI holds them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchState {
    pub title: String,
    /// Resolved from geolocation, an explicit flag or a saved location
    pub coordinates: Option<Coordinate>,
    /// UI radius label such as `"50km"`
    pub radius: Option<String>,
    pub region: Option<String>,
    pub dates: DateSelection,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl SearchState {
    pub fn build(&self) -> Option<SearchParams> {
        build_search_params(self)
    }

    /// Filters alone, usable before a coordinate is known
    pub fn filters(&self) -> SearchFilters {
        SearchFilters {
            title: non_blank(Some(&self.title)),
            region: non_blank(self.region.as_ref()),
            dates: self.dates.resolve(),
        }
    }
}

/// Outbound radius search parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    pub coordinates: Coordinate,
    pub radius_meters: u32,
    pub filters: SearchFilters,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl SearchParams {
    pub fn new(coordinates: Coordinate, radius: RadiusFilter) -> Self {
        Self {
            coordinates,
            radius_meters: radius.meters(),
            filters: SearchFilters::default(),
            page: None,
            limit: None,
        }
    }

    #[must_use]
    pub fn with_filters(mut self, filters: SearchFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Flat GET parameters:
    /// `lat, lng, radius, title?, region?, date? | startDate?, endDate?, page?, limit?`
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("lat", self.coordinates.lat.to_string()),
            ("lng", self.coordinates.lng.to_string()),
            ("radius", self.radius_meters.to_string()),
        ];
        self.filters.push_pairs(&mut pairs);
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }
}

/// Build radius search parameters from UI state.
///
/// Returns `None` while no coordinate is known; the caller decides on a
/// fallback instead of sending a request without a location.
pub fn build_search_params(state: &SearchState) -> Option<SearchParams> {
    let coordinates = state.coordinates.filter(Coordinate::is_valid)?;
    Some(SearchParams {
        coordinates,
        radius_meters: RadiusFilter::from_label(state.radius.as_deref()).meters(),
        filters: state.filters(),
        page: state.page,
        limit: state.limit,
    })
}

/// Body of a polygon ("events in the visible map area") search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolygonQuery {
    pub coordinates: Polygon,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub page: u32,
    pub limit: u32,
}

impl PolygonQuery {
    pub fn new(coordinates: Polygon, filters: &SearchFilters, page: u32, limit: u32) -> Self {
        let format = |d: NaiveDate| d.format(DATE_FORMAT).to_string();
        let (date, start_date, end_date) = match filters.dates {
            Some(DateQuery::Single(d)) => (Some(format(d)), None, None),
            Some(DateQuery::Range { start, end }) => (None, Some(format(start)), end.map(format)),
            None => (None, None, None),
        };
        Self {
            coordinates,
            title: filters.title.clone(),
            region: filters.region.clone(),
            date,
            start_date,
            end_date,
            page,
            limit,
        }
    }
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use healthwatch_geo::MapBounds;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn accra_state() -> SearchState {
        SearchState {
            coordinates: Some(Coordinate::new(5.6037, -0.1870)),
            ..SearchState::default()
        }
    }

    fn pair<'a>(pairs: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        pairs.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_radius_defaults_to_25km() {
        assert_eq!(RadiusFilter::from_label(None).meters(), DEFAULT_RADIUS_METERS);
        assert_eq!(RadiusFilter::from_label(Some("75km")).meters(), 25_000);
        assert_eq!(RadiusFilter::from_label(Some("")).meters(), 25_000);
        assert_eq!(RadiusFilter::from_label(Some("50km")).meters(), 50_000);
        assert_eq!(RadiusFilter::from_label(Some("100 KM")).meters(), 100_000);

        let mut state = accra_state();
        state.radius = Some("walking distance".into());
        let pairs = state.build().unwrap().to_query_pairs();
        assert_eq!(pair(&pairs, "radius"), Some("25000"));
    }

    #[test]
    fn test_snap_up() {
        assert_eq!(RadiusFilter::snap_up(3.0), RadiusFilter::Km25);
        assert_eq!(RadiusFilter::snap_up(25.0), RadiusFilter::Km25);
        assert_eq!(RadiusFilter::snap_up(25.1), RadiusFilter::Km50);
        assert_eq!(RadiusFilter::snap_up(80.0), RadiusFilter::Km100);
        assert_eq!(RadiusFilter::snap_up(900.0), RadiusFilter::Km100);
    }

    #[test]
    fn test_not_ready_without_coordinates() {
        let state = SearchState {
            title: "malaria".into(),
            ..SearchState::default()
        };
        assert!(build_search_params(&state).is_none());

        let state = SearchState {
            coordinates: Some(Coordinate::new(95.0, 0.0)),
            ..SearchState::default()
        };
        assert!(build_search_params(&state).is_none());
    }

    #[test]
    fn test_query_pairs_order_and_blanks() {
        let mut state = accra_state();
        state.title = "  ".into();
        state.region = Some("Greater Accra".into());
        state.page = Some(2);
        state.limit = Some(20);

        let keys: Vec<&str> = state.build().unwrap().to_query_pairs().iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["lat", "lng", "radius", "region", "page", "limit"]);
    }

    #[test]
    fn test_date_flag_gates_dates() {
        let mut state = accra_state();
        state.dates = DateSelection {
            has_date_filter: false,
            date: Some(ymd(2025, 10, 16)),
            ..DateSelection::default()
        };
        let pairs = state.build().unwrap().to_query_pairs();
        assert!(pair(&pairs, "date").is_none());

        state.dates.has_date_filter = true;
        let pairs = state.build().unwrap().to_query_pairs();
        assert_eq!(pair(&pairs, "date"), Some("2025-10-16"));
    }

    #[test]
    fn test_range_takes_precedence_and_collapses() {
        let mut state = accra_state();
        state.dates = DateSelection {
            has_date_filter: true,
            date: Some(ymd(2025, 10, 1)),
            start_date: Some(ymd(2025, 10, 16)),
            end_date: Some(ymd(2025, 10, 16)),
        };
        let pairs = state.build().unwrap().to_query_pairs();
        assert!(pair(&pairs, "date").is_none());
        assert_eq!(pair(&pairs, "startDate"), Some("2025-10-16"));
        assert!(pair(&pairs, "endDate").is_none());

        state.dates.end_date = Some(ymd(2025, 10, 20));
        let pairs = state.build().unwrap().to_query_pairs();
        assert_eq!(pair(&pairs, "endDate"), Some("2025-10-20"));
    }

    #[test]
    fn test_reversed_and_dangling_ranges() {
        let reversed = DateSelection::range(ymd(2025, 10, 20), Some(ymd(2025, 10, 16)));
        assert_eq!(
            reversed.resolve(),
            Some(DateQuery::Range {
                start: ymd(2025, 10, 16),
                end: Some(ymd(2025, 10, 20))
            })
        );

        let dangling = DateSelection {
            has_date_filter: true,
            end_date: Some(ymd(2025, 10, 20)),
            ..DateSelection::default()
        };
        assert_eq!(dangling.resolve(), None);
    }

    #[test]
    fn test_date_query_contains() {
        let single_day = DateQuery::Range { start: ymd(2025, 10, 16), end: None };
        assert!(single_day.contains(ymd(2025, 10, 16)));
        assert!(!single_day.contains(ymd(2025, 10, 17)));

        let week = DateQuery::Range { start: ymd(2025, 10, 16), end: Some(ymd(2025, 10, 22)) };
        assert!(week.contains(ymd(2025, 10, 22)));
        assert!(!week.contains(ymd(2025, 10, 15)));
    }

    #[test]
    fn test_polygon_query_body() {
        let bounds = MapBounds::new(Coordinate::new(6.0, 0.5), Coordinate::new(5.0, -0.5)).unwrap();
        let filters = SearchFilters {
            title: Some("screening".into()),
            region: None,
            dates: DateSelection::range(ymd(2025, 10, 16), Some(ymd(2025, 10, 18))).resolve(),
        };
        let body = serde_json::to_value(PolygonQuery::new(Polygon::from_bounds(&bounds), &filters, 1, 50))
            .unwrap();

        assert_eq!(body["coordinates"][0], serde_json::json!([-0.5, 5.0]));
        assert_eq!(body["coordinates"][4], body["coordinates"][0]);
        assert_eq!(body["title"], "screening");
        assert_eq!(body["startDate"], "2025-10-16");
        assert_eq!(body["endDate"], "2025-10-18");
        assert!(body.get("region").is_none());
        assert!(body.get("date").is_none());
        assert_eq!(body["limit"], 50);
    }

    #[test]
    fn test_date_filter_uses_local_calendar_day() {
        use crate::model::{EventLocation, EventStatus};
        use chrono::{FixedOffset, Utc};

        // 23:30 UTC on the 16th is already the 17th at UTC+2
        let event = Event {
            id: "late".into(),
            title: "Late Screening".into(),
            description: None,
            category: None,
            date: Utc.with_ymd_and_hms(2025, 10, 16, 23, 30, 0).unwrap(),
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
        };
        let on_17th = SearchFilters {
            dates: Some(DateQuery::Single(ymd(2025, 10, 17))),
            ..SearchFilters::default()
        };
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();

        assert!(on_17th.matches_in(&event, &plus_two));
        assert!(!on_17th.matches_in(&event, &Utc));
        assert_eq!(on_17th.matches(&event), on_17th.matches_in(&event, &Local));
    }
}
