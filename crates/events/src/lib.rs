//! Health-awareness events: model, normalization, grouping and search filters.
//!
//! This crate provides:
//! - The client-side [`Event`] shape and the lenient [`RawEvent`] wire shape
//! - A pure transformer between the two
//! - Date bucketing (Today / Tomorrow / This Week / month) for sectioned display
//! - The search filter builder that turns UI state into query parameters
//! - An owned, cancellable [`Debouncer`] for map viewport searches
//! - A small sample dataset used when the API is unreachable
//!
//! # Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use healthwatch_events::{group_by_date, transform_value, DateGroupKey};
//! use serde_json::json;
//!
//! let now = Utc.with_ymd_and_hms(2025, 10, 16, 9, 0, 0).unwrap();
//! let event = transform_value(json!({
//!     "_id": "a1",
//!     "title": "X",
//!     "date": "2025-10-16T14:00:00Z",
//!     "location": {"coordinates": [-0.18, 5.60], "address": "Accra"}
//! }))
//! .unwrap();
//!
//! assert_eq!(event.location.coordinates.lat, 5.60);
//! let groups = group_by_date(vec![event], &now);
//! assert_eq!(groups[0].key, DateGroupKey::Today);
//! ```

mod debounce;
mod error;
mod filter;
mod grouping;
mod model;
mod sample;
mod transform;

pub use debounce::Debouncer;
pub use error::{EventError, Result};
pub use filter::{
    build_search_params, DateQuery, DateSelection, PolygonQuery, RadiusFilter, SearchFilters,
    SearchParams, SearchState, DEFAULT_RADIUS_METERS,
};
pub use grouping::{group_by_date, group_by_date_local, DateGroupKey, EventGroup};
pub use model::{Event, EventLocation, EventStatus, Organizer, RawEvent, RawLocation};
pub use sample::sample_events;
pub use transform::{
    annotate_distances, parse_event_date, sort_by_distance, transform_event, transform_events,
    transform_value,
};
