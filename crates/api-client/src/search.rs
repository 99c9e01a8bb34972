//! Event search with graceful degradation.
//!
//! Every search returns events. When the API cannot answer, the polygon search
//! falls back to a radius search around the viewport, and the radius search
//! falls back to the built-in sample events filtered locally.

use crate::client::HealthWatchClient;
use crate::endpoints::EventsApi;
use crate::error::ApiError;
use chrono::Utc;
use healthwatch_events::{
    annotate_distances, sample_events, Event, PolygonQuery, RadiusFilter, SearchFilters,
    SearchParams,
};
use healthwatch_geo::{Coordinate, MapBounds, Polygon};
use serde::Serialize;
use tracing::{debug, warn};

/// Page size used when none is configured
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Where a result list came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSource {
    /// Returned by the API
    Live,
    /// Built-in sample events
    Fallback,
}

/// Events plus their provenance
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub events: Vec<Event>,
    pub source: EventSource,
    /// Why live data is missing, for an inline notice
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

impl SearchOutcome {
    fn live(events: Vec<Event>) -> Self {
        Self {
            events,
            source: EventSource::Live,
            notice: None,
        }
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.source == EventSource::Fallback
    }
}

/// Radius and polygon searches with fallbacks
#[derive(Debug, Clone)]
pub struct EventFinder {
    api: EventsApi,
    page_size: u32,
}

impl EventFinder {
    #[must_use]
    pub fn new(client: &HealthWatchClient) -> Self {
        Self {
            api: client.events(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Radius search; `None` means no location is known yet.
    ///
    /// `filters` narrows the sample events shown without a location. With
    /// params present, their own filters apply.
    pub async fn search(&self, params: Option<&SearchParams>, filters: &SearchFilters) -> SearchOutcome {
        let Some(params) = params else {
            debug!("No location yet, showing sample events");
            return fallback(filters, None, "Location not set".to_string());
        };

        match self.api.list(params).await {
            Ok(mut events) => {
                annotate_distances(&mut events, &params.coordinates);
                debug!(count = events.len(), "Radius search returned events");
                SearchOutcome::live(events)
            }
            Err(e) => {
                warn!(error = %e, "Radius search failed, showing sample events");
                fallback(&params.filters, Some(&params.coordinates), notice_for(&e))
            }
        }
    }

    /// Events inside the viewport.
    ///
    /// A failed polygon search is retried once as a radius search centred on
    /// the viewport, wide enough to cover its corners where the allowed radii
    /// permit.
    pub async fn search_within(&self, bounds: &MapBounds, filters: &SearchFilters) -> SearchOutcome {
        let center = bounds.center();
        let query = PolygonQuery::new(Polygon::from_bounds(bounds), filters, 1, self.page_size);

        match self.api.within_polygon(&query).await {
            Ok(mut events) => {
                annotate_distances(&mut events, &center);
                debug!(count = events.len(), "Polygon search returned events");
                SearchOutcome::live(events)
            }
            Err(e) => {
                let radius = RadiusFilter::snap_up(bounds.half_diagonal_km());
                warn!(
                    error = %e,
                    radius = radius.label(),
                    "Polygon search failed, falling back to radius search"
                );
                let mut params = SearchParams::new(center, radius).with_filters(filters.clone());
                params.limit = Some(self.page_size);
                self.search(Some(&params), filters).await
            }
        }
    }
}

fn notice_for(error: &ApiError) -> String {
    match error {
        ApiError::CircuitOpen => "Service unavailable, showing sample events".to_string(),
        e if e.is_unauthorized() => "Session expired, showing sample events".to_string(),
        _ => "Could not reach the server, showing sample events".to_string(),
    }
}

fn fallback(filters: &SearchFilters, origin: Option<&Coordinate>, notice: String) -> SearchOutcome {
    let mut events: Vec<Event> = sample_events(Utc::now())
        .into_iter()
        .filter(|e| filters.matches(e))
        .collect();
    if let Some(origin) = origin {
        annotate_distances(&mut events, origin);
    }
    SearchOutcome {
        events,
        source: EventSource::Fallback,
        notice: Some(notice),
    }
}
