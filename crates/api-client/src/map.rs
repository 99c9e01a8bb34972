//! Debounced "events in the visible map area" search.

use crate::search::{EventFinder, SearchOutcome};
use healthwatch_events::{Debouncer, SearchFilters};
use healthwatch_geo::MapBounds;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

/// Shortest quiet period before a viewport search fires
pub const MIN_DEBOUNCE: Duration = Duration::from_millis(500);
/// Longest quiet period before a viewport search fires
pub const MAX_DEBOUNCE: Duration = Duration::from_millis(1000);
/// Quiet period unless configured otherwise
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(750);

/// Result for one settled viewport
#[derive(Debug, Clone)]
pub struct MapUpdate {
    pub bounds: MapBounds,
    pub outcome: SearchOutcome,
}

/// Turns a stream of viewport changes into one search per quiet period.
///
/// A new change cancels both the pending timer and a search still running
/// for the previous viewport, so at most one search is in flight and only
/// the settled viewport produces a [`MapUpdate`].
#[derive(Debug)]
pub struct MapSearch {
    finder: EventFinder,
    filters: SearchFilters,
    debouncer: Debouncer,
    updates: mpsc::Sender<MapUpdate>,
}

impl MapSearch {
    /// `delay` is clamped to 500..=1000 ms. Updates arrive on the returned receiver.
    #[must_use]
    pub fn new(finder: EventFinder, delay: Duration) -> (Self, mpsc::Receiver<MapUpdate>) {
        let (updates, receiver) = mpsc::channel(8);
        let search = Self {
            finder,
            filters: SearchFilters::default(),
            debouncer: Debouncer::new(delay.clamp(MIN_DEBOUNCE, MAX_DEBOUNCE)),
            updates,
        };
        (search, receiver)
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.debouncer.delay()
    }

    /// Filters applied to the following searches
    pub fn set_filters(&mut self, filters: SearchFilters) {
        self.filters = filters;
    }

    /// Record a viewport change; the search runs once changes stop.
    pub fn viewport_changed(&mut self, bounds: MapBounds) {
        let finder = self.finder.clone();
        let filters = self.filters.clone();
        let updates = self.updates.clone();

        self.debouncer.trigger(async move {
            debug!(center = ?bounds.center(), "Viewport settled, searching");
            let outcome = finder.search_within(&bounds, &filters).await;
            // Receiver gone means nobody is looking at the map anymore
            let _ = updates.send(MapUpdate { bounds, outcome }).await;
        });
    }

    /// Drop the pending search, if any
    pub fn cancel(&mut self) -> bool {
        self.debouncer.cancel()
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{test_server, HealthWatchClient};
    use crate::config::ClientConfig;
    use crate::search::EventSource;
    use healthwatch_geo::Coordinate;
    use serde_json::json;

    fn body() -> String {
        json!({"success": true, "data": {"events": []}}).to_string()
    }

    fn bounds(step: u32) -> MapBounds {
        let shift = f64::from(step) * 0.01;
        MapBounds::new(
            Coordinate::new(5.7 + shift, -0.1 + shift),
            Coordinate::new(5.5 + shift, -0.3 + shift),
        )
        .unwrap()
    }

    #[test]
    fn test_delay_is_clamped() {
        let client = HealthWatchClient::with_config(ClientConfig::development()).unwrap();
        let finder = EventFinder::new(&client);

        let (fast, _) = MapSearch::new(finder.clone(), Duration::from_millis(10));
        assert_eq!(fast.delay(), MIN_DEBOUNCE);
        let (slow, _) = MapSearch::new(finder.clone(), Duration::from_secs(5));
        assert_eq!(slow.delay(), MAX_DEBOUNCE);
        let (default, _) = MapSearch::new(finder, DEFAULT_DEBOUNCE);
        assert_eq!(default.delay(), DEFAULT_DEBOUNCE);
    }

    #[tokio::test]
    async fn test_rapid_changes_search_once_with_last_viewport() {
        let (base, seen) = test_server::spawn(|_, _| (200, body())).await;
        let client = HealthWatchClient::with_config(ClientConfig::development().with_base_url(base)).unwrap();
        let (mut map, mut updates) = MapSearch::new(EventFinder::new(&client), MIN_DEBOUNCE);

        for step in 0..10 {
            map.viewport_changed(bounds(step));
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        let update = tokio::time::timeout(Duration::from_secs(5), updates.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(update.bounds, bounds(9));
        assert_eq!(update.outcome.source, EventSource::Live);

        tokio::time::sleep(Duration::from_millis(700)).await;
        assert!(updates.try_recv().is_err());

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let body: serde_json::Value = serde_json::from_str(&seen[0].body).unwrap();
        let sw = bounds(9).southwest;
        assert_eq!(body["coordinates"][0], json!([sw.lng, sw.lat]));
    }

    #[tokio::test]
    async fn test_cancel_suppresses_search() {
        let (base, seen) = test_server::spawn(|_, _| (200, body())).await;
        let client = HealthWatchClient::with_config(ClientConfig::development().with_base_url(base)).unwrap();
        let (mut map, mut updates) = MapSearch::new(EventFinder::new(&client), MIN_DEBOUNCE);

        map.viewport_changed(bounds(0));
        assert!(map.is_pending());
        assert!(map.cancel());

        tokio::time::sleep(Duration::from_millis(800)).await;
        assert!(updates.try_recv().is_err());
        assert!(seen.lock().unwrap().is_empty());
    }
}
