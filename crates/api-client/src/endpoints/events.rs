//! Event search and detail endpoints
//!
//! Records are normalized with the events crate's transformer on the way in,
//! so callers only ever see client-shaped [`Event`]s.

use super::{path_segment, unwrap_key};
use crate::client::HealthWatchClient;
use crate::error::ApiResult;
use healthwatch_events::{transform_events, transform_value, Event, PolygonQuery, SearchParams};
use serde_json::Value;
use tracing::debug;

/// Events API interface
#[derive(Debug, Clone)]
pub struct EventsApi {
    client: HealthWatchClient,
}

impl EventsApi {
    /// Create a new events API interface
    pub(crate) fn new(client: HealthWatchClient) -> Self {
        Self { client }
    }

    /// Radius search
    ///
    /// `GET /events?lat&lng&radius&title?&region?&date?|startDate?&endDate?&page?&limit?`
    pub async fn list(&self, params: &SearchParams) -> ApiResult<Vec<Event>> {
        let data: Value = self
            .client
            .get_with_query("events", &params.to_query_pairs())
            .await?;
        Ok(events_from(data))
    }

    /// Events inside the visible map area
    ///
    /// `POST /events/polygon`
    pub async fn within_polygon(&self, query: &PolygonQuery) -> ApiResult<Vec<Event>> {
        let data: Value = self.client.post("events/polygon", query).await?;
        Ok(events_from(data))
    }

    /// Single event detail
    ///
    /// `GET /events/:id`
    pub async fn get(&self, id: &str) -> ApiResult<Event> {
        let path = format!("events/{}", path_segment(id)?);
        let data: Value = self.client.get(&path).await?;
        Ok(transform_value(unwrap_key(data, "event"))?)
    }
}

/// `{events: [...]}` or a bare array, transformed and with bad records dropped
fn events_from(data: Value) -> Vec<Event> {
    let records = match unwrap_key(data, "events") {
        Value::Array(items) => items,
        _ => Vec::new(),
    };
    let received = records.len();
    let events = transform_events(records);
    debug!(received, kept = events.len(), "Decoded event list");
    events
}
