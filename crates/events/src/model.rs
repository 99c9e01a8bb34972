//! Event shapes: the normalized client model and the lenient wire model.

use chrono::{DateTime, Utc};
use healthwatch_geo::Coordinate;
use serde::{Deserialize, Serialize};

/// Lifecycle status of an event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    /// Upcoming or running
    #[default]
    Active,
    /// Already took place
    Completed,
    /// Called off by the organizer
    Cancelled,
}

impl EventStatus {
    /// Parse a wire status; unknown values are treated as active
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "completed" | "complete" | "done" => Self::Completed,
            "cancelled" | "canceled" => Self::Cancelled,
            _ => Self::Active,
        }
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

/// Event organizer contact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organizer {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Where an event takes place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventLocation {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Always `{lat, lng}` on the client
    pub coordinates: Coordinate,
}

/// A health-awareness event as the client works with it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub date: DateTime<Utc>,
    pub location: EventLocation,
    /// Distance from the search origin; `None` means unknown, not zero
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizer: Option<Organizer>,
    #[serde(default)]
    pub status: EventStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_participants: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered_participants: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Event {
    /// Seats left, when the event has a participant cap
    pub fn spots_left(&self) -> Option<u32> {
        self.max_participants
            .map(|max| max.saturating_sub(self.registered_participants.unwrap_or(0)))
    }

    /// Whether the participant cap has been reached
    pub fn is_full(&self) -> bool {
        self.spots_left() == Some(0)
    }
}

/// Location as it arrives on the wire
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawLocation {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    /// `[lng, lat]`, `{lat, lng}`, a GeoJSON Point or WKT
    #[serde(default)]
    pub coordinates: serde_json::Value,
}

/// Event record as it arrives on the wire
///
/// Every field is optional here; [`transform_event`](crate::transform_event)
/// decides what is required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    #[serde(rename = "_id", default)]
    pub object_id: Option<serde_json::Value>,
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub location: Option<RawLocation>,
    /// Distance in meters, as computed by the server's geo query
    #[serde(default)]
    pub distance: Option<f64>,
    /// Distance in kilometers, present on already-normalized records
    #[serde(default)]
    pub distance_km: Option<f64>,
    #[serde(default)]
    pub organizer: Option<Organizer>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub max_participants: Option<u32>,
    #[serde(default)]
    pub registered_participants: Option<u32>,
    #[serde(default)]
    pub image_url: Option<String>,
}
