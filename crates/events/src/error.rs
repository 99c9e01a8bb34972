//! Error types for event normalization.

use thiserror::Error;

/// Result type alias for event operations.
pub type Result<T> = std::result::Result<T, EventError>;

/// Reasons a wire record cannot become a client [`Event`](crate::Event).
#[derive(Debug, Error)]
pub enum EventError {
    /// Neither `_id` nor `id` was present
    #[error("Event record has no `_id` or `id`")]
    MissingId,

    /// A required field was absent or empty
    #[error("Event {id}: missing field `{field}`")]
    MissingField {
        /// Event identifier
        id: String,
        /// Field name on the wire
        field: &'static str,
    },

    /// The date string matched none of the accepted formats
    #[error("Event {id}: unparseable date `{value}`")]
    InvalidDate {
        /// Event identifier
        id: String,
        /// Raw date string
        value: String,
    },

    /// Coordinates missing, malformed or out of range
    #[error("Event {id}: invalid coordinates")]
    InvalidCoordinates {
        /// Event identifier
        id: String,
    },

    /// The record was not an event object at all
    #[error("Malformed event record: {0}")]
    Malformed(#[from] serde_json::Error),
}
