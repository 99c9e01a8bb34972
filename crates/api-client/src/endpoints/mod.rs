//! Endpoint-specific API implementations
//!
//! Each module provides a typed interface for one resource of the REST API.
//!
//! | Module | Paths |
//! |--------|-------|
//! | `events` | `GET /events`, `POST /events/polygon`, `GET /events/:id` |
//! | `auth` | `POST /auth/login`, `POST /auth/register`, `GET /auth/me` |
//! | `profile` | `GET /profile/health`, `PUT /profile/health` |
//! | `symptoms` | `GET /symptoms`, `POST /symptoms` |
//! | `appointments` | `GET /appointments`, `POST /appointments`, `PATCH /appointments/:id/cancel` |
//! | `notifications` | `GET /notifications`, `PATCH /notifications/:id/read` |
//! | `reviews` | `GET /events/:id/reviews`, `POST /events/:id/reviews` |

pub mod appointments;
pub mod auth;
pub mod events;
pub mod notifications;
pub mod profile;
pub mod reviews;
pub mod symptoms;

pub use appointments::{Appointment, AppointmentStatus, AppointmentsApi, BookAppointment};
pub use auth::{AuthApi, AuthSession, LoginRequest, RegisterRequest, User};
pub use events::EventsApi;
pub use notifications::{unread_count, Notification, NotificationsApi};
pub use profile::{EmergencyContact, HealthProfile, ProfileApi};
pub use reviews::{average_rating, NewReview, Review, ReviewsApi};
pub use symptoms::{NewSymptomEntry, Severity, SymptomEntry, SymptomsApi};

use crate::client::HealthWatchClient;
use crate::error::{ApiError, ApiResult};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Take `data[key]` when the payload wraps the record, else the payload itself
fn unwrap_key(mut data: Value, key: &str) -> Value {
    match data.get_mut(key) {
        Some(inner) => inner.take(),
        None => data,
    }
}

/// Move the database key `_id` into `id`, which it takes precedence over
fn normalize_id(value: &mut Value) {
    if let Some(obj) = value.as_object_mut() {
        if let Some(object_id) = obj.remove("_id") {
            obj.insert("id".to_string(), object_id);
        }
    }
}

/// Decode one record, optionally wrapped under `key`
pub(crate) fn decode_one<T: DeserializeOwned>(data: Value, key: &str) -> ApiResult<T> {
    let mut record = unwrap_key(data, key);
    normalize_id(&mut record);
    serde_json::from_value(record).map_err(ApiError::Json)
}

/// Decode a list, optionally wrapped under `key`
pub(crate) fn decode_list<T: DeserializeOwned>(data: Value, key: &str) -> ApiResult<Vec<T>> {
    let mut list = unwrap_key(data, key);
    if let Some(items) = list.as_array_mut() {
        items.iter_mut().for_each(normalize_id);
    }
    serde_json::from_value(list).map_err(ApiError::Json)
}

/// Reject identifiers that would change the request path
pub(crate) fn path_segment(id: &str) -> ApiResult<&str> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(id)
    } else {
        Err(ApiError::InvalidId(id.to_string()))
    }
}

/// Fail early for endpoints that need a logged-in user
pub(crate) fn require_auth(client: &HealthWatchClient) -> ApiResult<()> {
    if client.is_authenticated() {
        Ok(())
    } else {
        Err(ApiError::NotAuthenticated)
    }
}
