//! Event review endpoints

use super::{decode_list, decode_one, path_segment, require_auth};
use crate::client::HealthWatchClient;
use crate::error::{ApiError, ApiResult};
use chrono::{DateTime, Utc};
use healthwatch_core::validation::{ValidationResult, Validator};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reviews API interface
#[derive(Debug, Clone)]
pub struct ReviewsApi {
    client: HealthWatchClient,
}

impl ReviewsApi {
    /// Create a new reviews API interface
    pub(crate) fn new(client: HealthWatchClient) -> Self {
        Self { client }
    }

    /// Reviews left on an event
    ///
    /// `GET /events/:id/reviews`
    pub async fn list(&self, event_id: &str) -> ApiResult<Vec<Review>> {
        let path = format!("events/{}/reviews", path_segment(event_id)?);
        let data: Value = self.client.get(&path).await?;
        decode_list(data, "reviews")
    }

    /// Review an attended event
    ///
    /// `POST /events/:id/reviews`
    pub async fn add(&self, event_id: &str, review: &NewReview) -> ApiResult<Review> {
        let result = review.validate();
        if !result.is_valid() {
            return Err(ApiError::from_validation(&result));
        }
        require_auth(&self.client)?;

        let path = format!("events/{}/reviews", path_segment(event_id)?);
        let data: Value = self.client.post(&path, review).await?;
        decode_one(data, "review")
    }
}

/// A review as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A review to submit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReview {
    /// 1 to 5 stars
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl NewReview {
    /// Client-side checks before submitting
    #[must_use]
    pub fn validate(&self) -> ValidationResult {
        Validator::new()
            .range("rating", self.rating, 1, 5)
            .max_length("comment", self.comment.as_deref().unwrap_or_default(), 1000)
            .validate()
    }
}

/// Mean star rating, `None` without reviews
#[must_use]
pub fn average_rating(reviews: &[Review]) -> Option<f64> {
    if reviews.is_empty() {
        return None;
    }
    let total: u32 = reviews.iter().map(|r| u32::from(r.rating)).sum();
    let count = u32::try_from(reviews.len()).unwrap_or(u32::MAX);
    Some(f64::from(total) / f64::from(count))
}
