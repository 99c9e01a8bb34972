//! Notification endpoints

use super::{decode_list, decode_one, path_segment, require_auth};
use crate::client::HealthWatchClient;
use crate::error::ApiResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Notifications API interface
#[derive(Debug, Clone)]
pub struct NotificationsApi {
    client: HealthWatchClient,
}

impl NotificationsApi {
    /// Create a new notifications API interface
    pub(crate) fn new(client: HealthWatchClient) -> Self {
        Self { client }
    }

    /// The user's notifications, newest first
    ///
    /// `GET /notifications`
    pub async fn list(&self) -> ApiResult<Vec<Notification>> {
        require_auth(&self.client)?;
        let data: Value = self.client.get("notifications").await?;
        let mut notifications: Vec<Notification> = decode_list(data, "notifications")?;
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notifications)
    }

    /// Mark one notification as read
    ///
    /// `PATCH /notifications/:id/read`
    pub async fn mark_read(&self, id: &str) -> ApiResult<Notification> {
        require_auth(&self.client)?;
        let path = format!("notifications/{}/read", path_segment(id)?);
        let data: Value = self.client.patch(&path).await?;
        decode_one(data, "notification")
    }
}

/// A message for the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub message: String,
    /// `event_reminder`, `appointment`, `system`, ...
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, alias = "isRead")]
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Number of unread notifications
#[must_use]
pub fn unread_count(notifications: &[Notification]) -> usize {
    notifications.iter().filter(|n| !n.read).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_shape() {
        let list: Vec<Notification> = decode_list(
            json!({"notifications": [
                {"_id": "n1", "title": "Reminder", "message": "Screening tomorrow", "type": "event_reminder", "isRead": false, "createdAt": "2025-10-15T10:00:00Z"},
                {"_id": "n2", "title": "Booked", "read": true, "createdAt": "2025-10-14T10:00:00Z"}
            ]}),
            "notifications",
        )
        .unwrap();

        assert_eq!(list[0].kind.as_deref(), Some("event_reminder"));
        assert_eq!(list[1].message, "");
        assert_eq!(unread_count(&list), 1);
    }
}
