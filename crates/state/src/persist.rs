//! The durable slice of client state and how it maps onto storage keys.

use crate::error::{Result, StateError};
use healthwatch_api_client::endpoints::{HealthProfile, User};
use healthwatch_core::storage::{keys, Storage};
use healthwatch_events::RadiusFilter;
use healthwatch_geo::Coordinate;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::warn;

/// User preferences kept between runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Radius label applied to new searches, e.g. `"50km"`
    pub default_radius: String,
    pub notifications_enabled: bool,
    pub page_size: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_radius: RadiusFilter::default().label().to_string(),
            notifications_enabled: true,
            page_size: 20,
        }
    }
}

impl Settings {
    #[must_use]
    pub fn radius(&self) -> RadiusFilter {
        RadiusFilter::from_label(Some(&self.default_radius))
    }

    /// Reject labels the radius selector does not offer and empty pages
    pub fn validate(&self) -> Result<()> {
        let known = RadiusFilter::ALL
            .iter()
            .any(|r| r.label().eq_ignore_ascii_case(self.default_radius.trim()));
        if !known {
            return Err(StateError::Settings(format!(
                "unknown radius '{}'",
                self.default_radius
            )));
        }
        if self.page_size == 0 {
            return Err(StateError::Settings("page size must be at least 1".into()));
        }
        Ok(())
    }
}

/// Last location the user searched from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedLocation {
    pub coordinates: Coordinate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Everything written under [`keys::APP_STATE`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedState {
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub health_profile: Option<HealthProfile>,
    pub settings: Settings,
    pub location: Option<SavedLocation>,
}

/// Values read back from storage on startup
#[derive(Debug, Default)]
pub(crate) struct Snapshot {
    pub persisted: PersistedState,
    pub token: Option<String>,
    pub saved_events: BTreeSet<String>,
}

impl Snapshot {
    /// Unreadable values are logged and replaced by defaults.
    pub fn load(storage: &Storage) -> Self {
        let persisted: PersistedState = read_or_default(storage, keys::APP_STATE);
        let token: Option<String> = read_or_default(storage, keys::AUTH_TOKEN);
        let user_id: Option<String> = read_or_default(storage, keys::USER_ID);
        let saved_events = read_or_default(storage, keys::SAVED_EVENTS);

        let mut snapshot = Self {
            persisted,
            token,
            saved_events,
        };

        // A session needs both the flag and a token
        if snapshot.token.is_none() {
            snapshot.persisted.is_authenticated = false;
        }
        if let (Some(user), Some(user_id)) = (&snapshot.persisted.user, &user_id) {
            if &user.id != user_id {
                warn!(stored = %user_id, "Stored user id does not match saved user, signing out");
                snapshot.persisted.is_authenticated = false;
                snapshot.token = None;
            }
        }
        snapshot
    }
}

fn read_or_default<T: DeserializeOwned + Default>(storage: &Storage, key: &str) -> T {
    match storage.get::<T>(key) {
        Ok(Some(value)) => value,
        Ok(None) => T::default(),
        Err(e) => {
            warn!(key, error = %e, "Ignoring unreadable stored value");
            T::default()
        }
    }
}

/// Write or remove an optional value
pub(crate) fn write_optional<T: Serialize>(storage: &Storage, key: &str, value: Option<&T>) -> Result<()> {
    match value {
        Some(value) => storage.set(key, value)?,
        None => {
            storage.remove(key)?;
        }
    }
    Ok(())
}
