use healthwatch_api_client::endpoints::{HealthProfile, User};
use healthwatch_api_client::EventSource;
use healthwatch_events::{Event, SearchState};

use crate::persist::{SavedLocation, Settings};
use crate::sequence::RequestTicket;

/// Every way client state can change
#[derive(Debug, Clone)]
pub enum Action {
    /// Login or registration succeeded
    LoggedIn { token: String, user: User },
    LoggedOut,
    UserUpdated(User),
    HealthProfileUpdated(HealthProfile),
    /// Also moves the current search to this location
    LocationSet(SavedLocation),
    SettingsChanged(Settings),
    /// Replaces the current search criteria
    FiltersChanged(SearchState),
    /// Results of the search identified by `ticket`
    EventsLoaded {
        ticket: RequestTicket,
        events: Vec<Event>,
        source: EventSource,
    },
    SearchFailed { ticket: RequestTicket, message: String },
    EventSaved(String),
    EventUnsaved(String),
    ErrorDismissed,
}

impl Action {
    /// Short name for logs
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoggedIn { .. } => "logged_in",
            Self::LoggedOut => "logged_out",
            Self::UserUpdated(_) => "user_updated",
            Self::HealthProfileUpdated(_) => "health_profile_updated",
            Self::LocationSet(_) => "location_set",
            Self::SettingsChanged(_) => "settings_changed",
            Self::FiltersChanged(_) => "filters_changed",
            Self::EventsLoaded { .. } => "events_loaded",
            Self::SearchFailed { .. } => "search_failed",
            Self::EventSaved(_) => "event_saved",
            Self::EventUnsaved(_) => "event_unsaved",
            Self::ErrorDismissed => "error_dismissed",
        }
    }
}
