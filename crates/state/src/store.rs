//! The state container.

use crate::action::Action;
use crate::error::Result;
use crate::persist::{write_optional, PersistedState, SavedLocation, Settings, Snapshot};
use crate::sequence::{RequestSequencer, RequestTicket};
use healthwatch_api_client::endpoints::{HealthProfile, User};
use healthwatch_api_client::EventSource;
use healthwatch_core::storage::{keys, Storage};
use healthwatch_events::{Event, SearchState};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, info};

/// Everything the client currently knows
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub health_profile: Option<HealthProfile>,
    pub settings: Settings,
    pub location: Option<SavedLocation>,
    /// Criteria for the next event search
    pub search: SearchState,
    pub events: Vec<Event>,
    /// Provenance of `events`; `None` before the first search
    pub source: Option<EventSource>,
    pub saved_events: BTreeSet<String>,
    pub last_error: Option<String>,
    /// A search is in flight
    pub loading: bool,
}

impl AppState {
    fn from_persisted(persisted: PersistedState, saved_events: BTreeSet<String>) -> Self {
        let search = SearchState {
            coordinates: persisted.location.as_ref().map(|l| l.coordinates),
            radius: Some(persisted.settings.default_radius.clone()),
            limit: Some(persisted.settings.page_size),
            ..SearchState::default()
        };
        Self {
            user: persisted.user,
            is_authenticated: persisted.is_authenticated,
            health_profile: persisted.health_profile,
            settings: persisted.settings,
            location: persisted.location,
            search,
            saved_events,
            ..Self::default()
        }
    }

    /// The durable slice
    #[must_use]
    pub fn persisted(&self) -> PersistedState {
        PersistedState {
            user: self.user.clone(),
            is_authenticated: self.is_authenticated,
            health_profile: self.health_profile.clone(),
            settings: self.settings.clone(),
            location: self.location.clone(),
        }
    }

    #[must_use]
    pub fn is_saved(&self, event_id: &str) -> bool {
        self.saved_events.contains(event_id)
    }

    /// Loaded events the user saved
    pub fn saved(&self) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(|e| self.is_saved(&e.id))
    }
}

/// Which storage keys an action touched
#[derive(Debug, Default, Clone, Copy)]
struct Touched {
    app_state: bool,
    session: bool,
    saved_events: bool,
}

impl Touched {
    const NONE: Self = Self {
        app_state: false,
        session: false,
        saved_events: false,
    };
    const APP_STATE: Self = Self {
        app_state: true,
        ..Self::NONE
    };
    const SESSION: Self = Self {
        app_state: true,
        session: true,
        saved_events: false,
    };
    const SAVED_EVENTS: Self = Self {
        saved_events: true,
        ..Self::NONE
    };
}

/// Single owner of client state.
///
/// Construct one per process and pass it to whatever needs it. All changes go
/// through [`Store::dispatch`].
pub struct Store {
    state: AppState,
    token: Option<String>,
    sequencer: RequestSequencer,
    storage: Option<Storage>,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .field("has_token", &self.token.is_some())
            .field("sequencer", &self.sequencer)
            .field("storage", &self.storage.as_ref().map(Storage::dir))
            .finish()
    }
}

impl Store {
    /// Rehydrate from storage; unreadable values fall back to defaults.
    #[must_use]
    pub fn open(storage: Storage) -> Self {
        let snapshot = Snapshot::load(&storage);
        debug!(
            dir = %storage.dir().display(),
            authenticated = snapshot.persisted.is_authenticated,
            saved = snapshot.saved_events.len(),
            "Restored client state"
        );
        Self {
            state: AppState::from_persisted(snapshot.persisted, snapshot.saved_events),
            token: snapshot.token,
            sequencer: RequestSequencer::new(),
            storage: Some(storage),
        }
    }

    /// A store that forgets everything on exit
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            state: AppState::from_persisted(PersistedState::default(), BTreeSet::new()),
            token: None,
            sequencer: RequestSequencer::new(),
            storage: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Bearer token of the current session
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    #[must_use]
    pub fn is_persistent(&self) -> bool {
        self.storage.is_some()
    }

    /// Start an event search. Pass the ticket back with its result.
    pub fn begin_request(&mut self) -> RequestTicket {
        let ticket = self.sequencer.issue();
        self.state.loading = true;
        debug!(ticket = ticket.value(), "Search started");
        ticket
    }

    /// Apply an action and write through what it changed.
    ///
    /// Returns `Ok(false)` when a search result was discarded because a newer
    /// one was already applied. Invalid locations and settings are rejected
    /// without changing anything. A storage failure leaves the in-memory
    /// state updated.
    pub fn dispatch(&mut self, action: Action) -> Result<bool> {
        let name = action.name();
        let Some(touched) = self.apply(action)? else {
            debug!(action = name, "Discarded stale search result");
            return Ok(false);
        };
        self.persist(touched)?;
        debug!(action = name, "Applied");
        Ok(true)
    }

    fn apply(&mut self, action: Action) -> Result<Option<Touched>> {
        let state = &mut self.state;
        let touched = match action {
            Action::LoggedIn { token, user } => {
                info!(user = %user.id, "Signed in");
                state.user = Some(user);
                state.is_authenticated = true;
                self.token = Some(token);
                Touched::SESSION
            }
            Action::LoggedOut => {
                info!("Signed out");
                state.user = None;
                state.is_authenticated = false;
                state.health_profile = None;
                self.token = None;
                Touched::SESSION
            }
            Action::UserUpdated(user) => {
                state.user = Some(user);
                Touched::SESSION
            }
            Action::HealthProfileUpdated(profile) => {
                state.health_profile = Some(profile);
                Touched::APP_STATE
            }
            Action::LocationSet(location) => {
                let coordinates = location.coordinates.validated()?;
                state.search.coordinates = Some(coordinates);
                state.location = Some(location);
                Touched::APP_STATE
            }
            Action::SettingsChanged(settings) => {
                settings.validate()?;
                state.search.radius = Some(settings.default_radius.clone());
                state.search.limit = Some(settings.page_size);
                state.settings = settings;
                Touched::APP_STATE
            }
            Action::FiltersChanged(mut search) => {
                if search.coordinates.is_none() {
                    search.coordinates = state.location.as_ref().map(|l| l.coordinates);
                }
                state.search = search;
                Touched::NONE
            }
            Action::EventsLoaded {
                ticket,
                events,
                source,
            } => {
                if !self.sequencer.accept(ticket) {
                    return Ok(None);
                }
                state.events = events;
                state.source = Some(source);
                state.last_error = None;
                if self.sequencer.is_latest(ticket) {
                    state.loading = false;
                }
                Touched::NONE
            }
            Action::SearchFailed { ticket, message } => {
                if !self.sequencer.accept(ticket) {
                    return Ok(None);
                }
                state.last_error = Some(message);
                if self.sequencer.is_latest(ticket) {
                    state.loading = false;
                }
                Touched::NONE
            }
            Action::EventSaved(id) => {
                state.saved_events.insert(id);
                Touched::SAVED_EVENTS
            }
            Action::EventUnsaved(id) => {
                state.saved_events.remove(&id);
                Touched::SAVED_EVENTS
            }
            Action::ErrorDismissed => {
                state.last_error = None;
                Touched::NONE
            }
        };
        Ok(Some(touched))
    }

    fn persist(&self, touched: Touched) -> Result<()> {
        let Some(storage) = &self.storage else {
            return Ok(());
        };

        if touched.app_state {
            storage.set(keys::APP_STATE, &self.state.persisted())?;
        }
        if touched.session {
            write_optional(storage, keys::AUTH_TOKEN, self.token.as_ref())?;
            let user_id = self.state.user.as_ref().map(|u| &u.id);
            write_optional(storage, keys::USER_ID, user_id)?;
        }
        if touched.saved_events {
            storage.set(keys::SAVED_EVENTS, &self.state.saved_events)?;
        }
        Ok(())
    }
}
