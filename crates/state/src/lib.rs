//! Client state for HealthWatch.
//!
//! A single [`Store`] owns everything the client remembers: the signed-in
//! user, the health profile, settings, the last location, the current search
//! and its results, and the saved events. It changes only through
//! [`Store::dispatch`], and the durable part is written through to
//! [`healthwatch_core::storage::Storage`] after every action that touches it.
//!
//! Event searches are sequenced: each search takes a [`RequestTicket`] from
//! [`Store::begin_request`], and a result carrying a ticket older than the
//! last applied one is dropped, so a slow response can never overwrite a
//! newer one.
//!
//! # Example
//!
//! ```
//! use healthwatch_api_client::EventSource;
//! use healthwatch_state::{Action, Store};
//!
//! let mut store = Store::in_memory();
//! let first = store.begin_request();
//! let second = store.begin_request();
//!
//! store.dispatch(Action::EventsLoaded { ticket: second, events: vec![], source: EventSource::Live }).unwrap();
//! let applied = store.dispatch(Action::EventsLoaded { ticket: first, events: vec![], source: EventSource::Fallback }).unwrap();
//!
//! assert!(!applied);
//! assert_eq!(store.state().source, Some(EventSource::Live));
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod action;
mod error;
mod persist;
mod sequence;
mod store;

pub use action::Action;
pub use error::{Result, StateError};
pub use persist::{PersistedState, SavedLocation, Settings};
pub use sequence::{RequestSequencer, RequestTicket};
pub use store::{AppState, Store};
