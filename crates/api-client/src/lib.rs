//! REST client for the HealthWatch API
//!
//! This crate provides a resilient HTTP client for the health-awareness REST
//! API and the event search flow built on top of it.
//!
//! # Features
//!
//! - **Environment-based configuration**: base URL, timeout and token from
//!   environment variables or the config file
//! - **Envelope decoding**: `{success, data, message, errors}` responses, with
//!   server validation errors mapped per field
//! - **Circuit breaker**: an unreachable backend fails fast
//! - **Fallbacks**: event searches degrade to a radius search, then to sample
//!   events, and never fail outright
//! - **Debounced map search**: one polygon search per settled viewport
//! - **Request correlation**: every request carries an `X-Request-ID`
//!
//! # Example
//!
//! ```rust,no_run
//! use healthwatch_api_client::{EventFinder, HealthWatchClient};
//! use healthwatch_events::SearchState;
//! use healthwatch_geo::Coordinate;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HealthWatchClient::new()?;
//!     let finder = EventFinder::new(&client);
//!
//!     let state = SearchState {
//!         coordinates: Some(Coordinate::new(5.6037, -0.1870)),
//!         radius: Some("50km".into()),
//!         ..SearchState::default()
//!     };
//!     let outcome = finder.search(state.build().as_ref(), &state.filters()).await;
//!     println!("{} events ({:?})", outcome.events.len(), outcome.source);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod endpoints;
mod envelope;
pub mod error;
pub mod map;
pub mod search;

pub use client::HealthWatchClient;
pub use config::{ClientConfig, Environment};
pub use envelope::Envelope;
pub use error::{ApiError, ApiResult, FieldIssue};
pub use map::{MapSearch, MapUpdate};
pub use search::{EventFinder, EventSource, SearchOutcome};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::client::HealthWatchClient;
    pub use crate::config::{ClientConfig, Environment};
    pub use crate::endpoints::{
        AppointmentsApi, AuthApi, EventsApi, NotificationsApi, ProfileApi, ReviewsApi, SymptomsApi,
    };
    pub use crate::error::{ApiError, ApiResult};
    pub use crate::map::{MapSearch, MapUpdate};
    pub use crate::search::{EventFinder, EventSource, SearchOutcome};
}
