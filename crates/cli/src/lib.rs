//! Terminal helpers for the HealthWatch CLI
//!
//! - Status messages and inline notices
//! - Date-grouped event listings
//! - Spinners for requests in flight

#![warn(missing_docs)]

pub mod output;
pub mod progress;
