//! Configuration loading and schema definitions
//!
//! Settings shared by the CLI and the client crates.

mod loader;
mod schema;

pub use loader::Config;
pub use schema::*;
