//! Core utilities for the HealthWatch client
//!
//! This crate provides shared functionality used by every other crate in the
//! workspace:
//!
//! - **Error handling**: Errors with codes, context, and recovery suggestions
//! - **Configuration**: TOML-based configuration with defaults
//! - **Storage**: Durable key-value storage for the persisted client state
//! - **Validation**: Field-level checks and server validation error mapping
//! - **Resilience**: Circuit breaker for HTTP calls
//!
//! # Example
//!
//! ```rust,no_run
//! use healthwatch_core::{config::Config, storage::{Storage, keys}};
//!
//! let config = Config::load(None).expect("config");
//! let storage = Storage::open(config.schema.storage.resolved_dir()).expect("storage");
//!
//! let token: Option<String> = storage.get(keys::AUTH_TOKEN).expect("read");
//! println!("logged in: {}", token.is_some());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod circuit;
pub mod config;
pub mod error;
pub mod storage;
pub mod validation;

pub use error::{Error, ErrorCode, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::circuit::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
    pub use crate::config::{Config, ConfigSchema};
    pub use crate::error::{exit_codes, Error, ErrorCode, Result, ResultExt};
    pub use crate::storage::{keys, Storage};
    pub use crate::validation::{FieldErrors, ValidationError, ValidationResult, Validator};
}
