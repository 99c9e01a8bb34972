//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    #[serde(default)]
    pub api: ApiSection,

    #[serde(default)]
    pub search: SearchSection,

    #[serde(default)]
    pub storage: StorageSection,

    #[serde(default)]
    pub logging: LoggingSection,
}

/// REST API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSection {
    /// Base URL of the REST API (overrides the environment default when set)
    #[serde(default)]
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

/// Event search defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSection {
    /// Radius label used when none is given (`25km`, `50km`, `100km`)
    #[serde(default = "default_radius")]
    pub default_radius: String,

    /// Events requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Quiet period before a map viewport search fires
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            default_radius: default_radius(),
            page_size: default_page_size(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_radius() -> String {
    "25km".to_string()
}

fn default_page_size() -> u32 {
    20
}

fn default_debounce_ms() -> u64 {
    750
}

/// Durable storage location
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageSection {
    /// Directory for persisted client state (platform data dir when unset)
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl StorageSection {
    /// Directory to use, falling back to the platform data directory
    #[must_use]
    pub fn resolved_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from(".healthwatch"))
                .join("healthwatch")
        })
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSection {
    /// Default log level when `RUST_LOG` is not set
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "warn".to_string()
}
