//! Configuration for the HealthWatch API client
//!
//! Values come from three layers, later ones winning: the environment preset,
//! the `[api]` section of the config file, then environment variables.

use crate::error::{ApiError, ApiResult};
use healthwatch_core::config::ApiSection;
use healthwatch_core::circuit::CircuitBreakerConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Production API
const PRODUCTION_URL: &str = "https://api.healthwatch.app/api";

/// Staging API
const STAGING_URL: &str = "https://staging-api.healthwatch.app/api";

/// Local development server
const DEVELOPMENT_URL: &str = "http://localhost:5000/api";

/// Request timeout unless configured otherwise
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Environment types
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development server
    Development,
    /// Staging environment
    Staging,
    /// Production environment
    #[default]
    Production,
}

impl Environment {
    /// Parse an environment name; unknown names mean production
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "development" | "dev" | "local" => Self::Development,
            "staging" | "stage" => Self::Staging,
            _ => Self::Production,
        }
    }

    /// Read `HEALTHWATCH_ENV`
    #[must_use]
    pub fn from_env() -> Self {
        Self::parse(&env::var("HEALTHWATCH_ENV").unwrap_or_default())
    }

    fn default_url(self) -> &'static str {
        match self {
            Self::Development => DEVELOPMENT_URL,
            Self::Staging => STAGING_URL,
            Self::Production => PRODUCTION_URL,
        }
    }
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST API, e.g. `https://api.healthwatch.app/api`
    pub base_url: String,
    /// Bearer token to start with (a login replaces it at runtime)
    pub api_token: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Circuit breaker configuration
    pub circuit_breaker: CircuitBreakerConfig,
    /// Current environment
    pub environment: Environment,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::production()
    }
}

impl ClientConfig {
    /// Preset for an environment
    #[must_use]
    pub fn for_environment(environment: Environment) -> Self {
        Self {
            base_url: environment.default_url().to_string(),
            api_token: None,
            timeout: DEFAULT_TIMEOUT,
            circuit_breaker: CircuitBreakerConfig::default(),
            environment,
        }
    }

    /// Create development configuration (local API server)
    #[must_use]
    pub fn development() -> Self {
        Self::for_environment(Environment::Development)
    }

    /// Create staging configuration
    #[must_use]
    pub fn staging() -> Self {
        Self::for_environment(Environment::Staging)
    }

    /// Create production configuration
    #[must_use]
    pub fn production() -> Self {
        Self::for_environment(Environment::Production)
    }

    /// Create configuration from environment variables
    ///
    /// Reads the following environment variables:
    /// - `HEALTHWATCH_ENV`: Environment (development/staging/production)
    /// - `HEALTHWATCH_API_URL`: Base URL of the REST API
    /// - `HEALTHWATCH_TIMEOUT_SECS`: Request timeout in seconds
    /// - `HEALTHWATCH_API_TOKEN`: Bearer token
    pub fn from_env() -> ApiResult<Self> {
        Self::from_sources(None)
    }

    /// Preset, then the config file's `[api]` section, then the environment
    pub fn from_sources(file: Option<&ApiSection>) -> ApiResult<Self> {
        let mut config = Self::for_environment(Environment::from_env());

        if let Some(api) = file {
            config = config.with_file_section(api);
        }

        if let Ok(url) = env::var("HEALTHWATCH_API_URL") {
            config.base_url = url;
        }
        if let Ok(secs) = env::var("HEALTHWATCH_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|_| ApiError::config(format!("HEALTHWATCH_TIMEOUT_SECS is not a number: {secs}")))?;
            config.timeout = Duration::from_secs(secs);
        }
        if let Ok(token) = env::var("HEALTHWATCH_API_TOKEN") {
            config.api_token = Some(token).filter(|t| !t.is_empty());
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply the `[api]` section of the config file
    #[must_use]
    pub fn with_file_section(mut self, api: &ApiSection) -> Self {
        if let Some(url) = &api.base_url {
            self.base_url.clone_from(url);
        }
        self.timeout = Duration::from_secs(api.timeout_secs);
        self
    }

    /// Builder-style method to set base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Builder-style method to set the bearer token
    #[must_use]
    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Builder-style method to set timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder-style method to set circuit breaker config
    #[must_use]
    pub fn with_circuit_breaker(mut self, circuit_breaker: CircuitBreakerConfig) -> Self {
        self.circuit_breaker = circuit_breaker;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> ApiResult<()> {
        if self.base_url.is_empty() {
            return Err(ApiError::config("base_url cannot be empty"));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ApiError::config("base_url must start with http:// or https://"));
        }

        if self.timeout.is_zero() {
            return Err(ApiError::config("timeout cannot be zero"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, PRODUCTION_URL);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.circuit_breaker.failure_threshold, 3);
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_environment_parse() {
        assert_eq!(Environment::parse("dev"), Environment::Development);
        assert_eq!(Environment::parse(" Staging "), Environment::Staging);
        assert_eq!(Environment::parse(""), Environment::Production);
        assert!(ClientConfig::development().base_url.contains("localhost"));
    }

    #[test]
    fn test_file_section_applies() {
        let api = ApiSection {
            base_url: Some("https://health.example.org/api".into()),
            timeout_secs: 25,
        };
        let config = ClientConfig::staging().with_file_section(&api);
        assert_eq!(config.base_url, "https://health.example.org/api");
        assert_eq!(config.timeout, Duration::from_secs(25));
        assert_eq!(config.environment, Environment::Staging);
    }

    #[test]
    fn test_builder_pattern() {
        let config = ClientConfig::default()
            .with_base_url("http://127.0.0.1:8080/api")
            .with_api_token("t0k3n")
            .with_timeout(Duration::from_secs(3));

        assert_eq!(config.base_url, "http://127.0.0.1:8080/api");
        assert_eq!(config.api_token.as_deref(), Some("t0k3n"));
        assert_eq!(config.timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_validation() {
        assert_ok!(ClientConfig::default().validate());
        assert_err!(ClientConfig::default().with_base_url("").validate());
        assert_err!(ClientConfig::default().with_base_url("ftp://x").validate());
        assert_err!(ClientConfig::default().with_timeout(Duration::ZERO).validate());
    }
}
