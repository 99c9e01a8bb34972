//! Main API client implementation

use crate::config::ClientConfig;
use crate::endpoints::{
    AppointmentsApi, AuthApi, EventsApi, NotificationsApi, ProfileApi, ReviewsApi, SymptomsApi,
};
use crate::envelope::decode_body;
use crate::error::{ApiError, ApiResult};
use healthwatch_core::circuit::{CircuitBreaker, CircuitState};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Request correlation ID header
const X_REQUEST_ID: &str = "X-Request-ID";

/// Query string pairs as produced by the search filter builder
pub type Query<'a> = &'a [(&'static str, String)];

/// HealthWatch REST client
///
/// Wraps `reqwest` and adds:
/// - Envelope decoding with per-field validation errors
/// - A circuit breaker so an unreachable backend fails fast
/// - Request correlation IDs for tracing
/// - A bearer token shared by every clone, set on login
#[derive(Clone)]
pub struct HealthWatchClient {
    inner: Client,
    config: Arc<ClientConfig>,
    circuit_breaker: Arc<CircuitBreaker>,
    token: Arc<RwLock<Option<String>>>,
}

impl std::fmt::Debug for HealthWatchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthWatchClient")
            .field("base_url", &self.config.base_url)
            .field("circuit", &self.circuit_state())
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl HealthWatchClient {
    /// Create a new client with configuration from the environment
    pub fn new() -> ApiResult<Self> {
        let config = ClientConfig::from_env()?;
        Self::with_config(config)
    }

    /// Create a new client with specific configuration
    pub fn with_config(config: ClientConfig) -> ApiResult<Self> {
        config.validate()?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("healthwatch-api-client/", env!("CARGO_PKG_VERSION"))),
        );

        let inner = Client::builder()
            .timeout(config.timeout)
            .default_headers(default_headers)
            .build()
            .map_err(ApiError::Request)?;

        let circuit_breaker = Arc::new(CircuitBreaker::new(config.circuit_breaker.clone()));
        let token = Arc::new(RwLock::new(config.api_token.clone()));

        Ok(Self {
            inner,
            config: Arc::new(config),
            circuit_breaker,
            token,
        })
    }

    /// Get the current configuration
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the base URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Get circuit breaker state
    #[must_use]
    pub fn circuit_state(&self) -> CircuitState {
        self.circuit_breaker.state()
    }

    /// Reset the circuit breaker
    pub fn reset_circuit(&self) {
        self.circuit_breaker.reset();
    }

    /// Use `token` for every following request
    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.into());
    }

    /// Forget the bearer token
    pub fn clear_token(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Current bearer token
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether a bearer token is set
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    // -------------------------------------------------------------------------
    // Endpoint API accessors
    // -------------------------------------------------------------------------

    /// Event search and detail endpoints
    #[must_use]
    pub fn events(&self) -> EventsApi {
        EventsApi::new(self.clone())
    }

    /// Login, registration and current user
    #[must_use]
    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.clone())
    }

    /// Health profile endpoints
    #[must_use]
    pub fn profile(&self) -> ProfileApi {
        ProfileApi::new(self.clone())
    }

    /// Symptom log endpoints
    #[must_use]
    pub fn symptoms(&self) -> SymptomsApi {
        SymptomsApi::new(self.clone())
    }

    /// Appointment booking endpoints
    #[must_use]
    pub fn appointments(&self) -> AppointmentsApi {
        AppointmentsApi::new(self.clone())
    }

    /// Notification endpoints
    #[must_use]
    pub fn notifications(&self) -> NotificationsApi {
        NotificationsApi::new(self.clone())
    }

    /// Event review endpoints
    #[must_use]
    pub fn reviews(&self) -> ReviewsApi {
        ReviewsApi::new(self.clone())
    }

    // -------------------------------------------------------------------------
    // Low-level HTTP methods with resilience
    // -------------------------------------------------------------------------

    /// Perform a GET request
    #[instrument(skip(self), level = "debug")]
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.request(Method::GET, path, &[], Option::<&()>::None).await
    }

    /// Perform a GET request with query parameters
    #[instrument(skip(self, query), level = "debug")]
    pub async fn get_with_query<T: DeserializeOwned>(&self, path: &str, query: Query<'_>) -> ApiResult<T> {
        self.request(Method::GET, path, query, Option::<&()>::None).await
    }

    /// Perform a POST request
    #[instrument(skip(self, body), level = "debug")]
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> ApiResult<T> {
        self.request(Method::POST, path, &[], Some(body)).await
    }

    /// Perform a PUT request
    #[instrument(skip(self, body), level = "debug")]
    pub async fn put<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> ApiResult<T> {
        self.request(Method::PUT, path, &[], Some(body)).await
    }

    /// Perform a PATCH request without a body
    #[instrument(skip(self), level = "debug")]
    pub async fn patch<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.request(Method::PATCH, path, &[], Option::<&()>::None).await
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Send a request once, guarded by the circuit breaker
    async fn request<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        query: Query<'_>,
        body: Option<&B>,
    ) -> ApiResult<T> {
        let request_id = Uuid::new_v4().to_string();

        if !self.circuit_breaker.can_execute() {
            warn!(
                request_id = %request_id,
                path = %path,
                "Circuit breaker is open, rejecting request"
            );
            return Err(ApiError::CircuitOpen);
        }

        let start = Instant::now();
        let result = self
            .execute_single_request(&request_id, method, path, query, body)
            .await;
        let elapsed = start.elapsed();

        match &result {
            Ok(_) => {
                self.circuit_breaker.record_success();
                debug!(
                    request_id = %request_id,
                    elapsed_ms = elapsed.as_millis(),
                    "Request succeeded"
                );
            }
            Err(e) => {
                if e.is_backend_failure() {
                    self.circuit_breaker.record_failure();
                } else {
                    self.circuit_breaker.record_success();
                }
                debug!(
                    request_id = %request_id,
                    elapsed_ms = elapsed.as_millis(),
                    error = %e,
                    "Request failed"
                );
            }
        }

        let data = result?;
        serde_json::from_value(data).map_err(ApiError::Json)
    }

    /// Send one request and decode the envelope
    async fn execute_single_request<B: Serialize>(
        &self,
        request_id: &str,
        method: Method,
        path: &str,
        query: Query<'_>,
        body: Option<&B>,
    ) -> ApiResult<serde_json::Value> {
        let mut request = self
            .inner
            .request(method, self.url(path))
            .header(X_REQUEST_ID, request_id);

        if !query.is_empty() {
            request = request.query(query);
        }

        if let Some(token) = self.token() {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        if let Some(b) = body {
            request = request.json(b);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        decode_body(status, &text, path)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use healthwatch_core::circuit::CircuitBreakerConfig;
    use std::time::Duration;

    fn client_for(base_url: &str) -> HealthWatchClient {
        HealthWatchClient::with_config(
            ClientConfig::development()
                .with_base_url(base_url)
                .with_timeout(Duration::from_secs(2)),
        )
        .unwrap()
    }

    #[test]
    fn test_client_creation() {
        let client = HealthWatchClient::with_config(ClientConfig::development()).unwrap();
        assert!(!client.is_authenticated());
        assert_eq!(client.circuit_state(), CircuitState::Closed);
    }

    #[test]
    fn test_url_joining() {
        let client = client_for("http://localhost:5000/api/");
        assert_eq!(client.url("/events"), "http://localhost:5000/api/events");
        assert_eq!(client.url("events/1"), "http://localhost:5000/api/events/1");
    }

    #[test]
    fn test_token_shared_between_clones() {
        let client = client_for("http://localhost:5000/api");
        let clone = client.clone();
        client.set_token("abc");
        assert_eq!(clone.token().as_deref(), Some("abc"));
        clone.clear_token();
        assert!(!client.is_authenticated());
    }

    #[tokio::test]
    async fn test_sends_query_token_and_request_id() {
        let (base, seen) = test_server::spawn(|_, _| {
            (200, r#"{"success": true, "data": {"ok": 1}}"#.to_string())
        })
        .await;
        let client = client_for(&base);
        client.set_token("secret");

        let data: serde_json::Value = client
            .get_with_query("events", &[("lat", "5.6".to_string()), ("radius", "25000".to_string())])
            .await
            .unwrap();
        assert_eq!(data["ok"], 1);

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].method, "GET");
        assert_eq!(seen[0].target, "/api/events?lat=5.6&radius=25000");
        assert_eq!(seen[0].header("authorization"), Some("Bearer secret"));
        assert!(seen[0].header("x-request-id").is_some());
    }

    #[tokio::test]
    async fn test_validation_errors_do_not_trip_breaker() {
        let (base, _) = test_server::spawn(|_, _| {
            (
                422,
                r#"{"success": false, "message": "Invalid", "errors": [{"path": "age", "message": "too old"}]}"#
                    .to_string(),
            )
        })
        .await;
        let client = client_for(&base);

        for _ in 0..5 {
            let err = client
                .post::<serde_json::Value, _>("profile", &serde_json::json!({"age": 300}))
                .await
                .unwrap_err();
            assert_eq!(err.field_errors().get("age"), Some("too old"));
        }
        assert_eq!(client.circuit_state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_server_errors_open_the_circuit() {
        let (base, seen) = test_server::spawn(|_, _| (500, r#"{"success": false}"#.to_string())).await;
        let client = HealthWatchClient::with_config(
            ClientConfig::development()
                .with_base_url(&base)
                .with_circuit_breaker(CircuitBreakerConfig {
                    failure_threshold: 2,
                    success_threshold: 1,
                    reset_timeout: Duration::from_secs(60),
                }),
        )
        .unwrap();

        for _ in 0..2 {
            assert!(client.get::<serde_json::Value>("events").await.unwrap_err().is_server_error());
        }
        assert_eq!(client.circuit_state(), CircuitState::Open);
        assert!(matches!(
            client.get::<serde_json::Value>("events").await,
            Err(ApiError::CircuitOpen)
        ));
        assert_eq!(seen.lock().unwrap().len(), 2);

        client.reset_circuit();
        assert_eq!(client.circuit_state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_failed_request_is_sent_once() {
        let (base, seen) = test_server::spawn(|_, _| (503, String::new())).await;
        let client = HealthWatchClient::with_config(
            ClientConfig::development()
                .with_base_url(&base)
                .with_circuit_breaker(CircuitBreakerConfig {
                    failure_threshold: 1,
                    ..CircuitBreakerConfig::default()
                }),
        )
        .unwrap();

        let err = client.get::<serde_json::Value>("events").await.unwrap_err();
        assert!(err.is_server_error());
        assert_eq!(seen.lock().unwrap().len(), 1);
        assert_eq!(client.circuit_state(), CircuitState::Open);
    }
}
