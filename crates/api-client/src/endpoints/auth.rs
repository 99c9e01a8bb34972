//! Authentication endpoints

use super::{decode_one, require_auth};
use crate::client::HealthWatchClient;
use crate::error::{ApiError, ApiResult};
use healthwatch_core::validation::{ValidationResult, Validator};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

/// Minimum password length accepted by the API
const MIN_PASSWORD_LEN: usize = 6;

/// Authentication API interface
#[derive(Debug, Clone)]
pub struct AuthApi {
    client: HealthWatchClient,
}

impl AuthApi {
    /// Create a new auth API interface
    pub(crate) fn new(client: HealthWatchClient) -> Self {
        Self { client }
    }

    /// Log in and use the returned token for the following requests
    ///
    /// `POST /auth/login`
    pub async fn login(&self, request: &LoginRequest) -> ApiResult<AuthSession> {
        let result = request.validate();
        if !result.is_valid() {
            return Err(ApiError::from_validation(&result));
        }

        let data: Value = self.client.post("auth/login", request).await?;
        let session: AuthSession = decode_one(data, "session")?;
        self.client.set_token(&session.token);
        info!(user_id = %session.user.id, "Logged in");
        Ok(session)
    }

    /// Create an account; the API logs the new user in
    ///
    /// `POST /auth/register`
    pub async fn register(&self, request: &RegisterRequest) -> ApiResult<AuthSession> {
        let result = request.validate();
        if !result.is_valid() {
            return Err(ApiError::from_validation(&result));
        }

        let data: Value = self.client.post("auth/register", request).await?;
        let session: AuthSession = decode_one(data, "session")?;
        self.client.set_token(&session.token);
        info!(user_id = %session.user.id, "Registered");
        Ok(session)
    }

    /// The logged-in user
    ///
    /// `GET /auth/me`
    pub async fn me(&self) -> ApiResult<User> {
        require_auth(&self.client)?;
        let data: Value = self.client.get("auth/me").await?;
        decode_one(data, "user")
    }

    /// Drop the token locally; the API keeps no session to end
    pub fn logout(&self) {
        self.client.clear_token();
    }
}

/// Login form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    /// Client-side checks before submitting
    #[must_use]
    pub fn validate(&self) -> ValidationResult {
        Validator::new()
            .required("email", &self.email)
            .email("email", &self.email)
            .required("password", &self.password)
            .validate()
    }
}

/// Registration form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    /// Client-side checks before submitting
    #[must_use]
    pub fn validate(&self) -> ValidationResult {
        Validator::new()
            .required("name", &self.name)
            .max_length("name", &self.name, 100)
            .required("email", &self.email)
            .email("email", &self.email)
            .min_length("password", &self.password, MIN_PASSWORD_LEN)
            .validate()
    }
}

/// A user account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Token and user returned by login and registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

impl<'de> Deserialize<'de> for User {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Wire {
            #[serde(rename = "_id", default)]
            object_id: Option<String>,
            #[serde(default)]
            id: Option<String>,
            #[serde(default)]
            name: String,
            email: String,
            #[serde(default)]
            role: Option<String>,
        }

        let wire = Wire::deserialize(deserializer)?;
        let id = wire
            .object_id
            .or(wire.id)
            .ok_or_else(|| serde::de::Error::missing_field("id"))?;
        Ok(Self {
            id,
            name: wire.name,
            email: wire.email,
            role: wire.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_server;
    use crate::config::ClientConfig;
    use serde_json::json;

    #[test]
    fn test_login_validation() {
        let bad = LoginRequest {
            email: "not-an-email".into(),
            password: String::new(),
        };
        let result = bad.validate();
        assert!(!result.is_valid());
        let fields = result.field_errors();
        assert!(fields.get("email").is_some());
        assert!(fields.get("password").is_some());
    }

    #[test]
    fn test_register_password_length() {
        let request = RegisterRequest {
            name: "Ama".into(),
            email: "ama@example.com".into(),
            password: "123".into(),
        };
        assert!(request.validate().field_errors().get("password").is_some());
    }

    #[test]
    fn test_user_accepts_either_id() {
        let user: User = serde_json::from_value(json!({"_id": "u1", "name": "Ama", "email": "a@b.co"})).unwrap();
        assert_eq!(user.id, "u1");
        let user: User = serde_json::from_value(json!({"id": "u2", "email": "a@b.co"})).unwrap();
        assert_eq!(user.id, "u2");
        assert!(serde_json::from_value::<User>(json!({"email": "a@b.co"})).is_err());
    }

    #[tokio::test]
    async fn test_login_stores_token() {
        let (base, seen) = test_server::spawn(|_, target| match target {
            "/api/auth/login" => (
                200,
                json!({"success": true, "data": {"token": "jwt-1", "user": {"_id": "u1", "name": "Ama", "email": "ama@example.com"}}})
                    .to_string(),
            ),
            _ => (
                200,
                json!({"success": true, "data": {"user": {"_id": "u1", "name": "Ama", "email": "ama@example.com"}}})
                    .to_string(),
            ),
        })
        .await;
        let client = HealthWatchClient::with_config(ClientConfig::development().with_base_url(base)).unwrap();
        let auth = client.auth();

        assert!(matches!(auth.me().await, Err(ApiError::NotAuthenticated)));

        let session = auth
            .login(&LoginRequest {
                email: "ama@example.com".into(),
                password: "secret1".into(),
            })
            .await
            .unwrap();
        assert_eq!(session.user.id, "u1");
        assert_eq!(client.token().as_deref(), Some("jwt-1"));

        let me = auth.me().await.unwrap();
        assert_eq!(me.name, "Ama");
        assert_eq!(seen.lock().unwrap()[1].header("authorization"), Some("Bearer jwt-1"));

        auth.logout();
        assert!(!client.is_authenticated());
    }
}
