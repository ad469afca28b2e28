//! Identity provider login
//!
//! Signs in against the password endpoint of the identity REST API, or
//! fabricates a local mock token for offline testing.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::distr::Alphanumeric;
use rand::Rng;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

use crate::http::ApiError;
use crate::output::status_text;

pub const DEFAULT_IDENTITY_ENDPOINT: &str =
    "https://identitytoolkit.googleapis.com/v1/accounts:signInWithPassword";

const MOCK_TOKEN_PREFIX: &str = "mock_firebase_token_";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

/// Successful sign-in payload
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    pub id_token: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: String,
    #[serde(default)]
    pub local_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Deserialize)]
struct ProviderErrorBody {
    error: ProviderError,
}

#[derive(Deserialize)]
struct ProviderError {
    message: String,
}

/// Client for the identity provider's password sign-in endpoint
#[derive(Clone)]
pub struct IdentityClient {
    client: Client,
    endpoint: String,
}

impl IdentityClient {
    /// Client for the hosted endpoint, authorised with a web API key
    pub fn new(web_api_key: &str, timeout_secs: u64) -> Result<Self, ApiError> {
        if web_api_key.trim().is_empty() {
            return Err(ApiError::auth(
                "Identity web API key is required for login",
            ));
        }
        Self::with_endpoint(
            format!("{DEFAULT_IDENTITY_ENDPOINT}?key={}", web_api_key.trim()),
            timeout_secs,
        )
    }

    /// Client for an explicit endpoint URL
    pub fn with_endpoint(endpoint: impl Into<String>, timeout_secs: u64) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Exchange email and password for an ID token
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SignInResponse, ApiError> {
        if email.trim().is_empty() {
            return Err(ApiError::validation("Email is required"));
        }
        if password.is_empty() {
            return Err(ApiError::validation("Password is required"));
        }

        info!("Signing in as {}", email.trim());
        let response = self
            .client
            .post(&self.endpoint)
            .json(&SignInRequest {
                email: email.trim(),
                password,
                return_secure_token: true,
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!("Identity provider answered {}", status.as_u16());

        if !status.is_success() {
            let message = serde_json::from_str::<ProviderErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| {
                    format!(
                        "HTTP {}: {}",
                        status.as_u16(),
                        status_text(status.as_u16())
                    )
                });
            error!("Login failed: {}", message);
            return Err(ApiError::http(message, status.as_u16()));
        }

        let signed_in: SignInResponse =
            serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))?;
        info!("Logged in as {}", signed_in.email);
        Ok(signed_in)
    }
}

/// Locally fabricated user
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockUser {
    pub uid: String,
    pub email: String,
    pub display_name: String,
    pub email_verified: bool,
}

#[derive(Clone, Debug)]
pub struct MockLogin {
    pub user: MockUser,
    pub token: String,
}

#[derive(Serialize, Deserialize)]
struct MockClaims {
    uid: String,
    email: String,
    /// Expiry in epoch milliseconds
    exp: i64,
}

/// Build a mock user and a one-hour token without contacting any provider
pub fn mock_login(email: &str) -> MockLogin {
    mock_login_at(email, Utc::now())
}

fn mock_login_at(email: &str, now: DateTime<Utc>) -> MockLogin {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();

    let email = email.trim().to_string();
    let user = MockUser {
        uid: format!("mock_user_{suffix}"),
        display_name: email.split('@').next().unwrap_or_default().to_string(),
        email: email.clone(),
        email_verified: true,
    };

    let claims = MockClaims {
        uid: user.uid.clone(),
        email,
        exp: (now + ChronoDuration::hours(1)).timestamp_millis(),
    };
    let encoded = serde_json::to_vec(&claims).unwrap_or_default();
    let token = format!("{MOCK_TOKEN_PREFIX}{}", STANDARD.encode(encoded));

    info!("Mock login successful for: {}", user.email);
    MockLogin { user, token }
}

/// True when `token` was produced by [`mock_login`], expired or not
pub fn is_mock_token(token: &str) -> bool {
    token.trim().starts_with(MOCK_TOKEN_PREFIX)
}

/// True for mock tokens that have not yet expired
pub fn is_token_valid(token: &str) -> bool {
    is_token_valid_at(token, Utc::now())
}

fn is_token_valid_at(token: &str, now: DateTime<Utc>) -> bool {
    let Some(payload) = token.trim().strip_prefix(MOCK_TOKEN_PREFIX) else {
        return false;
    };

    let claims = STANDARD
        .decode(payload)
        .map_err(|e| e.to_string())
        .and_then(|bytes| serde_json::from_slice::<MockClaims>(&bytes).map_err(|e| e.to_string()));

    match claims {
        Ok(claims) => claims.exp > now.timestamp_millis(),
        Err(e) => {
            error!("Token validation error: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::mock::spawn_mock_server;

    #[test]
    fn test_mock_login_token_is_valid() {
        let login = mock_login("farmer@example.com");
        assert!(login.user.uid.starts_with("mock_user_"));
        assert_eq!(login.user.display_name, "farmer");
        assert!(login.token.starts_with(MOCK_TOKEN_PREFIX));
        assert!(is_token_valid(&login.token));
    }

    #[test]
    fn test_mock_token_expires_after_an_hour() {
        let issued = Utc::now();
        let login = mock_login_at("a@b.c", issued);
        assert!(is_token_valid_at(&login.token, issued + ChronoDuration::minutes(59)));
        assert!(!is_token_valid_at(&login.token, issued + ChronoDuration::minutes(61)));
    }

    #[test]
    fn test_foreign_tokens_are_invalid() {
        assert!(!is_mock_token("eyJhbGciOiJSUzI1NiJ9.payload.sig"));
        assert!(is_mock_token("mock_firebase_token_%%%not-base64"));
        assert!(!is_token_valid(""));
        assert!(!is_token_valid("eyJhbGciOiJSUzI1NiJ9.payload.sig"));
        assert!(!is_token_valid("mock_firebase_token_%%%not-base64"));
    }

    #[test]
    fn test_new_requires_web_api_key() {
        assert!(matches!(
            IdentityClient::new("  ", 5),
            Err(ApiError::AuthConfiguration(_))
        ));
    }

    async fn spawn_provider(status_line: &'static str, body: &'static str) -> String {
        let (base, _server) = spawn_mock_server(status_line, "application/json", body).await;
        format!("{base}/v1/accounts:signInWithPassword?key=test")
    }

    #[tokio::test]
    async fn test_sign_in_success() {
        let endpoint = spawn_provider(
            "200 OK",
            r#"{"idToken":"id-123","refreshToken":"r-1","expiresIn":"3600","localId":"u1","email":"a@b.c","displayName":""}"#,
        )
        .await;

        let client = IdentityClient::with_endpoint(endpoint, 5).unwrap();
        let response = client.sign_in("a@b.c", "pw").await.unwrap();
        assert_eq!(response.id_token, "id-123");
        assert_eq!(response.expires_in, "3600");
        assert_eq!(response.local_id, "u1");
    }

    #[tokio::test]
    async fn test_sign_in_provider_error() {
        let endpoint = spawn_provider(
            "400 Bad Request",
            r#"{"error":{"code":400,"message":"INVALID_PASSWORD"}}"#,
        )
        .await;

        let client = IdentityClient::with_endpoint(endpoint, 5).unwrap();
        let err = client.sign_in("a@b.c", "wrong").await.unwrap_err();
        assert_eq!(err, ApiError::http("INVALID_PASSWORD", 400));
    }

    #[tokio::test]
    async fn test_sign_in_validates_input() {
        let client = IdentityClient::with_endpoint("http://127.0.0.1:9/", 1).unwrap();
        let err = client.sign_in("", "pw").await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
