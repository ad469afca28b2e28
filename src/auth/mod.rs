//! Authentication header composition and identity login
//!
//! Request headers are derived from an [`AuthMode`] and the current
//! [`Configuration`]. Missing credentials are reported, never retried.

mod identity;

pub use identity::{is_mock_token, is_token_valid, mock_login, IdentityClient};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::config::Configuration;
use crate::http::ApiError;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const AUTHORIZATION: &str = "Authorization";
pub const API_KEY_HEADER: &str = "X-API-Key";
pub const JSON_MIME: &str = "application/json";

/// Header map used for outgoing requests; ordered so logs are stable
pub type Headers = BTreeMap<String, String>;

/// Which credential a request carries
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthMode {
    #[default]
    None,
    #[serde(alias = "api")]
    ApiKey,
    #[serde(alias = "bearer", alias = "firebase")]
    BearerToken,
}

impl AuthMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" => Some(AuthMode::None),
            "api-key" | "apikey" | "api" => Some(AuthMode::ApiKey),
            "bearer" | "bearer-token" | "firebase" => Some(AuthMode::BearerToken),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AuthMode::None => "none",
            AuthMode::ApiKey => "api-key",
            AuthMode::BearerToken => "bearer",
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Default JSON content type, plus the credential `mode` asks for
pub fn compose_headers(config: &Configuration, mode: AuthMode) -> Result<Headers, ApiError> {
    let mut headers = Headers::new();
    headers.insert(CONTENT_TYPE.to_string(), JSON_MIME.to_string());

    match mode {
        AuthMode::None => {}
        AuthMode::ApiKey => {
            let api_key = config.api_key();
            if api_key.is_empty() {
                return Err(ApiError::auth("API key is required for this endpoint"));
            }
            headers.insert(API_KEY_HEADER.to_string(), api_key);
        }
        AuthMode::BearerToken => {
            let token = config.token();
            if token.is_empty() {
                return Err(ApiError::auth(
                    "Firebase token is required for this endpoint",
                ));
            }
            headers.insert(AUTHORIZATION.to_string(), format!("Bearer {token}"));
        }
    }

    Ok(headers)
}

/// Drop any Content-Type entry so the transport can set a multipart boundary
pub fn strip_content_type(headers: &mut Headers) {
    headers.retain(|name, _| !name.eq_ignore_ascii_case(CONTENT_TYPE));
}

/// Copy of `headers` with credential values masked, for the debug log
pub fn redact(headers: &Headers) -> Headers {
    headers
        .iter()
        .map(|(name, value)| {
            let shown = if name.eq_ignore_ascii_case(AUTHORIZATION)
                || name.eq_ignore_ascii_case(API_KEY_HEADER)
            {
                mask(value)
            } else {
                value.clone()
            };
            (name.clone(), shown)
        })
        .collect()
}

fn mask(value: &str) -> String {
    let visible: String = value.chars().take(10).collect();
    if value.chars().count() > 10 {
        format!("{visible}…")
    } else {
        "***".to_string()
    }
}
