//! Endpoint actions
//!
//! Each action gathers its input, validates it, picks the credential for its
//! endpoint, calls the executor and reports the outcome as a notification.
//! Failures are returned as values after they have been reported.

mod general;
mod iot;
mod ml;
mod suite;
mod validate;
mod weighing;

pub use general::health_check;
pub use iot::{get_active_session, send_status, send_weight};
pub use ml::identify_vegetable;
pub use suite::run_default_suite;
pub use weighing::{complete_session, get_history, get_session, initiate_session};

use tracing::{error, info};

use crate::auth::{compose_headers, AuthMode, Headers};
use crate::config::Configuration;
use crate::http::{ApiClient, ApiError, RequestOptions, RequestResult};
use crate::models::Endpoint;
use crate::output::Notifier;

/// Everything an action needs; passed explicitly, never global
pub struct SessionContext {
    pub config: Configuration,
    pub client: ApiClient,
    pub notifier: Notifier,
    /// Credential for the telemetry endpoints (weight, active session)
    pub telemetry_auth: AuthMode,
}

impl SessionContext {
    pub fn new(config: Configuration, client: ApiClient, notifier: Notifier) -> Self {
        Self {
            config,
            client,
            notifier,
            telemetry_auth: AuthMode::None,
        }
    }

    pub fn with_telemetry_auth(mut self, mode: AuthMode) -> Self {
        self.telemetry_auth = mode;
        self
    }

    /// Headers for `endpoint` under the current configuration
    pub fn headers_for(&self, endpoint: Endpoint) -> Result<Headers, ApiError> {
        compose_headers(&self.config, endpoint.auth_mode(self.telemetry_auth))
    }

    /// Execute `endpoint` with its method and the given path
    async fn call(
        &self,
        endpoint: Endpoint,
        path: &str,
        headers: Headers,
        options: RequestOptions,
    ) -> Result<RequestResult, ApiError> {
        let options = options.method(endpoint.method()).headers(headers);
        self.client.execute(&self.config, path, options).await
    }

    /// Report the outcome of an action and pass it through
    fn report(
        &self,
        endpoint: Endpoint,
        success_message: &str,
        outcome: Result<RequestResult, ApiError>,
    ) -> Result<RequestResult, ApiError> {
        match &outcome {
            Ok(result) => {
                self.notifier.success(success_message);
                info!("{} succeeded with status {}", endpoint.name(), result.status);
            }
            Err(e) => {
                self.notifier.error(&e.user_message());
                error!(kind = e.kind(), "{} failed: {}", endpoint.name(), e);
            }
        }
        outcome
    }
}
