//! General actions

use tracing::info;

use super::SessionContext;
use crate::http::{ApiError, RequestOptions, RequestResult};
use crate::models::Endpoint;

/// `GET /` without credentials
pub async fn health_check(ctx: &SessionContext) -> Result<RequestResult, ApiError> {
    let endpoint = Endpoint::HealthCheck;
    info!("Testing health check endpoint");

    let outcome = match ctx.headers_for(endpoint) {
        Ok(headers) => {
            ctx.call(endpoint, &endpoint.path(None), headers, RequestOptions::default())
                .await
        }
        Err(e) => Err(e),
    };
    ctx.report(endpoint, "Health check successful!", outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::anonymous_context;
    use crate::http::mock::spawn_mock_server;

    #[tokio::test]
    async fn test_health_check() {
        let (base, server) =
            spawn_mock_server("200 OK", "text/plain", "Lokatani API is running").await;
        let result = health_check(&anonymous_context(&base)).await.unwrap();
        assert_eq!(result.data.to_string(), "Lokatani API is running");
        assert!(server.await.unwrap().starts_with("GET / "));
    }

    #[tokio::test]
    async fn test_health_check_server_error() {
        let (base, _server) =
            spawn_mock_server("503 Service Unavailable", "text/plain", "down").await;
        let err = health_check(&anonymous_context(&base)).await.unwrap_err();
        assert_eq!(err, ApiError::http("HTTP 503: Service Unavailable", 503));
    }

    #[tokio::test]
    async fn test_health_check_needs_base_url() {
        let err = health_check(&anonymous_context("")).await.unwrap_err();
        assert_eq!(err, ApiError::configuration("Please enter a base URL"));
    }
}
