//! Telemetry actions for the scale device

use tracing::info;

use super::{validate, SessionContext};
use crate::http::{ApiError, RequestOptions, RequestResult};
use crate::models::Endpoint;

/// Post a weight reading; `payload` must be JSON
pub async fn send_weight(ctx: &SessionContext, payload: &str) -> Result<RequestResult, ApiError> {
    let outcome = post_json(ctx, Endpoint::SendWeight, payload, "Weight Data").await;
    ctx.report(Endpoint::SendWeight, "Weight data sent successfully!", outcome)
}

/// Post a device status report; never carries a credential
pub async fn send_status(ctx: &SessionContext, payload: &str) -> Result<RequestResult, ApiError> {
    let outcome = post_json(ctx, Endpoint::SendStatus, payload, "Status Data").await;
    ctx.report(Endpoint::SendStatus, "Status data sent successfully!", outcome)
}

/// The session the scale is currently attached to
pub async fn get_active_session(ctx: &SessionContext) -> Result<RequestResult, ApiError> {
    let endpoint = Endpoint::ActiveSession;
    info!("Getting active weighing session from IoT endpoint");

    let outcome = match ctx.headers_for(endpoint) {
        Ok(headers) => {
            ctx.call(endpoint, &endpoint.path(None), headers, RequestOptions::default())
                .await
        }
        Err(e) => Err(e),
    };
    ctx.report(endpoint, "Active session retrieved successfully!", outcome)
}

async fn post_json(
    ctx: &SessionContext,
    endpoint: Endpoint,
    payload: &str,
    field: &str,
) -> Result<RequestResult, ApiError> {
    let body = validate::json(payload, field)?;
    info!("Sending {} to {}", field.to_lowercase(), endpoint.path_template());

    let headers = ctx.headers_for(endpoint)?;
    ctx.call(
        endpoint,
        &endpoint.path(None),
        headers,
        RequestOptions::default().json(body),
    )
    .await
}
