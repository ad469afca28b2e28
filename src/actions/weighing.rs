//! Weighing session actions

use serde_json::json;
use tracing::info;

use super::{validate, SessionContext};
use crate::http::{ApiError, RequestOptions, RequestResult};
use crate::models::Endpoint;

/// Session type used when none is given
pub const DEFAULT_SESSION_TYPE: &str = "rompes";

/// Start a weighing session
///
/// A blank `session_type` means [`DEFAULT_SESSION_TYPE`], which also needs a
/// vegetable type.
pub async fn initiate_session(
    ctx: &SessionContext,
    session_type: &str,
    vegetable_type: Option<&str>,
) -> Result<RequestResult, ApiError> {
    let endpoint = Endpoint::InitiateSession;
    let outcome = initiate(ctx, session_type, vegetable_type).await;
    let outcome = ctx.report(endpoint, "Weighing session initiated!", outcome);
    announce_session_id(ctx, &outcome, "Session ID");
    outcome
}

async fn initiate(
    ctx: &SessionContext,
    session_type: &str,
    vegetable_type: Option<&str>,
) -> Result<RequestResult, ApiError> {
    let endpoint = Endpoint::InitiateSession;
    let session_type = match session_type.trim() {
        "" => DEFAULT_SESSION_TYPE,
        other => other,
    };

    let vegetable_type = vegetable_type.map(str::trim).filter(|v| !v.is_empty());
    if session_type == DEFAULT_SESSION_TYPE && vegetable_type.is_none() {
        return Err(ApiError::validation("Vegetable Type is required"));
    }

    let mut body = json!({ "session_type": session_type });
    if let Some(vegetable_type) = vegetable_type {
        body["vegetable_type"] = json!(vegetable_type);
    }
    info!(
        "Initiating new weighing session with type: {}{}",
        session_type,
        vegetable_type
            .map(|v| format!(", vegetable_type: {v}"))
            .unwrap_or_default()
    );

    let headers = ctx.headers_for(endpoint)?;
    ctx.call(
        endpoint,
        &endpoint.path(None),
        headers,
        RequestOptions::default().json(body.to_string()),
    )
    .await
}

/// Close a weighing session
pub async fn complete_session(
    ctx: &SessionContext,
    session_id: &str,
) -> Result<RequestResult, ApiError> {
    let outcome = complete(ctx, session_id).await;
    let outcome = ctx.report(Endpoint::CompleteSession, "Weighing session completed!", outcome);
    announce_session_id(ctx, &outcome, "Completed Session ID");
    outcome
}

async fn complete(ctx: &SessionContext, session_id: &str) -> Result<RequestResult, ApiError> {
    let endpoint = Endpoint::CompleteSession;
    let session_id = validate::required(session_id, "Session ID")?;
    info!("Completing weighing session: {}", session_id);

    let headers = ctx.headers_for(endpoint)?;
    let body = json!({ "session_id": session_id });
    ctx.call(
        endpoint,
        &endpoint.path(None),
        headers,
        RequestOptions::default().json(body.to_string()),
    )
    .await
}

/// The caller's weighing history
pub async fn get_history(ctx: &SessionContext) -> Result<RequestResult, ApiError> {
    let endpoint = Endpoint::WeighingHistory;
    info!("Getting weighing session history");

    let outcome = match ctx.headers_for(endpoint) {
        Ok(headers) => {
            ctx.call(endpoint, &endpoint.path(None), headers, RequestOptions::default())
                .await
        }
        Err(e) => Err(e),
    };
    ctx.report(endpoint, "Weighing history retrieved successfully!", outcome)
}

/// One weighing session by id
pub async fn get_session(ctx: &SessionContext, session_id: &str) -> Result<RequestResult, ApiError> {
    let outcome = session(ctx, session_id).await;
    ctx.report(
        Endpoint::WeighingSession,
        "Weighing session retrieved successfully!",
        outcome,
    )
}

async fn session(ctx: &SessionContext, session_id: &str) -> Result<RequestResult, ApiError> {
    let endpoint = Endpoint::WeighingSession;
    let session_id = validate::path_segment(session_id, "Session ID")?;
    info!("Getting weighing session: {}", session_id);

    let headers = ctx.headers_for(endpoint)?;
    ctx.call(
        endpoint,
        &endpoint.path(Some(&session_id)),
        headers,
        RequestOptions::default(),
    )
    .await
}

fn announce_session_id(
    ctx: &SessionContext,
    outcome: &Result<RequestResult, ApiError>,
    label: &str,
) {
    if let Ok(result) = outcome {
        if let Some(id) = result.data.field("session_id") {
            ctx.notifier.info(&format!("{label}: {id}"));
        }
    }
}
