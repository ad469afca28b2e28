//! Vegetable classification

use std::path::Path;
use tracing::info;

use super::{validate, SessionContext};
use crate::auth::strip_content_type;
use crate::http::{ApiError, MultipartForm, RequestOptions, RequestResult};
use crate::models::Endpoint;

/// Upload an image for classification, optionally tied to a session
pub async fn identify_vegetable(
    ctx: &SessionContext,
    image: Option<&Path>,
    session_id: Option<&str>,
) -> Result<RequestResult, ApiError> {
    let outcome = identify(ctx, image, session_id).await;
    ctx.report(
        Endpoint::IdentifyVegetable,
        "Vegetable identification completed successfully!",
        outcome,
    )
}

async fn identify(
    ctx: &SessionContext,
    image: Option<&Path>,
    session_id: Option<&str>,
) -> Result<RequestResult, ApiError> {
    let endpoint = Endpoint::IdentifyVegetable;
    let bytes = validate::file(image, "Image File").await?;
    let path = image.ok_or_else(|| ApiError::validation("Image File is required"))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "image".to_string());
    let mut form = MultipartForm::new().file("image", file_name.as_str(), validate::mime_for(path), bytes);
    if let Some(session_id) = session_id.map(str::trim).filter(|s| !s.is_empty()) {
        form = form.text("session_id", session_id);
    }
    info!("Identifying vegetable from {}", file_name);

    // The transport sets the multipart boundary
    let mut headers = ctx.headers_for(endpoint)?;
    strip_content_type(&mut headers);

    ctx.call(
        endpoint,
        &endpoint.path(None),
        headers,
        RequestOptions::default().multipart(form),
    )
    .await
}
