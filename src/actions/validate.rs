//! Input checks run before any request is built

use std::path::Path;

use crate::http::ApiError;

/// Trimmed value, or a validation error naming the field
pub fn required(value: &str, field: &str) -> Result<String, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// Required value usable as one URL path segment
pub fn path_segment(value: &str, field: &str) -> Result<String, ApiError> {
    let value = required(value, field)?;
    if value == "." || value == ".." {
        return Err(ApiError::validation(format!("{field} must not be '{value}'")));
    }
    Ok(value)
}

/// Required value that must also parse as JSON
pub fn json(value: &str, field: &str) -> Result<String, ApiError> {
    let value = required(value, field)?;
    serde_json::from_str::<serde_json::Value>(&value)
        .map_err(|e| ApiError::validation(format!("{field} must be valid JSON: {e}")))?;
    Ok(value)
}

/// Read a file that must exist
pub async fn file(path: Option<&Path>, field: &str) -> Result<Vec<u8>, ApiError> {
    let path = match path {
        Some(path) if !path.as_os_str().is_empty() => path,
        _ => return Err(ApiError::validation(format!("{field} is required"))),
    };
    if !path.is_file() {
        return Err(ApiError::validation(format!(
            "{field} not found: {}",
            path.display()
        )));
    }
    tokio::fs::read(path).await.map_err(|e| {
        ApiError::validation(format!("{field} could not be read: {e}"))
    })
}

/// Mime type guessed from the file extension
pub fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
}
