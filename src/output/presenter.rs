//! Response panel
//!
//! Renders status, timing and body of every response handed over by the
//! request executor.

use std::io::Write;
use std::sync::Mutex;

use crate::http::ResponseBody;

/// Receiver for every decoded response, success or not
pub trait ResponseSink: Send + Sync {
    fn present(&self, data: &ResponseBody, status: u16, elapsed_ms: u64);
}

/// Display class of an HTTP status
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    ClientIssue,
    ServerIssue,
}

impl StatusClass {
    pub fn of(status: u16) -> Self {
        match status {
            200..=299 => StatusClass::Success,
            400..=499 => StatusClass::ClientIssue,
            _ => StatusClass::ServerIssue,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StatusClass::Success => "success",
            StatusClass::ClientIssue => "client-issue",
            StatusClass::ServerIssue => "server-issue",
        }
    }

    fn color(&self) -> &'static str {
        match self {
            StatusClass::Success => "\x1b[32m",
            StatusClass::ClientIssue => "\x1b[33m",
            StatusClass::ServerIssue => "\x1b[31m",
        }
    }
}

/// Human-readable text for the status codes the backend uses; the panel and
/// HTTP error messages both read it
pub fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        408 => "Request Timeout",
        409 => "Conflict",
        413 => "Payload Too Large",
        415 => "Unsupported Media Type",
        422 => "Unprocessable Entity",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Unknown Status",
    }
}

/// Terminal response panel
pub struct ResponsePresenter {
    colorize: bool,
    last: Mutex<Option<String>>,
}

impl ResponsePresenter {
    pub fn new() -> Self {
        Self {
            colorize: true,
            last: Mutex::new(None),
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    /// Render a response without printing it
    pub fn format(&self, data: &ResponseBody, status: u16, elapsed_ms: u64) -> String {
        let class = StatusClass::of(status);
        let status_line = format!("{} {}", status, status_text(status));
        let status_line = if self.colorize {
            format!("{}{status_line}\x1b[0m", class.color())
        } else {
            status_line
        };

        let mut output = String::new();
        output.push_str("\n┌──────────────────────────────────────────────────────────────\n");
        output.push_str(&format!(
            "│ {status_line}  [{}]  {elapsed_ms}ms\n",
            class.name()
        ));
        output.push_str("├──────────────────────────────────────────────────────────────\n");
        for line in data.pretty().lines() {
            output.push_str(&format!("│ {line}\n"));
        }
        output.push_str("└──────────────────────────────────────────────────────────────\n");
        output
    }

    /// Body of the most recently presented response
    pub fn last(&self) -> Option<String> {
        self.last.lock().ok().and_then(|last| last.clone())
    }
}

impl Default for ResponsePresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseSink for ResponsePresenter {
    fn present(&self, data: &ResponseBody, status: u16, elapsed_ms: u64) {
        let rendered = self.format(data, status, elapsed_ms);
        let mut stdout = std::io::stdout().lock();
        let _ = stdout.write_all(rendered.as_bytes());
        let _ = stdout.flush();

        if let Ok(mut last) = self.last.lock() {
            *last = Some(data.pretty());
        }
    }
}

/// Discards responses; used when stdout carries machine-readable output
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl ResponseSink for NullSink {
    fn present(&self, _data: &ResponseBody, _status: u16, _elapsed_ms: u64) {}
}

/// Keeps every presented response in memory
#[cfg(test)]
#[derive(Default)]
pub struct RecordingSink {
    seen: Mutex<Vec<(ResponseBody, u16)>>,
}

#[cfg(test)]
impl RecordingSink {
    pub fn statuses(&self) -> Vec<u16> {
        self.seen
            .lock()
            .map(|seen| seen.iter().map(|(_, s)| *s).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
impl ResponseSink for RecordingSink {
    fn present(&self, data: &ResponseBody, status: u16, _elapsed_ms: u64) {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push((data.clone(), status));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_class() {
        assert_eq!(StatusClass::of(200), StatusClass::Success);
        assert_eq!(StatusClass::of(299), StatusClass::Success);
        assert_eq!(StatusClass::of(404), StatusClass::ClientIssue);
        assert_eq!(StatusClass::of(500), StatusClass::ServerIssue);
        assert_eq!(StatusClass::of(302), StatusClass::ServerIssue);
    }

    #[test]
    fn test_status_text_fallback() {
        assert_eq!(status_text(422), "Unprocessable Entity");
        assert_eq!(status_text(418), "Unknown Status");
    }

    #[test]
    fn test_format_json_is_indented() {
        let presenter = ResponsePresenter::new().no_color();
        let body = ResponseBody::Json(json!({"sessions": [], "count": 0}));
        let output = presenter.format(&body, 200, 42);
        assert!(output.contains("200 OK  [success]  42ms"));
        assert!(output.contains("│   \"count\": 0"));
    }

    #[test]
    fn test_format_text_as_is() {
        let presenter = ResponsePresenter::new().no_color();
        let body = ResponseBody::Text("Service Unavailable".to_string());
        let output = presenter.format(&body, 503, 7);
        assert!(output.contains("[server-issue]"));
        assert!(output.contains("│ Service Unavailable"));
    }

    #[test]
    fn test_present_remembers_last_body() {
        let presenter = ResponsePresenter::new().no_color();
        assert!(presenter.last().is_none());
        presenter.present(&ResponseBody::Text("pong".to_string()), 200, 1);
        assert_eq!(presenter.last().as_deref(), Some("pong"));
    }
}
