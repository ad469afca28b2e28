//! Request executor for the backend API
//!
//! Builds the final request from the session configuration, sends it, times
//! it and classifies the outcome. Every call is single-shot.

use reqwest::{
    header::CONTENT_TYPE,
    multipart::{Form, Part},
    Client, Method, Response,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::ApiError;
use crate::auth::{self, Headers, JSON_MIME};
use crate::config::Configuration;
use crate::output::{status_text, ResponseSink};
use crate::utils::Timer;

/// Request payload
#[derive(Clone, Debug, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    /// JSON (or other) text sent verbatim
    Text(String),
    Multipart(MultipartForm),
}

/// One field of a multipart form
#[derive(Clone, Debug)]
pub enum FormPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        mime: String,
        bytes: Vec<u8>,
    },
}

/// Owned description of a multipart body, converted at send time
#[derive(Clone, Debug, Default)]
pub struct MultipartForm {
    pub parts: Vec<FormPart>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.parts.push(FormPart::File {
            name: name.into(),
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        });
        self
    }

    fn describe(&self) -> String {
        self.parts
            .iter()
            .map(|part| match part {
                FormPart::Text { name, value } => format!("{name}={value}"),
                FormPart::File {
                    name,
                    file_name,
                    mime,
                    bytes,
                } => format!("{name}={file_name} ({mime}, {} bytes)", bytes.len()),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn into_form(self) -> Result<Form, ApiError> {
        let mut form = Form::new();
        for part in self.parts {
            form = match part {
                FormPart::Text { name, value } => form.text(name, value),
                FormPart::File {
                    name,
                    file_name,
                    mime,
                    bytes,
                } => {
                    let part = Part::bytes(bytes)
                        .file_name(file_name)
                        .mime_str(&mime)
                        .map_err(|_| ApiError::validation(format!("Invalid MIME type: {mime}")))?;
                    form.part(name, part)
                }
            };
        }
        Ok(form)
    }
}

/// Caller-supplied options; unset fields fall back to the defaults
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    pub method: Option<Method>,
    pub headers: Option<Headers>,
    pub body: RequestBody,
}

impl RequestOptions {
    #[cfg(test)]
    pub fn get() -> Self {
        Self::default().method(Method::GET)
    }

    #[cfg(test)]
    pub fn post() -> Self {
        Self::default().method(Method::POST)
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers = Some(headers);
        self
    }

    pub fn json(mut self, body: impl Into<String>) -> Self {
        self.body = RequestBody::Text(body.into());
        self
    }

    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }
}

/// Fully resolved request, built fresh for every call
#[derive(Clone, Debug)]
pub struct RequestSpec {
    pub method: Method,
    pub url: String,
    pub headers: Headers,
    pub body: RequestBody,
}

/// Response body, decided once from the response content type
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ResponseBody {
    Json(serde_json::Value),
    Text(String),
}

impl ResponseBody {
    /// Indented JSON or raw text
    pub fn pretty(&self) -> String {
        match self {
            ResponseBody::Json(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            ResponseBody::Text(text) => text.clone(),
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(_) => None,
        }
    }

    /// Top-level string field of a JSON object body
    pub fn field(&self, name: &str) -> Option<&str> {
        self.as_json()?.get(name)?.as_str()
    }
}

impl fmt::Display for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pretty())
    }
}

/// Outcome of a successful call
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RequestResult {
    pub data: ResponseBody,
    pub status: u16,
    pub elapsed_ms: u64,
}

/// Executor for backend API calls
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    timeout_secs: u64,
    presenter: Arc<dyn ResponseSink>,
}

impl ApiClient {
    /// Create client with custom timeout
    pub fn with_timeout(timeout_secs: u64, presenter: Arc<dyn ResponseSink>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            timeout_secs,
            presenter,
        })
    }

    /// Validate configuration, join the URL and merge options over defaults
    pub fn build_spec(
        config: &Configuration,
        path: &str,
        options: RequestOptions,
    ) -> Result<RequestSpec, ApiError> {
        config.check()?;

        let base = config.base_url();
        let url = format!("{}{}", base.trim_end_matches('/'), path);

        // Shallow merge: caller headers replace the default set wholesale.
        let headers = options.headers.unwrap_or_else(|| {
            let mut defaults = Headers::new();
            defaults.insert(auth::CONTENT_TYPE.to_string(), JSON_MIME.to_string());
            defaults
        });

        Ok(RequestSpec {
            method: options.method.unwrap_or(Method::GET),
            url,
            headers,
            body: options.body,
        })
    }

    /// Run the full request pipeline against `path`
    pub async fn execute(
        &self,
        config: &Configuration,
        path: &str,
        options: RequestOptions,
    ) -> Result<RequestResult, ApiError> {
        let spec = match Self::build_spec(config, path, options) {
            Ok(spec) => spec,
            Err(e) => {
                error!("Request aborted: {}", e);
                return Err(e);
            }
        };
        self.send(spec).await
    }

    /// Send a resolved request
    pub async fn send(&self, spec: RequestSpec) -> Result<RequestResult, ApiError> {
        info!("Making {} request to: {}", spec.method, spec.url);
        debug!(
            "Request headers: {}",
            serde_json::to_string_pretty(&auth::redact(&spec.headers)).unwrap_or_default()
        );

        let mut builder = self.client.request(spec.method.clone(), &spec.url);
        for (name, value) in &spec.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match spec.body {
            RequestBody::Empty => builder,
            RequestBody::Text(body) => {
                debug!("Request body: {}", body);
                builder.body(body)
            }
            RequestBody::Multipart(form) => {
                debug!("Request body: multipart form [{}]", form.describe());
                builder.multipart(form.into_form()?)
            }
        };

        let timer = Timer::start(format!("{} {}", spec.method, spec.url));
        let sent = builder.send().await;
        let elapsed_ms = timer.elapsed_ms();

        let response = match sent {
            Ok(response) => response,
            Err(e) => {
                if e.is_timeout() {
                    warn!("Request timed out after {}s", self.timeout_secs);
                }
                let err = ApiError::from(e);
                error!("Request failed after {}ms: {}", elapsed_ms, err);
                return Err(err);
            }
        };

        let status = response.status();
        let reason = status_text(status.as_u16());
        info!("Response status: {} {}", status.as_u16(), reason);
        info!("Response time: {}ms", elapsed_ms);

        let data = decode_body(response).await.inspect_err(|e| {
            error!("Request failed: {}", e);
        })?;
        debug!("Response data: {}", data.pretty());

        self.presenter.present(&data, status.as_u16(), elapsed_ms);

        if !status.is_success() {
            let message = error_message(&data, status.as_u16(), reason);
            error!("Request failed: {}", message);
            return Err(ApiError::http(message, status.as_u16()));
        }

        Ok(RequestResult {
            data,
            status: status.as_u16(),
            elapsed_ms,
        })
    }
}

/// JSON when the response says so, raw text otherwise
async fn decode_body(response: Response) -> Result<ResponseBody, ApiError> {
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.to_ascii_lowercase().contains(JSON_MIME))
        .unwrap_or(false);

    if is_json {
        let bytes = response.bytes().await?;
        let value =
            serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(ResponseBody::Json(value))
    } else {
        Ok(ResponseBody::Text(response.text().await?))
    }
}

/// The body's `error` field when present, else `HTTP <status>: <text>`
fn error_message(data: &ResponseBody, status: u16, status_text: &str) -> String {
    let from_body = data
        .as_json()
        .and_then(|value| value.as_object())
        .and_then(|object| object.get("error"))
        .and_then(|error| match error {
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            serde_json::Value::Null | serde_json::Value::Bool(false) => None,
            serde_json::Value::String(_) => None,
            other => Some(other.to_string()),
        });

    from_body.unwrap_or_else(|| format!("HTTP {status}: {status_text}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{compose_headers, strip_content_type, AuthMode, CONTENT_TYPE as CT};
    use crate::output::{NullSink, RecordingSink};
    use serde_json::json;
    use crate::http::mock::spawn_mock_server;
    use tokio_test::assert_ok;

    fn client() -> ApiClient {
        ApiClient::with_timeout(5, Arc::new(NullSink)).unwrap()
    }

    #[test]
    fn test_build_spec_joins_url_and_applies_defaults() {
        let config = Configuration::new("http://x/");
        let spec = ApiClient::build_spec(&config, "/api/weighing/history", RequestOptions::default())
            .unwrap();
        assert_eq!(spec.url, "http://x/api/weighing/history");
        assert_eq!(spec.method, Method::GET);
        assert_eq!(spec.headers.get(CT).map(String::as_str), Some(JSON_MIME));
    }

    #[test]
    fn test_build_spec_caller_headers_replace_defaults() {
        let config = Configuration::new("http://x");
        let mut headers = Headers::new();
        headers.insert("Authorization".to_string(), "Bearer t".to_string());
        let spec =
            ApiClient::build_spec(&config, "/", RequestOptions::post().headers(headers)).unwrap();
        assert_eq!(spec.method, Method::POST);
        assert_eq!(spec.headers.len(), 1);
        assert!(!spec.headers.contains_key(CT));
    }

    #[test]
    fn test_build_spec_rejects_invalid_configuration() {
        let err = ApiClient::build_spec(&Configuration::new(""), "/", RequestOptions::default())
            .unwrap_err();
        assert!(matches!(err, ApiError::Configuration(_)));
    }

    #[test]
    fn test_multipart_spec_has_no_json_content_type() {
        let config = Configuration::new("http://x").with_token("tok");
        let mut headers = compose_headers(&config, AuthMode::BearerToken).unwrap();
        strip_content_type(&mut headers);
        let form = MultipartForm::new().file("image", "a.jpg", "image/jpeg", vec![1, 2, 3]);
        let spec = ApiClient::build_spec(
            &config,
            "/api/ml/identify-vegetable",
            RequestOptions::post().headers(headers).multipart(form),
        )
        .unwrap();
        assert!(matches!(spec.body, RequestBody::Multipart(_)));
        assert!(spec.headers.keys().all(|k| !k.eq_ignore_ascii_case(CT)));
    }

    #[test]
    fn test_error_message_rules() {
        let body = ResponseBody::Json(json!({"error": "not found"}));
        assert_eq!(error_message(&body, 404, "Not Found"), "not found");

        let body = ResponseBody::Json(json!({"message": "nope"}));
        assert_eq!(error_message(&body, 400, "Bad Request"), "HTTP 400: Bad Request");

        let body = ResponseBody::Json(json!(["error"]));
        assert_eq!(error_message(&body, 422, "Unprocessable Entity"), "HTTP 422: Unprocessable Entity");

        let body = ResponseBody::Text("boom".to_string());
        assert_eq!(
            error_message(&body, 500, "Internal Server Error"),
            "HTTP 500: Internal Server Error"
        );
    }

    #[test]
    fn test_response_body_serializes_tagged() {
        let body = ResponseBody::Text("ok".to_string());
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"kind": "text", "value": "ok"})
        );
    }

    #[tokio::test]
    async fn test_execute_success_json() {
        let (base, server) =
            spawn_mock_server("200 OK", "application/json", r#"{"sessions":[]}"#).await;
        let sink = Arc::new(RecordingSink::default());
        let client = ApiClient::with_timeout(5, sink.clone()).unwrap();
        let config = Configuration::new(base);

        let result = assert_ok!(
            client
                .execute(&config, "/api/weighing/history", RequestOptions::get())
                .await
        );
        assert_eq!(result.status, 200);
        assert_eq!(result.data, ResponseBody::Json(json!({"sessions": []})));

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /api/weighing/history HTTP/1.1"));
        assert_eq!(sink.statuses(), vec![200]);
    }

    #[tokio::test]
    async fn test_execute_http_error_uses_body_error_field() {
        let (base, _server) =
            spawn_mock_server("404 Not Found", "application/json", r#"{"error":"not found"}"#)
                .await;
        let sink = Arc::new(RecordingSink::default());
        let client = ApiClient::with_timeout(5, sink.clone()).unwrap();

        let err = client
            .execute(&Configuration::new(base), "/api/weighing/abc", RequestOptions::get())
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::http("not found", 404));
        assert_eq!(err.to_string(), "not found");
        // Presented even though the call failed
        assert_eq!(sink.statuses(), vec![404]);
    }

    #[tokio::test]
    async fn test_execute_http_error_plain_text() {
        let (base, _server) = spawn_mock_server(
            "500 Internal Server Error",
            "text/plain; charset=utf-8",
            "something broke",
        )
        .await;

        let err = client()
            .execute(&Configuration::new(base), "/", RequestOptions::get())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "HTTP 500: Internal Server Error");
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn test_http_error_names_status_like_the_panel() {
        for (status_line, status) in [("409 Conflict", 409), ("418 I'm a teapot", 418)] {
            let (base, _server) = spawn_mock_server(status_line, "text/plain", "no").await;
            let err = client()
                .execute(&Configuration::new(base), "/", RequestOptions::get())
                .await
                .unwrap_err();
            assert_eq!(err.to_string(), format!("HTTP {status}: {}", status_text(status)));
        }
        assert_eq!(status_text(409), "Conflict");
        assert_eq!(status_text(418), "Unknown Status");
    }

    #[tokio::test]
    async fn test_execute_text_body_success() {
        let (base, _server) = spawn_mock_server("200 OK", "text/html", "<h1>up</h1>").await;
        let result = client()
            .execute(&Configuration::new(base), "/", RequestOptions::get())
            .await
            .unwrap();
        assert_eq!(result.data, ResponseBody::Text("<h1>up</h1>".to_string()));
    }

    #[tokio::test]
    async fn test_execute_invalid_json_is_fatal() {
        let (base, _server) = spawn_mock_server("200 OK", "application/json", "{not json").await;
        let err = client()
            .execute(&Configuration::new(base), "/", RequestOptions::get())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn test_execute_connection_refused_is_network_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client()
            .execute(
                &Configuration::new(format!("http://{addr}")),
                "/",
                RequestOptions::get(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
    }

    #[tokio::test]
    async fn test_execute_invalid_config_makes_no_call() {
        let sink = Arc::new(RecordingSink::default());
        let client = ApiClient::with_timeout(5, sink.clone()).unwrap();
        let err = client
            .execute(&Configuration::new("example.com"), "/", RequestOptions::get())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Configuration(_)));
        assert!(sink.statuses().is_empty());
    }

    #[tokio::test]
    async fn test_execute_sends_body_and_headers() {
        let (base, server) =
            spawn_mock_server("201 Created", "application/json", r#"{"session_id":"s-1"}"#).await;
        let config = Configuration::new(base).with_token("tok");
        let headers = compose_headers(&config, AuthMode::BearerToken).unwrap();

        let result = client()
            .execute(
                &config,
                "/api/weighing/initiate",
                RequestOptions::post()
                    .headers(headers)
                    .json(r#"{"session_type":"rompes"}"#),
            )
            .await
            .unwrap();
        assert_eq!(result.status, 201);
        assert_eq!(result.data.field("session_id"), Some("s-1"));

        let request = server.await.unwrap().to_lowercase();
        assert!(request.starts_with("post /api/weighing/initiate"));
        assert!(request.contains("authorization: bearer tok"));
        assert!(request.contains("content-type: application/json"));
        assert!(request.contains(r#"{"session_type":"rompes"}"#));
    }

    #[tokio::test]
    async fn test_execute_multipart_wire_headers() {
        let (base, server) =
            spawn_mock_server("200 OK", "application/json", r#"{"label":"kangkung"}"#).await;
        let config = Configuration::new(base).with_token("tok");
        let mut headers = compose_headers(&config, AuthMode::BearerToken).unwrap();
        strip_content_type(&mut headers);
        let form = MultipartForm::new()
            .file("image", "leaf.png", "image/png", vec![0x89, 0x50, 0x4e, 0x47])
            .text("session_id", "s-9");

        client()
            .execute(
                &config,
                "/api/ml/identify-vegetable",
                RequestOptions::post().headers(headers).multipart(form),
            )
            .await
            .unwrap();

        let request = server.await.unwrap().to_lowercase();
        assert!(request.contains("content-type: multipart/form-data; boundary="));
        assert!(!request.contains("content-type: application/json"));
        assert!(request.contains("name=\"image\"; filename=\"leaf.png\""));
        assert!(request.contains("name=\"session_id\""));
    }
}
