//! Canonical endpoint table for the Lokatani backend
//!
//! One entry per backend operation the console can exercise.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

use crate::auth::AuthMode;

/// Backend operations, in the order the console lists them
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    // Weighing flow (1-4)
    InitiateSession,
    SendWeight,
    IdentifyVegetable,
    CompleteSession,

    // Side features (5-8)
    ActiveSession,
    WeighingHistory,
    WeighingSession,
    SendStatus,

    // General (9)
    HealthCheck,
}

/// How an endpoint picks its credentials
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthRequirement {
    Fixed(AuthMode),
    /// Deployment-specific, taken from the telemetry auth setting
    Telemetry,
}

impl Endpoint {
    pub fn number(&self) -> u8 {
        match self {
            Endpoint::InitiateSession => 1,
            Endpoint::SendWeight => 2,
            Endpoint::IdentifyVegetable => 3,
            Endpoint::CompleteSession => 4,
            Endpoint::ActiveSession => 5,
            Endpoint::WeighingHistory => 6,
            Endpoint::WeighingSession => 7,
            Endpoint::SendStatus => 8,
            Endpoint::HealthCheck => 9,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::InitiateSession => "Initiate Session",
            Endpoint::SendWeight => "Send Weight",
            Endpoint::IdentifyVegetable => "Identify Vegetable",
            Endpoint::CompleteSession => "Complete Session",
            Endpoint::ActiveSession => "Get Active Session",
            Endpoint::WeighingHistory => "Get Weighing History",
            Endpoint::WeighingSession => "Get Weighing Session",
            Endpoint::SendStatus => "Send Status",
            Endpoint::HealthCheck => "Health Check",
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            Endpoint::InitiateSession
            | Endpoint::SendWeight
            | Endpoint::IdentifyVegetable
            | Endpoint::CompleteSession => "Weighing Flow",
            Endpoint::HealthCheck => "General",
            _ => "Side Features",
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Endpoint::InitiateSession
            | Endpoint::SendWeight
            | Endpoint::IdentifyVegetable
            | Endpoint::CompleteSession
            | Endpoint::SendStatus => Method::POST,
            _ => Method::GET,
        }
    }

    /// Path template; `{id}` marks the session id slot
    pub fn path_template(&self) -> &'static str {
        match self {
            Endpoint::InitiateSession => "/api/weighing/initiate",
            Endpoint::SendWeight => "/api/iot/weight",
            Endpoint::IdentifyVegetable => "/api/ml/identify-vegetable",
            Endpoint::CompleteSession => "/api/weighing/complete",
            Endpoint::ActiveSession => "/api/iot/active-session",
            Endpoint::WeighingHistory => "/api/weighing/history",
            Endpoint::WeighingSession => "/api/weighing/{id}",
            Endpoint::SendStatus => "/api/iot/status",
            Endpoint::HealthCheck => "/",
        }
    }

    /// Concrete path, filling the session id slot when there is one.
    /// The id always stays a single segment: `/`, `?` and `#` are escaped.
    pub fn path(&self, id: Option<&str>) -> String {
        let template = self.path_template();
        match id {
            Some(id) => template.replace("{id}", &path_segment(id.trim())),
            None => template.to_string(),
        }
    }

    pub fn auth(&self) -> AuthRequirement {
        match self {
            Endpoint::SendWeight | Endpoint::ActiveSession => AuthRequirement::Telemetry,
            Endpoint::SendStatus | Endpoint::HealthCheck => AuthRequirement::Fixed(AuthMode::None),
            _ => AuthRequirement::Fixed(AuthMode::BearerToken),
        }
    }

    /// Auth mode to use given the deployment's telemetry setting
    pub fn auth_mode(&self, telemetry: AuthMode) -> AuthMode {
        match self.auth() {
            AuthRequirement::Fixed(mode) => mode,
            AuthRequirement::Telemetry => telemetry,
        }
    }

    pub fn auth_label(&self) -> &'static str {
        match self.auth() {
            AuthRequirement::Fixed(AuthMode::None) => "none",
            AuthRequirement::Fixed(AuthMode::ApiKey) => "api-key",
            AuthRequirement::Fixed(AuthMode::BearerToken) => "bearer",
            AuthRequirement::Telemetry => "telemetry",
        }
    }

    pub fn all() -> Vec<Endpoint> {
        vec![
            Endpoint::InitiateSession,
            Endpoint::SendWeight,
            Endpoint::IdentifyVegetable,
            Endpoint::CompleteSession,
            Endpoint::ActiveSession,
            Endpoint::WeighingHistory,
            Endpoint::WeighingSession,
            Endpoint::SendStatus,
            Endpoint::HealthCheck,
        ]
    }
}

/// `raw` percent-encoded as one path segment; `.` and `..` come back empty
fn path_segment(raw: &str) -> String {
    let Ok(mut url) = Url::parse("http://segment.invalid/") else {
        return String::new();
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.clear().push(raw);
    }
    url.path().trim_start_matches('/').to_string()
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({})",
            self.method(),
            self.path_template(),
            self.name()
        )
    }
}
