//! Sample telemetry payloads for manual testing

use chrono::{Duration, Utc};
use rand::Rng;
use serde::Serialize;
use serde_json::{json, Value};

/// Generated request bodies, ready to paste into `weight` / `status`
#[derive(Clone, Debug, Serialize)]
pub struct SamplePayloads {
    pub weight: Value,
    pub status: Value,
}

impl SamplePayloads {
    pub fn generate(device_id: &str) -> Self {
        let mut rng = rand::rng();
        let now = Utc::now();

        let weight = json!({
            "device_id": device_id,
            "weight": round_to(rng.random_range(0.5..5.5), 2),
            "unit": "kg",
            "timestamp": now.to_rfc3339(),
            "session_id": format!("session_{}", now.timestamp_millis()),
            "temperature": round_to(rng.random_range(20.0..30.0), 1),
            "humidity": round_to(rng.random_range(60.0..80.0), 1),
        });

        let calibration_age = Duration::seconds(rng.random_range(0..7 * 24 * 60 * 60));
        let status = json!({
            "device_id": device_id,
            "status": "online",
            "battery_level": rng.random_range(0..100),
            "signal_strength": rng.random_range(-80..-40),
            "firmware_version": "1.2.3",
            "last_calibration": (now - calibration_age).to_rfc3339(),
            "timestamp": now.to_rfc3339(),
        });

        Self { weight, status }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
