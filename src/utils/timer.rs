//! Timer utilities
//!
//! Wall-clock timing for requests and runner steps.

use std::time::{Duration, Instant};

/// Simple timer for measuring elapsed time
#[derive(Debug)]
pub struct Timer {
    start: Instant,
    label: String,
}

impl Timer {
    /// Create and start a new timer
    pub fn start(label: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            label: label.into(),
        }
    }

    /// Get elapsed time
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Get elapsed time in milliseconds
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed().as_millis() as u64
    }

    /// Stop timer and return elapsed milliseconds
    ///
    /// Slow operations are flagged in the debug log.
    pub fn stop(self) -> u64 {
        let elapsed_ms = self.elapsed_ms();
        if elapsed_ms > 5000 {
            tracing::warn!("{} completed in {}ms", self.label, elapsed_ms);
        } else {
            tracing::debug!("{} completed in {}ms", self.label, elapsed_ms);
        }
        elapsed_ms
    }
}
