//! Outcome models for sequential test runs
//!
//! Defines per-step outcomes and the suite summary.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::http::ResponseBody;

/// Result of one step in a sequential run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TestOutcome {
    pub name: String,
    pub success: bool,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ResponseBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TestOutcome {
    pub fn pass(name: impl Into<String>, duration_ms: u64, status: u16, result: ResponseBody) -> Self {
        Self {
            name: name.into(),
            success: true,
            duration_ms,
            status: Some(status),
            result: Some(result),
            error: None,
        }
    }

    pub fn fail(name: impl Into<String>, duration_ms: u64, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            success: false,
            duration_ms,
            status: None,
            result: None,
            error: Some(error.into()),
        }
    }

    pub fn with_status(mut self, status: Option<u16>) -> Self {
        self.status = status;
        self
    }

    pub fn symbol(&self) -> &'static str {
        if self.success {
            "✓"
        } else {
            "✗"
        }
    }
}

impl fmt::Display for TestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} [{}ms]", self.symbol(), self.name, self.duration_ms)?;
        if let Some(err) = &self.error {
            write!(f, " - {err}")?;
        }
        Ok(())
    }
}

/// Summary of a sequential run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SuiteSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub total_duration_ms: u64,
    pub outcomes: Vec<TestOutcome>,
}

impl SuiteSummary {
    pub fn new(outcomes: Vec<TestOutcome>) -> Self {
        let total = outcomes.len();
        let passed = outcomes.iter().filter(|o| o.success).count();
        let total_duration_ms = outcomes.iter().map(|o| o.duration_ms).sum();

        Self {
            total,
            passed,
            failed: total - passed,
            total_duration_ms,
            outcomes,
        }
    }

    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.passed as f64 / self.total as f64) * 100.0
        }
    }

    pub fn is_all_passed(&self) -> bool {
        self.passed == self.total
    }
}

impl fmt::Display for SuiteSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        for outcome in &self.outcomes {
            writeln!(f, "  {outcome}")?;
        }
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(
            f,
            "Test Summary: {} passed, {} failed ({:.1}%) in {}ms",
            self.passed,
            self.failed,
            self.pass_rate(),
            self.total_duration_ms
        )
    }
}
