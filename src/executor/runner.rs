//! Sequential test runner
//!
//! Awaits each step to completion, then pauses before the next one. A failed
//! step is recorded and the run carries on.

use futures::future::{FutureExt, LocalBoxFuture};
use std::future::Future;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::http::{ApiError, RequestResult};
use crate::models::{SuiteSummary, TestOutcome};
use crate::utils::Timer;

/// Pause used by the default suite
pub const DEFAULT_DELAY_MS: u64 = 1000;

/// Deferred action; nothing runs until the runner awaits it
pub type ActionFuture<'a> = LocalBoxFuture<'a, Result<RequestResult, ApiError>>;

/// Named step of a sequential run
pub struct TestStep<'a> {
    pub name: String,
    pub action: ActionFuture<'a>,
}

impl<'a> TestStep<'a> {
    pub fn new<F>(name: impl Into<String>, action: F) -> Self
    where
        F: Future<Output = Result<RequestResult, ApiError>> + 'a,
    {
        Self {
            name: name.into(),
            action: action.boxed_local(),
        }
    }
}

/// Runs steps one after another with a fixed delay between them
pub struct SequentialRunner {
    delay: Duration,
}

impl SequentialRunner {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
        }
    }

    /// Run every step in order and collect outcomes in the same order
    pub async fn run(&self, steps: Vec<TestStep<'_>>) -> SuiteSummary {
        let total = steps.len();
        info!("Starting sequential test run with {} tests", total);

        let mut outcomes = Vec::with_capacity(total);

        for (index, step) in steps.into_iter().enumerate() {
            info!("Running test {}/{}: {}", index + 1, total, step.name);

            let timer = Timer::start(step.name.as_str());
            let result = step.action.await;
            let duration_ms = timer.stop();

            let outcome = match result {
                Ok(result) => {
                    info!("{} - SUCCESS ({}ms)", step.name, duration_ms);
                    TestOutcome::pass(step.name, duration_ms, result.status, result.data)
                }
                Err(e) => {
                    error!("{} - FAILED: {}", step.name, e);
                    TestOutcome::fail(step.name, duration_ms, e.to_string()).with_status(e.status())
                }
            };
            outcomes.push(outcome);

            if index + 1 < total && !self.delay.is_zero() {
                info!("Waiting {}ms before next test...", self.delay.as_millis());
                tokio::time::sleep(self.delay).await;
            }
        }

        let summary = SuiteSummary::new(outcomes);
        if summary.failed == 0 {
            info!(
                "Test Summary: {} passed, {} failed",
                summary.passed, summary.failed
            );
        } else {
            warn!(
                "Test Summary: {} passed, {} failed",
                summary.passed, summary.failed
            );
        }
        summary
    }
}

/// Convenience wrapper around [`SequentialRunner::run`]
pub async fn run_sequential(steps: Vec<TestStep<'_>>, delay_ms: u64) -> SuiteSummary {
    SequentialRunner::new(delay_ms).run(steps).await
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::http::ResponseBody;
    use std::cell::RefCell;
    use std::time::Instant;

    fn ok_result() -> Result<RequestResult, ApiError> {
        Ok(RequestResult {
            data: ResponseBody::Text("ok".to_string()),
            status: 200,
            elapsed_ms: 1,
        })
    }

    #[tokio::test]
    async fn test_failure_does_not_abort_and_order_is_kept() {
        let steps = vec![
            TestStep::new("A", async { Err(ApiError::http("boom", 500)) }),
            TestStep::new("B", async { ok_result() }),
        ];

        let start = Instant::now();
        let summary = run_sequential(steps, 50).await;

        let names: Vec<_> = summary.outcomes.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert!(!summary.outcomes[0].success);
        assert_eq!(summary.outcomes[0].status, Some(500));
        assert_eq!(summary.outcomes[0].error.as_deref(), Some("boom"));
        assert!(summary.outcomes[1].success);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 1);
        // One pause between the two steps
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_no_pause_after_last_step() {
        let steps = vec![TestStep::new("only", async { ok_result() })];
        let start = Instant::now();
        let summary = run_sequential(steps, 5_000).await;
        assert!(start.elapsed() < Duration::from_millis(1_000));
        assert!(summary.is_all_passed());
    }

    #[tokio::test]
    async fn test_steps_never_overlap() {
        let log = RefCell::new(Vec::new());
        let step = |name: &'static str| {
            let log = &log;
            TestStep::new(name, async move {
                log.borrow_mut().push(format!("start {name}"));
                tokio::time::sleep(Duration::from_millis(5)).await;
                log.borrow_mut().push(format!("end {name}"));
                ok_result()
            })
        };

        let steps = vec![step("A"), step("B"), step("C")];
        // Building the steps must not start them
        assert!(log.borrow().is_empty());

        run_sequential(steps, 0).await;
        assert_eq!(
            *log.borrow(),
            vec!["start A", "end A", "start B", "end B", "start C", "end C"]
        );
    }
}
