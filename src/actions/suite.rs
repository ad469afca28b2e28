//! Default read-only smoke suite

use super::{general, iot, weighing, SessionContext};
use crate::executor::{run_sequential, TestStep};
use crate::models::{Endpoint, SuiteSummary};

/// Endpoints exercised by the default suite, in run order
pub const DEFAULT_SUITE: [Endpoint; 3] = [
    Endpoint::HealthCheck,
    Endpoint::WeighingHistory,
    Endpoint::ActiveSession,
];

/// Steps of the default suite; nothing runs until the runner awaits them
pub fn default_suite(ctx: &SessionContext) -> Vec<TestStep<'_>> {
    DEFAULT_SUITE
        .iter()
        .filter_map(|&endpoint| read_only_step(ctx, endpoint))
        .collect()
}

/// Step for an endpoint that needs no input
fn read_only_step(ctx: &SessionContext, endpoint: Endpoint) -> Option<TestStep<'_>> {
    let name = endpoint.name();
    match endpoint {
        Endpoint::HealthCheck => Some(TestStep::new(name, general::health_check(ctx))),
        Endpoint::WeighingHistory => Some(TestStep::new(name, weighing::get_history(ctx))),
        Endpoint::ActiveSession => Some(TestStep::new(name, iot::get_active_session(ctx))),
        _ => None,
    }
}

pub async fn run_default_suite(ctx: &SessionContext, delay_ms: u64) -> SuiteSummary {
    ctx.notifier.info("Starting comprehensive API test...");
    let summary = run_sequential(default_suite(ctx), delay_ms).await;
    ctx.notifier.info("Comprehensive API test completed");
    summary
}
