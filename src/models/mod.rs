//! Data models for the API tester
//!
//! Endpoint table, run outcomes and sample payloads.

mod endpoint;
mod outcome;
mod sample;

pub use endpoint::Endpoint;
pub use outcome::{SuiteSummary, TestOutcome};
pub use sample::SamplePayloads;
