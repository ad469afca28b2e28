//! Test execution engine
//!
//! Runs endpoint actions one after another and collects their outcomes.

mod runner;

pub use runner::{run_sequential, TestStep, DEFAULT_DELAY_MS};
