//! Core library for the `pummel` CLI.
//!
//! A bounded-concurrency HTTP load generator: it fires GET requests at a
//! single target URL for a fixed duration, keeping at most a configured
//! number of requests in flight, and reports aggregate success/failure
//! counts when the run ends. The binary in `main.rs` is the user-facing
//! interface; these modules are also driven directly by the integration
//! tests.

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod runner;
pub mod stats;
