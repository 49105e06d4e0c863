//! Transmission chain integration tests.
//!
//! Each test builds a full chain (region registry, event queue, module
//! manager) from a TOML scenario, injects the configured messages,
//! drains the queue to completion, and asserts on the outcome stream.
//!
//! Scenario arithmetic convention: target_delay is 1 s so a message's
//! bandwidth demand in bps equals its payload in bits, and base delays
//! are zero unless a test is about them.

mod infra;

mod capacity;
mod ordering;
mod scenarios;
