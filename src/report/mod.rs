//! Snapshot rendering.
//!
//! JSON and markdown documents for the published dashboard, plus the
//! terminal summary printed after a one-shot run.

pub mod generator;

pub use generator::*;
