//! Testing infrastructure for spanweave integration tests.
//!
//! - `fixtures`: span builders and OpenInference export records
//! - `assertions`: forest and CLI output checks
//! - `world`: isolated temp environment for CLI runs

pub mod assertions;
pub mod fixtures;
pub mod world;

pub use fixtures::{SampleFiles, SpanBuilder};
pub use world::TestWorld;
