//! Application layer for MindSketch.
//!
//! This crate provides the use case implementation that coordinates the
//! domain and infrastructure layers: the test flow from capture through
//! analysis to the archived result.

pub mod engine;
pub mod test_flow;

pub use engine::SketchEngine;
pub use test_flow::TestFlowUseCase;
