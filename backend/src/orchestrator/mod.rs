//! Orchestrator - per-event calibration sequencing
//!
//! See `engine.rs` for the implementation.

pub mod engine;

pub use engine::Orchestrator;
