//! Python bindings
//!
//! Thin wrappers exposing run-range resolution and exclusion-map queries to
//! Python analysis scripts.

pub mod run_range;
pub mod veto;
