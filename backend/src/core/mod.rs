//! Core building blocks shared by every calibration component

pub mod run_range;

pub use run_range::{RunRangeMatch, RunRangeRule, RunRangeTable, OPEN_BOUND};
