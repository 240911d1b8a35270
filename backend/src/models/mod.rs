//! Record, output and event-log types

pub mod event;
pub mod output;
pub mod record;

pub use event::{CalibrationEvent, CalibrationLog};
pub use output::{EventOutput, ObjectOutput, MISSING_DENSITY};
pub use record::{energy_from, EventRecord, RawObject};
