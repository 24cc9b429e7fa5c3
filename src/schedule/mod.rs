//! Pure scheduling logic: text to shifts, shifts to calendar writes, shifts
//! to the wake-up alarm. Nothing in here performs I/O.

pub mod alarm;
pub mod models;
pub mod parser;
pub mod reconcile;

pub use alarm::{compute_alarm, AlarmTime};
pub use models::{CalendarMutation, ExistingEvent, ReconciliationOutcome, ShiftRecord};
pub use parser::{parse, parse_with_today};
pub use reconcile::reconcile;
