//! Domain types: bars and signal records.

mod bar;
mod signal;

pub use bar::Bar;
pub use signal::{Direction, SignalRecord};
