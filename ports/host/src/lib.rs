//! Host-side peripherals for running the timer console without hardware.
//!
//! [`SimTimer`] models a set of free-running counters with compare channels
//! whose interrupts are delivered from a worker thread per device, and
//! [`SimGpio`] records every probe transition so tests can count them.

mod gpio;
mod timer;

pub use gpio::SimGpio;
pub use timer::{SimTimer, SimTimerConfig};
