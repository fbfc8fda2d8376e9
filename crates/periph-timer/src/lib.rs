//! # periph-timer
//!
//! Command set of an interactive diagnostic console for timer drivers. Each
//! driver operation is exposed as a line-oriented command; `timer_set` and
//! `timer_set_absolute` block the console until the armed channel's
//! interrupt has fired.
//!
//! ## Module Overview
//! - [`gate`]     – Binary lock handed between command and interrupt.
//! - [`probe`]    – Optional GPIO timing probe and per-device pin table.
//! - [`callback`] – The three selectable interrupt callbacks.
//! - [`executor`] – Typed timer operations, including the blocking arm.
//! - [`commands`] – Argument parsing for each console command.
//! - [`dispatch`] – Command table and `Success:`/`Error:` reporting.
//!
//! The driver and GPIO are reached only through the `hal` traits, so a
//! [`TimerTester`] can be built over real hardware or the host simulation.

pub mod args;
pub mod callback;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod executor;
pub mod gate;
pub mod probe;
mod sync;

pub use args::DeviceIndex;
pub use callback::{CallbackBinding, CallbackKind};
pub use commands::Reply;
pub use config::{TesterConfig, TesterConfigBuilder};
pub use dispatch::{execute, Dispatch, ShellCommand, COMMANDS};
pub use error::{CommandError, SetupError};
pub use executor::{ArmMode, ArmPhase, BenchReport, CommandOutcome, Metadata, TimerTester};
pub use gate::{Gate, GateError};
pub use probe::{DebugProbe, PinTable, MAX_TIMER_DEVICES};

#[cfg(test)]
mod tests;
