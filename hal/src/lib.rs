//! Hardware Abstraction Layer (HAL) for the timer test console
//!
//! This crate provides the vendor-agnostic traits the console drives: a
//! multi-device timer with compare channels and an interrupt callback, and
//! plain GPIO outputs used as timing probes. Board ports implement them; the
//! console never touches registers directly.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod error;
pub mod gpio;
pub mod timer;

// Re-export commonly used types
pub use error::{HalError, HalResult};
pub use gpio::{GpioOutput, Level, PinId};
pub use timer::{Channel, IsrHandle, Ticks, TimerDriver, TimerIsr};
