//! Timer abstraction
//!
//! A [`TimerDriver`] owns a fixed set of timer devices, each with one or more
//! compare channels. Exactly one [`TimerIsr`] is bound per device at `init`;
//! the driver invokes it from interrupt context whenever an armed channel
//! matches.

use alloc::sync::Arc;

use crate::error::HalResult;

/// Compare channel within a device. Opaque to callers, validated by drivers.
pub type Channel = i32;

/// Raw counter value.
pub type Ticks = u32;

/// Interrupt service routine bound to a timer device.
///
/// Runs in interrupt context: it must not block and must return quickly.
pub trait TimerIsr: Send + Sync {
    /// Called once per compare match on `channel`.
    fn on_match(&self, channel: Channel);
}

/// Shared handle to a bound ISR.
pub type IsrHandle = Arc<dyn TimerIsr>;

/// Timer device set.
///
/// Device indices passed in are assumed to be below [`device_count`]; callers
/// validate them first.
///
/// [`device_count`]: TimerDriver::device_count
pub trait TimerDriver: Send + Sync {
    /// Number of timer devices available.
    fn device_count(&self) -> usize;

    /// Configure `dev` to count at `freq` Hz and bind `isr` to its interrupt.
    /// The counter starts running.
    fn init(&self, dev: usize, freq: u32, isr: IsrHandle) -> HalResult<()>;

    /// Arm `channel` to fire `ticks` ticks from now.
    fn set(&self, dev: usize, channel: Channel, ticks: Ticks) -> HalResult<()>;

    /// Arm `channel` to fire when the counter reaches `ticks`.
    fn set_absolute(&self, dev: usize, channel: Channel, ticks: Ticks) -> HalResult<()>;

    /// Disarm `channel`.
    fn clear(&self, dev: usize, channel: Channel) -> HalResult<()>;

    /// Current counter value.
    fn read(&self, dev: usize) -> Ticks;

    /// Resume counting.
    fn start(&self, dev: usize);

    /// Halt counting. Armed channels stay armed.
    fn stop(&self, dev: usize);
}
