//! Optional GPIO timing probe and the per-device pin table.
//!
//! Probe operations on an unset pin are no-ops. The probe is instrumentation
//! only: nothing in the gate protocol depends on it.

use std::sync::Arc;

use hal::{GpioOutput, HalResult, Level, PinId};
use heapless::Vec;

use crate::sync::Mutex;

/// Upper bound on timer devices the pin table can track.
pub const MAX_TIMER_DEVICES: usize = 16;

/// Drives probe pins through a [`GpioOutput`].
pub struct DebugProbe {
    gpio: Arc<dyn GpioOutput>,
}

impl DebugProbe {
    pub fn new(gpio: Arc<dyn GpioOutput>) -> Self {
        Self { gpio }
    }

    /// Configures `pin` as an output so it can be used as a probe.
    pub fn configure(&self, pin: PinId) -> HalResult<()> {
        self.gpio.init_output(pin)
    }

    #[inline]
    pub fn toggle(&self, pin: Option<PinId>) {
        if let Some(pin) = pin {
            self.gpio.toggle(pin);
        }
    }

    #[inline]
    pub fn assert_high(&self, pin: Option<PinId>) {
        if let Some(pin) = pin {
            self.gpio.write(pin, Level::High);
        }
    }

    #[inline]
    pub fn assert_low(&self, pin: Option<PinId>) {
        if let Some(pin) = pin {
            self.gpio.write(pin, Level::Low);
        }
    }
}

/// One optional probe pin per timer device, all unset initially.
///
/// Written only by the probe configuration command, read by callbacks and by
/// the arm and bench commands.
pub struct PinTable {
    slots: Mutex<Vec<Option<PinId>, MAX_TIMER_DEVICES>>,
}

impl PinTable {
    /// Creates a table for `devices` devices, or `None` if that exceeds
    /// [`MAX_TIMER_DEVICES`].
    pub fn new(devices: usize) -> Option<Self> {
        let mut slots = Vec::new();
        slots.resize(devices, None).ok()?;
        Some(Self {
            slots: Mutex::new(slots),
        })
    }

    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Probe pin bound to `dev`, if any.
    pub fn get(&self, dev: usize) -> Option<PinId> {
        self.slots.lock().get(dev).copied().flatten()
    }

    /// Binds `pin` to `dev`. Out-of-range devices are ignored.
    pub fn set(&self, dev: usize, pin: Option<PinId>) {
        if let Some(slot) = self.slots.lock().get_mut(dev) {
            *slot = pin;
        }
    }
}
