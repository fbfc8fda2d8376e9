//! Timer callbacks selectable from the console.

use std::sync::Arc;
use core::fmt;
use core::str::FromStr;

use hal::{Channel, TimerIsr};

use crate::error::CommandError;
use crate::gate::Gate;
use crate::probe::{DebugProbe, PinTable};

/// What the callback does to the device's probe pin before releasing the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallbackKind {
    /// `cb_toggle`
    Toggle,
    /// `cb_high`
    High,
    /// `cb_low`
    Low,
}

impl CallbackKind {
    pub const ALL: [CallbackKind; 3] = [Self::Toggle, Self::High, Self::Low];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Toggle => "cb_toggle",
            Self::High => "cb_high",
            Self::Low => "cb_low",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for CallbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CallbackKind {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| CommandError::UnknownCallback {
            name: s.to_owned(),
        })
    }
}

/// ISR installed by `timer_init`.
///
/// The probe pin is looked up when the interrupt fires, so a pin configured
/// after `timer_init` is still driven.
pub struct CallbackBinding {
    kind: CallbackKind,
    device: usize,
    pins: Arc<PinTable>,
    probe: Arc<DebugProbe>,
    gate: Arc<Gate>,
}

impl CallbackBinding {
    pub fn new(
        kind: CallbackKind,
        device: usize,
        pins: Arc<PinTable>,
        probe: Arc<DebugProbe>,
        gate: Arc<Gate>,
    ) -> Self {
        Self {
            kind,
            device,
            pins,
            probe,
            gate,
        }
    }

    pub fn kind(&self) -> CallbackKind {
        self.kind
    }

    pub fn device(&self) -> usize {
        self.device
    }
}

impl TimerIsr for CallbackBinding {
    fn on_match(&self, _channel: Channel) {
        let pin = self.pins.get(self.device);
        match self.kind {
            CallbackKind::Toggle => self.probe.toggle(pin),
            CallbackKind::High => self.probe.assert_high(pin),
            CallbackKind::Low => self.probe.assert_low(pin),
        }
        self.gate.unlock();
    }
}
