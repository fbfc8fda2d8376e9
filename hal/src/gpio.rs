//! GPIO (General Purpose Input/Output) abstraction

use core::fmt;

use crate::error::HalResult;

/// GPIO pin levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    /// Low level (0V)
    Low,
    /// High level (VCC)
    High,
}

impl Level {
    /// Returns the opposite level.
    pub const fn inverted(self) -> Self {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

/// A pin addressed by port and pin number within the port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PinId {
    pub port: u32,
    pub pin: u32,
}

impl PinId {
    pub const fn new(port: u32, pin: u32) -> Self {
        Self { port, pin }
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}.{}", self.port, self.pin)
    }
}

/// Output-only GPIO controller (object-safe).
///
/// `write`, `read` and `toggle` may be called from interrupt context and
/// therefore take `&self`; implementations use interior mutability and must
/// not block.
pub trait GpioOutput: Send + Sync {
    /// Configure `pin` as a push-pull output.
    fn init_output(&self, pin: PinId) -> HalResult<()>;

    /// Drive `pin` to `level`.
    fn write(&self, pin: PinId, level: Level);

    /// Current output level of `pin`.
    fn read(&self, pin: PinId) -> Level;

    /// Toggle output
    fn toggle(&self, pin: PinId) {
        let current = self.read(pin);
        self.write(pin, current.inverted());
    }
}
