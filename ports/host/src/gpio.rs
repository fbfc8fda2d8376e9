use std::collections::BTreeMap;

use hal::{GpioOutput, HalResult, Level, PinId};
use parking_lot::Mutex;

#[derive(Debug, Clone, Copy)]
struct PinRecord {
    level: Level,
    output: bool,
    transitions: u64,
}

impl Default for PinRecord {
    fn default() -> Self {
        Self {
            level: Level::Low,
            output: false,
            transitions: 0,
        }
    }
}

/// In-memory GPIO bank that counts level transitions per pin.
#[derive(Debug, Default)]
pub struct SimGpio {
    pins: Mutex<BTreeMap<PinId, PinRecord>>,
}

impl SimGpio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current level, or `None` if the pin was never touched.
    pub fn level(&self, pin: PinId) -> Option<Level> {
        self.pins.lock().get(&pin).map(|record| record.level)
    }

    /// Number of level changes seen on `pin`.
    pub fn transitions(&self, pin: PinId) -> u64 {
        self.pins
            .lock()
            .get(&pin)
            .map_or(0, |record| record.transitions)
    }

    /// True once `init_output` was called for `pin`.
    pub fn is_output(&self, pin: PinId) -> bool {
        self.pins.lock().get(&pin).is_some_and(|record| record.output)
    }
}

impl GpioOutput for SimGpio {
    fn init_output(&self, pin: PinId) -> HalResult<()> {
        self.pins.lock().entry(pin).or_default().output = true;
        log::debug!("gpio {pin} configured as output");
        Ok(())
    }

    fn write(&self, pin: PinId, level: Level) {
        let mut pins = self.pins.lock();
        let record = pins.entry(pin).or_default();
        if record.level != level {
            record.level = level;
            record.transitions += 1;
        }
    }

    fn read(&self, pin: PinId) -> Level {
        self.pins
            .lock()
            .get(&pin)
            .map_or(Level::Low, |record| record.level)
    }

    fn toggle(&self, pin: PinId) {
        let mut pins = self.pins.lock();
        let record = pins.entry(pin).or_default();
        record.level = record.level.inverted();
        record.transitions += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_counts_every_transition() {
        let gpio = SimGpio::new();
        let pin = PinId::new(1, 4);
        gpio.init_output(pin).unwrap();

        gpio.toggle(pin);
        gpio.toggle(pin);
        gpio.toggle(pin);

        assert!(gpio.is_output(pin));
        assert_eq!(gpio.transitions(pin), 3);
        assert_eq!(gpio.level(pin), Some(Level::High));
    }

    #[test]
    fn writing_same_level_is_not_a_transition() {
        let gpio = SimGpio::new();
        let pin = PinId::new(0, 0);

        gpio.write(pin, Level::Low);
        gpio.write(pin, Level::High);
        gpio.write(pin, Level::High);

        assert_eq!(gpio.transitions(pin), 1);
        assert_eq!(gpio.read(pin), Level::High);
        assert!(!gpio.is_output(pin));
    }
}
