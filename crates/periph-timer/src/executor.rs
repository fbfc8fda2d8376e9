//! Timer operations behind the console commands.
//!
//! Arguments arrive typed and validated; every operation on a
//! [`DeviceIndex`] is therefore guaranteed to address an existing device.
//! `set` and `set_absolute` run the blocking gate handshake, all other
//! operations return immediately.

use std::fmt;
use std::hint::black_box;
use std::sync::Arc;
use std::time::{Duration, Instant};

use hal::error::result_code;
use hal::{Channel, GpioOutput, HalResult, PinId, Ticks, TimerDriver};

use crate::args::DeviceIndex;
use crate::callback::{CallbackBinding, CallbackKind};
use crate::config::TesterConfig;
use crate::error::{CommandError, SetupError, ETIMEDOUT, RESULT_ERROR, RESULT_OK};
use crate::gate::Gate;
use crate::probe::{DebugProbe, PinTable, MAX_TIMER_DEVICES};

/// Uniform result of a command: success flag, numeric code and whether the
/// code is worth printing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandOutcome {
    pub success: bool,
    pub code: i64,
    pub print_code: bool,
}

impl CommandOutcome {
    /// Success without a code.
    pub const fn ok() -> Self {
        Self {
            success: true,
            code: 0,
            print_code: false,
        }
    }

    /// Failure without a code.
    pub const fn failed() -> Self {
        Self {
            success: false,
            code: 1,
            print_code: false,
        }
    }

    /// Success carrying a value, such as a counter reading.
    pub const fn value(value: i64) -> Self {
        Self {
            success: true,
            code: value,
            print_code: true,
        }
    }

    /// Driver result passed through verbatim: `0` on success, the driver's
    /// code otherwise.
    pub fn from_driver(result: HalResult<()>) -> Self {
        Self::from_code(result_code(result))
    }

    pub fn from_code(code: i32) -> Self {
        Self {
            success: code == 0,
            code: code.into(),
            print_code: true,
        }
    }

    /// Status handed back to the enclosing shell.
    pub const fn status(&self) -> i32 {
        if self.success {
            RESULT_OK
        } else {
            RESULT_ERROR
        }
    }
}

/// How an arm command interprets its tick argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmMode {
    Relative,
    Absolute,
}

/// Progress of one blocking arm command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmPhase {
    Idle,
    Armed,
    Waiting,
    Complete,
}

impl fmt::Display for ArmPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "IDLE",
            Self::Armed => "ARMED",
            Self::Waiting => "WAITING",
            Self::Complete => "COMPLETE",
        };
        f.write_str(name)
    }
}

/// Board and application identifiers reported by `get_metadata`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub board: String,
    pub application: String,
}

/// Result of a read benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchReport {
    pub reads: u32,
    pub elapsed: Duration,
}

/// Owns everything a command needs: the driver, the gate, the probe and the
/// pin table. Independent instances share nothing.
pub struct TimerTester {
    driver: Arc<dyn TimerDriver>,
    probe: Arc<DebugProbe>,
    pins: Arc<PinTable>,
    gate: Arc<Gate>,
    config: TesterConfig,
}

impl TimerTester {
    pub fn new(
        driver: Arc<dyn TimerDriver>,
        gpio: Arc<dyn GpioOutput>,
        config: TesterConfig,
    ) -> Result<Self, SetupError> {
        let count = driver.device_count();
        let pins = PinTable::new(count).ok_or(SetupError::TooManyDevices {
            count,
            max: MAX_TIMER_DEVICES,
        })?;
        Ok(Self {
            driver,
            probe: Arc::new(DebugProbe::new(gpio)),
            pins: Arc::new(pins),
            gate: Arc::new(Gate::new()),
            config,
        })
    }

    pub fn device_count(&self) -> usize {
        self.driver.device_count()
    }

    pub fn resolve_device(&self, token: &str) -> Result<DeviceIndex, CommandError> {
        DeviceIndex::resolve(token, self.device_count())
    }

    pub fn config(&self) -> &TesterConfig {
        &self.config
    }

    pub fn gate(&self) -> &Gate {
        &self.gate
    }

    /// Probe pin currently bound to `dev`.
    pub fn debug_pin(&self, dev: DeviceIndex) -> Option<PinId> {
        self.pins.get(dev.get())
    }

    /// Initialises `dev` at `freq` Hz with a callback of the given kind.
    pub fn init(&self, dev: DeviceIndex, freq: u32, kind: CallbackKind) -> CommandOutcome {
        let binding = CallbackBinding::new(
            kind,
            dev.get(),
            Arc::clone(&self.pins),
            Arc::clone(&self.probe),
            Arc::clone(&self.gate),
        );
        let result = self.driver.init(dev.get(), freq, Arc::new(binding));
        log::debug!("timer_init dev={} freq={freq} cb={kind}: {result:?}", dev.get());
        CommandOutcome::from_driver(result)
    }

    /// Arms `channel` `ticks` ticks from now and blocks until it fires.
    pub fn set(&self, dev: DeviceIndex, channel: Channel, ticks: Ticks) -> CommandOutcome {
        self.arm_and_wait(dev, channel, ticks, ArmMode::Relative)
    }

    /// Arms `channel` for counter value `ticks` and blocks until it fires.
    pub fn set_absolute(&self, dev: DeviceIndex, channel: Channel, ticks: Ticks) -> CommandOutcome {
        self.arm_and_wait(dev, channel, ticks, ArmMode::Absolute)
    }

    fn arm_and_wait(
        &self,
        dev: DeviceIndex,
        channel: Channel,
        ticks: Ticks,
        mode: ArmMode,
    ) -> CommandOutcome {
        let index = dev.get();
        let trace = |phase: ArmPhase| log::trace!("timer {index} channel {channel}: {phase}");
        trace(ArmPhase::Idle);

        self.gate.lock();
        self.probe.toggle(self.pins.get(index));
        let result = match mode {
            ArmMode::Relative => self.driver.set(index, channel, ticks),
            ArmMode::Absolute => self.driver.set_absolute(index, channel, ticks),
        };

        if let Err(err) = result {
            // Nothing was armed, so nothing will ever release the gate.
            self.gate.unlock();
            trace(ArmPhase::Complete);
            log::debug!("timer {index} channel {channel}: arm failed: {err}");
            return CommandOutcome::from_driver(Err(err));
        }
        trace(ArmPhase::Armed);

        trace(ArmPhase::Waiting);
        let waited = match self.config.wait_timeout {
            None => {
                self.gate.lock();
                Ok(())
            }
            Some(timeout) => self.gate.lock_timeout(timeout),
        };
        self.gate.unlock();
        trace(ArmPhase::Complete);

        match waited {
            Ok(()) => CommandOutcome::from_driver(Ok(())),
            Err(err) => {
                log::warn!("timer {index} channel {channel}: {err}");
                if let Err(clear_err) = self.driver.clear(index, channel) {
                    log::warn!("timer {index} channel {channel}: clear failed: {clear_err}");
                }
                CommandOutcome::from_code(-ETIMEDOUT)
            }
        }
    }

    pub fn clear(&self, dev: DeviceIndex, channel: Channel) -> CommandOutcome {
        let result = self.driver.clear(dev.get(), channel);
        log::debug!("timer_clear dev={} chan={channel}: {result:?}", dev.get());
        CommandOutcome::from_driver(result)
    }

    pub fn read(&self, dev: DeviceIndex) -> Ticks {
        self.driver.read(dev.get())
    }

    pub fn start(&self, dev: DeviceIndex) {
        log::debug!("timer_start dev={}", dev.get());
        self.driver.start(dev.get());
    }

    pub fn stop(&self, dev: DeviceIndex) {
        log::debug!("timer_stop dev={}", dev.get());
        self.driver.stop(dev.get());
    }

    /// Binds `pin` as the probe for `dev` and configures it as an output.
    pub fn configure_debug_pin(&self, dev: DeviceIndex, pin: PinId) -> CommandOutcome {
        match self.probe.configure(pin) {
            Ok(()) => {
                self.pins.set(dev.get(), Some(pin));
                CommandOutcome::ok()
            }
            Err(err) => {
                log::debug!("probe {pin} for timer {}: {err}", dev.get());
                CommandOutcome::failed()
            }
        }
    }

    /// Reads the counter `repeat` times back to back, with one probe toggle
    /// before and one after. Never touches the gate.
    pub fn read_bench(&self, dev: DeviceIndex, repeat: u32) -> BenchReport {
        let index = dev.get();
        let pin = self.pins.get(index);

        self.probe.toggle(pin);
        let started = Instant::now();
        for _ in 0..repeat {
            black_box(self.driver.read(index));
        }
        let elapsed = started.elapsed();
        self.probe.toggle(pin);

        log::debug!("timer {index}: {repeat} reads in {elapsed:?}");
        BenchReport {
            reads: repeat,
            elapsed,
        }
    }

    pub fn metadata(&self) -> Metadata {
        Metadata {
            board: self.config.board.clone(),
            application: self.config.application.clone(),
        }
    }
}
