mod gate;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use hal::{Channel, GpioOutput, HalError, HalResult, IsrHandle, Level, PinId, Ticks, TimerDriver};

use crate::{TesterConfig, TimerTester};

/// When the fake hardware delivers the compare interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FireMode {
    /// Inside `set`, before the command reaches its wait.
    Immediate,
    /// From another thread after the delay.
    Deferred(Duration),
    /// Never.
    Never,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Init { dev: usize, freq: u32 },
    Set { dev: usize, channel: Channel, ticks: Ticks },
    SetAbsolute { dev: usize, channel: Channel, ticks: Ticks },
    Clear { dev: usize, channel: Channel },
    Start(usize),
    Stop(usize),
}

pub(crate) struct FakeTimer {
    devices: usize,
    fire: Mutex<FireMode>,
    arm_error: Mutex<Option<HalError>>,
    init_error: Mutex<Option<HalError>>,
    counter: Ticks,
    isrs: Mutex<Vec<Option<IsrHandle>>>,
    calls: Mutex<Vec<Call>>,
    reads: AtomicUsize,
    fired: Arc<AtomicUsize>,
}

impl FakeTimer {
    pub(crate) fn new(devices: usize) -> Self {
        Self {
            devices,
            fire: Mutex::new(FireMode::Deferred(Duration::from_millis(5))),
            arm_error: Mutex::new(None),
            init_error: Mutex::new(None),
            counter: 1234,
            isrs: Mutex::new(vec![None; devices]),
            calls: Mutex::new(Vec::new()),
            reads: AtomicUsize::new(0),
            fired: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn set_fire_mode(&self, mode: FireMode) {
        *self.fire.lock().unwrap() = mode;
    }

    pub(crate) fn fail_arm_with(&self, err: HalError) {
        *self.arm_error.lock().unwrap() = Some(err);
    }

    pub(crate) fn fail_init_with(&self, err: HalError) {
        *self.init_error.lock().unwrap() = Some(err);
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub(crate) fn fired(&self) -> usize {
        self.fired.load(Ordering::SeqCst)
    }

    /// Raises the interrupt of `dev` by hand.
    pub(crate) fn fire(&self, dev: usize, channel: Channel) {
        let isr = self.isrs.lock().unwrap()[dev].clone();
        if let Some(isr) = isr {
            self.fired.fetch_add(1, Ordering::SeqCst);
            isr.on_match(channel);
        }
    }

    fn arm(&self, dev: usize, channel: Channel, call: Call) -> HalResult<()> {
        self.calls.lock().unwrap().push(call);
        if let Some(err) = *self.arm_error.lock().unwrap() {
            return Err(err);
        }
        let isr = self.isrs.lock().unwrap()[dev].clone().ok_or(HalError::Uninitialized)?;
        let mode = *self.fire.lock().unwrap();
        match mode {
            FireMode::Immediate => {
                self.fired.fetch_add(1, Ordering::SeqCst);
                isr.on_match(channel);
            }
            FireMode::Deferred(delay) => {
                let fired = Arc::clone(&self.fired);
                thread::spawn(move || {
                    thread::sleep(delay);
                    fired.fetch_add(1, Ordering::SeqCst);
                    isr.on_match(channel);
                });
            }
            FireMode::Never => {}
        }
        Ok(())
    }
}

impl TimerDriver for FakeTimer {
    fn device_count(&self) -> usize {
        self.devices
    }

    fn init(&self, dev: usize, freq: u32, isr: IsrHandle) -> HalResult<()> {
        self.calls.lock().unwrap().push(Call::Init { dev, freq });
        if let Some(err) = *self.init_error.lock().unwrap() {
            return Err(err);
        }
        self.isrs.lock().unwrap()[dev] = Some(isr);
        Ok(())
    }

    fn set(&self, dev: usize, channel: Channel, ticks: Ticks) -> HalResult<()> {
        self.arm(dev, channel, Call::Set { dev, channel, ticks })
    }

    fn set_absolute(&self, dev: usize, channel: Channel, ticks: Ticks) -> HalResult<()> {
        self.arm(dev, channel, Call::SetAbsolute { dev, channel, ticks })
    }

    fn clear(&self, dev: usize, channel: Channel) -> HalResult<()> {
        self.calls.lock().unwrap().push(Call::Clear { dev, channel });
        Ok(())
    }

    fn read(&self, _dev: usize) -> Ticks {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.counter
    }

    fn start(&self, dev: usize) {
        self.calls.lock().unwrap().push(Call::Start(dev));
    }

    fn stop(&self, dev: usize) {
        self.calls.lock().unwrap().push(Call::Stop(dev));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PinEvent {
    Init,
    Toggle,
    Write(Level),
}

#[derive(Default)]
pub(crate) struct FakeGpio {
    events: Mutex<Vec<(PinId, PinEvent)>>,
    levels: Mutex<Vec<(PinId, Level)>>,
    reject_init: Mutex<bool>,
}

impl FakeGpio {
    pub(crate) fn events(&self, pin: PinId) -> Vec<PinEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| *p == pin)
            .map(|(_, event)| *event)
            .collect()
    }

    pub(crate) fn toggles(&self, pin: PinId) -> usize {
        self.events(pin)
            .into_iter()
            .filter(|event| *event == PinEvent::Toggle)
            .count()
    }

    pub(crate) fn total_events(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub(crate) fn reject_init(&self) {
        *self.reject_init.lock().unwrap() = true;
    }

    fn store(&self, pin: PinId, level: Level) {
        let mut levels = self.levels.lock().unwrap();
        match levels.iter_mut().find(|(p, _)| *p == pin) {
            Some(entry) => entry.1 = level,
            None => levels.push((pin, level)),
        }
    }
}

impl GpioOutput for FakeGpio {
    fn init_output(&self, pin: PinId) -> HalResult<()> {
        if *self.reject_init.lock().unwrap() {
            return Err(HalError::NotSupported);
        }
        self.events.lock().unwrap().push((pin, PinEvent::Init));
        Ok(())
    }

    fn write(&self, pin: PinId, level: Level) {
        self.events.lock().unwrap().push((pin, PinEvent::Write(level)));
        self.store(pin, level);
    }

    fn read(&self, pin: PinId) -> Level {
        self.levels
            .lock()
            .unwrap()
            .iter()
            .find(|(p, _)| *p == pin)
            .map_or(Level::Low, |(_, level)| *level)
    }

    fn toggle(&self, pin: PinId) {
        self.events.lock().unwrap().push((pin, PinEvent::Toggle));
        let level = self.read(pin).inverted();
        self.store(pin, level);
    }
}

pub(crate) struct Rig {
    pub timer: Arc<FakeTimer>,
    pub gpio: Arc<FakeGpio>,
    pub tester: TimerTester,
}

pub(crate) fn rig(devices: usize) -> Rig {
    rig_with(devices, TesterConfig::default())
}

pub(crate) fn rig_with(devices: usize, config: TesterConfig) -> Rig {
    let timer = Arc::new(FakeTimer::new(devices));
    let gpio = Arc::new(FakeGpio::default());
    let tester = TimerTester::new(timer.clone(), gpio.clone(), config).unwrap();
    Rig {
        timer,
        gpio,
        tester,
    }
}
