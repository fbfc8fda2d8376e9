//! Simulated timer devices.
//!
//! Each device owns a worker thread standing in for its interrupt line. The
//! worker sleeps until the earliest armed channel is due (absolute deadline on
//! the monotonic clock, as the POSIX ticker does) and then calls the bound
//! ISR with the device lock released.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use hal::{Channel, HalError, HalResult, IsrHandle, Ticks, TimerDriver};
use parking_lot::{Condvar, Mutex, MutexGuard};

/// Nanoseconds per second
const NSEC_PER_SEC: u128 = 1_000_000_000;

/// Shape of the simulated timer block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimTimerConfig {
    pub devices: usize,
    pub channels: usize,
    pub max_frequency: u32,
}

impl Default for SimTimerConfig {
    fn default() -> Self {
        Self {
            devices: 2,
            channels: 4,
            max_frequency: 64_000_000,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Arm {
    start: Ticks,
    delay: Ticks,
}

struct DeviceState {
    freq: u32,
    isr: Option<IsrHandle>,
    running: bool,
    base: u64,
    since: Instant,
    arms: Vec<Option<Arm>>,
    shutdown: bool,
}

impl DeviceState {
    fn new(channels: usize) -> Self {
        Self {
            freq: 0,
            isr: None,
            running: false,
            base: 0,
            since: Instant::now(),
            arms: vec![None; channels],
            shutdown: false,
        }
    }

    fn counter_at(&self, now: Instant) -> u64 {
        if !self.running || self.freq == 0 {
            return self.base;
        }
        let elapsed = now.saturating_duration_since(self.since).as_nanos();
        self.base + (elapsed * u128::from(self.freq) / NSEC_PER_SEC) as u64
    }

    fn ticks_at(&self, now: Instant) -> Ticks {
        self.counter_at(now) as Ticks
    }

    fn ticks_to_duration(&self, ticks: Ticks) -> Duration {
        let nanos = u128::from(ticks) * NSEC_PER_SEC / u128::from(self.freq.max(1));
        // Round up so the worker never wakes one tick early.
        Duration::from_nanos(nanos as u64 + 1)
    }

    fn check_armable(&self, channel: Channel) -> HalResult<usize> {
        if self.freq == 0 {
            return Err(HalError::Uninitialized);
        }
        usize::try_from(channel)
            .ok()
            .filter(|&idx| idx < self.arms.len())
            .ok_or(HalError::InvalidChannel)
    }

    fn next_event(&self, now: Instant) -> NextEvent {
        let ticks = self.ticks_at(now);
        let mut earliest: Option<Ticks> = None;
        for (idx, arm) in self.arms.iter().enumerate() {
            let Some(arm) = arm else { continue };
            let elapsed = ticks.wrapping_sub(arm.start);
            if elapsed >= arm.delay {
                return NextEvent::Fire(idx);
            }
            let remaining = arm.delay - elapsed;
            earliest = Some(earliest.map_or(remaining, |cur| cur.min(remaining)));
        }
        match earliest {
            Some(remaining) if self.running => NextEvent::In(self.ticks_to_duration(remaining)),
            _ => NextEvent::Idle,
        }
    }
}

enum NextEvent {
    Fire(usize),
    In(Duration),
    Idle,
}

struct SimDevice {
    index: usize,
    state: Mutex<DeviceState>,
    wake: Condvar,
    fired: AtomicU64,
}

impl SimDevice {
    fn lock(&self) -> MutexGuard<'_, DeviceState> {
        self.state.lock()
    }

    fn run(&self) {
        let mut state = self.lock();
        loop {
            if state.shutdown {
                break;
            }
            match state.next_event(Instant::now()) {
                NextEvent::Fire(idx) => {
                    state.arms[idx] = None;
                    let isr = state.isr.clone();
                    self.fired.fetch_add(1, Ordering::Relaxed);
                    if let Some(isr) = isr {
                        log::trace!("timer {} channel {idx} fired", self.index);
                        MutexGuard::unlocked(&mut state, || isr.on_match(idx as Channel));
                    }
                }
                NextEvent::In(timeout) => {
                    self.wake.wait_for(&mut state, timeout);
                }
                NextEvent::Idle => self.wake.wait(&mut state),
            }
        }
    }
}

/// Thread-backed implementation of [`TimerDriver`].
pub struct SimTimer {
    config: SimTimerConfig,
    devices: Vec<Arc<SimDevice>>,
    workers: Vec<JoinHandle<()>>,
}

impl SimTimer {
    /// Creates the device set and spawns one interrupt worker per device.
    pub fn new(config: SimTimerConfig) -> Self {
        let devices: Vec<Arc<SimDevice>> = (0..config.devices)
            .map(|index| {
                Arc::new(SimDevice {
                    index,
                    state: Mutex::new(DeviceState::new(config.channels)),
                    wake: Condvar::new(),
                    fired: AtomicU64::new(0),
                })
            })
            .collect();

        let workers = devices
            .iter()
            .map(|device| {
                let device = Arc::clone(device);
                thread::Builder::new()
                    .name(format!("timer{}-isr", device.index))
                    .spawn(move || device.run())
                    .expect("failed to spawn timer interrupt thread")
            })
            .collect();

        Self {
            config,
            devices,
            workers,
        }
    }

    pub fn config(&self) -> SimTimerConfig {
        self.config
    }

    /// Number of compare matches delivered on `dev` so far.
    pub fn fired(&self, dev: usize) -> u64 {
        self.devices[dev].fired.load(Ordering::Relaxed)
    }

    /// True if `dev` is counting.
    pub fn is_running(&self, dev: usize) -> bool {
        self.devices[dev].lock().running
    }

    /// True if `channel` on `dev` is armed and has not fired yet.
    pub fn is_armed(&self, dev: usize, channel: Channel) -> bool {
        let state = self.devices[dev].lock();
        usize::try_from(channel)
            .ok()
            .and_then(|idx| state.arms.get(idx).copied().flatten())
            .is_some()
    }

    fn arm(&self, dev: usize, channel: Channel, target: impl FnOnce(Ticks) -> Arm) -> HalResult<()> {
        let device = &self.devices[dev];
        let mut state = device.lock();
        let idx = state.check_armable(channel)?;
        let now = state.ticks_at(Instant::now());
        let arm = target(now);
        log::trace!(
            "timer {dev} channel {channel} armed at {} for {} ticks",
            arm.start,
            arm.delay
        );
        state.arms[idx] = Some(arm);
        drop(state);
        device.wake.notify_one();
        Ok(())
    }
}

impl Default for SimTimer {
    fn default() -> Self {
        Self::new(SimTimerConfig::default())
    }
}

impl Drop for SimTimer {
    fn drop(&mut self) {
        for device in &self.devices {
            device.lock().shutdown = true;
            device.wake.notify_one();
        }
        for worker in std::mem::take(&mut self.workers) {
            let _ = worker.join();
        }
    }
}

impl TimerDriver for SimTimer {
    fn device_count(&self) -> usize {
        self.devices.len()
    }

    fn init(&self, dev: usize, freq: u32, isr: IsrHandle) -> HalResult<()> {
        if freq == 0 || freq > self.config.max_frequency {
            return Err(HalError::InvalidFrequency);
        }
        let device = &self.devices[dev];
        let mut state = device.lock();
        state.freq = freq;
        state.isr = Some(isr);
        state.running = true;
        state.base = 0;
        state.since = Instant::now();
        state.arms.iter_mut().for_each(|arm| *arm = None);
        drop(state);
        device.wake.notify_one();
        log::debug!("timer {dev} initialised at {freq} Hz");
        Ok(())
    }

    fn set(&self, dev: usize, channel: Channel, ticks: Ticks) -> HalResult<()> {
        self.arm(dev, channel, |now| Arm {
            start: now,
            delay: ticks,
        })
    }

    fn set_absolute(&self, dev: usize, channel: Channel, ticks: Ticks) -> HalResult<()> {
        self.arm(dev, channel, |now| Arm {
            start: now,
            delay: ticks.wrapping_sub(now),
        })
    }

    fn clear(&self, dev: usize, channel: Channel) -> HalResult<()> {
        let device = &self.devices[dev];
        let mut state = device.lock();
        let idx = state.check_armable(channel)?;
        state.arms[idx] = None;
        drop(state);
        device.wake.notify_one();
        Ok(())
    }

    fn read(&self, dev: usize) -> Ticks {
        self.devices[dev].lock().ticks_at(Instant::now())
    }

    fn start(&self, dev: usize) {
        let device = &self.devices[dev];
        let mut state = device.lock();
        if !state.running {
            state.since = Instant::now();
            state.running = true;
        }
        drop(state);
        device.wake.notify_one();
    }

    fn stop(&self, dev: usize) {
        let device = &self.devices[dev];
        let mut state = device.lock();
        if state.running {
            state.base = state.counter_at(Instant::now());
            state.running = false;
        }
    }
}
