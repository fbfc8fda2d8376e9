//! Binary handshake between a blocking command and a timer interrupt.
//!
//! The [`Gate`] is a non-owning binary lock: any actor may unlock it, and
//! unlocking an unlocked gate is a no-op. A command drives it to LOCKED,
//! arms the hardware, then locks again and is suspended until the interrupt
//! callback unlocks it. A callback that fires before the second `lock` leaves
//! the gate UNLOCKED, so the wakeup cannot be lost.
//!
//! ```ignore
//! gate.lock();            // baseline: LOCKED
//! driver.set(dev, 0, 100)?;
//! gate.lock();            // suspended until the ISR calls gate.unlock()
//! gate.unlock();          // back to baseline for the next command
//! ```
//!
//! [`Gate::unlock`] is the only method the interrupt side calls. It never
//! allocates and never waits for the command side.

use core::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use thiserror::Error;

/// Error returned by bounded waits on a [`Gate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GateError {
    #[error("gate was not released within {0:?}")]
    Timeout(Duration),
}

/// Binary lock shared by the command context and interrupt context.
pub struct Gate {
    inner: imp::RawGate,
    unlocks: AtomicUsize,
}

impl Gate {
    /// Creates an unlocked gate.
    pub const fn new() -> Self {
        Self {
            inner: imp::RawGate::new(),
            unlocks: AtomicUsize::new(0),
        }
    }

    /// Locks the gate, suspending the caller while it is held.
    pub fn lock(&self) {
        self.inner.lock();
        log::trace!("gate locked");
    }

    /// Locks the gate if it is free. Never blocks.
    pub fn try_lock(&self) -> bool {
        self.inner.try_lock()
    }

    /// Like [`lock`](Self::lock) but gives up after `timeout`.
    pub fn lock_timeout(&self, timeout: Duration) -> Result<(), GateError> {
        let deadline = Instant::now() + timeout;
        if self.inner.lock_until(deadline) {
            log::trace!("gate locked");
            Ok(())
        } else {
            Err(GateError::Timeout(timeout))
        }
    }

    /// Releases the gate and wakes one waiter. Safe to call from interrupt
    /// context.
    pub fn unlock(&self) {
        self.unlocks.fetch_add(1, Ordering::Relaxed);
        self.inner.unlock();
    }

    /// Returns true while the gate is held.
    pub fn is_locked(&self) -> bool {
        self.inner.is_locked()
    }

    /// Total number of `unlock` calls since creation.
    pub fn unlock_count(&self) -> usize {
        self.unlocks.load(Ordering::Relaxed)
    }
}

impl Default for Gate {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Gate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Gate")
            .field("locked", &self.is_locked())
            .field("unlocks", &self.unlock_count())
            .finish()
    }
}

#[cfg(not(feature = "lock-free"))]
mod imp {
    use std::time::Instant;

    use parking_lot::{Condvar, Mutex};

    pub(super) struct RawGate {
        locked: Mutex<bool>,
        released: Condvar,
    }

    impl RawGate {
        pub(super) const fn new() -> Self {
            Self {
                locked: parking_lot::const_mutex(false),
                released: Condvar::new(),
            }
        }

        pub(super) fn lock(&self) {
            let mut locked = self.locked.lock();
            while *locked {
                self.released.wait(&mut locked);
            }
            *locked = true;
        }

        pub(super) fn try_lock(&self) -> bool {
            let mut locked = self.locked.lock();
            !core::mem::replace(&mut *locked, true)
        }

        pub(super) fn lock_until(&self, deadline: Instant) -> bool {
            let mut locked = self.locked.lock();
            while *locked {
                if self.released.wait_until(&mut locked, deadline).timed_out() && *locked {
                    return false;
                }
            }
            *locked = true;
            true
        }

        pub(super) fn unlock(&self) {
            *self.locked.lock() = false;
            self.released.notify_one();
        }

        pub(super) fn is_locked(&self) -> bool {
            *self.locked.lock()
        }
    }
}

#[cfg(feature = "lock-free")]
mod imp {
    use core::sync::atomic::{AtomicBool, Ordering};
    use std::time::Instant;

    use spin::relax::{RelaxStrategy, Spin};

    pub(super) struct RawGate {
        locked: AtomicBool,
    }

    impl RawGate {
        pub(super) const fn new() -> Self {
            Self {
                locked: AtomicBool::new(false),
            }
        }

        pub(super) fn lock(&self) {
            while !self.try_lock() {
                while self.locked.load(Ordering::Relaxed) {
                    Spin::relax();
                }
            }
        }

        pub(super) fn try_lock(&self) -> bool {
            self.locked
                .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
                .is_ok()
        }

        pub(super) fn lock_until(&self, deadline: Instant) -> bool {
            while !self.try_lock() {
                if Instant::now() >= deadline {
                    return false;
                }
                Spin::relax();
            }
            true
        }

        pub(super) fn unlock(&self) {
            self.locked.store(false, Ordering::Release);
        }

        pub(super) fn is_locked(&self) -> bool {
            self.locked.load(Ordering::Relaxed)
        }
    }
}
