use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::gate::{Gate, GateError};

#[test]
fn starts_unlocked() {
    let gate = Gate::new();
    assert!(!gate.is_locked());
    assert!(gate.try_lock());
    assert!(gate.is_locked());
    assert!(!gate.try_lock());
}

#[test]
fn unlock_from_other_thread_wakes_waiter() {
    let gate = Arc::new(Gate::new());
    gate.lock();

    let isr_gate = Arc::clone(&gate);
    let isr = thread::spawn(move || {
        thread::sleep(Duration::from_millis(10));
        isr_gate.unlock();
    });

    gate.lock();
    assert!(gate.is_locked());
    gate.unlock();
    isr.join().unwrap();

    assert!(!gate.is_locked());
    assert_eq!(gate.unlock_count(), 2);
}

#[test]
fn release_before_wait_is_not_lost() {
    let gate = Gate::new();
    gate.lock();
    // Interrupt lands between arming and the second lock.
    gate.unlock();
    gate.lock();
    gate.unlock();
    assert!(!gate.is_locked());
}

#[test]
fn unlocking_an_open_gate_is_a_no_op() {
    let gate = Gate::new();
    gate.unlock();
    gate.unlock();
    assert!(!gate.is_locked());
    assert!(gate.try_lock());
    assert!(!gate.try_lock());
}

#[test]
fn bounded_wait_times_out() {
    let gate = Gate::new();
    gate.lock();

    let err = gate.lock_timeout(Duration::from_millis(20)).unwrap_err();
    assert_eq!(err, GateError::Timeout(Duration::from_millis(20)));
    assert!(gate.is_locked());
}

#[test]
fn bounded_wait_succeeds_when_released() {
    let gate = Arc::new(Gate::new());
    gate.lock();

    let isr_gate = Arc::clone(&gate);
    let isr = thread::spawn(move || {
        thread::sleep(Duration::from_millis(5));
        isr_gate.unlock();
    });

    assert!(gate.lock_timeout(Duration::from_secs(5)).is_ok());
    isr.join().unwrap();
}

#[test]
fn sequential_handshakes_return_to_baseline() {
    let gate = Arc::new(Gate::new());

    for round in 0..3 {
        gate.lock();
        let isr_gate = Arc::clone(&gate);
        let isr = thread::spawn(move || isr_gate.unlock());
        gate.lock();
        gate.unlock();
        isr.join().unwrap();

        assert!(!gate.is_locked(), "round {round} left the gate held");
    }
    assert_eq!(gate.unlock_count(), 6);
}
