use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use periph_timer::{CallbackKind, DeviceIndex, Gate, TesterConfig, TimerTester};
use periph_timer_port_host::{SimGpio, SimTimer, SimTimerConfig};

fn gate_uncontended(c: &mut Criterion) {
    let gate = Gate::new();
    c.bench_function("gate lock/unlock", |b| {
        b.iter(|| {
            gate.lock();
            black_box(&gate);
            gate.unlock();
        })
    });
}

fn blocking_set(c: &mut Criterion) {
    let timer = Arc::new(SimTimer::new(SimTimerConfig::default()));
    let tester = TimerTester::new(timer, Arc::new(SimGpio::new()), TesterConfig::default())
        .expect("simulated timer fits the pin table");
    let dev = DeviceIndex::new(0, tester.device_count()).expect("device 0 exists");
    tester.init(dev, 1_000_000, CallbackKind::Toggle);

    c.bench_function("timer_set 1 tick", |b| {
        b.iter(|| black_box(tester.set(dev, 0, 1)))
    });
}

fn read_bench(c: &mut Criterion) {
    let timer = Arc::new(SimTimer::new(SimTimerConfig::default()));
    let tester = TimerTester::new(timer, Arc::new(SimGpio::new()), TesterConfig::default())
        .expect("simulated timer fits the pin table");
    let dev = DeviceIndex::new(0, tester.device_count()).expect("device 0 exists");
    tester.init(dev, 1_000_000, CallbackKind::Toggle);

    c.bench_function("timer_read_bench 1000", |b| {
        b.iter(|| tester.read_bench(dev, black_box(1000)))
    });
}

criterion_group!(benches, gate_uncontended, blocking_set, read_bench);
criterion_main!(benches);
