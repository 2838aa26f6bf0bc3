//! Timer Resource Manager Tests
//!
//! Arming, event dispatch and callback replacement against the simulated
//! 16-bit timer.
//! Run with: cargo test --features std --test timer_tests

use std::sync::atomic::{AtomicU32, Ordering};

use control_ecu::sim::{RegisterWrite, SimTimer};
use control_ecu::timer::{
    InterruptMask, InterruptSource, Prescaler, SharedTimer, TickHandler, TickRate, Timer,
    TimerConfiguration, TimerMode, TimerRegisters,
};
use control_ecu::Error;

const CLOCK_HZ: u32 = 8_000_000;

/// Step the counter and service the interrupt after every raised event
fn run(timer: &mut Timer<'_, &mut SimTimer>, ticks: u32) -> u32 {
    let mut calls = 0;
    for _ in 0..ticks {
        if timer.registers_mut().tick().is_some() {
            calls += u32::from(timer.on_interrupt());
        }
    }
    calls
}

/// Handler counting its own calls
#[derive(Default)]
struct Counter {
    calls: u32,
}

impl TickHandler for Counter {
    fn on_tick(&mut self) {
        self.calls += 1;
    }
}

// =============================================================================
// Configuration Tests
// =============================================================================

#[test]
fn prescaler_divisors() {
    assert_eq!(Prescaler::Disabled.divisor(), None);
    assert_eq!(Prescaler::Div1.divisor(), Some(1));
    assert_eq!(Prescaler::Div8.divisor(), Some(8));
    assert_eq!(Prescaler::Div64.divisor(), Some(64));
    assert_eq!(Prescaler::Div256.divisor(), Some(256));
    assert_eq!(Prescaler::Div1024.divisor(), Some(1024));
}

#[test]
fn tick_rate_follows_clock_and_prescaler() {
    let slow = TickRate::new(8_000_000, Prescaler::Div1024).unwrap();
    let fast = TickRate::new(16_000_000, Prescaler::Div1024).unwrap();
    assert_eq!(slow.ticks_per_second(), 7812);
    assert_eq!(fast.ticks_per_second(), 15_625);
}

#[test]
fn one_second_period_at_8mhz() {
    let config = TimerConfiguration::with_period_ms(CLOCK_HZ, Prescaler::Div1024, 1000).unwrap();
    assert_eq!(config.mode, TimerMode::CompareTriggered);
    assert_eq!(config.initial_value, 0);
    assert_eq!(config.compare_value, 7812);
}

#[test]
fn zero_length_period_rejected() {
    assert_eq!(
        TimerConfiguration::with_period_ms(CLOCK_HZ, Prescaler::Div1024, 0),
        Err(Error::TickRateOutOfRange)
    );
}

#[test]
fn one_tick_compare_rejected() {
    assert_eq!(TimerConfiguration::MIN_COMPARE, 2);
    assert_eq!(
        TimerConfiguration::compare_triggered(0, 1, Prescaler::Div1).validate(),
        Err(Error::InvalidModeCombination)
    );
    // 1.5 MHz / 1024 = 1464 Hz, 1 ms is a single tick
    assert_eq!(
        TimerConfiguration::with_period_ms(1_500_000, Prescaler::Div1024, 1),
        Err(Error::TickRateOutOfRange)
    );
    let shortest = TimerConfiguration::with_period_ms(CLOCK_HZ, Prescaler::Div8, 1).unwrap();
    assert_eq!(shortest.compare_value, 1000);
}

#[test]
fn stopped_clock_rejected() {
    let mut sim = SimTimer::new();
    let mut timer = Timer::new(&mut sim, CLOCK_HZ);
    let config = TimerConfiguration::free_running(0, Prescaler::Disabled);
    assert_eq!(timer.initialize(config), Err(Error::InvalidModeCombination));
    assert!(timer.configuration().is_none());
}

// =============================================================================
// Arming Tests
// =============================================================================

#[test]
fn compare_mode_loads_registers() {
    let mut sim = SimTimer::new();
    let mut timer = Timer::new(&mut sim, CLOCK_HZ);
    let config = TimerConfiguration::compare_triggered(100, 7812, Prescaler::Div1024);
    timer.initialize(config).unwrap();

    assert!(timer.is_armed());
    assert_eq!(timer.configuration(), Some(config));
    assert_eq!(timer.tick_rate().map(TickRate::ticks_per_second), Some(7812));
    drop(timer);
    // Dropping the timer released the unit
    assert_eq!(sim.clock(), Prescaler::Disabled);
}

#[test]
fn compare_mode_enables_only_compare_interrupt() {
    let mut sim = SimTimer::new();
    let mut timer = Timer::new(&mut sim, CLOCK_HZ);
    timer
        .initialize(TimerConfiguration::compare_triggered(100, 7812, Prescaler::Div1024))
        .unwrap();

    let regs = timer.registers();
    assert_eq!(regs.interrupts(), InterruptMask::COMPARE_MATCH);
    assert_eq!(regs.counter(), 100);
    assert_eq!(regs.compare(), 7812);
    assert_eq!(regs.clock(), Prescaler::Div1024);
}

#[test]
fn free_running_enables_only_overflow_interrupt() {
    let mut sim = SimTimer::new();
    let mut timer = Timer::new(&mut sim, CLOCK_HZ);
    timer
        .initialize(TimerConfiguration::free_running(42, Prescaler::Div64))
        .unwrap();

    let regs = timer.registers();
    assert_eq!(regs.interrupts(), InterruptMask::OVERFLOW);
    assert_eq!(regs.counter(), 42);
}

#[test]
fn pending_flag_from_before_arming_is_discarded() {
    let mut counter = Counter::default();
    let mut sim = SimTimer::new();
    sim.raise(InterruptSource::CompareMatch);
    {
        let mut timer = Timer::new(&mut sim, CLOCK_HZ);
        timer.set_callback(&mut counter);
        timer
            .initialize(TimerConfiguration::compare_triggered(0, 50, Prescaler::Div8))
            .unwrap();
        assert_eq!(timer.on_interrupt(), 0);
    }
    assert_eq!(counter.calls, 0);
}

#[test]
fn clock_enabled_after_interrupt_source() {
    let mut sim = SimTimer::new();
    let mut timer = Timer::new(&mut sim, CLOCK_HZ);
    timer.registers_mut().clear_log();
    timer
        .initialize(TimerConfiguration::free_running(0, Prescaler::Div8))
        .unwrap();

    let log = timer.registers().log();
    let n = log.len();
    assert_eq!(log[n - 2], RegisterWrite::Interrupts(InterruptMask::OVERFLOW));
    assert_eq!(log[n - 1], RegisterWrite::Clock(Prescaler::Div8));
}

// =============================================================================
// Dispatch Tests
// =============================================================================

#[test]
fn no_callback_before_compare_value_reached() {
    let mut counter = Counter::default();
    let mut sim = SimTimer::new();
    {
        let mut timer = Timer::new(&mut sim, CLOCK_HZ);
        timer.set_callback(&mut counter);
        timer
            .initialize(TimerConfiguration::compare_triggered(10, 1000, Prescaler::Div8))
            .unwrap();

        assert_eq!(run(&mut timer, 989), 0);
        assert_eq!(run(&mut timer, 1), 1);
        // Subsequent periods start from zero
        assert_eq!(run(&mut timer, 999), 0);
        assert_eq!(run(&mut timer, 1), 1);
    }
    assert_eq!(counter.calls, 2);
}

#[test]
fn each_event_dispatched_separately() {
    let hits = AtomicU32::new(0);
    let mut handler = || {
        hits.fetch_add(1, Ordering::Relaxed);
    };
    let mut sim = SimTimer::new();
    let mut timer = Timer::new(&mut sim, CLOCK_HZ);
    timer.set_callback(&mut handler);
    timer
        .initialize(TimerConfiguration::compare_triggered(0, 4, Prescaler::Div1))
        .unwrap();

    assert_eq!(run(&mut timer, 40), 10);
    drop(timer);
    assert_eq!(hits.load(Ordering::Relaxed), 10);
}

#[test]
fn replaced_callback_is_the_only_one_called() {
    let first = AtomicU32::new(0);
    let second = AtomicU32::new(0);
    let mut first_handler = || {
        first.fetch_add(1, Ordering::Relaxed);
    };
    let mut second_handler = || {
        second.fetch_add(1, Ordering::Relaxed);
    };

    let mut sim = SimTimer::new();
    let mut timer = Timer::new(&mut sim, CLOCK_HZ);
    timer.set_callback(&mut first_handler);
    timer
        .initialize(TimerConfiguration::compare_triggered(0, 10, Prescaler::Div1))
        .unwrap();
    assert_eq!(run(&mut timer, 10), 1);

    timer.set_callback(&mut second_handler);
    assert_eq!(run(&mut timer, 10), 1);
    drop(timer);

    assert_eq!(first.load(Ordering::Relaxed), 1);
    assert_eq!(second.load(Ordering::Relaxed), 1);
}

#[test]
fn callback_set_before_arming_survives_initialize() {
    let mut counter = Counter::default();
    let mut sim = SimTimer::new();
    {
        let mut timer = Timer::new(&mut sim, CLOCK_HZ);
        timer.set_callback(&mut counter);
        timer
            .initialize(TimerConfiguration::free_running(0xFFFF, Prescaler::Div1))
            .unwrap();
        timer
            .initialize(TimerConfiguration::free_running(0xFFFF, Prescaler::Div1))
            .unwrap();
        assert!(timer.has_callback());
        assert_eq!(run(&mut timer, 1), 1);
    }
    assert_eq!(counter.calls, 1);
}

#[test]
fn deinitialize_then_event_calls_nothing() {
    let mut counter = Counter::default();
    let mut sim = SimTimer::new();
    {
        let mut timer = Timer::new(&mut sim, CLOCK_HZ);
        timer.set_callback(&mut counter);
        timer
            .initialize(TimerConfiguration::compare_triggered(0, 10, Prescaler::Div1))
            .unwrap();
        timer.deinitialize();

        timer.registers_mut().raise(InterruptSource::CompareMatch);
        timer.registers_mut().raise(InterruptSource::Overflow);
        assert_eq!(timer.on_interrupt(), 0);
        assert!(!timer.has_callback());
        // Stopped clock, nothing counts
        assert_eq!(run(&mut timer, 100), 0);
    }
    assert_eq!(counter.calls, 0);
}

#[test]
fn masked_source_not_dispatched() {
    let mut counter = Counter::default();
    let mut sim = SimTimer::new();
    {
        let mut timer = Timer::new(&mut sim, CLOCK_HZ);
        timer.set_callback(&mut counter);
        timer
            .initialize(TimerConfiguration::compare_triggered(0, 10, Prescaler::Div1))
            .unwrap();
        timer.registers_mut().raise(InterruptSource::Overflow);
        assert_eq!(timer.on_interrupt(), 0);
    }
    assert_eq!(counter.calls, 0);
}

// =============================================================================
// Shared Timer Tests
// =============================================================================

#[test]
fn shared_timer_refuses_reentry_from_handler() {
    static SHARED: SharedTimer<'static, SimTimer> = SharedTimer::new();
    static REFUSED: AtomicU32 = AtomicU32::new(0);

    struct Reentrant;

    impl TickHandler for Reentrant {
        fn on_tick(&mut self) {
            if SHARED.with(|t| t.deinitialize()).is_none() {
                REFUSED.fetch_add(1, Ordering::Relaxed);
            }
            if SHARED.take().is_none() {
                REFUSED.fetch_add(1, Ordering::Relaxed);
            }
            if SHARED.install(Timer::new(SimTimer::new(), CLOCK_HZ)).is_err() {
                REFUSED.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    let handler: &'static mut Reentrant = Box::leak(Box::new(Reentrant));
    let mut timer = Timer::new(SimTimer::new(), CLOCK_HZ);
    timer.set_callback(handler);
    timer
        .initialize(TimerConfiguration::compare_triggered(0, 2, Prescaler::Div1))
        .unwrap();
    assert!(matches!(SHARED.install(timer), Ok(None)));

    for _ in 0..2 {
        SHARED.with(|t| t.registers_mut().tick());
    }
    assert_eq!(SHARED.on_interrupt(), 1);
    assert_eq!(REFUSED.load(Ordering::Relaxed), 3);
    // The original timer is still installed and armed
    assert_eq!(SHARED.with(|t| t.is_armed()), Some(true));
    assert_eq!(SHARED.with(|t| t.has_callback()), Some(true));

    assert!(SHARED.take().is_some());
    assert!(SHARED.take().is_none());
}
