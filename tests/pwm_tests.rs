//! PWM Generator Tests
//!
//! Duty cycle to compare-load translation and the resulting output shape on
//! the simulated 8-bit fast-PWM unit.
//! Run with: cargo test --features std --test pwm_tests

use control_ecu::config::{PWM_COUNTER_MAX, PWM_PRESCALER};
use control_ecu::pwm::{DutyCycle, OutputMode, PwmGenerator};
use control_ecu::sim::SimPwm;
use control_ecu::timer::Prescaler;
use control_ecu::Error;

fn generator() -> PwmGenerator<SimPwm> {
    PwmGenerator::new(SimPwm::new(PWM_COUNTER_MAX), PWM_PRESCALER)
}

// =============================================================================
// Duty Cycle Tests
// =============================================================================

#[test]
fn duty_cycle_presets() {
    assert_eq!(DutyCycle::ZERO.percent(), 0);
    assert_eq!(DutyCycle::QUARTER.percent(), 25);
    assert_eq!(DutyCycle::HALF.percent(), 50);
    assert_eq!(DutyCycle::FULL.percent(), 100);
}

#[test]
fn duty_cycle_range() {
    assert!(DutyCycle::from_percent(100).is_ok());
    assert_eq!(DutyCycle::from_percent(101), Err(Error::DutyCycleOutOfRange(101)));
    assert_eq!(DutyCycle::try_from(255u8), Err(Error::DutyCycleOutOfRange(255)));
}

#[test]
fn compare_load_boundaries() {
    let mut pwm = generator();
    for (percent, load) in [(0, 0), (1, 3), (50, 128), (99, 252), (100, 255)] {
        pwm.set_duty_cycle(percent).unwrap();
        assert_eq!(pwm.compare_load(), load, "percent {percent}");
    }
}

#[test]
fn compare_load_is_monotonic() {
    let mut last = 0;
    for percent in 0..=100u8 {
        let load = DutyCycle::from_percent(percent).unwrap().compare_load(PWM_COUNTER_MAX);
        assert!(load >= last);
        last = load;
    }
    assert_eq!(last, PWM_COUNTER_MAX);
}

#[test]
fn compare_load_within_half_step_of_exact() {
    for percent in 0..=100u32 {
        let duty = DutyCycle::from_percent(u8::try_from(percent).unwrap()).unwrap();
        let load = u32::from(duty.compare_load(PWM_COUNTER_MAX));
        let exact_x100 = percent * u32::from(PWM_COUNTER_MAX);
        assert!((load * 100).abs_diff(exact_x100) <= 50);
    }
}

// =============================================================================
// Output Shape Tests
// =============================================================================

#[test]
fn zero_percent_is_permanently_low() {
    let mut pwm = generator();
    pwm.set_duty_cycle(0).unwrap();
    let sim = pwm.registers();
    assert_eq!(sim.mode(), OutputMode::ForcedLow);
    assert_eq!(sim.high_ticks_per_period(), 0);
}

#[test]
fn hundred_percent_is_permanently_high() {
    let mut pwm = generator();
    pwm.set_duty_cycle(100).unwrap();
    let sim = pwm.registers();
    assert_eq!(sim.mode(), OutputMode::ClearOnCompare);
    assert_eq!(sim.high_ticks_per_period(), sim.period_ticks());
}

#[test]
fn half_duty_is_half_period() {
    let mut pwm = generator();
    pwm.set_duty_cycle(50).unwrap();
    let sim = pwm.registers();
    // High for compare + 1 ticks out of 256
    assert_eq!(sim.high_ticks_per_period(), 129);
}

#[test]
fn set_duty_cycle_starts_counter_at_configured_prescaler() {
    let mut pwm = generator();
    assert!(!pwm.is_running());
    assert_eq!(pwm.registers().clock(), Prescaler::Disabled);

    pwm.set_duty_cycle(30).unwrap();
    assert!(pwm.is_running());
    assert_eq!(pwm.registers().clock(), PWM_PRESCALER);
}

#[test]
fn repeated_calls_take_latest_value() {
    let mut pwm = generator();
    pwm.set_duty_cycle(10).unwrap();
    pwm.set_duty_cycle(90).unwrap();
    assert_eq!(pwm.duty_cycle().percent(), 90);
    assert_eq!(pwm.registers().compare(), 230);
}

#[test]
fn rejected_duty_writes_nothing() {
    let mut pwm = generator();
    let writes = pwm.registers().compare_writes();
    assert!(pwm.set_duty_cycle(150).is_err());
    assert_eq!(pwm.registers().compare_writes(), writes);
    assert!(!pwm.is_running());
}

#[test]
fn wider_counter_scales_load() {
    let mut pwm = PwmGenerator::new(SimPwm::new(999), Prescaler::Div1);
    pwm.set_duty_cycle(75).unwrap();
    assert_eq!(pwm.compare_load(), 749);
}
