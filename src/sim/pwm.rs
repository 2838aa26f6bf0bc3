//! Fast-PWM timer model

use crate::gpio::Level;
use crate::pwm::{CompareOutput, OutputMode};
use crate::timer::Prescaler;

/// Simulated fast-PWM unit
///
/// The counter runs `0..=counter_max`. In [`OutputMode::ClearOnCompare`]
/// the pin is set at the bottom and cleared after the compare match, so it
/// is high for `compare + 1` ticks and constantly high once the compare
/// value reaches `counter_max`.
#[derive(Debug)]
pub struct SimPwm {
    counter_max: u16,
    compare: u16,
    mode: OutputMode,
    clock: Prescaler,
    compare_writes: u32,
}

impl SimPwm {
    /// Create a stopped unit with the given top count
    #[must_use]
    pub const fn new(counter_max: u16) -> Self {
        Self {
            counter_max,
            compare: 0,
            mode: OutputMode::ForcedLow,
            clock: Prescaler::Disabled,
            compare_writes: 0,
        }
    }

    /// Pin level while the counter holds `counter`
    #[must_use]
    pub fn output_level(&self, counter: u16) -> Level {
        if !self.clock.is_running() || self.mode == OutputMode::ForcedLow {
            return Level::Low;
        }
        Level::from(counter <= self.compare)
    }

    /// Ticks per period with the pin high
    #[must_use]
    pub fn high_ticks_per_period(&self) -> u32 {
        let high = (0..=self.counter_max)
            .filter(|&counter| self.output_level(counter).is_high())
            .count();
        u32::try_from(high).unwrap_or(u32::MAX)
    }

    /// Ticks per period
    #[must_use]
    pub const fn period_ticks(&self) -> u32 {
        self.counter_max as u32 + 1
    }

    /// Output-compare register
    #[must_use]
    pub const fn compare(&self) -> u16 {
        self.compare
    }

    /// Compare output mode
    #[must_use]
    pub const fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Clock select bits
    #[must_use]
    pub const fn clock(&self) -> Prescaler {
        self.clock
    }

    /// Number of writes to the output-compare register
    #[must_use]
    pub const fn compare_writes(&self) -> u32 {
        self.compare_writes
    }
}

impl Default for SimPwm {
    fn default() -> Self {
        Self::new(crate::config::PWM_COUNTER_MAX)
    }
}

impl CompareOutput for SimPwm {
    fn counter_max(&self) -> u16 {
        self.counter_max
    }

    fn set_compare(&mut self, value: u16) {
        self.compare = value;
        self.compare_writes += 1;
    }

    fn set_output(&mut self, mode: OutputMode) {
        self.mode = mode;
    }

    fn start(&mut self, prescaler: Prescaler) {
        self.clock = prescaler;
    }

    fn stop(&mut self) {
        self.clock = Prescaler::Disabled;
    }
}
