//! PWM Generator
//!
//! Turns a 0-100 % duty cycle into an output-compare load on a dedicated
//! timer running in fast-PWM mode, driving the H-bridge enable input.
//!
//! The compare load is `round(percent * counter_max / 100)`, rounding half
//! up. 0 % disconnects the compare output and holds the pin low, because a
//! zero compare value still produces a one-tick pulse at the bottom of every
//! period. 100 % loads `counter_max`, which keeps the pin high.

use embedded_hal::pwm::SetDutyCycle;

use crate::error::{Error, Result};
use crate::timer::Prescaler;

/// Duty cycle as a whole percentage (0-100)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DutyCycle(u8);

impl DutyCycle {
    /// 0% duty cycle
    pub const ZERO: Self = Self(0);

    /// 25% duty cycle
    pub const QUARTER: Self = Self(25);

    /// 50% duty cycle
    pub const HALF: Self = Self(50);

    /// 100% duty cycle
    pub const FULL: Self = Self(100);

    /// Create from percentage
    ///
    /// # Errors
    ///
    /// [`Error::DutyCycleOutOfRange`] above 100.
    pub const fn from_percent(percent: u8) -> Result<Self> {
        if percent > 100 {
            Err(Error::DutyCycleOutOfRange(percent))
        } else {
            Ok(Self(percent))
        }
    }

    /// Get as percentage
    #[must_use]
    pub const fn percent(self) -> u8 {
        self.0
    }

    /// Output-compare load for a counter topping out at `counter_max`
    #[must_use]
    pub const fn compare_load(self, counter_max: u16) -> u16 {
        ((self.0 as u32 * counter_max as u32 + 50) / 100) as u16
    }
}

impl TryFrom<u8> for DutyCycle {
    type Error = Error;

    fn try_from(percent: u8) -> Result<Self> {
        Self::from_percent(percent)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for DutyCycle {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}%", self.0);
    }
}

/// Behaviour of the output-compare pin
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Compare output disconnected, pin held low
    #[default]
    ForcedLow,
    /// Non-inverting: set at the bottom of the period, cleared on compare match
    ClearOnCompare,
}

/// Output-compare half of a timer unit
pub trait CompareOutput {
    /// Top count of the counter, one period is `counter_max + 1` ticks
    fn counter_max(&self) -> u16;

    /// Load the output-compare register, effective from the next period
    fn set_compare(&mut self, value: u16);

    /// Select the compare output behaviour
    fn set_output(&mut self, mode: OutputMode);

    /// Run the counter in continuous fast-PWM mode
    fn start(&mut self, prescaler: Prescaler);

    /// Stop the counter
    fn stop(&mut self);
}

impl<R: CompareOutput + ?Sized> CompareOutput for &mut R {
    fn counter_max(&self) -> u16 {
        (**self).counter_max()
    }

    fn set_compare(&mut self, value: u16) {
        (**self).set_compare(value);
    }

    fn set_output(&mut self, mode: OutputMode) {
        (**self).set_output(mode);
    }

    fn start(&mut self, prescaler: Prescaler) {
        (**self).start(prescaler);
    }

    fn stop(&mut self) {
        (**self).stop();
    }
}

/// Duty-cycle driven PWM output on one timer unit
pub struct PwmGenerator<R: CompareOutput> {
    regs: R,
    prescaler: Prescaler,
    duty: DutyCycle,
    compare_load: u16,
    running: bool,
}

impl<R: CompareOutput> PwmGenerator<R> {
    /// Take ownership of the timer unit, output held low until the first
    /// duty cycle is set
    ///
    /// `prescaler` is handed to [`CompareOutput::start`]. Backends whose
    /// carrier is fixed elsewhere, such as [`HalPwm`], ignore it.
    pub fn new(mut regs: R, prescaler: Prescaler) -> Self {
        regs.stop();
        regs.set_output(OutputMode::ForcedLow);
        regs.set_compare(0);
        Self {
            regs,
            prescaler,
            duty: DutyCycle::ZERO,
            compare_load: 0,
            running: false,
        }
    }

    /// Set the duty cycle from a percentage and (re)start the counter
    ///
    /// # Errors
    ///
    /// [`Error::DutyCycleOutOfRange`] above 100, with no register written.
    pub fn set_duty_cycle(&mut self, percent: u8) -> Result<DutyCycle> {
        let duty = DutyCycle::from_percent(percent)?;
        self.set_duty(duty);
        Ok(duty)
    }

    /// Set an already validated duty cycle and (re)start the counter
    pub fn set_duty(&mut self, duty: DutyCycle) {
        let load = duty.compare_load(self.regs.counter_max());

        if duty == DutyCycle::ZERO {
            self.regs.set_output(OutputMode::ForcedLow);
            self.regs.set_compare(load);
        } else {
            self.regs.set_compare(load);
            self.regs.set_output(OutputMode::ClearOnCompare);
        }
        self.regs.start(self.prescaler);

        self.duty = duty;
        self.compare_load = load;
        self.running = true;
    }

    /// Stop the counter and hold the output low
    pub fn disable(&mut self) {
        self.regs.set_output(OutputMode::ForcedLow);
        self.regs.stop();
        self.duty = DutyCycle::ZERO;
        self.compare_load = 0;
        self.running = false;
    }

    /// Current duty cycle
    #[must_use]
    pub const fn duty_cycle(&self) -> DutyCycle {
        self.duty
    }

    /// Value last written to the output-compare register
    #[must_use]
    pub const fn compare_load(&self) -> u16 {
        self.compare_load
    }

    /// Check whether the counter is running
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Underlying timer unit
    #[must_use]
    pub const fn registers(&self) -> &R {
        &self.regs
    }
}

/// [`CompareOutput`] over an `embedded-hal` PWM channel
///
/// The carrier frequency, and with it the prescaler, is fixed when the
/// channel is created, so [`CompareOutput::start`] only re-enables the
/// output. `counter_max` is the channel's maximum duty value.
pub struct HalPwm<P> {
    channel: P,
    compare: u16,
    mode: OutputMode,
    running: bool,
}

impl<P: SetDutyCycle> HalPwm<P> {
    /// Wrap a PWM channel, driving it fully off
    pub fn new(mut channel: P) -> Self {
        if channel.set_duty_cycle_fully_off().is_err() {
            crate::log_warn!("pwm channel rejected duty write");
        }
        Self {
            channel,
            compare: 0,
            mode: OutputMode::ForcedLow,
            running: false,
        }
    }

    /// Release the wrapped channel
    pub fn into_inner(self) -> P {
        self.channel
    }

    fn apply(&mut self) {
        let duty = match (self.running, self.mode) {
            (true, OutputMode::ClearOnCompare) => self.compare.min(self.channel.max_duty_cycle()),
            _ => 0,
        };
        if self.channel.set_duty_cycle(duty).is_err() {
            crate::log_warn!("pwm channel rejected duty {}", duty);
        }
    }
}

impl<P: SetDutyCycle> CompareOutput for HalPwm<P> {
    fn counter_max(&self) -> u16 {
        self.channel.max_duty_cycle()
    }

    fn set_compare(&mut self, value: u16) {
        self.compare = value;
        self.apply();
    }

    fn set_output(&mut self, mode: OutputMode) {
        self.mode = mode;
        self.apply();
    }

    fn start(&mut self, _prescaler: Prescaler) {
        self.running = true;
        self.apply();
    }

    fn stop(&mut self) {
        self.running = false;
        self.apply();
    }
}
