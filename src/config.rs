//! System configuration and hardware constants
//!
//! This module defines compile-time constants for the control unit hardware.
//! Pin mappings, clock frequencies, timer assignments and speed presets are
//! centralized here.

use crate::timer::{Prescaler, TimerConfiguration};

/// Timer kernel clock (STM32G474 on HSI16, the embassy default clock tree)
pub const SYSTEM_CLOCK_HZ: u32 = 16_000_000;

/// Prescaler used for second-scale event timing
pub const EVENT_PRESCALER: Prescaler = Prescaler::Div1024;

/// Prescaler used by the PWM generator
pub const PWM_PRESCALER: Prescaler = Prescaler::Div8;

/// Top count of the PWM counter (8-bit resolution)
pub const PWM_COUNTER_MAX: u16 = 255;

/// Motor stopped
pub const NO_SPEED: u8 = 0;

/// Quarter speed
pub const QUARTER_SPEED: u8 = 25;

/// Half speed
pub const HALF_SPEED: u8 = 50;

/// Full speed
pub const FULL_SPEED: u8 = 100;

/// Pin assignments for GPIO
pub mod pins {
    //! GPIO pin assignments matching the schematic

    use crate::gpio::{PinId, PortId};

    /// Port carrying both H-bridge direction inputs
    pub const MOTOR_PORT: PortId = PortId::B;

    /// H-bridge IN1
    pub const MOTOR_IN1: PinId = PinId::masked(0);

    /// H-bridge IN2
    pub const MOTOR_IN2: PinId = PinId::masked(1);

    /// Port carrying the H-bridge enable (PWM) output
    pub const MOTOR_PWM_PORT: PortId = PortId::A;

    /// H-bridge enable, TIM1 CH1 output compare
    pub const MOTOR_PWM: PinId = PinId::masked(8);

    /// Buzzer port
    pub const BUZZER_PORT: PortId = PortId::A;

    /// Buzzer pin
    pub const BUZZER: PinId = PinId::masked(1);
}

/// Timer assignments
pub mod timers {
    //! Hardware timer assignments

    /// Event timer (overflow / compare-match callbacks)
    pub const EVENT: u8 = 3;

    /// Motor PWM timer
    pub const MOTOR_PWM: u8 = 1;

    /// Embassy time driver, not available to the drivers
    pub const TIME_DRIVER: u8 = 2;

    /// PWM carrier frequency in Hz
    pub const MOTOR_PWM_HZ: u32 = 1_000;
}

/// One-second compare-triggered configuration for the event timer
///
/// The tick count is computed from [`SYSTEM_CLOCK_HZ`] and
/// [`EVENT_PRESCALER`], so it follows any change to either.
///
/// # Errors
///
/// Returns [`crate::Error::TickRateOutOfRange`] if one second does not fit
/// in the 16-bit counter at the configured clock.
pub fn one_second() -> crate::Result<TimerConfiguration> {
    TimerConfiguration::with_period_ms(SYSTEM_CLOCK_HZ, EVENT_PRESCALER, 1_000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_second_fits_sixteen_bits() {
        let config = one_second().unwrap();
        assert_eq!(config.compare_value, 15_625);
    }
}
