//! DC Motor Driver
//!
//! Drives a brushed DC motor through an L293D-style H-bridge: two GPIO lines
//! select the direction, the PWM generator modulates the bridge enable.
//!
//! | IN1  | IN2  | State            |
//! |------|------|------------------|
//! | LOW  | LOW  | Stopped          |
//! | LOW  | HIGH | Clockwise        |
//! | HIGH | LOW  | CounterClockwise |
//!
//! No state is stored: each [`DcMotor::rotate`] call fully determines the
//! pins and the duty cycle, and [`DcMotor::state`] reads the lines back.

use crate::config::pins;
use crate::error::Result;
use crate::gpio::{GpioPort, Level, PinDirection, PinId, PortId};
use crate::pwm::{CompareOutput, DutyCycle, PwmGenerator};

/// Rotation state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MotorState {
    /// Both direction lines low
    #[default]
    Stopped,
    /// IN1 low, IN2 high
    Clockwise,
    /// IN1 high, IN2 low
    CounterClockwise,
}

impl MotorState {
    /// Direction line levels as `(IN1, IN2)`
    #[must_use]
    pub const fn levels(self) -> (Level, Level) {
        match self {
            Self::Stopped => (Level::Low, Level::Low),
            Self::Clockwise => (Level::Low, Level::High),
            Self::CounterClockwise => (Level::High, Level::Low),
        }
    }

    /// Decode direction line levels
    ///
    /// Both lines high is a bridge brake, which this driver never produces.
    #[must_use]
    pub const fn from_levels(in1: Level, in2: Level) -> Option<Self> {
        match (in1, in2) {
            (Level::Low, Level::Low) => Some(Self::Stopped),
            (Level::Low, Level::High) => Some(Self::Clockwise),
            (Level::High, Level::Low) => Some(Self::CounterClockwise),
            (Level::High, Level::High) => None,
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for MotorState {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Stopped => defmt::write!(f, "STOP"),
            Self::Clockwise => defmt::write!(f, "CW"),
            Self::CounterClockwise => defmt::write!(f, "CCW"),
        }
    }
}

/// Direction line wiring
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MotorPins {
    /// Port carrying both lines
    pub port: PortId,
    /// H-bridge IN1
    pub in1: PinId,
    /// H-bridge IN2
    pub in2: PinId,
}

impl Default for MotorPins {
    fn default() -> Self {
        Self {
            port: pins::MOTOR_PORT,
            in1: pins::MOTOR_IN1,
            in2: pins::MOTOR_IN2,
        }
    }
}

/// H-bridge DC motor
pub struct DcMotor<G: GpioPort, R: CompareOutput> {
    gpio: G,
    pwm: PwmGenerator<R>,
    pins: MotorPins,
}

impl<G: GpioPort, R: CompareOutput> DcMotor<G, R> {
    /// Assemble the driver, call [`DcMotor::initialize`] before use
    pub fn new(gpio: G, pwm: PwmGenerator<R>, pins: MotorPins) -> Self {
        Self { gpio, pwm, pins }
    }

    /// Configure the direction lines as outputs and stop the motor
    pub fn initialize(&mut self) {
        self.gpio
            .set_direction(self.pins.port, self.pins.in1, PinDirection::Output);
        self.gpio
            .set_direction(self.pins.port, self.pins.in2, PinDirection::Output);
        self.drive(MotorState::Stopped);
        self.pwm.disable();
        crate::log_info!(
            "motor ready on {} IN1 {} IN2 {}",
            self.pins.port,
            self.pins.in1,
            self.pins.in2
        );
    }

    /// Set direction and speed
    ///
    /// `speed` is a duty cycle percentage. [`MotorState::Stopped`] ignores
    /// it and drives the PWM to 0 %.
    ///
    /// # Errors
    ///
    /// [`crate::Error::DutyCycleOutOfRange`] for a running state with a
    /// speed above 100; nothing is written in that case.
    pub fn rotate(&mut self, state: MotorState, speed: u8) -> Result<()> {
        let duty = match state {
            MotorState::Stopped => DutyCycle::ZERO,
            MotorState::Clockwise | MotorState::CounterClockwise => {
                DutyCycle::from_percent(speed)?
            }
        };

        self.drive(state);
        self.pwm.set_duty(duty);
        crate::log_debug!("motor {} at {}", state, duty);
        Ok(())
    }

    /// Stop the motor
    pub fn stop(&mut self) {
        self.drive(MotorState::Stopped);
        self.pwm.set_duty(DutyCycle::ZERO);
    }

    /// State read back from the direction lines
    #[must_use]
    pub fn state(&self) -> Option<MotorState> {
        MotorState::from_levels(
            self.gpio.read(self.pins.port, self.pins.in1),
            self.gpio.read(self.pins.port, self.pins.in2),
        )
    }

    /// Current duty cycle on the bridge enable
    #[must_use]
    pub const fn speed(&self) -> DutyCycle {
        self.pwm.duty_cycle()
    }

    /// PWM generator driving the bridge enable
    #[must_use]
    pub const fn pwm(&self) -> &PwmGenerator<R> {
        &self.pwm
    }

    /// GPIO backend
    #[must_use]
    pub const fn gpio(&self) -> &G {
        &self.gpio
    }

    fn drive(&mut self, state: MotorState) {
        let (in1, in2) = state.levels();
        self.gpio.write(self.pins.port, self.pins.in1, in1);
        self.gpio.write(self.pins.port, self.pins.in2, in2);
    }
}
