//! Simulated Register Blocks
//!
//! Host models of the timer, PWM and GPIO hardware. They implement the same
//! traits as the board backends, so every driver runs unchanged on a
//! workstation and tests can step the counters tick by tick.

mod gpio;
mod pwm;
mod timer;

pub use gpio::SimGpio;
pub use pwm::SimPwm;
pub use timer::{RegisterWrite, SimTimer};
