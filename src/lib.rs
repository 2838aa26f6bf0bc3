//! Control ECU Driver Library
//!
//! This library provides the motor and timing peripherals of an
//! STM32G474-based control unit: a configurable event timer with
//! interrupt-driven callback dispatch, a duty-cycle PWM generator, and an
//! H-bridge DC motor driver built on top of it.
//!
//! # Architecture
//!
//! The firmware is organized in layers:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      DRIVER LAYER                            │
//! │  DC Motor  │  Buzzer                                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │                   PERIPHERAL CORE                            │
//! │  Timer Resource Manager  │  PWM Generator  │  GPIO capability │
//! ├─────────────────────────────────────────────────────────────┤
//! │              REGISTER BACKENDS (traits)                      │
//! │  hal:: (STM32G474, embassy)  │  sim:: (host models)          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Principles
//!
//! - **One owner per timer unit**: a [`timer::Timer`] or
//!   [`pwm::PwmGenerator`] owns its register block, nothing aliases it
//! - **Validate, then write**: every fallible entry point checks its
//!   arguments before the first register write
//! - **No unsafe in driver code**: register access goes through the PAC
//! - **Same drivers on host and target**: backends sit behind traits
//! - **Explicit error handling**: All fallible operations return `Result`

#![cfg_attr(feature = "embedded", no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export dependencies needed by applications (only in embedded mode)
#[cfg(feature = "embedded")]
pub use embassy_executor;
#[cfg(feature = "embedded")]
pub use embassy_stm32;
#[cfg(feature = "embedded")]
pub use embassy_time;

/// Logging macros
#[macro_use]
mod log;

/// Hardware Abstraction Layer
///
/// STM32G474 register backends for the driver traits.
#[cfg(feature = "embedded")]
pub mod hal;

/// Simulated register blocks for host builds and tests
#[cfg(feature = "std")]
pub mod sim;

/// Error types
pub mod error;

/// GPIO capability consumed by the drivers
pub mod gpio;

/// Timer Resource Manager
///
/// Event timer with overflow / compare-match callback dispatch.
pub mod timer;

/// PWM Generator
pub mod pwm;

/// DC Motor Driver
pub mod motor;

/// Buzzer Driver
pub mod buzzer;

/// System configuration and constants
pub mod config;

pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    //! Convenient re-exports for common types and traits.

    pub use crate::buzzer::Buzzer;
    pub use crate::config::*;
    pub use crate::error::{Error, Result};
    pub use crate::gpio::{GpioPort, Level, PinDirection, PinId, PortId};
    pub use crate::motor::{DcMotor, MotorPins, MotorState};
    pub use crate::pwm::{CompareOutput, DutyCycle, HalPwm, PwmGenerator};
    pub use crate::timer::{
        Prescaler, SharedTimer, TickHandler, TickRate, Timer, TimerConfiguration, TimerMode,
        TimerRegisters,
    };

    #[cfg(feature = "embedded")]
    pub use crate::hal::{gpio::FlexPort, timer::TimRegisters};

    // Embassy
    #[cfg(feature = "embedded")]
    pub use embassy_time::{Duration, Instant};

    // Logging
    #[cfg(feature = "embedded")]
    pub use defmt::{debug, error, info, trace, warn};
}
