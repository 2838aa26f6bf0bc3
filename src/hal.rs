//! Hardware Abstraction Layer
//!
//! STM32G474 backends for the driver traits: port-addressed GPIO over
//! embassy `Flex` pins and register access to a general-purpose timer.
//! The PWM generator needs no backend here, it runs on any
//! `embedded-hal` PWM channel through [`crate::pwm::HalPwm`].

pub mod gpio;
pub mod timer;
