//! Buzzer Driver
//!
//! Active buzzer on a single GPIO line.

use crate::config::pins;
use crate::gpio::{GpioPort, Level, PinDirection, PinId, PortId};

/// Active buzzer
pub struct Buzzer<G: GpioPort> {
    gpio: G,
    port: PortId,
    pin: PinId,
}

impl<G: GpioPort> Buzzer<G> {
    /// Create a buzzer on a specific pin
    pub fn new(gpio: G, port: PortId, pin: PinId) -> Self {
        Self { gpio, port, pin }
    }

    /// Create a buzzer on the board's buzzer pin
    pub fn on_board(gpio: G) -> Self {
        Self::new(gpio, pins::BUZZER_PORT, pins::BUZZER)
    }

    /// Configure the pin as output and silence the buzzer
    pub fn initialize(&mut self) {
        self.gpio.set_direction(self.port, self.pin, PinDirection::Output);
        self.off();
    }

    /// Sound the buzzer
    pub fn on(&mut self) {
        self.gpio.write(self.port, self.pin, Level::High);
    }

    /// Silence the buzzer
    pub fn off(&mut self) {
        self.gpio.write(self.port, self.pin, Level::Low);
    }

    /// Check whether the buzzer is sounding
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.gpio.read(self.port, self.pin).is_high()
    }
}
