//! GPIO Backend
//!
//! [`GpioPort`] over embassy-stm32 `Flex` pins. Each pin is attached once
//! with its port/pin address; pins never attached are ignored.

use embassy_stm32::gpio::{Flex, Pull, Speed};
use heapless::Vec;

use crate::gpio::{GpioPort, Level, PinDirection, PinId, PortId};

/// Set of flexible pins addressed by port and pin number
pub struct FlexPort<'d, const N: usize> {
    pins: Vec<(PortId, PinId, Flex<'d>), N>,
}

impl<'d, const N: usize> FlexPort<'d, N> {
    /// Create an empty port map
    #[must_use]
    pub const fn new() -> Self {
        Self { pins: Vec::new() }
    }

    /// Attach a pin, handing it back if the map is full
    ///
    /// # Errors
    ///
    /// Returns the pin when all `N` slots are taken.
    pub fn attach(&mut self, port: PortId, pin: PinId, flex: Flex<'d>) -> Result<(), Flex<'d>> {
        self.pins.push((port, pin, flex)).map_err(|(_, _, flex)| flex)
    }

    fn find(&self, port: PortId, pin: PinId) -> Option<&Flex<'d>> {
        self.pins
            .iter()
            .find(|(p, n, _)| *p == port && *n == pin)
            .map(|(_, _, flex)| flex)
    }

    fn find_mut(&mut self, port: PortId, pin: PinId) -> Option<&mut Flex<'d>> {
        let found = self
            .pins
            .iter_mut()
            .find(|(p, n, _)| *p == port && *n == pin)
            .map(|(_, _, flex)| flex);
        if found.is_none() {
            crate::log_warn!("gpio {}{} not attached", port, pin);
        }
        found
    }
}

impl<const N: usize> Default for FlexPort<'_, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> GpioPort for FlexPort<'_, N> {
    fn set_direction(&mut self, port: PortId, pin: PinId, direction: PinDirection) {
        if let Some(flex) = self.find_mut(port, pin) {
            match direction {
                PinDirection::Input => flex.set_as_input(Pull::None),
                PinDirection::Output => flex.set_as_output(Speed::Low),
            }
        }
    }

    fn write(&mut self, port: PortId, pin: PinId, level: Level) {
        if let Some(flex) = self.find_mut(port, pin) {
            match level {
                Level::Low => flex.set_low(),
                Level::High => flex.set_high(),
            }
        }
    }

    fn read(&self, port: PortId, pin: PinId) -> Level {
        self.find(port, pin)
            .map_or(Level::Low, |flex| Level::from(flex.is_high()))
    }
}
