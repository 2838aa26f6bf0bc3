//! GPIO port model

use crate::gpio::{GpioPort, Level, PinDirection, PinId, PortId};

/// Simulated GPIO bank, every pin starts as a low input
#[derive(Debug, Default)]
pub struct SimGpio {
    directions: [[PinDirection; PinId::PER_PORT]; PortId::COUNT],
    levels: [[Level; PinId::PER_PORT]; PortId::COUNT],
    writes: u32,
}

impl SimGpio {
    /// Create a bank in its reset state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configured direction of a pin
    #[must_use]
    pub fn direction(&self, port: PortId, pin: PinId) -> PinDirection {
        self.directions[port.index()][usize::from(pin.number())]
    }

    /// Number of level writes so far
    #[must_use]
    pub const fn writes(&self) -> u32 {
        self.writes
    }
}

impl GpioPort for SimGpio {
    fn set_direction(&mut self, port: PortId, pin: PinId, direction: PinDirection) {
        self.directions[port.index()][usize::from(pin.number())] = direction;
    }

    fn write(&mut self, port: PortId, pin: PinId, level: Level) {
        self.writes += 1;
        // Inputs keep their level, the write only changes the pull on real parts
        if self.direction(port, pin) == PinDirection::Output {
            self.levels[port.index()][usize::from(pin.number())] = level;
        }
    }

    fn read(&self, port: PortId, pin: PinId) -> Level {
        self.levels[port.index()][usize::from(pin.number())]
    }
}
