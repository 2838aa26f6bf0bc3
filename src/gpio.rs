//! GPIO Capability
//!
//! The port/pin level interface the drivers consume. Board backends
//! (`hal::gpio`) and the host model (`sim::SimGpio`) implement it.

/// GPIO port identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PortId {
    /// Port A
    A,
    /// Port B
    B,
    /// Port C
    C,
    /// Port D
    D,
}

impl PortId {
    /// Number of ports exposed by the capability
    pub const COUNT: usize = 4;

    /// Zero-based index of the port
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
            Self::C => 2,
            Self::D => 3,
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for PortId {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::A => defmt::write!(f, "PA"),
            Self::B => defmt::write!(f, "PB"),
            Self::C => defmt::write!(f, "PC"),
            Self::D => defmt::write!(f, "PD"),
        }
    }
}

/// Pin number within a port (0-15)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PinId(u8);

impl PinId {
    /// Pins per port
    pub const PER_PORT: usize = 16;

    /// Create a pin id, returns None if out of range
    #[must_use]
    pub const fn new(pin: u8) -> Option<Self> {
        if (pin as usize) < Self::PER_PORT {
            Some(Self(pin))
        } else {
            None
        }
    }

    /// Create a pin id, masking to the valid range
    #[must_use]
    pub const fn masked(pin: u8) -> Self {
        Self(pin & 0x0F)
    }

    /// Get the pin number
    #[must_use]
    pub const fn number(self) -> u8 {
        self.0
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for PinId {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}", self.0);
    }
}

/// Pin direction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PinDirection {
    /// High-impedance input (reset state)
    #[default]
    Input,
    /// Push-pull output
    Output,
}

/// Logic level
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Level {
    /// Logic 0
    #[default]
    Low,
    /// Logic 1
    High,
}

impl Level {
    /// Check for logic 1
    #[must_use]
    pub const fn is_high(self) -> bool {
        matches!(self, Self::High)
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Self::High
        } else {
            Self::Low
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Level {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Low => defmt::write!(f, "LOW"),
            Self::High => defmt::write!(f, "HIGH"),
        }
    }
}

/// Port-addressed GPIO access
///
/// Implementations are synchronous and assumed correct; a pin that the
/// backend does not own is ignored rather than reported.
pub trait GpioPort {
    /// Configure a pin as input or output
    fn set_direction(&mut self, port: PortId, pin: PinId, direction: PinDirection);

    /// Drive an output pin
    fn write(&mut self, port: PortId, pin: PinId, level: Level);

    /// Read back a pin level
    fn read(&self, port: PortId, pin: PinId) -> Level;
}

impl<G: GpioPort + ?Sized> GpioPort for &mut G {
    fn set_direction(&mut self, port: PortId, pin: PinId, direction: PinDirection) {
        (**self).set_direction(port, pin, direction);
    }

    fn write(&mut self, port: PortId, pin: PinId, level: Level) {
        (**self).write(port, pin, level);
    }

    fn read(&self, port: PortId, pin: PinId) -> Level {
        (**self).read(port, pin)
    }
}
