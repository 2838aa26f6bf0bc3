//! Driver error types
//!
//! Every public entry point validates its arguments before touching a
//! register. Interrupt dispatch never produces an error.

use core::fmt;

/// Result type for driver operations
pub type Result<T> = core::result::Result<T, Error>;

/// Driver-level errors
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// Duty cycle percentage above 100
    DutyCycleOutOfRange(u8),
    /// Timer configuration that would arm into a degenerate state
    ///
    /// Raised for a compare-triggered timer with a zero compare value (an
    /// immediate spurious match) and for arming with the clock disabled.
    InvalidModeCombination,
    /// Requested period cannot be represented in a 16-bit counter at the
    /// chosen prescaler, or the input clock is zero
    TickRateOutOfRange,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DutyCycleOutOfRange(percent) => {
                write!(f, "duty cycle {percent}% outside 0-100%")
            }
            Self::InvalidModeCombination => f.write_str("invalid timer mode combination"),
            Self::TickRateOutOfRange => f.write_str("tick rate out of range"),
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::DutyCycleOutOfRange(percent) => {
                defmt::write!(f, "DutyCycleOutOfRange({})", percent);
            }
            Self::InvalidModeCombination => defmt::write!(f, "InvalidModeCombination"),
            Self::TickRateOutOfRange => defmt::write!(f, "TickRateOutOfRange"),
        }
    }
}
