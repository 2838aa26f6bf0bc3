//! 16-bit timer model

use heapless::Vec;

use crate::timer::{InterruptMask, InterruptSource, Prescaler, TimerRegisters, Waveform};

/// Capacity of the register write log
const LOG_CAPACITY: usize = 64;

/// One recorded register write
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegisterWrite {
    /// Clock select bits
    Clock(Prescaler),
    /// Interrupt enable bits
    Interrupts(InterruptMask),
    /// Pending flags read and cleared
    ClearPending,
    /// Counter load
    Counter(u16),
    /// Compare register load
    Compare(u16),
    /// Waveform mode bits
    Waveform(Waveform),
}

/// Simulated 16-bit timer unit
///
/// `Normal` counts through `0xFFFF` and flags an overflow on wrap.
/// `ClearOnCompare` flags a compare match when the counter reaches the
/// compare register and restarts from zero. Flags are set regardless of the
/// enable bits, as on hardware.
#[derive(Debug, Default)]
pub struct SimTimer {
    counter: u16,
    compare: u16,
    clock: Prescaler,
    waveform: Waveform,
    enabled: InterruptMask,
    pending: InterruptMask,
    log: Vec<RegisterWrite, LOG_CAPACITY>,
}

impl SimTimer {
    /// Create a timer in its reset state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the counter by one tick
    ///
    /// Returns the event raised by this tick, if any. A stopped clock does
    /// not count.
    pub fn tick(&mut self) -> Option<InterruptSource> {
        if !self.clock.is_running() {
            return None;
        }

        let event = match self.waveform {
            Waveform::Normal => {
                let (next, wrapped) = self.counter.overflowing_add(1);
                self.counter = next;
                wrapped.then_some(InterruptSource::Overflow)
            }
            Waveform::ClearOnCompare => {
                self.counter = self.counter.wrapping_add(1);
                if self.counter == self.compare {
                    self.counter = 0;
                    Some(InterruptSource::CompareMatch)
                } else {
                    None
                }
            }
        };

        if let Some(source) = event {
            self.raise(source);
        }
        event
    }

    /// Set an event flag without counting
    pub fn raise(&mut self, source: InterruptSource) {
        self.pending = self.pending.union(InterruptMask::of(source));
    }

    /// Pending flags, without clearing them
    #[must_use]
    pub const fn pending(&self) -> InterruptMask {
        self.pending
    }

    /// Counter register
    #[must_use]
    pub const fn counter(&self) -> u16 {
        self.counter
    }

    /// Compare register
    #[must_use]
    pub const fn compare(&self) -> u16 {
        self.compare
    }

    /// Clock select bits
    #[must_use]
    pub const fn clock(&self) -> Prescaler {
        self.clock
    }

    /// Waveform mode bits
    #[must_use]
    pub const fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Register writes since the last [`SimTimer::clear_log`]
    ///
    /// Writes beyond the log capacity are not recorded.
    #[must_use]
    pub fn log(&self) -> &[RegisterWrite] {
        &self.log
    }

    /// Forget recorded writes
    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    fn record(&mut self, write: RegisterWrite) {
        let _ = self.log.push(write);
    }
}

impl TimerRegisters for SimTimer {
    fn set_clock(&mut self, prescaler: Prescaler) {
        self.clock = prescaler;
        self.record(RegisterWrite::Clock(prescaler));
    }

    fn set_interrupts(&mut self, mask: InterruptMask) {
        self.enabled = mask;
        self.record(RegisterWrite::Interrupts(mask));
    }

    fn interrupts(&self) -> InterruptMask {
        self.enabled
    }

    fn take_pending(&mut self) -> InterruptMask {
        self.record(RegisterWrite::ClearPending);
        core::mem::take(&mut self.pending)
    }

    fn write_counter(&mut self, value: u16) {
        self.counter = value;
        self.record(RegisterWrite::Counter(value));
    }

    fn write_compare(&mut self, value: u16) {
        self.compare = value;
        self.record(RegisterWrite::Compare(value));
    }

    fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
        self.record(RegisterWrite::Waveform(waveform));
    }
}
