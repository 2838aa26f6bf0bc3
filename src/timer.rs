//! Timer Resource Manager
//!
//! Owns one hardware counter's register block, turns a [`TimerConfiguration`]
//! into register state, and forwards each overflow or compare-match
//! interrupt to a single registered [`TickHandler`].
//!
//! # Interrupt model
//!
//! [`Timer::on_interrupt`] is the body of the timer's interrupt vector. The
//! handler is invoked synchronously from there, once per event, and must not
//! block. A handler only ever sees `&mut self` of its own state, never the
//! [`Timer`], so it cannot re-enter [`Timer::initialize`] or
//! [`Timer::deinitialize`] for the unit that is dispatching it. When the
//! timer is placed in a [`SharedTimer`], a re-entrant access from the
//! handler is refused instead.

mod shared;

pub use shared::SharedTimer;

use crate::error::{Error, Result};

/// Counting mode
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TimerMode {
    /// Count up to the 16-bit maximum and raise an overflow event on wrap
    #[default]
    FreeRunning,
    /// Count up to the compare value, raise a compare-match event and clear
    CompareTriggered,
}

#[cfg(feature = "embedded")]
impl defmt::Format for TimerMode {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::FreeRunning => defmt::write!(f, "FreeRunning"),
            Self::CompareTriggered => defmt::write!(f, "CompareTriggered"),
        }
    }
}

/// Clock divider in front of the counter
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Prescaler {
    /// No clock, the counter is stopped
    #[default]
    Disabled,
    /// System clock
    Div1,
    /// System clock / 8
    Div8,
    /// System clock / 64
    Div64,
    /// System clock / 256
    Div256,
    /// System clock / 1024
    Div1024,
}

impl Prescaler {
    /// Division factor, None when the clock is disabled
    #[must_use]
    pub const fn divisor(self) -> Option<u32> {
        match self {
            Self::Disabled => None,
            Self::Div1 => Some(1),
            Self::Div8 => Some(8),
            Self::Div64 => Some(64),
            Self::Div256 => Some(256),
            Self::Div1024 => Some(1024),
        }
    }

    /// Check whether the counter runs at this setting
    #[must_use]
    pub const fn is_running(self) -> bool {
        !matches!(self, Self::Disabled)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Prescaler {
    fn format(&self, f: defmt::Formatter) {
        match self.divisor() {
            None => defmt::write!(f, "off"),
            Some(div) => defmt::write!(f, "/{}", div),
        }
    }
}

/// Effective counter rate for a clock and prescaler
///
/// Integer ticks per second, truncated: 8 MHz / 1024 gives 7812.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickRate {
    hz: u32,
}

impl TickRate {
    /// Compute the tick rate
    ///
    /// # Errors
    ///
    /// [`Error::InvalidModeCombination`] if the prescaler stops the clock,
    /// [`Error::TickRateOutOfRange`] if the resulting rate is zero.
    pub const fn new(clock_hz: u32, prescaler: Prescaler) -> Result<Self> {
        let Some(divisor) = prescaler.divisor() else {
            return Err(Error::InvalidModeCombination);
        };
        let hz = clock_hz / divisor;
        if hz == 0 {
            return Err(Error::TickRateOutOfRange);
        }
        Ok(Self { hz })
    }

    /// Counter ticks per second
    #[must_use]
    pub const fn ticks_per_second(self) -> u32 {
        self.hz
    }

    /// Counter ticks in a period of milliseconds (truncated)
    #[must_use]
    pub const fn ticks_for_ms(self, ms: u32) -> u64 {
        (self.hz as u64 * ms as u64) / 1000
    }

    /// Milliseconds covered by a tick count (truncated)
    #[must_use]
    pub const fn ms_for_ticks(self, ticks: u32) -> u64 {
        (ticks as u64 * 1000) / self.hz as u64
    }
}

/// Timer configuration, applied as a whole by [`Timer::initialize`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct TimerConfiguration {
    /// Counting mode
    pub mode: TimerMode,
    /// Count loaded into the counter when arming
    pub initial_value: u16,
    /// Match threshold, ignored in [`TimerMode::FreeRunning`]
    pub compare_value: u16,
    /// Clock divider
    pub prescaler: Prescaler,
}

impl TimerConfiguration {
    /// Smallest compare value that can be armed
    ///
    /// A general-purpose STM32 timer with an auto-reload of zero does not
    /// count, so a one-tick period never raises an event there.
    pub const MIN_COMPARE: u16 = 2;

    /// Free-running configuration, overflow after `0x1_0000 - initial_value` ticks
    #[must_use]
    pub const fn free_running(initial_value: u16, prescaler: Prescaler) -> Self {
        Self {
            mode: TimerMode::FreeRunning,
            initial_value,
            compare_value: 0,
            prescaler,
        }
    }

    /// Compare-triggered configuration
    #[must_use]
    pub const fn compare_triggered(
        initial_value: u16,
        compare_value: u16,
        prescaler: Prescaler,
    ) -> Self {
        Self {
            mode: TimerMode::CompareTriggered,
            initial_value,
            compare_value,
            prescaler,
        }
    }

    /// Compare-triggered configuration firing every `period_ms`
    ///
    /// # Errors
    ///
    /// [`Error::TickRateOutOfRange`] if the period is shorter than
    /// [`Self::MIN_COMPARE`] ticks or needs more than 16 bits at this clock
    /// and prescaler.
    pub const fn with_period_ms(
        clock_hz: u32,
        prescaler: Prescaler,
        period_ms: u32,
    ) -> Result<Self> {
        let rate = match TickRate::new(clock_hz, prescaler) {
            Ok(rate) => rate,
            Err(e) => return Err(e),
        };
        let ticks = rate.ticks_for_ms(period_ms);
        if ticks < Self::MIN_COMPARE as u64 || ticks > u16::MAX as u64 {
            return Err(Error::TickRateOutOfRange);
        }
        Ok(Self::compare_triggered(0, ticks as u16, prescaler))
    }

    /// Check the configuration can be armed
    ///
    /// # Errors
    ///
    /// [`Error::InvalidModeCombination`] for a stopped clock or a compare
    /// value below [`Self::MIN_COMPARE`] in [`TimerMode::CompareTriggered`].
    pub const fn validate(&self) -> Result<()> {
        if !self.prescaler.is_running() {
            return Err(Error::InvalidModeCombination);
        }
        let compare_triggered = matches!(self.mode, TimerMode::CompareTriggered);
        if compare_triggered && self.compare_value < Self::MIN_COMPARE {
            return Err(Error::InvalidModeCombination);
        }
        Ok(())
    }
}

/// Interrupt source of a timer unit
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterruptSource {
    /// Counter wrapped from its maximum to zero
    Overflow,
    /// Counter reached the compare value
    CompareMatch,
}

/// Set of interrupt sources, used for enable bits and pending flags
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct InterruptMask(u8);

impl InterruptMask {
    /// No sources
    pub const NONE: Self = Self(0);

    /// Overflow only
    pub const OVERFLOW: Self = Self(0b01);

    /// Compare match only
    pub const COMPARE_MATCH: Self = Self(0b10);

    /// Mask for a single source
    #[must_use]
    pub const fn of(source: InterruptSource) -> Self {
        match source {
            InterruptSource::Overflow => Self::OVERFLOW,
            InterruptSource::CompareMatch => Self::COMPARE_MATCH,
        }
    }

    /// Check whether a source is in the set
    #[must_use]
    pub const fn contains(self, source: InterruptSource) -> bool {
        self.0 & Self::of(source).0 != 0
    }

    /// Union of two sets
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Intersection of two sets
    #[must_use]
    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// Check for the empty set
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Counter waveform generation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Waveform {
    /// Count through the full 16-bit range
    #[default]
    Normal,
    /// Clear the counter on compare match
    ClearOnCompare,
}

/// Register-level access to one timer unit
///
/// Each method is one register write (or read). [`Timer`] owns the order in
/// which they happen.
pub trait TimerRegisters {
    /// Program the clock select bits, [`Prescaler::Disabled`] stops counting
    fn set_clock(&mut self, prescaler: Prescaler);

    /// Program the interrupt enable bits
    fn set_interrupts(&mut self, mask: InterruptMask);

    /// Current interrupt enable bits
    fn interrupts(&self) -> InterruptMask;

    /// Read and clear the pending event flags
    fn take_pending(&mut self) -> InterruptMask;

    /// Load the counter
    fn write_counter(&mut self, value: u16);

    /// Load the compare register
    fn write_compare(&mut self, value: u16);

    /// Select the waveform generation mode
    fn set_waveform(&mut self, waveform: Waveform);
}

impl<R: TimerRegisters + ?Sized> TimerRegisters for &mut R {
    fn set_clock(&mut self, prescaler: Prescaler) {
        (**self).set_clock(prescaler);
    }

    fn set_interrupts(&mut self, mask: InterruptMask) {
        (**self).set_interrupts(mask);
    }

    fn interrupts(&self) -> InterruptMask {
        (**self).interrupts()
    }

    fn take_pending(&mut self) -> InterruptMask {
        (**self).take_pending()
    }

    fn write_counter(&mut self, value: u16) {
        (**self).write_counter(value);
    }

    fn write_compare(&mut self, value: u16) {
        (**self).write_compare(value);
    }

    fn set_waveform(&mut self, waveform: Waveform) {
        (**self).set_waveform(waveform);
    }
}

/// Application logic run on each timer event
///
/// Runs in interrupt context: keep it short, do not block.
pub trait TickHandler {
    /// Called once per overflow or compare-match event
    fn on_tick(&mut self);
}

impl<F: FnMut()> TickHandler for F {
    fn on_tick(&mut self) {
        self();
    }
}

/// A timer unit with its callback slot
///
/// Dropping the timer stops the counter and masks its interrupts.
pub struct Timer<'h, R: TimerRegisters> {
    regs: R,
    clock_hz: u32,
    config: Option<TimerConfiguration>,
    tick_rate: Option<TickRate>,
    handler: Option<&'h mut (dyn TickHandler + Send)>,
}

impl<'h, R: TimerRegisters> Timer<'h, R> {
    /// Take ownership of a register block, leaving the unit stopped
    pub fn new(regs: R, clock_hz: u32) -> Self {
        let mut timer = Self {
            regs,
            clock_hz,
            config: None,
            tick_rate: None,
            handler: None,
        };
        timer.halt();
        timer
    }

    /// Arm the timer with a configuration
    ///
    /// Re-arming a running timer resets every register first; nothing from
    /// the previous configuration carries over. The callback is kept.
    ///
    /// # Errors
    ///
    /// Returns the validation error without touching the registers.
    pub fn initialize(&mut self, config: TimerConfiguration) -> Result<()> {
        config.validate()?;
        let tick_rate = TickRate::new(self.clock_hz, config.prescaler)?;

        self.halt();

        self.regs.write_counter(config.initial_value);
        let (waveform, source) = match config.mode {
            TimerMode::FreeRunning => (Waveform::Normal, InterruptSource::Overflow),
            TimerMode::CompareTriggered => {
                self.regs.write_compare(config.compare_value);
                (Waveform::ClearOnCompare, InterruptSource::CompareMatch)
            }
        };
        self.regs.set_waveform(waveform);

        // Flags raised while loading must not fire once enabled
        let _ = self.regs.take_pending();
        self.regs.set_interrupts(InterruptMask::of(source));
        self.regs.set_clock(config.prescaler);

        self.config = Some(config);
        self.tick_rate = Some(tick_rate);

        crate::log_info!(
            "timer armed: {} start {} compare {} clock {}",
            config.mode,
            config.initial_value,
            config.compare_value,
            config.prescaler
        );
        Ok(())
    }

    /// Stop the timer and clear the callback slot
    ///
    /// Idempotent. Events already pending in hardware are discarded.
    pub fn deinitialize(&mut self) {
        let was_armed = self.is_armed();
        self.halt();
        self.handler = None;
        if was_armed {
            crate::log_info!("timer disarmed");
        }
    }

    /// Register the event handler, replacing any previous one
    pub fn set_callback(&mut self, handler: &'h mut (dyn TickHandler + Send)) {
        self.handler = Some(handler);
    }

    /// Remove the event handler, events are discarded afterwards
    pub fn clear_callback(&mut self) {
        self.handler = None;
    }

    /// Check whether a handler is registered
    #[must_use]
    pub fn has_callback(&self) -> bool {
        self.handler.is_some()
    }

    /// Interrupt vector body
    ///
    /// Reads and clears the pending flags and calls the handler once for each
    /// enabled source that fired. Returns the number of handler calls.
    pub fn on_interrupt(&mut self) -> u8 {
        let fired = self.regs.take_pending().intersection(self.regs.interrupts());
        let mut calls = 0;
        for source in [InterruptSource::Overflow, InterruptSource::CompareMatch] {
            if fired.contains(source) && self.dispatch() {
                calls += 1;
            }
        }
        calls
    }

    /// Check whether the timer is armed
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.config.is_some()
    }

    /// Active configuration, None while disarmed
    #[must_use]
    pub const fn configuration(&self) -> Option<TimerConfiguration> {
        self.config
    }

    /// Tick rate derived when the timer was armed
    #[must_use]
    pub const fn tick_rate(&self) -> Option<TickRate> {
        self.tick_rate
    }

    /// Input clock frequency
    #[must_use]
    pub const fn clock_hz(&self) -> u32 {
        self.clock_hz
    }

    /// Underlying register block
    #[must_use]
    pub const fn registers(&self) -> &R {
        &self.regs
    }

    /// Underlying register block, mutable
    ///
    /// Writing configuration registers directly bypasses the arming order.
    pub fn registers_mut(&mut self) -> &mut R {
        &mut self.regs
    }

    fn dispatch(&mut self) -> bool {
        match self.handler.as_deref_mut() {
            Some(handler) => {
                handler.on_tick();
                true
            }
            None => false,
        }
    }

    // Stop the clock before masking, and mask before the counter and compare
    // registers change, so no intermediate state can raise an event.
    fn halt(&mut self) {
        self.regs.set_clock(Prescaler::Disabled);
        self.regs.set_interrupts(InterruptMask::NONE);
        let _ = self.regs.take_pending();
        self.regs.write_counter(0);
        self.regs.write_compare(0);
        self.regs.set_waveform(Waveform::Normal);
        self.config = None;
        self.tick_rate = None;
    }
}

impl<R: TimerRegisters> Drop for Timer<'_, R> {
    fn drop(&mut self) {
        self.halt();
    }
}
