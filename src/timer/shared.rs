//! Interrupt-safe home for a [`Timer`]
//!
//! The main flow reaches the timer through [`SharedTimer::with`], the
//! interrupt vector through [`SharedTimer::on_interrupt`]. Both run inside a
//! critical section, so a configuration sequence is never observed half
//! written by the interrupt path.

use core::cell::RefCell;

use critical_section::Mutex;

use super::{Timer, TimerRegisters};

/// A [`Timer`] that can live in a `static`
pub struct SharedTimer<'h, R: TimerRegisters> {
    inner: Mutex<RefCell<Option<Timer<'h, R>>>>,
}

impl<'h, R: TimerRegisters> SharedTimer<'h, R> {
    /// Create an empty slot
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    /// Place a timer in the slot, returning the one it replaces
    ///
    /// # Errors
    ///
    /// Hands `timer` back when the slot is borrowed, which is what a
    /// handler calling back into its own slot observes.
    pub fn install(
        &self,
        timer: Timer<'h, R>,
    ) -> core::result::Result<Option<Timer<'h, R>>, Timer<'h, R>> {
        critical_section::with(|cs| match self.inner.borrow(cs).try_borrow_mut() {
            Ok(mut slot) => Ok(slot.replace(timer)),
            Err(_) => Err(timer),
        })
    }

    /// Remove the timer from the slot
    ///
    /// Returns None when the slot is empty or already borrowed.
    pub fn take(&self) -> Option<Timer<'h, R>> {
        critical_section::with(|cs| self.inner.borrow(cs).try_borrow_mut().ok()?.take())
    }

    /// Run `f` on the installed timer
    ///
    /// Returns None when the slot is empty or already borrowed, which is
    /// what a handler calling back into its own timer observes.
    pub fn with<T>(&self, f: impl FnOnce(&mut Timer<'h, R>) -> T) -> Option<T> {
        critical_section::with(|cs| {
            let mut slot = self.inner.borrow(cs).try_borrow_mut().ok()?;
            slot.as_mut().map(f)
        })
    }

    /// Interrupt vector body, returns the number of handler calls
    pub fn on_interrupt(&self) -> u8 {
        self.with(Timer::on_interrupt).unwrap_or(0)
    }
}

impl<R: TimerRegisters> Default for SharedTimer<'_, R> {
    fn default() -> Self {
        Self::new()
    }
}
