//! Timer Backend
//!
//! [`TimerRegisters`] over an STM32 general-purpose 16-bit timer.
//!
//! Both event kinds come from the update interrupt: in `Normal` mode the
//! auto-reload is `0xFFFF` and an update is a counter wrap, in
//! `ClearOnCompare` mode the auto-reload is `compare - 1` so the update
//! lands when the counter reaches the compare value.

use embassy_stm32::pac::timer::TimGp16;
use embassy_stm32::pac::timer::vals::Urs;
use embassy_stm32::peripherals::TIM3;

use crate::timer::{InterruptMask, Prescaler, TimerRegisters, Waveform};

/// Register block of one general-purpose timer
pub struct TimRegisters {
    regs: TimGp16,
    waveform: Waveform,
    compare: u16,
    enabled: InterruptMask,
}

impl TimRegisters {
    /// Take TIM3, enabling and resetting its kernel clock
    #[must_use]
    pub fn tim3(_tim: TIM3) -> Self {
        embassy_stm32::rcc::enable_and_reset::<TIM3>();
        Self::from_regs(embassy_stm32::pac::TIM3)
    }

    fn from_regs(regs: TimGp16) -> Self {
        // Software updates (UG) must not raise the update flag
        regs.cr1().modify(|w| w.set_urs(Urs::COUNTER_ONLY));
        Self {
            regs,
            waveform: Waveform::Normal,
            compare: 0,
            enabled: InterruptMask::NONE,
        }
    }

    // Arming rejects compares below `TimerConfiguration::MIN_COMPARE`, so
    // the CTC reload is never zero while the counter runs
    fn reload(&self) -> u16 {
        match self.waveform {
            Waveform::Normal => u16::MAX,
            Waveform::ClearOnCompare => self.compare.saturating_sub(1),
        }
    }
}

impl TimerRegisters for TimRegisters {
    fn set_clock(&mut self, prescaler: Prescaler) {
        match prescaler.divisor() {
            None => self.regs.cr1().modify(|w| w.set_cen(false)),
            Some(divisor) => {
                self.regs.psc().write_value(u16::try_from(divisor - 1).unwrap_or(u16::MAX));
                // UG latches the prescaler but also clears the counter
                let count = self.regs.cnt().read().cnt();
                self.regs.egr().write(|w| w.set_ug(true));
                self.regs.cnt().write(|w| w.set_cnt(count));
                self.regs.cr1().modify(|w| w.set_cen(true));
            }
        }
    }

    fn set_interrupts(&mut self, mask: InterruptMask) {
        self.enabled = mask;
        self.regs.dier().modify(|w| w.set_uie(!mask.is_empty()));
    }

    fn interrupts(&self) -> InterruptMask {
        self.enabled
    }

    fn take_pending(&mut self) -> InterruptMask {
        let updated = self.regs.sr().read().uif();
        if updated {
            // rc_w0: writing 1 leaves the other flags as they are
            self.regs.sr().write(|w| {
                w.0 = u32::MAX;
                w.set_uif(false);
            });
        }
        match (updated, self.waveform) {
            (false, _) => InterruptMask::NONE,
            (true, Waveform::Normal) => InterruptMask::OVERFLOW,
            (true, Waveform::ClearOnCompare) => InterruptMask::COMPARE_MATCH,
        }
    }

    fn write_counter(&mut self, value: u16) {
        self.regs.cnt().write(|w| w.set_cnt(value));
    }

    fn write_compare(&mut self, value: u16) {
        self.compare = value;
        let reload = self.reload();
        self.regs.arr().write(|w| w.set_arr(reload));
    }

    fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
        let reload = self.reload();
        self.regs.arr().write(|w| w.set_arr(reload));
    }
}
