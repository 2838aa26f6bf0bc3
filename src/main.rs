//! Control ECU Main Application
//!
//! Entry point for the STM32G474-based control unit firmware.
//! Arms a one-second event timer on TIM3, drives the H-bridge motor from
//! TIM1 CH1 and runs a lock/hold/unlock cycle paced by the timer callback.

#![no_std]
#![no_main]

use core::sync::atomic::{AtomicU32, Ordering};

use defmt::{info, unwrap};
use embassy_executor::Spawner;
use embassy_stm32::gpio::{Flex, OutputType};
use embassy_stm32::interrupt;
use embassy_stm32::interrupt::InterruptExt;
use embassy_stm32::time::hz;
use embassy_stm32::timer::simple_pwm::{PwmPin, SimplePwm};
use embassy_stm32::timer::low_level::CountingMode;
use embassy_time::Timer as Delay;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use control_ecu::prelude::*;

/// Event timer shared with the TIM3 interrupt vector
static EVENT_TIMER: SharedTimer<'static, TimRegisters> = SharedTimer::new();

/// Seconds counted by the event timer callback
static SECONDS: AtomicU32 = AtomicU32::new(0);

/// Callback state, lives for the whole program
static SECOND_COUNTER: StaticCell<SecondCounter> = StaticCell::new();

/// Motor run time in each direction, in seconds
const MOTOR_RUN_S: u32 = 15;

/// Hold time between the two directions, in seconds
const HOLD_S: u32 = 3;

/// Counts timer events into [`SECONDS`]
struct SecondCounter;

impl TickHandler for SecondCounter {
    fn on_tick(&mut self) {
        SECONDS.fetch_add(1, Ordering::Relaxed);
    }
}

#[interrupt]
fn TIM3() {
    EVENT_TIMER.on_interrupt();
}

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Control ECU Firmware v{}", env!("CARGO_PKG_VERSION"));

    // Default clock tree: HSI16, which SYSTEM_CLOCK_HZ assumes
    let config = embassy_stm32::Config::default();
    let p = embassy_stm32::init(config);

    info!("Peripherals initialized");

    // Event timer: one compare-match per second
    let mut timer = Timer::new(TimRegisters::tim3(p.TIM3), SYSTEM_CLOCK_HZ);
    timer.set_callback(SECOND_COUNTER.init(SecondCounter));
    defmt::assert!(matches!(EVENT_TIMER.install(timer), Ok(None)));
    let one_second = unwrap!(one_second());
    unwrap!(unwrap!(EVENT_TIMER.with(|t| t.initialize(one_second))));

    interrupt::TIM3.unpend();
    // SAFETY: the vector only touches EVENT_TIMER, which is initialized above
    unsafe {
        interrupt::TIM3.enable();
    }

    // Motor: direction lines on PB0/PB1, enable on PA8 (TIM1 CH1)
    let mut motor_lines: FlexPort<'_, 2> = FlexPort::new();
    defmt::assert!(motor_lines
        .attach(pins::MOTOR_PORT, pins::MOTOR_IN1, Flex::new(p.PB0))
        .is_ok());
    defmt::assert!(motor_lines
        .attach(pins::MOTOR_PORT, pins::MOTOR_IN2, Flex::new(p.PB1))
        .is_ok());

    let pwm = SimplePwm::new(
        p.TIM1,
        Some(PwmPin::new_ch1(p.PA8, OutputType::PushPull)),
        None,
        None,
        None,
        hz(timers::MOTOR_PWM_HZ),
        CountingMode::EdgeAlignedUp,
    );
    let mut channels = pwm.split();
    channels.ch1.enable();
    // The carrier is fixed by SimplePwm above, HalPwm has no clock select
    let pwm = PwmGenerator::new(HalPwm::new(channels.ch1), Prescaler::Div1);

    let mut motor = DcMotor::new(motor_lines, pwm, MotorPins::default());
    motor.initialize();

    // Buzzer on PA1
    let mut buzzer_line: FlexPort<'_, 1> = FlexPort::new();
    defmt::assert!(buzzer_line
        .attach(pins::BUZZER_PORT, pins::BUZZER, Flex::new(p.PA1))
        .is_ok());
    let mut buzzer = Buzzer::on_board(buzzer_line);
    buzzer.initialize();

    info!("Drivers initialized, entering main loop");

    loop {
        unwrap!(motor.rotate(MotorState::Clockwise, FULL_SPEED));
        wait_seconds(MOTOR_RUN_S).await;

        motor.stop();
        buzzer.on();
        wait_seconds(HOLD_S).await;
        buzzer.off();

        unwrap!(motor.rotate(MotorState::CounterClockwise, HALF_SPEED));
        wait_seconds(MOTOR_RUN_S).await;

        motor.stop();
        info!("Cycle done at {}s", SECONDS.load(Ordering::Relaxed));
        wait_seconds(HOLD_S).await;
    }
}

/// Wait for `seconds` event timer periods
async fn wait_seconds(seconds: u32) {
    let start = SECONDS.load(Ordering::Relaxed);
    while SECONDS.load(Ordering::Relaxed).wrapping_sub(start) < seconds {
        Delay::after(Duration::from_millis(10)).await;
    }
}
