//! Metronome - demo board firmware
//!
//! Brings up the SysTick clock on an STM32F1 board, keeps a repeating
//! alarm on the timer-queue hook, and reports uptime over defmt.

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use defmt::*;
use {defmt_rtt as _, panic_probe as _};

use metronome_core::{Clock, ClockTiming};
use metronome_hal_cortex_m::{bind_systick, systick, SysTickCounter};

use crate::timers::{Alarm, IrqEnergy};

mod board;
mod timers;

/// Clock timing from board.toml, checked at compile time
const TIMING: ClockTiming = match board::PROFILE.timing(board::TICKS_PER_SECOND) {
    Ok(timing) => timing,
    Err(_) => core::panic!("board.toml clock settings are not usable with SysTick"),
};

static CLOCK: Clock = Clock::new(TIMING);
static ALARM: Alarm = Alarm::new();
static ENERGY: IrqEnergy = IrqEnergy::new();

bind_systick!(CLOCK, ALARM, ENERGY);

/// Main entry point
#[entry]
fn main() -> ! {
    info!("Metronome firmware starting...");

    let Some(mut cp) = cortex_m::Peripherals::take() else {
        defmt::panic!("core peripherals already taken");
    };

    if let Err(e) = systick::start(&CLOCK, &mut cp.SYST) {
        defmt::panic!("SysTick rejected clock timing: {}", e);
    }
    info!(
        "Clock running: {} ticks/s, {}",
        TIMING.ticks_per_second(),
        TIMING.strategy()
    );

    ALARM.arm(CLOCK.now_ticks().wrapping_add(board::ALARM_TICKS));
    let mut last_second = CLOCK.now_seconds();

    loop {
        if ALARM.take_poll() {
            debug!("Alarm at tick {}", CLOCK.now_ticks());
            ALARM.arm(CLOCK.now_ticks().wrapping_add(board::ALARM_TICKS));
        }

        let seconds = CLOCK.now_seconds();
        if seconds != last_second {
            info!(
                "Uptime {} s ({} us), {} tick interrupts",
                seconds,
                CLOCK.now_usec(&SysTickCounter),
                ENERGY.entries()
            );
            last_second = seconds;
        }

        CLOCK.delay_usec(&SysTickCounter, board::LOOP_DELAY_USEC);
    }
}
