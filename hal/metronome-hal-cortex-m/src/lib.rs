//! Cortex-M HAL for Metronome boards
//!
//! This crate provides the SysTick-backed implementations of the
//! `metronome-hal` counter traits, plus:
//!
//! - Chip family profiles (STM32 libopencm3 parts, F1 connectivity line)
//! - [`bind_systick!`] to install a clock as the SysTick exception
//!
//! # Usage
//!
//! ```ignore
//! use metronome_core::{Clock, ClockTiming};
//! use metronome_hal_cortex_m::{bind_systick, ChipProfile, SysTickCounter};
//!
//! const TIMING: ClockTiming = match ChipProfile::Ocm3 { ahb_hz: 72_000_000 }.timing(1000) {
//!     Ok(timing) => timing,
//!     Err(_) => panic!("unsupported clock setup"),
//! };
//! static CLOCK: Clock = Clock::new(TIMING);
//!
//! bind_systick!(CLOCK);
//!
//! metronome_hal_cortex_m::systick::start(&CLOCK, &mut peripherals.SYST)?;
//! CLOCK.delay_usec(&SysTickCounter, 250);
//! ```

#![no_std]
#![deny(unsafe_code)]

pub mod profile;
pub mod systick;

pub use profile::ChipProfile;
pub use systick::{SysTickCounter, SysTickTimer};

#[doc(hidden)]
pub mod __private {
    pub use metronome_core::{NoActivity, NoTimers};
}

/// Install a [`Clock`](metronome_core::Clock) as the SysTick exception
///
/// The calling crate must depend on `cortex-m-rt`. The timer queue and
/// activity monitor default to no-ops.
///
/// ```ignore
/// bind_systick!(CLOCK);
/// bind_systick!(CLOCK, TIMERS, ENERGY);
/// ```
#[macro_export]
macro_rules! bind_systick {
    ($clock:expr, $timers:expr, $activity:expr) => {
        #[cortex_m_rt::exception]
        fn SysTick() {
            $clock.on_tick(&$timers, &$activity);
        }
    };
    ($clock:expr) => {
        $crate::bind_systick!(
            $clock,
            $crate::__private::NoTimers,
            $crate::__private::NoActivity
        );
    };
}
