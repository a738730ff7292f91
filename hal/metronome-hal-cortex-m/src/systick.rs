//! SysTick as the Metronome tick source
//!
//! SysTick is a 24-bit down-counter present on every Cortex-M core. Its
//! reload register sets the tick period and its current value register is
//! the free-running counter the delay engine polls.

use cortex_m::peripheral::syst::SystClkSource;
use cortex_m::peripheral::SYST;
use metronome_core::{Clock, ClockTiming, ConfigError};
use metronome_hal::{ClockSource, DownCounter, PeriodicTimer};

/// Largest value the 24-bit reload register holds
pub const MAX_RELOAD: u32 = 0x00FF_FFFF;

/// Longest tick period, in counter cycles
pub const MAX_PERIOD: u32 = MAX_RELOAD + 1;

/// Reject timings SysTick cannot reload
pub const fn check_timing(timing: ClockTiming) -> Result<ClockTiming, ConfigError> {
    timing.with_max_period(MAX_PERIOD)
}

/// Live SysTick current value register
///
/// Reading it needs no ownership of the peripheral, so this can be used
/// from anywhere once SysTick has been started.
#[derive(Debug, Clone, Copy, Default)]
pub struct SysTickCounter;

impl DownCounter for SysTickCounter {
    #[inline]
    fn value(&self) -> u32 {
        SYST::get_current()
    }
}

/// SysTick setup during clock init
pub struct SysTickTimer<'a> {
    syst: &'a mut SYST,
}

impl<'a> SysTickTimer<'a> {
    /// Borrow the SysTick peripheral for setup
    pub fn new(syst: &'a mut SYST) -> Self {
        Self { syst }
    }
}

impl PeriodicTimer for SysTickTimer<'_> {
    fn set_clock_source(&mut self, source: ClockSource) {
        // On STM32 parts the "external" SysTick reference is HCLK / 8
        let source = match source {
            ClockSource::Core => SystClkSource::Core,
            ClockSource::CoreDiv8 => SystClkSource::External,
        };
        self.syst.set_clock_source(source);
    }

    fn set_reload(&mut self, reload: u32) {
        self.syst.set_reload(reload);
    }

    fn clear_current(&mut self) {
        self.syst.clear_current();
    }

    fn enable_interrupt(&mut self) {
        self.syst.enable_interrupt();
    }

    fn enable_counter(&mut self) {
        self.syst.enable_counter();
    }
}

/// Configure SysTick for `clock` and start it
///
/// Call once at startup, then install the handler with
/// [`bind_systick!`](crate::bind_systick). A timing whose period does not
/// fit the 24-bit reload register is rejected and SysTick is left stopped.
pub fn start(clock: &Clock, syst: &mut SYST) -> Result<(), ConfigError> {
    check_timing(*clock.timing())?;

    #[cfg(feature = "defmt")]
    {
        let timing = clock.timing();
        defmt::info!(
            "SysTick: {} ticks/s, reload {}, {} units/us",
            timing.ticks_per_second(),
            timing.reload(),
            timing.units_per_usec()
        );
    }

    clock.init(&mut SysTickTimer::new(syst));
    Ok(())
}
