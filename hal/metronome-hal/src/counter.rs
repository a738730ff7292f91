//! Hardware counter abstractions
//!
//! A periodic timer is modeled as two halves: the setup side that is
//! programmed once at startup, and the read-only counter that free-runs
//! afterwards and is sampled for sub-tick timing.

/// Free-running down-counter
///
/// Counts from `period - 1` down to `0`, then reloads to `period - 1`.
/// Software never writes it after setup.
pub trait DownCounter {
    /// Read the live counter value
    ///
    /// Must be a single indivisible read of the hardware register. Every
    /// call reads the hardware again; implementations must not cache.
    fn value(&self) -> u32;
}

/// Clock input feeding the counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockSource {
    /// Processor clock, undivided
    Core,
    /// Processor clock divided by 8
    CoreDiv8,
}

impl ClockSource {
    /// Divider applied to the processor clock
    pub const fn divider(self) -> u32 {
        match self {
            ClockSource::Core => 1,
            ClockSource::CoreDiv8 => 8,
        }
    }
}

/// Periodic interrupt timer setup
///
/// Implemented by the peripheral that drives the system tick. The calls
/// are made once, in order, by the clock's `init`.
pub trait PeriodicTimer {
    /// Select the counter's input clock
    fn set_clock_source(&mut self, source: ClockSource);

    /// Program the reload value
    ///
    /// The counter period is `reload + 1` counter cycles.
    fn set_reload(&mut self, reload: u32);

    /// Reset the live counter so the first period is a full one
    fn clear_current(&mut self);

    /// Enable the period-expiry interrupt
    fn enable_interrupt(&mut self);

    /// Start counting
    fn enable_counter(&mut self);
}
