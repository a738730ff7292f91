//! Clock configuration
//!
//! A [`ClockConfig`] describes the board (processor clock, counter input,
//! desired tick rate). It is validated once into a [`ClockTiming`], which
//! holds every derived constant the tick handler and delay engine use.
//! Validation is a `const fn` so a bad board description fails the build
//! when the timing is computed in a `const` item.

use metronome_hal::ClockSource;

/// Microseconds per second
pub const USEC_PER_SECOND: u32 = 1_000_000;

/// The long delay interval is this fraction of one reload period
pub const LONG_INTERVAL_DIVISOR: u32 = 10;

/// Stepping strategy for the microsecond delay engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DelayStrategy {
    /// One microsecond per step, regardless of the requested duration
    FineOnly,
    /// Long-interval steps while the remainder allows, then fine steps
    LongInterval,
}

/// Errors from clock configuration validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Processor clock or tick rate is zero
    ZeroRate,
    /// Counter runs slower than 1 MHz, so a microsecond is not a whole unit
    CounterTooSlow,
    /// Reload period too short to hold a single delay step
    PeriodTooShort,
    /// Reload period exceeds what the counter hardware can hold
    PeriodTooLong,
}

/// Board clock description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockConfig {
    /// Processor clock feeding the timer, in Hz
    pub core_hz: u32,
    /// Counter input selection
    pub source: ClockSource,
    /// Logical ticks per wall-clock second
    pub ticks_per_second: u32,
    /// Delay engine strategy
    pub strategy: DelayStrategy,
}

impl ClockConfig {
    /// Validate and derive the timing constants
    pub const fn timing(&self) -> Result<ClockTiming, ConfigError> {
        ClockTiming::new(self)
    }
}

/// Derived clock constants
///
/// All values are in hardware counter units unless the name says
/// otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockTiming {
    source: ClockSource,
    ticks_per_second: u32,
    period: u32,
    units_per_usec: u32,
    long_units: u32,
    long_usec: u32,
    strategy: DelayStrategy,
}

impl ClockTiming {
    /// Validate a configuration
    ///
    /// The counter rate is `core_hz / divider`; a rate that does not divide
    /// evenly by `ticks_per_second` truncates the period.
    pub const fn new(config: &ClockConfig) -> Result<Self, ConfigError> {
        if config.core_hz == 0 || config.ticks_per_second == 0 {
            return Err(ConfigError::ZeroRate);
        }

        let counter_hz = config.core_hz / config.source.divider();
        let units_per_usec = counter_hz / USEC_PER_SECOND;
        if units_per_usec == 0 {
            return Err(ConfigError::CounterTooSlow);
        }

        let period = counter_hz / config.ticks_per_second;
        if period <= units_per_usec {
            return Err(ConfigError::PeriodTooShort);
        }

        // Whole microseconds only, so coarse steps consume exactly what they claim
        let long_usec = match config.strategy {
            DelayStrategy::FineOnly => 0,
            DelayStrategy::LongInterval => {
                let long_usec = period / LONG_INTERVAL_DIVISOR / units_per_usec;
                if long_usec == 0 {
                    return Err(ConfigError::PeriodTooShort);
                }
                long_usec
            }
        };

        Ok(Self {
            source: config.source,
            ticks_per_second: config.ticks_per_second,
            period,
            units_per_usec,
            long_units: long_usec * units_per_usec,
            long_usec,
            strategy: config.strategy,
        })
    }

    /// Reject periods the counter hardware cannot reload
    pub const fn with_max_period(self, max_period: u32) -> Result<Self, ConfigError> {
        if self.period > max_period {
            Err(ConfigError::PeriodTooLong)
        } else {
            Ok(self)
        }
    }

    /// Counter input selection
    pub const fn source(&self) -> ClockSource {
        self.source
    }

    /// Logical ticks per wall-clock second
    pub const fn ticks_per_second(&self) -> u32 {
        self.ticks_per_second
    }

    /// Counter cycles per tick
    pub const fn period(&self) -> u32 {
        self.period
    }

    /// Value programmed into the reload register
    pub const fn reload(&self) -> u32 {
        self.period - 1
    }

    /// Counter units per microsecond
    pub const fn units_per_usec(&self) -> u32 {
        self.units_per_usec
    }

    /// Long interval in counter units (zero for fine-only stepping)
    pub const fn long_units(&self) -> u32 {
        self.long_units
    }

    /// Long interval in microseconds (zero for fine-only stepping)
    pub const fn long_usec(&self) -> u32 {
        self.long_usec
    }

    /// Microseconds covered by `ticks` whole ticks, wrapping
    ///
    /// Exact for any tick rate, including ones that do not divide a second
    /// evenly.
    pub const fn ticks_to_usec(&self, ticks: u32) -> u32 {
        (ticks as u64 * USEC_PER_SECOND as u64 / self.ticks_per_second as u64) as u32
    }

    /// How the microsecond delay is stepped
    pub const fn strategy(&self) -> DelayStrategy {
        self.strategy
    }
}
