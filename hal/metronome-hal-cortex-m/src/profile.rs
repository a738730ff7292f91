//! Chip family clock profiles
//!
//! Both supported STM32 families run SysTick from HCLK / 8. They differ
//! only in how the microsecond delay is stepped.

use metronome_core::{ClockConfig, ClockTiming, ConfigError, DelayStrategy};
use metronome_hal::ClockSource;

use crate::systick;

/// Supported chip family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChipProfile {
    /// libopencm3-supported STM32 parts (F0 through F4)
    Ocm3 {
        /// AHB (HCLK) frequency in Hz
        ahb_hz: u32,
    },
    /// STM32F105/F107 connectivity line
    F1Connectivity {
        /// AHB (HCLK) frequency in Hz
        ahb_hz: u32,
    },
}

impl ChipProfile {
    /// AHB (HCLK) frequency in Hz
    pub const fn ahb_hz(self) -> u32 {
        match self {
            ChipProfile::Ocm3 { ahb_hz } | ChipProfile::F1Connectivity { ahb_hz } => ahb_hz,
        }
    }

    /// Delay stepping used on this family
    pub const fn strategy(self) -> DelayStrategy {
        match self {
            ChipProfile::Ocm3 { .. } => DelayStrategy::LongInterval,
            ChipProfile::F1Connectivity { .. } => DelayStrategy::FineOnly,
        }
    }

    /// Clock configuration for `ticks_per_second`
    pub const fn config(self, ticks_per_second: u32) -> ClockConfig {
        ClockConfig {
            core_hz: self.ahb_hz(),
            source: ClockSource::CoreDiv8,
            ticks_per_second,
            strategy: self.strategy(),
        }
    }

    /// Validated timing, including the SysTick reload limit
    pub const fn timing(self, ticks_per_second: u32) -> Result<ClockTiming, ConfigError> {
        match self.config(ticks_per_second).timing() {
            Ok(timing) => systick::check_timing(timing),
            Err(e) => Err(e),
        }
    }
}
