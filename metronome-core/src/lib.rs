//! Hardware-agnostic clock core for Metronome boards
//!
//! This crate contains the timekeeping logic that does not depend on any
//! specific timer peripheral:
//!
//! - Tick counter driven by a periodic interrupt
//! - Seconds derived from a per-tick countdown
//! - Tick-based busy wait
//! - Microsecond delay engine over a free-running down-counter
//! - Clock configuration and timing derivation
//!
//! Hardware is reached only through the `metronome-hal` traits.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod clock;
pub mod config;
pub mod hooks;

pub use clock::{ticks_since, Clock, Seconds, TickCount};
pub use config::{ClockConfig, ClockTiming, ConfigError, DelayStrategy};
pub use hooks::{ActivityMonitor, NoActivity, NoTimers, TimerQueue};
