//! Metronome Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits that chip-specific
//! HALs (Cortex-M SysTick, board USARTs, etc.) implement. The clock engine
//! and the drivers only ever talk to these traits, never to registers.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  metronome-core / metronome-drivers     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  metronome-hal (this crate - traits)    │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ metronome-hal-│       │  board USART  │
//! │   cortex-m    │       │     glue      │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`counter::DownCounter`] - Free-running down-counter readout
//! - [`counter::PeriodicTimer`] - Periodic interrupt setup
//! - [`usart::UsartPort`] - Interrupt-driven serial port

#![no_std]
#![deny(unsafe_code)]

pub mod counter;
pub mod usart;

// Re-export key traits at crate root for convenience
pub use counter::{ClockSource, DownCounter, PeriodicTimer};
pub use usart::{UartConfig, UsartPort};
