//! Peripheral drivers for Metronome boards
//!
//! This crate provides the peripheral glue that sits next to the clock:
//!
//! - Buffered, interrupt-driven debug console over a `UsartPort`
//! - MRF24J40 radio transport over `embedded-hal` SPI and pins

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod console;
pub mod radio;

pub use console::{Console, ConsoleWriter, InputHandler};
pub use radio::{IrqLine, Mrf24j40Transport, RadioError, RadioPins};
