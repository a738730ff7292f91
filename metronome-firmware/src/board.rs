//! Board settings generated from board.toml

use metronome_hal_cortex_m::ChipProfile;

include!(concat!(env!("OUT_DIR"), "/board.rs"));
