//! Build script for metronome-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates board.toml and emits it as constants

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR not set by cargo"));
    setup_linker(&out_dir);
    generate_board_config(&out_dir);
}

/// Set up linker search paths for memory.x
fn setup_linker(out_dir: &Path) {
    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Board settings pulled out of board.toml
struct Board {
    profile: &'static str,
    ahb_hz: u32,
    ticks_per_second: u32,
    alarm_ticks: u32,
    loop_delay_usec: u32,
}

/// Validate board.toml and write `$OUT_DIR/board.rs`
fn generate_board_config(out_dir: &Path) {
    println!("cargo:rerun-if-changed=board.toml");

    let content = match fs::read_to_string("board.toml") {
        Ok(content) => content,
        Err(e) => panic!("\n  ERROR: failed to read board.toml: {}\n", e),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => panic!("\n  ERROR: invalid TOML in board.toml:\n{}\n", e),
    };

    let board = match parse_board(&config) {
        Ok(board) => board,
        Err(errors) => {
            let list = errors
                .iter()
                .map(|e| format!("    - {}", e))
                .collect::<Vec<_>>()
                .join("\n");
            panic!("\n  ERROR: board.toml validation failed:\n{}\n", list);
        }
    };

    let variant = match board.profile {
        "ocm3" => "Ocm3",
        _ => "F1Connectivity",
    };

    let generated = format!(
        "// Generated from board.toml by build.rs\n\
         pub const PROFILE: ChipProfile = ChipProfile::{variant} {{ ahb_hz: {ahb_hz} }};\n\
         pub const TICKS_PER_SECOND: u32 = {tps};\n\
         pub const ALARM_TICKS: u32 = {alarm};\n\
         pub const LOOP_DELAY_USEC: u32 = {delay};\n",
        variant = variant,
        ahb_hz = board.ahb_hz,
        tps = board.ticks_per_second,
        alarm = board.alarm_ticks,
        delay = board.loop_delay_usec,
    );

    fs::write(out_dir.join("board.rs"), generated).unwrap();
    println!(
        "cargo:warning=board.toml validated: {} at {} Hz, {} ticks/s",
        board.profile, board.ahb_hz, board.ticks_per_second
    );
}

/// Collect every problem rather than stopping at the first
fn parse_board(config: &toml::Value) -> Result<Board, Vec<String>> {
    let mut errors = Vec::new();

    let profile = match config.get("clock").and_then(|c| c.get("profile")) {
        Some(toml::Value::String(s)) if s == "ocm3" => "ocm3",
        Some(toml::Value::String(s)) if s == "f1-connectivity" => "f1-connectivity",
        Some(other) => {
            errors.push(format!(
                "[clock].profile must be \"ocm3\" or \"f1-connectivity\", got {}",
                other
            ));
            "ocm3"
        }
        None => {
            errors.push("[clock].profile is missing".to_string());
            "ocm3"
        }
    };

    let ahb_hz = positive(config, "clock", "ahb_hz", &mut errors);
    let ticks_per_second = positive(config, "clock", "ticks_per_second", &mut errors);
    let alarm_ticks = positive(config, "demo", "alarm_ticks", &mut errors);
    let loop_delay_usec = positive(config, "demo", "loop_delay_usec", &mut errors);

    // SysTick is fed from HCLK / 8 and must tick at least once per microsecond
    if ahb_hz != 0 && ahb_hz / 8 < 1_000_000 {
        errors.push(format!("[clock].ahb_hz {} is below 8 MHz", ahb_hz));
    }
    if ahb_hz != 0 && ticks_per_second != 0 && ahb_hz / 8 / ticks_per_second > 0x0100_0000 {
        errors.push(format!(
            "[clock].ticks_per_second {} needs a SysTick period beyond 24 bits",
            ticks_per_second
        ));
    }

    if errors.is_empty() {
        Ok(Board {
            profile,
            ahb_hz,
            ticks_per_second,
            alarm_ticks,
            loop_delay_usec,
        })
    } else {
        Err(errors)
    }
}

/// Read `[section].key` as a non-zero u32
fn positive(config: &toml::Value, section: &str, key: &str, errors: &mut Vec<String>) -> u32 {
    let value = config.get(section).and_then(|s| s.get(key));
    match value.and_then(toml::Value::as_integer) {
        Some(v) if v > 0 && v <= i64::from(u32::MAX) => v as u32,
        Some(v) => {
            errors.push(format!("[{}].{} out of range: {}", section, key, v));
            0
        }
        None => {
            errors.push(format!("[{}].{} is missing or not an integer", section, key));
            0
        }
    }
}
