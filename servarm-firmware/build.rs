//! Build script for servarm-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates arm.toml and compiles it into `board_config.rs`

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Servo frame length; pulse limits must fit inside it
const SERVO_PERIOD_US: i64 = 20_000;

/// Device name capacity minus the "-xxxxxxxx" suffix
const MAX_PREFIX_LEN: usize = 32 - 9;

fn main() {
    setup_linker();
    let board = load_board_config();
    write_board_config(&board);
}

/// Set up linker search paths and scripts
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Board values compiled into the firmware
struct BoardConfig {
    name_prefix: String,
    baudrate: u32,
    min_pulse_us: i32,
    max_pulse_us: i32,
}

/// Read and validate arm.toml
fn load_board_config() -> BoardConfig {
    println!("cargo:rerun-if-changed=arm.toml");

    let config_path = Path::new("arm.toml");
    if !config_path.exists() {
        fail(
            "arm.toml not found",
            &["The firmware requires an arm.toml board configuration file."],
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read arm.toml", &[e.to_string().as_str()]),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            let msg = e.to_string();
            let lines: Vec<&str> = msg.lines().collect();
            fail("Invalid TOML syntax in arm.toml", &lines)
        }
    };

    let mut errors = Vec::new();

    let name_prefix = match config.get("device").and_then(|d| d.get("name_prefix")) {
        Some(toml::Value::String(prefix)) => {
            if prefix.is_empty() || prefix.len() > MAX_PREFIX_LEN {
                errors.push(format!(
                    "[device] name_prefix must be 1-{} characters",
                    MAX_PREFIX_LEN
                ));
            }
            if !prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
                errors.push("[device] name_prefix may only use letters, digits and '-'".to_string());
            }
            prefix.clone()
        }
        Some(_) => {
            errors.push("[device] name_prefix must be a string".to_string());
            String::new()
        }
        None => {
            errors.push("[device] missing 'name_prefix'".to_string());
            String::new()
        }
    };

    let baudrate = integer(&config, "console", "baudrate", &mut errors);
    if baudrate <= 0 || baudrate > 921_600 {
        errors.push("[console] baudrate must be 1-921600".to_string());
    }

    let min_pulse_us = integer(&config, "servo", "min_pulse_us", &mut errors);
    let max_pulse_us = integer(&config, "servo", "max_pulse_us", &mut errors);
    if min_pulse_us < 0 || max_pulse_us > SERVO_PERIOD_US {
        errors.push(format!(
            "[servo] pulse limits must lie within 0-{} us",
            SERVO_PERIOD_US
        ));
    }
    if min_pulse_us >= max_pulse_us {
        errors.push("[servo] min_pulse_us must be below max_pulse_us".to_string());
    }

    if !errors.is_empty() {
        let lines: Vec<&str> = errors.iter().map(String::as_str).collect();
        fail("Invalid board configuration in arm.toml", &lines);
    }

    println!("cargo:warning=arm.toml validated successfully");
    BoardConfig {
        name_prefix,
        baudrate: baudrate as u32,
        min_pulse_us: min_pulse_us as i32,
        max_pulse_us: max_pulse_us as i32,
    }
}

/// Look up `[section] key` as an integer, recording an error if absent
fn integer(config: &toml::Value, section: &str, key: &str, errors: &mut Vec<String>) -> i64 {
    match config.get(section).and_then(|s| s.get(key)) {
        Some(toml::Value::Integer(value)) => *value,
        Some(_) => {
            errors.push(format!("[{}] {} must be an integer", section, key));
            0
        }
        None => {
            errors.push(format!("[{}] missing '{}'", section, key));
            0
        }
    }
}

/// Emit the validated values as Rust constants
fn write_board_config(board: &BoardConfig) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let mut f = File::create(out_dir.join("board_config.rs")).unwrap();
    writeln!(f, "// Generated from arm.toml by build.rs").unwrap();
    writeln!(f, "pub const NAME_PREFIX: &str = {:?};", board.name_prefix).unwrap();
    writeln!(f, "pub const CONSOLE_BAUDRATE: u32 = {};", board.baudrate).unwrap();
    writeln!(
        f,
        "pub const PULSE_LIMITS: servarm_drivers::servo::PulseLimits = \
         servarm_drivers::servo::PulseLimits::new({}, {});",
        board.min_pulse_us, board.max_pulse_us
    )
    .unwrap();
}

/// Abort the build with a boxed error message
fn fail(title: &str, lines: &[&str]) -> ! {
    let body = lines
        .iter()
        .map(|line| {
            let truncated = if line.len() > 62 {
                format!("{}...", &line[..59])
            } else {
                line.to_string()
            };
            format!("║  • {:<62} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n");
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<57}║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title, body
    );
}
