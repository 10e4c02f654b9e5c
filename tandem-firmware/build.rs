//! Build script for tandem-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates machine.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// GPIOs on the RP2040
const GPIO_COUNT: i64 = 30;

fn main() {
    setup_linker();
    validate_config();
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

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate machine.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=machine.toml");

    let config_path = Path::new("machine.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: machine.toml not found!                                  ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a machine.toml configuration file.        ║\n\
            ║  Please create one in the tandem-firmware directory.             ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read machine.toml                              ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in machine.toml                      ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    let mut used_pins = Vec::new();
    let mut min_steps = None;

    for name in ["x", "y"] {
        match config.get("axis").and_then(|a| a.get(name)) {
            Some(axis) => {
                if let Some(steps) = validate_axis(name, axis, &mut used_pins, &mut errors) {
                    min_steps = Some(min_steps.map_or(steps, |m: i64| m.min(steps)));
                }
            }
            None => errors.push(format!("Missing required section [axis.{}]", name)),
        }
    }

    if let Some(motion) = config.get("motion") {
        if let Some(rpm) = motion.get("max_speed_rpm") {
            match rpm.as_integer() {
                Some(rpm) if rpm <= 0 => {
                    errors.push(format!("motion.max_speed_rpm must be positive, got {}", rpm))
                }
                // Every axis needs a step delay of at least 1 ms
                Some(rpm) => {
                    if let Some(steps) = min_steps {
                        if 60_000 / steps / rpm == 0 {
                            errors.push(format!(
                                "motion.max_speed_rpm {} is too fast for {} steps/rev",
                                rpm, steps
                            ));
                        }
                    }
                }
                None => errors.push("motion.max_speed_rpm must be an integer".to_string()),
            }
        }
        if let Some(inc) = motion.get("arc_increment_mrad") {
            match inc.as_integer() {
                Some(inc) if (1..=65_535).contains(&inc) => {}
                _ => errors.push("motion.arc_increment_mrad must be 1..=65535".to_string()),
            }
        }
    }

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid machine.toml                                     ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            format_error_lines(&errors.join("\n"))
        );
    }

    println!("cargo:warning=machine.toml validated successfully");
}

/// Check one `[axis.*]` table, returning its steps per revolution
fn validate_axis(
    name: &str,
    axis: &toml::Value,
    used_pins: &mut Vec<i64>,
    errors: &mut Vec<String>,
) -> Option<i64> {
    let steps = match axis.get("steps_per_revolution").map(|v| v.as_integer()) {
        None => Some(200),
        Some(Some(steps)) if steps > 0 => Some(steps),
        Some(_) => {
            errors.push(format!(
                "axis.{}.steps_per_revolution must be a positive integer",
                name
            ));
            None
        }
    };

    let winding = axis.get("winding").and_then(|v| v.as_integer()).unwrap_or(4);
    if winding != 2 && winding != 4 {
        errors.push(format!("axis.{}.winding must be 2 or 4, got {}", name, winding));
    }

    let Some(pins) = axis.get("pins").and_then(|v| v.as_array()) else {
        errors.push(format!("axis.{}.pins must be an array of pin strings", name));
        return steps;
    };

    if pins.len() as i64 != winding {
        errors.push(format!(
            "axis.{} has {} pins but winding = {}",
            name,
            pins.len(),
            winding
        ));
    }

    for pin in pins {
        let Some(pin_str) = pin.as_str() else {
            errors.push(format!("axis.{}.pins entries must be strings", name));
            continue;
        };
        match parse_gpio(pin_str) {
            Some(num) if used_pins.contains(&num) => {
                errors.push(format!("gpio{} is assigned more than once", num))
            }
            Some(num) => used_pins.push(num),
            None => errors.push(format!(
                "axis.{}: invalid pin '{}' (expected gpio0..gpio29, optional '!')",
                name, pin_str
            )),
        }
    }

    steps
}

/// Parse "gpioN" or "!gpioN" into N
fn parse_gpio(s: &str) -> Option<i64> {
    let s = s.strip_prefix('!').unwrap_or(s);
    let num: i64 = s.strip_prefix("gpio")?.parse().ok()?;
    (0..GPIO_COUNT).contains(&num).then_some(num)
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
