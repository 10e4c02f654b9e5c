//! Minimal TOML reader for `machine.toml`
//!
//! Handles only the subset the machine file uses; this is not a general
//! TOML parser.
//!
//! Supported:
//! - `[axis.x]`, `[axis.y]` and `[motion]` section headers
//! - `key = value` with integers, strings and flat string arrays
//! - Comments (`# ...`), also after a value
//!
//! Keys that are not recognised are ignored so the file can carry notes
//! for other tools. Missing keys keep their defaults, except that both axis
//! sections must be present.

use core::fmt;

use heapless::Vec;

use super::types::{AxisConfig, MachineConfig, PinConfig, MAX_COIL_PINS};
use crate::error::ConfigError;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Value of the wrong type or out of range
    InvalidValue,
    /// More pins than an axis can have
    TooManyItems,
    /// Pin string is not `gpioN` or `!gpioN`
    InvalidPin,
    /// `[axis.x]` or `[axis.y]` not present
    MissingSection,
    /// Parsed values do not describe a usable machine
    Config(ConfigError),
}

impl From<ConfigError> for ParseError {
    fn from(e: ConfigError) -> Self {
        ParseError::Config(e)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSection => write!(f, "invalid section header"),
            Self::InvalidValue => write!(f, "invalid value"),
            Self::TooManyItems => write!(f, "too many pins for one axis"),
            Self::InvalidPin => write!(f, "invalid pin (expected \"gpioN\" or \"!gpioN\")"),
            Self::MissingSection => write!(f, "both [axis.x] and [axis.y] are required"),
            Self::Config(e) => write!(f, "{}", e),
        }
    }
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    AxisX,
    AxisY,
    Motion,
}

/// Parse and validate a machine configuration
pub fn parse_config(input: &str) -> Result<MachineConfig, ParseError> {
    let mut config = MachineConfig::default();
    let mut section = Section::Root;
    let mut seen_x = false;
    let mut seen_y = false;

    for line in input.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(&line[1..line.len() - 1])?;
            // A section replaces the default wholesale
            match section {
                Section::AxisX => {
                    config.x = AxisConfig::default();
                    seen_x = true;
                }
                Section::AxisY => {
                    config.y = AxisConfig::default();
                    seen_y = true;
                }
                Section::Motion | Section::Root => {}
            }
            continue;
        }

        if let Some((key, value)) = parse_key_value(line) {
            apply_value(section, key, value, &mut config)?;
        }
    }

    if !seen_x || !seen_y {
        return Err(ParseError::MissingSection);
    }

    config.validate()?;
    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "axis.x" => Ok(Section::AxisX),
        "axis.y" => Ok(Section::AxisY),
        "motion" => Ok(Section::Motion),
        _ => Err(ParseError::InvalidSection),
    }
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut MachineConfig,
) -> Result<(), ParseError> {
    match section {
        Section::AxisX | Section::AxisY => {
            let axis = if section == Section::AxisX {
                &mut config.x
            } else {
                &mut config.y
            };
            match key {
                "steps_per_revolution" => axis.steps_per_revolution = parse_int(value)?,
                "winding" => axis.winding_width = parse_int(value)?,
                "pins" => axis.pins = parse_pins(value)?,
                _ => {}
            }
        }
        Section::Motion => match key {
            "max_speed_rpm" => config.max_speed_rpm = parse_int(value)?,
            "arc_increment_mrad" => config.arc_increment_mrad = parse_int(value)?,
            _ => {}
        },
        Section::Root => {}
    }
    Ok(())
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    // Remove inline comments outside strings
    let value = match value.find('#') {
        Some(hash_pos) if value[..hash_pos].matches('"').count() % 2 == 0 => {
            value[..hash_pos].trim()
        }
        _ => value,
    };

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Strip surrounding quotes if present
fn parse_string(value: &str) -> &str {
    let value = value.trim();
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

/// Parse a pin string like "gpio11" or "!gpio12"
fn parse_pin(value: &str) -> Result<PinConfig, ParseError> {
    let s = parse_string(value);
    let (inverted, s) = match s.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, s),
    };

    let number = s.strip_prefix("gpio").ok_or(ParseError::InvalidPin)?;
    let pin: u8 = number.parse().map_err(|_| ParseError::InvalidPin)?;

    Ok(PinConfig { pin, inverted })
}

/// Parse a pin array like `["gpio2", "gpio3", "!gpio4", "gpio5"]`
fn parse_pins(value: &str) -> Result<Vec<PinConfig, MAX_COIL_PINS>, ParseError> {
    let inner = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .ok_or(ParseError::InvalidValue)?;

    let mut pins = Vec::new();
    for item in inner.split(',') {
        let item = item.trim();
        // Tolerate a trailing comma
        if item.is_empty() {
            continue;
        }
        pins.push(parse_pin(item)?)
            .map_err(|_| ParseError::TooManyItems)?;
    }
    Ok(pins)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[axis.x]
steps_per_revolution = 200
winding = 4
pins = ["gpio2", "gpio3", "gpio4", "gpio5"]

[axis.y]
steps_per_revolution = 48
winding = 2
pins = ["gpio10", "!gpio11"]   # inverted driver on the second coil

[motion]
max_speed_rpm = 30
"#;

    #[test]
    fn test_parse_pin() {
        let pin = parse_pin("gpio11").unwrap();
        assert_eq!(pin.pin, 11);
        assert!(!pin.inverted);

        let pin = parse_pin("\"!gpio12\"").unwrap();
        assert_eq!(pin.pin, 12);
        assert!(pin.inverted);

        assert_eq!(parse_pin("pin3"), Err(ParseError::InvalidPin));
        assert_eq!(parse_pin("gpio"), Err(ParseError::InvalidPin));
        assert_eq!(parse_pin("gpio300"), Err(ParseError::InvalidPin));
    }

    #[test]
    fn test_parse_pins_array() {
        let pins = parse_pins(r#"["gpio1", "!gpio2",]"#).unwrap();
        assert_eq!(pins.len(), 2);
        assert!(pins[1].inverted);

        assert_eq!(
            parse_pins(r#"["gpio1", "gpio2", "gpio3", "gpio4", "gpio5"]"#),
            Err(ParseError::TooManyItems)
        );
        assert_eq!(parse_pins("\"gpio1\""), Err(ParseError::InvalidValue));
    }

    #[test]
    fn test_parse_key_value_strips_comment() {
        assert_eq!(
            parse_key_value("winding = 2 # two coils"),
            Some(("winding", "2"))
        );
        assert_eq!(
            parse_key_value(r##"name = "a#b""##),
            Some(("name", r##""a#b""##))
        );
        assert_eq!(parse_key_value("novalue ="), None);
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = parse_config(MINIMAL).unwrap();
        assert_eq!(config.x.steps_per_revolution, 200);
        assert_eq!(config.x.pins.len(), 4);
        assert_eq!(config.x.pins[0].pin, 2);
        assert_eq!(config.y.winding_width, 2);
        assert_eq!(config.y.pins[1], PinConfig::inverted(11));
        assert_eq!(config.max_speed_rpm, 30);
        // Not given: default
        assert_eq!(config.arc_increment_mrad, 50);
    }

    #[test]
    fn test_missing_axis_section() {
        let input = "[axis.x]\nwinding = 2\npins = [\"gpio0\", \"gpio1\"]\n";
        assert_eq!(parse_config(input), Err(ParseError::MissingSection));
    }

    #[test]
    fn test_unknown_section_rejected() {
        assert_eq!(
            parse_config("[axis.z]\n"),
            Err(ParseError::InvalidSection)
        );
    }

    #[test]
    fn test_invalid_config_reported() {
        let input = MINIMAL.replace("winding = 2", "winding = 3");
        assert_eq!(
            parse_config(&input),
            Err(ParseError::Config(ConfigError::UnsupportedWinding(3)))
        );

        let input = MINIMAL.replace("\"!gpio11\"", "\"gpio3\"");
        assert_eq!(
            parse_config(&input),
            Err(ParseError::Config(ConfigError::PinConflict(3)))
        );
    }

    #[test]
    fn test_zero_arc_increment_reported() {
        let input = format!("{}arc_increment_mrad = 0\n", MINIMAL);
        assert_eq!(
            parse_config(&input),
            Err(ParseError::Config(ConfigError::InvalidArcIncrement))
        );
    }

    #[test]
    fn test_bad_number_rejected() {
        let input = MINIMAL.replace("max_speed_rpm = 30", "max_speed_rpm = fast");
        assert_eq!(parse_config(&input), Err(ParseError::InvalidValue));
    }
}
