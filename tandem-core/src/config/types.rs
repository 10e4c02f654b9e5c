//! Configuration type definitions
//!
//! These types describe one machine: two axes and the motion limits. They
//! are filled in from `machine.toml` and checked with
//! [`MachineConfig::validate`] before any pin is claimed.

use heapless::Vec;

use crate::axis::AxisState;
use crate::commutation::Winding;
use crate::error::ConfigError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum coil pins per axis
pub const MAX_COIL_PINS: usize = 4;

/// GPIO pin configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinConfig {
    /// GPIO pin number (0-29 for RP2040)
    pub pin: u8,
    /// Drive the pin low for a logical high
    pub inverted: bool,
}

impl PinConfig {
    pub const fn new(pin: u8) -> Self {
        Self {
            pin,
            inverted: false,
        }
    }

    /// Create an inverted (active-low) pin
    pub const fn inverted(pin: u8) -> Self {
        Self {
            pin,
            inverted: true,
        }
    }
}

/// One axis: motor geometry and coil wiring
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AxisConfig {
    /// Full steps per motor revolution
    pub steps_per_revolution: u32,
    /// Number of coil pins, 2 or 4
    pub winding_width: u8,
    /// Coil pins in commutation table column order
    pub pins: Vec<PinConfig, MAX_COIL_PINS>,
}

impl AxisConfig {
    /// Four-wire axis on the given GPIOs, in table column order
    pub fn four_wire(steps_per_revolution: u32, pins: [u8; 4]) -> Self {
        Self {
            steps_per_revolution,
            winding_width: 4,
            pins: pins.iter().map(|&p| PinConfig::new(p)).collect(),
        }
    }

    /// Winding implied by `winding_width`
    pub fn winding(&self) -> Result<Winding, ConfigError> {
        Winding::try_from(self.winding_width)
    }

    /// Check steps, winding and pin count
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.steps_per_revolution == 0 {
            return Err(ConfigError::InvalidStepsPerRevolution);
        }
        let winding = self.winding()?;
        if self.pins.len() != winding.pin_count() {
            return Err(ConfigError::PinCountMismatch {
                expected: winding.pin_count() as u8,
                found: self.pins.len() as u8,
            });
        }
        Ok(())
    }
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            steps_per_revolution: 200,
            winding_width: 4,
            pins: Vec::new(),
        }
    }
}

/// Complete machine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MachineConfig {
    pub x: AxisConfig,
    pub y: AxisConfig,
    /// Speed of the major axis of every move (RPM)
    pub max_speed_rpm: u32,
    /// Arc chord increment in milliradians
    pub arc_increment_mrad: u16,
}

impl MachineConfig {
    /// Arc chord increment in radians
    pub fn arc_increment_rad(&self) -> f32 {
        self.arc_increment_mrad as f32 / 1000.0
    }

    /// Check both axes, the speed limit, the arc increment and pin
    /// uniqueness
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.x.validate()?;
        self.y.validate()?;

        if self.arc_increment_mrad == 0 {
            return Err(ConfigError::InvalidArcIncrement);
        }

        AxisState::delay_for_rpm(self.x.steps_per_revolution, self.max_speed_rpm)?;
        AxisState::delay_for_rpm(self.y.steps_per_revolution, self.max_speed_rpm)?;

        let pins: Vec<u8, { MAX_COIL_PINS * 2 }> =
            self.x.pins.iter().chain(self.y.pins.iter()).map(|p| p.pin).collect();
        for (i, pin) in pins.iter().enumerate() {
            if pins[i + 1..].contains(pin) {
                return Err(ConfigError::PinConflict(*pin));
            }
        }
        Ok(())
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            x: AxisConfig::four_wire(200, [2, 3, 4, 5]),
            y: AxisConfig::four_wire(200, [6, 7, 8, 9]),
            max_speed_rpm: 60,
            arc_increment_mrad: 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_wire(pins: [u8; 2]) -> AxisConfig {
        AxisConfig {
            steps_per_revolution: 48,
            winding_width: 2,
            pins: pins.iter().map(|&p| PinConfig::new(p)).collect(),
        }
    }

    #[test]
    fn test_default_is_valid() {
        let config = MachineConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.x.pins[3].pin, 5);
        assert_eq!(config.y.pins[0].pin, 6);
        assert!((config.arc_increment_rad() - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_four_wire_pins_in_order() {
        let axis = AxisConfig::four_wire(200, [255, 0, 254, 1]);
        assert_eq!(axis.winding_width, 4);
        let pins: std::vec::Vec<u8> = axis.pins.iter().map(|p| p.pin).collect();
        assert_eq!(pins, [255, 0, 254, 1]);
        assert!(axis.pins.iter().all(|p| !p.inverted));
    }

    #[test]
    fn test_zero_arc_increment_rejected() {
        let config = MachineConfig {
            arc_increment_mrad: 0,
            ..MachineConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidArcIncrement));

        let config = MachineConfig {
            arc_increment_mrad: 1,
            ..MachineConfig::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_pin_count_must_match_winding() {
        let mut axis = two_wire([0, 1]);
        axis.winding_width = 4;
        assert_eq!(
            axis.validate(),
            Err(ConfigError::PinCountMismatch {
                expected: 4,
                found: 2
            })
        );
    }

    #[test]
    fn test_unsupported_winding() {
        let mut axis = two_wire([0, 1]);
        axis.winding_width = 3;
        assert_eq!(axis.validate(), Err(ConfigError::UnsupportedWinding(3)));
    }

    #[test]
    fn test_zero_steps_rejected() {
        let mut axis = two_wire([0, 1]);
        axis.steps_per_revolution = 0;
        assert_eq!(
            axis.validate(),
            Err(ConfigError::InvalidStepsPerRevolution)
        );
    }

    #[test]
    fn test_shared_pin_rejected() {
        let config = MachineConfig {
            x: two_wire([10, 11]),
            y: two_wire([12, 10]),
            ..MachineConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::PinConflict(10)));
    }

    #[test]
    fn test_speed_checked_against_both_axes() {
        let config = MachineConfig {
            x: two_wire([0, 1]),
            y: two_wire([2, 3]),
            max_speed_rpm: 0,
            ..MachineConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidSpeed));

        // 60000 / 200 / 400 truncates to zero on the default X axis
        let config = MachineConfig {
            max_speed_rpm: 400,
            ..MachineConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::SpeedTooHigh { rpm: 400 })
        );
    }
}
