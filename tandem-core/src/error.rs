//! Error types shared by the motion core
//!
//! Every error here is detected before a pin is written. None of them is
//! fatal: the caller decides whether to retry, skip or stop.

use core::fmt;

/// Invalid machine or axis configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Steps per revolution must be at least 1
    InvalidStepsPerRevolution,
    /// Only 2-wire and 4-wire windings are supported
    UnsupportedWinding(u8),
    /// Number of coil pins does not match the winding
    PinCountMismatch {
        /// Pins required by the winding
        expected: u8,
        /// Pins supplied
        found: u8,
    },
    /// Same GPIO assigned twice
    PinConflict(u8),
    /// Requested speed is zero
    InvalidSpeed,
    /// Requested speed would need a step delay below one millisecond
    SpeedTooHigh {
        /// Requested speed in RPM
        rpm: u32,
    },
    /// Arc increment must be at least 1 mrad
    InvalidArcIncrement,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidStepsPerRevolution => write!(f, "steps per revolution must be positive"),
            Self::UnsupportedWinding(width) => {
                write!(f, "unsupported winding width {} (expected 2 or 4)", width)
            }
            Self::PinCountMismatch { expected, found } => {
                write!(f, "winding needs {} pins, got {}", expected, found)
            }
            Self::PinConflict(pin) => write!(f, "gpio{} assigned more than once", pin),
            Self::InvalidSpeed => write!(f, "speed must be positive"),
            Self::SpeedTooHigh { rpm } => {
                write!(f, "{} rpm needs a step delay shorter than 1 ms", rpm)
            }
            Self::InvalidArcIncrement => write!(f, "arc increment must be positive"),
        }
    }
}

/// A move that cannot be turned into step counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GeometryError {
    /// Speed ratio requested for a move with no travel on either axis
    ZeroLength,
    /// NaN or infinite radius/angle
    NonFinite,
    /// Step counts or resulting position do not fit the position range
    OutOfRange,
    /// Arc radius or angular increment is not usable
    InvalidArc,
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroLength => write!(f, "move has no length"),
            Self::NonFinite => write!(f, "non-finite geometry input"),
            Self::OutOfRange => write!(f, "move exceeds position range"),
            Self::InvalidArc => write!(f, "invalid arc radius or increment"),
        }
    }
}

/// Errors reported by the scheduler and planner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionError {
    /// Configuration rejected
    Config(ConfigError),
    /// Geometry rejected
    Geometry(GeometryError),
    /// A move is already executing
    Busy,
    /// Speed has not been set yet (call `init` first)
    NotInitialized,
}

impl From<ConfigError> for MotionError {
    fn from(e: ConfigError) -> Self {
        MotionError::Config(e)
    }
}

impl From<GeometryError> for MotionError {
    fn from(e: GeometryError) -> Self {
        MotionError::Geometry(e)
    }
}

impl fmt::Display for MotionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration error: {}", e),
            Self::Geometry(e) => write!(f, "geometry error: {}", e),
            Self::Busy => write!(f, "a move is already in progress"),
            Self::NotInitialized => write!(f, "axis speed not set"),
        }
    }
}
