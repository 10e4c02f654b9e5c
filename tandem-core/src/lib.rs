//! Board-agnostic motion core for the dual stepper firmware
//!
//! This crate contains all motion logic that does not depend on
//! specific hardware implementations:
//!
//! - Commutation tables for 2-wire and 4-wire coil drive
//! - Per-axis stepping state (phase, direction, timing)
//! - Time-multiplexed two-axis step scheduler
//! - Motion planning (linear, polar and arc moves)
//! - Configuration types and the `machine.toml` parser
//!
//! The system is open-loop: there is no position feedback, so a missed
//! step is never observed or corrected.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod axis;
pub mod commutation;
pub mod config;
pub mod error;
pub mod motion;
pub mod scheduler;

#[cfg(test)]
pub(crate) mod test_utils;

pub use error::{ConfigError, GeometryError, MotionError};
