//! RP2040-specific HAL for the dual stepper firmware
//!
//! Implements the `tandem-hal` traits on top of `embassy-rp`:
//!
//! - Dynamic pin allocation for config-driven coil wiring
//! - Coil outputs with optional inversion
//! - Millisecond clock backed by the embassy time driver

#![no_std]
#![deny(unsafe_code)]

pub mod clock;
pub mod pins;

pub use clock::EmbassyClock;
pub use pins::{CoilOutput, PinBank, PinError};
