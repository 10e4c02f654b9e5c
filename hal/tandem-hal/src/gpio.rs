//! GPIO output abstractions
//!
//! Coil lines are plain push-pull outputs. A pin is configured as an
//! output when the chip HAL constructs it, so by the time a value
//! implements [`OutputPin`] the only remaining operation is writing a level.

use core::convert::Infallible;

use embedded_hal::digital::StatefulOutputPin;

/// Logic level written to a coil line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    /// Logic 0
    Low,
    /// Logic 1
    High,
}

impl Level {
    /// Check if this is the high level
    pub const fn is_high(self) -> bool {
        matches!(self, Level::High)
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

impl From<Level> for bool {
    fn from(level: Level) -> Self {
        level.is_high()
    }
}

/// Digital output pin
///
/// Each motor exclusively owns the pins of its coils, so implementations
/// need no locking.
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Set the pin to a specific state
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Write a [`Level`]
    fn set_level(&mut self, level: Level) {
        self.set_state(level.is_high());
    }

    /// Check if the pin is currently set high
    fn is_set_high(&self) -> bool;

    /// Check if the pin is currently set low
    fn is_set_low(&self) -> bool {
        !self.is_set_high()
    }
}

/// Adapter for `embedded-hal` 1.0 output pins
///
/// Only infallible pins are accepted (GPIO on the supported chips cannot
/// fail a write); the error type being [`Infallible`] lets the adapter
/// discard the `Result` without losing information.
pub struct HalOutput<P> {
    pin: P,
    high: bool,
}

impl<P> HalOutput<P>
where
    P: StatefulOutputPin<Error = Infallible>,
{
    /// Wrap an `embedded-hal` pin
    pub fn new(mut pin: P) -> Self {
        let high = match pin.is_set_high() {
            Ok(high) => high,
            Err(e) => match e {},
        };
        Self { pin, high }
    }

    /// Release the wrapped pin
    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P> OutputPin for HalOutput<P>
where
    P: StatefulOutputPin<Error = Infallible>,
{
    fn set_high(&mut self) {
        match self.pin.set_high() {
            Ok(()) => self.high = true,
            Err(e) => match e {},
        }
    }

    fn set_low(&mut self) {
        match self.pin.set_low() {
            Ok(()) => self.high = false,
            Err(e) => match e {},
        }
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}
