//! Dynamic pin allocation for config-driven coil wiring
//!
//! Coil pins come from `machine.toml` as GPIO numbers, so they are taken
//! from a bank by number at runtime instead of being hardcoded.

use embassy_rp::gpio::{AnyPin, Level as RpLevel, Output};
use embassy_rp::Peri;
use tandem_core::config::PinConfig;
use tandem_hal::{HalOutput, OutputPin};

/// Number of user GPIOs on the RP2040
pub const GPIO_COUNT: usize = 30;

/// Collect every GPIO of an `embassy_rp::Peripherals` into an array for
/// [`PinBank::new`]
///
/// Usage:
/// ```ignore
/// let p = embassy_rp::init(Default::default());
/// let mut bank = PinBank::new(gpio_pins!(p));
/// ```
#[macro_export]
macro_rules! gpio_pins {
    ($p:expr) => {
        [
            $p.PIN_0.into(), $p.PIN_1.into(), $p.PIN_2.into(), $p.PIN_3.into(),
            $p.PIN_4.into(), $p.PIN_5.into(), $p.PIN_6.into(), $p.PIN_7.into(),
            $p.PIN_8.into(), $p.PIN_9.into(), $p.PIN_10.into(), $p.PIN_11.into(),
            $p.PIN_12.into(), $p.PIN_13.into(), $p.PIN_14.into(), $p.PIN_15.into(),
            $p.PIN_16.into(), $p.PIN_17.into(), $p.PIN_18.into(), $p.PIN_19.into(),
            $p.PIN_20.into(), $p.PIN_21.into(), $p.PIN_22.into(), $p.PIN_23.into(),
            $p.PIN_24.into(), $p.PIN_25.into(), $p.PIN_26.into(), $p.PIN_27.into(),
            $p.PIN_28.into(), $p.PIN_29.into(),
        ]
    };
}

/// Error when requesting a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// Pin number out of range (0-29 valid)
    InvalidPin(u8),
    /// Pin already taken
    AlreadyTaken(u8),
}

/// All GPIOs, handed out once each
pub struct PinBank {
    pins: [Option<Peri<'static, AnyPin>>; GPIO_COUNT],
}

impl PinBank {
    /// Create a bank owning every GPIO
    pub fn new(pins: [Peri<'static, AnyPin>; GPIO_COUNT]) -> Self {
        Self {
            pins: pins.map(Some),
        }
    }

    /// Take a pin by number
    pub fn take(&mut self, pin_num: u8) -> Result<Peri<'static, AnyPin>, PinError> {
        self.pins
            .get_mut(pin_num as usize)
            .ok_or(PinError::InvalidPin(pin_num))?
            .take()
            .ok_or(PinError::AlreadyTaken(pin_num))
    }

    /// Take a pin and configure it as a coil output, de-energised
    pub fn take_coil(&mut self, config: PinConfig) -> Result<CoilOutput, PinError> {
        let pin = self.take(config.pin)?;
        Ok(CoilOutput::new(pin, config.inverted))
    }
}

/// Coil line driven through an RP2040 output
///
/// With `inverted` set the physical level is the opposite of the logical
/// one, for drivers with active-low inputs.
pub struct CoilOutput {
    out: HalOutput<Output<'static>>,
    inverted: bool,
}

impl CoilOutput {
    /// Configure `pin` as an output, logically low
    pub fn new(pin: Peri<'static, AnyPin>, inverted: bool) -> Self {
        let initial = if inverted { RpLevel::High } else { RpLevel::Low };
        Self {
            out: HalOutput::new(Output::new(pin, initial)),
            inverted,
        }
    }
}

impl OutputPin for CoilOutput {
    fn set_high(&mut self) {
        if self.inverted {
            self.out.set_low()
        } else {
            self.out.set_high()
        }
    }

    fn set_low(&mut self) {
        if self.inverted {
            self.out.set_high()
        } else {
            self.out.set_low()
        }
    }

    fn is_set_high(&self) -> bool {
        self.out.is_set_high() != self.inverted
    }
}
