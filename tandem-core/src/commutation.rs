//! Coil commutation tables
//!
//! A stepper advances one step each time its coils are energised with the
//! next row of a fixed four-entry sequence. The two supported wirings are:
//!
//! ```text
//! 4-wire                2-wire (C1, C2 of the 4-wire table)
//! Phase C0 C1 C2 C3     Phase C0 C1
//!   0    1  0  1  0       0    0  1
//!   1    0  1  1  0       1    1  1
//!   2    0  1  0  1       2    1  0
//!   3    1  0  0  1       3    0  0
//! ```
//!
//! The 2-wire variant relies on an inverting driver (Darlington array or
//! L293) to derive the other two coil signals. Row order is significant:
//! a reordered table makes the motor skip or stall.

use tandem_hal::{Level, OutputPin};

use crate::error::ConfigError;

/// Number of entries in every commutation sequence
pub const PHASE_COUNT: usize = 4;

const L: Level = Level::Low;
const H: Level = Level::High;

/// Two-wire sequence, pin 1 first
pub static TWO_WIRE_SEQUENCE: [[Level; 2]; PHASE_COUNT] = [
    [L, H], // 01
    [H, H], // 11
    [H, L], // 10
    [L, L], // 00
];

/// Four-wire sequence, pin 1 first
pub static FOUR_WIRE_SEQUENCE: [[Level; 4]; PHASE_COUNT] = [
    [H, L, H, L], // 1010
    [L, H, H, L], // 0110
    [L, H, L, H], // 0101
    [H, L, L, H], // 1001
];

/// Coil wiring of one motor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Winding {
    /// Two control lines plus external inverters
    TwoWire,
    /// One control line per coil end
    FourWire,
}

impl Winding {
    /// Number of GPIO lines this winding uses
    pub const fn pin_count(self) -> usize {
        match self {
            Winding::TwoWire => 2,
            Winding::FourWire => 4,
        }
    }
}

impl TryFrom<u8> for Winding {
    type Error = ConfigError;

    fn try_from(width: u8) -> Result<Self, Self::Error> {
        match width {
            2 => Ok(Winding::TwoWire),
            4 => Ok(Winding::FourWire),
            other => Err(ConfigError::UnsupportedWinding(other)),
        }
    }
}

/// Pin levels for a phase index
///
/// Any index is accepted; only `phase % PHASE_COUNT` matters.
pub fn outputs_for(phase: usize, winding: Winding) -> &'static [Level] {
    let row = phase % PHASE_COUNT;
    match winding {
        Winding::TwoWire => &TWO_WIRE_SEQUENCE[row],
        Winding::FourWire => &FOUR_WIRE_SEQUENCE[row],
    }
}

/// Coil pins owned by one motor, tagged with their wiring
///
/// The variant is fixed at construction, so the table used for output is
/// selected once rather than re-checked on every step.
#[derive(Debug)]
pub enum Coils<P> {
    /// Two control lines
    TwoWire([P; 2]),
    /// Four control lines
    FourWire([P; 4]),
}

impl<P: OutputPin> Coils<P> {
    /// Build a coil set from an ordered pin list
    ///
    /// Fails with [`ConfigError::PinCountMismatch`] unless exactly
    /// `winding.pin_count()` pins are supplied.
    pub fn from_pins<I>(winding: Winding, pins: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = P>,
    {
        let mut it = pins.into_iter();
        let mismatch = |found: usize| ConfigError::PinCountMismatch {
            expected: winding.pin_count() as u8,
            found: found as u8,
        };

        let coils = match winding {
            Winding::TwoWire => match (it.next(), it.next()) {
                (Some(a), Some(b)) => Coils::TwoWire([a, b]),
                (first, _) => return Err(mismatch(first.is_some() as usize)),
            },
            Winding::FourWire => match (it.next(), it.next(), it.next(), it.next()) {
                (Some(a), Some(b), Some(c), Some(d)) => Coils::FourWire([a, b, c, d]),
                (a, b, c, _) => {
                    let found = [a.is_some(), b.is_some(), c.is_some()]
                        .iter()
                        .filter(|present| **present)
                        .count();
                    return Err(mismatch(found));
                }
            },
        };

        let extra = it.count();
        if extra > 0 {
            return Err(mismatch(winding.pin_count() + extra));
        }
        Ok(coils)
    }

    /// Wiring of this coil set
    pub fn winding(&self) -> Winding {
        match self {
            Coils::TwoWire(_) => Winding::TwoWire,
            Coils::FourWire(_) => Winding::FourWire,
        }
    }

    /// Pins in table column order
    pub fn pins(&self) -> &[P] {
        match self {
            Coils::TwoWire(pins) => pins,
            Coils::FourWire(pins) => pins,
        }
    }

    /// Write the table row for `phase` to the pins
    pub fn energize(&mut self, phase: usize) {
        let levels = outputs_for(phase, self.winding());
        let pins: &mut [P] = match self {
            Coils::TwoWire(pins) => pins,
            Coils::FourWire(pins) => pins,
        };
        for (pin, level) in pins.iter_mut().zip(levels) {
            pin.set_level(*level);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockPin, PinLog};

    fn levels(pins: &[MockPin]) -> Vec<bool> {
        pins.iter().map(|p| p.is_set_high()).collect()
    }

    #[test]
    fn test_winding_from_width() {
        assert_eq!(Winding::try_from(2), Ok(Winding::TwoWire));
        assert_eq!(Winding::try_from(4), Ok(Winding::FourWire));
        assert_eq!(
            Winding::try_from(3),
            Err(ConfigError::UnsupportedWinding(3))
        );
        assert_eq!(
            Winding::try_from(0),
            Err(ConfigError::UnsupportedWinding(0))
        );
    }

    #[test]
    fn test_four_wire_cycle_matches_table() {
        let log = PinLog::new();
        let mut coils = Coils::from_pins(Winding::FourWire, log.pins(4)).unwrap();

        let expected = [
            [true, false, true, false],
            [false, true, true, false],
            [false, true, false, true],
            [true, false, false, true],
        ];
        for (phase, row) in expected.iter().enumerate() {
            coils.energize(phase);
            assert_eq!(levels(coils.pins()), row.to_vec(), "phase {}", phase);
        }

        // Wraps back to the first row
        coils.energize(4);
        assert_eq!(levels(coils.pins()), expected[0].to_vec());
    }

    #[test]
    fn test_two_wire_cycle_matches_table() {
        let log = PinLog::new();
        let mut coils = Coils::from_pins(Winding::TwoWire, log.pins(2)).unwrap();

        let expected = [[false, true], [true, true], [true, false], [false, false]];
        for (phase, row) in expected.iter().enumerate() {
            coils.energize(phase);
            assert_eq!(levels(coils.pins()), row.to_vec(), "phase {}", phase);
        }
    }

    #[test]
    fn test_two_wire_is_middle_columns_of_four_wire() {
        for phase in 0..PHASE_COUNT {
            let four = outputs_for(phase, Winding::FourWire);
            let two = outputs_for(phase, Winding::TwoWire);
            assert_eq!(two, &four[1..3]);
        }
    }

    #[test]
    fn test_energize_writes_only_own_pins() {
        let log = PinLog::new();
        let mut coils = Coils::from_pins(Winding::TwoWire, log.pins(2)).unwrap();
        coils.energize(1);
        assert_eq!(log.writes(), vec![(0, true), (1, true)]);
    }

    #[test]
    fn test_pin_count_mismatch() {
        let log = PinLog::new();
        assert_eq!(
            Coils::from_pins(Winding::FourWire, log.pins(2)).err(),
            Some(ConfigError::PinCountMismatch {
                expected: 4,
                found: 2
            })
        );
        assert_eq!(
            Coils::from_pins(Winding::TwoWire, log.pins(3)).err(),
            Some(ConfigError::PinCountMismatch {
                expected: 2,
                found: 3
            })
        );
        assert_eq!(
            Coils::from_pins(Winding::TwoWire, log.pins(0)).err(),
            Some(ConfigError::PinCountMismatch {
                expected: 2,
                found: 0
            })
        );
        // Construction never writes
        assert!(log.writes().is_empty());
    }
}
