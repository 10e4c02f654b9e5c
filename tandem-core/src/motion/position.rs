//! Carriage position bookkeeping
//!
//! Positions and displacements are in raw motor steps. Converting to
//! physical length needs a calibration that this firmware does not have,
//! so one input unit is one step on the corresponding axis.

use crate::error::GeometryError;

/// Relative move in steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Displacement {
    pub dx: i32,
    pub dy: i32,
}

impl Displacement {
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// Displacement between two points, `to - from`
    pub fn between(from: CarriagePosition, to: CarriagePosition) -> Result<Self, GeometryError> {
        Ok(Self {
            dx: to.x.checked_sub(from.x).ok_or(GeometryError::OutOfRange)?,
            dy: to.y.checked_sub(from.y).ok_or(GeometryError::OutOfRange)?,
        })
    }

    /// Check if neither axis moves
    pub fn is_zero(&self) -> bool {
        self.dx == 0 && self.dy == 0
    }
}

/// Cumulative carriage position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CarriagePosition {
    pub x: i32,
    pub y: i32,
}

impl CarriagePosition {
    /// Position at the origin
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Position after applying `d`, or `OutOfRange` on overflow
    pub fn offset(self, d: Displacement) -> Result<Self, GeometryError> {
        Ok(Self {
            x: self.x.checked_add(d.dx).ok_or(GeometryError::OutOfRange)?,
            y: self.y.checked_add(d.dy).ok_or(GeometryError::OutOfRange)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset() {
        let p = CarriagePosition::new(3, -4);
        assert_eq!(
            p.offset(Displacement::new(-5, 10)),
            Ok(CarriagePosition::new(-2, 6))
        );
    }

    #[test]
    fn test_offset_overflow() {
        let p = CarriagePosition::new(i32::MAX, 0);
        assert_eq!(
            p.offset(Displacement::new(1, 0)),
            Err(GeometryError::OutOfRange)
        );
    }

    #[test]
    fn test_between() {
        let d = Displacement::between(CarriagePosition::new(1, 2), CarriagePosition::new(4, -2));
        assert_eq!(d, Ok(Displacement::new(3, -4)));
        assert!(Displacement::default().is_zero());
        assert_eq!(
            Displacement::between(CarriagePosition::new(i32::MIN, 0), CarriagePosition::new(1, 0)),
            Err(GeometryError::OutOfRange)
        );
    }
}
