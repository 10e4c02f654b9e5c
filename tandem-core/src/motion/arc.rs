//! Circular arcs as chains of short straight segments
//!
//! An arc is approximated by chords whose endpoints lie on the circle. The
//! worst-case deviation from the true arc is the sagitta of one chord,
//! `r * (1 - cos(increment / 2))`, so the angular increment bounds quality.
//! Endpoints are rounded to whole steps; each chord then runs through the
//! ordinary coordinated linear move.

use core::f32::consts::FRAC_PI_2;

use libm::{acosf, ceilf, cosf, fabsf, roundf, sinf};

use super::position::CarriagePosition;
use crate::error::GeometryError;

/// Upper bound on chords per arc
pub const MAX_ARC_SEGMENTS: u32 = 100_000;

/// Largest angular increment whose chord error stays within `tolerance`
///
/// Both arguments are in steps. Never coarser than a quarter turn.
pub fn chord_increment(radius: f32, tolerance: f32) -> Result<f32, GeometryError> {
    if !radius.is_finite() || !tolerance.is_finite() {
        return Err(GeometryError::NonFinite);
    }
    if radius <= 0.0 || tolerance <= 0.0 {
        return Err(GeometryError::InvalidArc);
    }
    let cos_half = (1.0 - tolerance / radius).max(-1.0);
    Ok((2.0 * acosf(cos_half)).min(FRAC_PI_2))
}

/// Iterator over chord endpoints of an arc
///
/// Yields absolute positions; the first item is the end of the first chord
/// (the start point itself is not repeated) and the last lands exactly on
/// `end_angle`.
///
/// Points are kept as an integer anchor plus a small float offset, so they
/// stay exact far from the origin where `f32` can no longer hold a whole
/// step.
#[derive(Debug, Clone)]
pub struct ArcPath {
    anchor: CarriagePosition,
    /// Center relative to `anchor`
    center_dx: f32,
    center_dy: f32,
    radius: f32,
    start_angle: f32,
    sweep: f32,
    segments: u32,
    next: u32,
}

impl ArcPath {
    /// Arc around an explicit center
    ///
    /// Angles are radians, counter-clockwise from +X. `end_angle` smaller
    /// than `start_angle` traces the arc clockwise.
    pub fn new(
        center: (f32, f32),
        radius: f32,
        start_angle: f32,
        end_angle: f32,
        increment: f32,
    ) -> Result<Self, GeometryError> {
        if !center.0.is_finite() || !center.1.is_finite() {
            return Err(GeometryError::NonFinite);
        }
        let anchor = CarriagePosition::new(
            to_steps(roundf(center.0))?,
            to_steps(roundf(center.1))?,
        );
        let offset = (
            center.0 - anchor.x as f32,
            center.1 - anchor.y as f32,
        );
        Self::around(anchor, offset, radius, start_angle, end_angle, increment)
    }

    /// Arc that starts at `from`
    ///
    /// `from` is taken to sit on the circle at `start_angle`, which fixes
    /// the center.
    pub fn starting_at(
        from: CarriagePosition,
        radius: f32,
        start_angle: f32,
        end_angle: f32,
        increment: f32,
    ) -> Result<Self, GeometryError> {
        if !radius.is_finite() || !start_angle.is_finite() {
            return Err(GeometryError::NonFinite);
        }
        let offset = (-radius * cosf(start_angle), -radius * sinf(start_angle));
        Self::around(from, offset, radius, start_angle, end_angle, increment)
    }

    fn around(
        anchor: CarriagePosition,
        center_offset: (f32, f32),
        radius: f32,
        start_angle: f32,
        end_angle: f32,
        increment: f32,
    ) -> Result<Self, GeometryError> {
        let inputs = [center_offset.0, center_offset.1, radius, start_angle, end_angle, increment];
        if inputs.iter().any(|v| !v.is_finite()) {
            return Err(GeometryError::NonFinite);
        }
        if radius <= 0.0 || increment <= 0.0 {
            return Err(GeometryError::InvalidArc);
        }

        let sweep = end_angle - start_angle;
        let segments = ceilf(fabsf(sweep) / increment);
        if segments > MAX_ARC_SEGMENTS as f32 {
            return Err(GeometryError::InvalidArc);
        }

        Ok(Self {
            anchor,
            center_dx: center_offset.0,
            center_dy: center_offset.1,
            radius,
            start_angle,
            sweep,
            segments: segments as u32,
            next: 0,
        })
    }

    /// Number of chords
    pub fn segment_count(&self) -> u32 {
        self.segments
    }

    fn point_at(&self, angle: f32) -> Result<CarriagePosition, GeometryError> {
        let dx = to_steps(roundf(self.center_dx + self.radius * cosf(angle)))?;
        let dy = to_steps(roundf(self.center_dy + self.radius * sinf(angle)))?;
        let x = self.anchor.x.checked_add(dx).ok_or(GeometryError::OutOfRange)?;
        let y = self.anchor.y.checked_add(dy).ok_or(GeometryError::OutOfRange)?;
        Ok(CarriagePosition::new(x, y))
    }
}

impl Iterator for ArcPath {
    type Item = Result<CarriagePosition, GeometryError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.segments {
            return None;
        }
        self.next += 1;
        let angle = if self.next == self.segments {
            self.start_angle + self.sweep
        } else {
            self.start_angle + self.sweep * (self.next as f32 / self.segments as f32)
        };
        Some(self.point_at(angle))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.segments - self.next) as usize;
        (left, Some(left))
    }
}

/// Convert an already-rounded coordinate to whole steps
pub(crate) fn to_steps(v: f32) -> Result<i32, GeometryError> {
    // i32::MAX is not representable in f32; stay strictly inside
    if v >= -2_147_483_648.0 && v < 2_147_483_648.0 {
        Ok(v as i32)
    } else {
        Err(GeometryError::OutOfRange)
    }
}
