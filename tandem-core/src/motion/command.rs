//! Motion commands and their decomposition into straight segments
//!
//! Every command that moves the carriage reduces to one or more
//! [`Displacement`]s executed through the same coordinated linear move.
//! This lets the blocking planner and an async task share one code path.

use super::arc::ArcPath;
use super::planner::polar_components;
use super::position::{CarriagePosition, Displacement};
use crate::error::{GeometryError, MotionError};

/// A request to the motion planner
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionCommand {
    /// Set both axes to the maximum speed (RPM)
    Init { max_rpm: u32 },
    /// Move X only, by `length` steps
    AlongX { length: i32 },
    /// Move Y only, by `length` steps
    AlongY { length: i32 },
    /// Straight move by the vector from (x1, y1) to (x2, y2)
    Linear { x1: i32, y1: i32, x2: i32, y2: i32 },
    /// Straight move by a polar vector (theta in radians)
    Polar { radius: f32, theta: f32 },
    /// Arc starting at the current position (angles in radians)
    Arc {
        radius: f32,
        start_angle: f32,
        end_angle: f32,
    },
}

impl MotionCommand {
    /// Split a command into straight segments starting at `from`
    ///
    /// `Init` yields no segments. An arc is walked once up front, so a chord
    /// that would leave the position range fails here, before any segment
    /// has moved the carriage.
    pub fn segments(
        &self,
        from: CarriagePosition,
        arc_increment: f32,
    ) -> Result<Segments, GeometryError> {
        let single = |d: Displacement| Segments::Single(Some(d));
        let segments = match *self {
            MotionCommand::Init { .. } => Segments::Single(None),
            MotionCommand::AlongX { length } => single(Displacement::new(length, 0)),
            MotionCommand::AlongY { length } => single(Displacement::new(0, length)),
            MotionCommand::Linear { x1, y1, x2, y2 } => single(Displacement::between(
                CarriagePosition::new(x1, y1),
                CarriagePosition::new(x2, y2),
            )?),
            MotionCommand::Polar { radius, theta } => single(polar_components(radius, theta)?),
            MotionCommand::Arc {
                radius,
                start_angle,
                end_angle,
            } => Segments::Arc {
                path: ArcPath::starting_at(from, radius, start_angle, end_angle, arc_increment)?,
                last: from,
            },
        };
        if let Segments::Arc { .. } = segments {
            segments.clone().try_for_each(|d| d.map(drop))?;
        }
        Ok(segments)
    }
}

/// Outcome reported back to whoever issued a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionStatus {
    /// Speeds configured
    Ready,
    /// Command finished; carriage is here
    Complete(CarriagePosition),
    /// Command abandoned part way; carriage is here
    Cancelled(CarriagePosition),
    /// Command rejected before any motion of the failing segment
    Failed(MotionError),
}

/// Segment iterator for one command
#[derive(Debug, Clone)]
pub enum Segments {
    /// Zero or one straight segment
    Single(Option<Displacement>),
    /// Chords of an arc, converted to relative moves
    Arc {
        path: ArcPath,
        last: CarriagePosition,
    },
}

impl Iterator for Segments {
    type Item = Result<Displacement, GeometryError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Segments::Single(d) => d.take().map(Ok),
            Segments::Arc { path, last } => {
                let point = match path.next()? {
                    Ok(point) => point,
                    Err(e) => return Some(Err(e)),
                };
                let d = Displacement::between(*last, point);
                *last = point;
                Some(d)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_axis_segments() {
        let segs: Vec<_> = MotionCommand::AlongY { length: -4 }
            .segments(CarriagePosition::ORIGIN, 0.1)
            .unwrap()
            .collect();
        assert_eq!(segs, vec![Ok(Displacement::new(0, -4))]);
    }

    #[test]
    fn test_linear_segment_is_relative() {
        let segs: Vec<_> = MotionCommand::Linear {
            x1: 5,
            y1: 5,
            x2: 8,
            y2: 1,
        }
        .segments(CarriagePosition::new(100, 100), 0.1)
        .unwrap()
        .collect();
        assert_eq!(segs, vec![Ok(Displacement::new(3, -4))]);
    }

    #[test]
    fn test_init_has_no_segments() {
        let mut segs = MotionCommand::Init { max_rpm: 10 }
            .segments(CarriagePosition::ORIGIN, 0.1)
            .unwrap();
        assert!(segs.next().is_none());
    }

    #[test]
    fn test_arc_segments_sum_to_chord() {
        let from = CarriagePosition::new(10, 0);
        let segs = MotionCommand::Arc {
            radius: 10.0,
            start_angle: 0.0,
            end_angle: core::f32::consts::PI,
        }
        .segments(from, 0.2)
        .unwrap();

        let mut pos = from;
        for d in segs {
            pos = pos.offset(d.unwrap()).unwrap();
        }
        assert_eq!(pos, CarriagePosition::new(-10, 0));
    }

    #[test]
    fn test_arc_leaving_range_rejected_up_front() {
        // Early chords fit; the last one ends past i32::MAX
        let cmd = MotionCommand::Arc {
            radius: 1000.0,
            start_angle: -core::f32::consts::FRAC_PI_2,
            end_angle: 0.0,
        };
        assert_eq!(
            cmd.segments(CarriagePosition::new(2_147_483_000, 0), 0.05).err(),
            Some(GeometryError::OutOfRange)
        );

        // Same arc with room to spare
        let segs = cmd.segments(CarriagePosition::ORIGIN, 0.05).unwrap();
        assert_eq!(segs.count(), 32);
    }

    #[test]
    fn test_bad_polar_rejected() {
        assert_eq!(
            MotionCommand::Polar {
                radius: f32::INFINITY,
                theta: 0.0
            }
            .segments(CarriagePosition::ORIGIN, 0.1)
            .err(),
            Some(GeometryError::NonFinite)
        );
    }
}
