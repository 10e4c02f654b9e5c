//! Motion planner for coordinated two-axis moves
//!
//! The planner turns a displacement into per-axis step counts and speeds.
//! For a straight move the axis with the larger travel (the major axis)
//! runs at the maximum speed and the other runs proportionally slower:
//!
//! ```text
//! minor_rpm = max_rpm * |minor| / |major|      (integer division)
//! ```
//!
//! With equal steps per revolution both axes then take about the same
//! time, so the carriage traces an approximately straight line.

use libm::{cosf, roundf, sinf};
use tandem_hal::{Clock, OutputPin};

use super::arc::to_steps;
use super::command::MotionCommand;
use super::position::{CarriagePosition, Displacement};
use crate::axis::AxisState;
use crate::error::{GeometryError, MotionError};
use crate::scheduler::{MoveProgress, MoveReport, StepCounts, StepScheduler};

/// Default angular increment for arcs in radians (about 2.9°)
pub const DEFAULT_ARC_INCREMENT_RAD: f32 = 0.05;

/// Speeds for one move, `None` for an axis that does not travel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisSpeeds {
    pub x_rpm: Option<u32>,
    pub y_rpm: Option<u32>,
}

/// Speeds that make both axes of `d` finish together
///
/// The minor axis never drops to 0 RPM while it still has steps to take;
/// a ratio that truncates to zero is raised to 1 RPM.
pub fn coordinated_speeds(d: Displacement, max_rpm: u32) -> Result<AxisSpeeds, GeometryError> {
    let (ax, ay) = (d.dx.unsigned_abs(), d.dy.unsigned_abs());
    let major = ax.max(ay);
    let minor = ax.min(ay);
    if major == 0 {
        return Err(GeometryError::ZeroLength);
    }

    let minor_rpm = (max_rpm as u64 * minor as u64 / major as u64) as u32;
    let speed_for = |travel: u32| match travel {
        0 => None,
        t if t == major => Some(max_rpm),
        _ => Some(minor_rpm.max(1)),
    };

    Ok(AxisSpeeds {
        x_rpm: speed_for(ax),
        y_rpm: speed_for(ay),
    })
}

/// Project a polar vector onto the axes, rounded to whole steps
pub fn polar_components(radius: f32, theta: f32) -> Result<Displacement, GeometryError> {
    if !radius.is_finite() || !theta.is_finite() {
        return Err(GeometryError::NonFinite);
    }
    Ok(Displacement::new(
        to_steps(roundf(radius * cosf(theta)))?,
        to_steps(roundf(radius * sinf(theta)))?,
    ))
}

/// Coordinated motion planner
///
/// Owns the step scheduler and the cumulative carriage position. The
/// position only changes once a move has been executed (fully, or up to
/// the point it was cancelled).
pub struct MotionPlanner<P, C> {
    scheduler: StepScheduler<P, C>,
    /// Maximum speed in RPM, set by `init`
    max_speed_rpm: Option<u32>,
    position: CarriagePosition,
    arc_increment_rad: f32,
    /// Displacement of the move currently in the scheduler
    pending: Option<Displacement>,
}

impl<P: OutputPin, C: Clock> MotionPlanner<P, C> {
    /// Create a planner at the origin
    pub fn new(scheduler: StepScheduler<P, C>) -> Self {
        Self {
            scheduler,
            max_speed_rpm: None,
            position: CarriagePosition::ORIGIN,
            arc_increment_rad: DEFAULT_ARC_INCREMENT_RAD,
            pending: None,
        }
    }

    /// Set both axes to `max_rpm`
    ///
    /// Both axes are validated before either is changed.
    pub fn init(&mut self, max_rpm: u32) -> Result<(), MotionError> {
        let x_steps = self.scheduler.x_axis().state().steps_per_revolution();
        let y_steps = self.scheduler.y_axis().state().steps_per_revolution();
        AxisState::delay_for_rpm(x_steps, max_rpm)?;
        AxisState::delay_for_rpm(y_steps, max_rpm)?;

        self.scheduler.set_x_speed(max_rpm)?;
        self.scheduler.set_y_speed(max_rpm)?;
        self.max_speed_rpm = Some(max_rpm);
        Ok(())
    }

    /// Current carriage position
    pub fn position(&self) -> CarriagePosition {
        self.position
    }

    /// Maximum speed, once initialised
    pub fn max_speed(&self) -> Option<u32> {
        self.max_speed_rpm
    }

    pub fn arc_increment(&self) -> f32 {
        self.arc_increment_rad
    }

    /// Set the angular step used to approximate arcs
    pub fn set_arc_increment(&mut self, radians: f32) -> Result<(), GeometryError> {
        if !radians.is_finite() {
            return Err(GeometryError::NonFinite);
        }
        if radians <= 0.0 {
            return Err(GeometryError::InvalidArc);
        }
        self.arc_increment_rad = radians;
        Ok(())
    }

    pub fn scheduler(&self) -> &StepScheduler<P, C> {
        &self.scheduler
    }

    /// Check if a submitted move is still executing
    pub fn is_busy(&self) -> bool {
        self.scheduler.is_busy()
    }

    /// Move X by `length` steps
    pub fn move_along_x(&mut self, length: i32) -> Result<MoveReport, MotionError> {
        self.move_by(Displacement::new(length, 0))
    }

    /// Move Y by `length` steps
    pub fn move_along_y(&mut self, length: i32) -> Result<MoveReport, MotionError> {
        self.move_by(Displacement::new(0, length))
    }

    /// Straight move by the vector from (x1, y1) to (x2, y2)
    ///
    /// The endpoints define a direction and length only; the move starts
    /// from wherever the carriage is.
    pub fn linear_to(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
    ) -> Result<MoveReport, MotionError> {
        let d = Displacement::between(CarriagePosition::new(x1, y1), CarriagePosition::new(x2, y2))?;
        self.move_by(d)
    }

    /// Straight move by a polar vector
    pub fn polar_to(&mut self, radius: f32, theta: f32) -> Result<MoveReport, MotionError> {
        let d = polar_components(radius, theta)?;
        self.move_by(d)
    }

    /// Arc of `radius` from `start_angle` to `end_angle`
    ///
    /// The carriage is taken to sit on the circle at `start_angle`. Returns
    /// the number of chords executed.
    pub fn circular_arc(
        &mut self,
        radius: f32,
        start_angle: f32,
        end_angle: f32,
    ) -> Result<u32, MotionError> {
        let cmd = MotionCommand::Arc {
            radius,
            start_angle,
            end_angle,
        };
        let mut chords = 0;
        for d in cmd.segments(self.position, self.arc_increment_rad)? {
            self.move_by(d?)?;
            chords += 1;
        }
        Ok(chords)
    }

    /// Run any command to completion, returning the final position
    pub fn execute(&mut self, cmd: MotionCommand) -> Result<CarriagePosition, MotionError> {
        if let MotionCommand::Init { max_rpm } = cmd {
            self.init(max_rpm)?;
            return Ok(self.position);
        }
        for d in cmd.segments(self.position, self.arc_increment_rad)? {
            self.move_by(d?)?;
        }
        Ok(self.position)
    }

    /// Start a straight move without waiting for it
    ///
    /// Drive it with [`poll`](Self::poll). A zero displacement is accepted
    /// and starts nothing.
    pub fn submit(&mut self, d: Displacement) -> Result<(), MotionError> {
        let max_rpm = self.max_speed_rpm.ok_or(MotionError::NotInitialized)?;
        if self.scheduler.is_busy() {
            return Err(MotionError::Busy);
        }
        self.position.offset(d)?;
        if d.is_zero() {
            return Ok(());
        }

        let speeds = coordinated_speeds(d, max_rpm)?;
        if let Some(rpm) = speeds.x_rpm {
            self.scheduler.set_x_speed(rpm)?;
        }
        if let Some(rpm) = speeds.y_rpm {
            self.scheduler.set_y_speed(rpm)?;
        }

        self.scheduler.begin(d.dy, d.dx)?;
        self.pending = Some(d);
        Ok(())
    }

    /// [`submit`](Self::submit) by a relative vector in steps
    pub fn submit_linear(&mut self, dx: i32, dy: i32) -> Result<(), MotionError> {
        self.submit(Displacement::new(dx, dy))
    }

    /// Advance the submitted move by one scheduler tick
    pub fn poll(&mut self) -> MoveProgress {
        let progress = self.scheduler.tick();
        if let MoveProgress::Complete(_) = progress {
            if let Some(d) = self.pending.take() {
                if let Ok(position) = self.position.offset(d) {
                    self.position = position;
                }
            }
        }
        progress
    }

    /// Abandon the submitted move
    ///
    /// The position advances by the steps actually taken. Returns the steps
    /// that were skipped, or `None` if nothing was running.
    pub fn cancel(&mut self) -> Option<StepCounts> {
        let remaining = self.scheduler.cancel()?;
        if let Some(d) = self.pending.take() {
            let taken = |delta: i32, left: u32| {
                (delta as i64 - delta.signum() as i64 * left as i64) as i32
            };
            let done = Displacement::new(taken(d.dx, remaining.x), taken(d.dy, remaining.y));
            if let Ok(position) = self.position.offset(done) {
                self.position = position;
            }
        }
        Some(remaining)
    }

    fn move_by(&mut self, d: Displacement) -> Result<MoveReport, MotionError> {
        self.submit(d)?;
        loop {
            match self.poll() {
                MoveProgress::Running { .. } => continue,
                MoveProgress::Complete(report) => return Ok(report),
                MoveProgress::Idle => {
                    return Ok(MoveReport::empty(self.scheduler.clock().now_millis()))
                }
            }
        }
    }
}
