//! Move execution
//!
//! A move is a pair of signed step counts. Each count's sign selects its
//! axis direction, and its magnitude is consumed one step at a time as the
//! axis's delay elapses.
//!
//! Two ways to drive it:
//!
//! - [`StepScheduler::run_move`] occupies the caller until both counts are
//!   exhausted. It polls, it never sleeps.
//! - [`StepScheduler::begin`] + [`StepScheduler::tick`] let an external
//!   scheduler (an async task, a timer interrupt) advance the move a little
//!   at a time and [`StepScheduler::cancel`] it between ticks.
//!
//! Argument order is Y first, then X, for both entry points.

use tandem_hal::{Clock, OutputPin};

use crate::axis::{AxisStepper, Direction};
use crate::error::{ConfigError, MotionError};

/// Unsigned per-axis step counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepCounts {
    pub x: u32,
    pub y: u32,
}

impl StepCounts {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Check if both counts are exhausted
    pub fn is_zero(&self) -> bool {
        self.x == 0 && self.y == 0
    }
}

/// Timing summary of a finished move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MoveReport {
    /// Steps taken on each axis
    pub steps: StepCounts,
    /// Clock reading when the move began
    pub started_ms: u64,
    /// Clock reading of the last X step (`started_ms` if X did not move)
    pub x_finished_ms: u64,
    /// Clock reading of the last Y step (`started_ms` if Y did not move)
    pub y_finished_ms: u64,
}

impl MoveReport {
    /// Report for a move with no steps
    pub const fn empty(at_ms: u64) -> Self {
        Self {
            steps: StepCounts::new(0, 0),
            started_ms: at_ms,
            x_finished_ms: at_ms,
            y_finished_ms: at_ms,
        }
    }

    /// Time from start until both axes were done
    pub fn elapsed_ms(&self) -> u64 {
        self.x_finished_ms
            .max(self.y_finished_ms)
            .wrapping_sub(self.started_ms)
    }

    /// Gap between the two axes' finishing times
    pub fn finish_skew_ms(&self) -> u64 {
        self.x_finished_ms.abs_diff(self.y_finished_ms)
    }
}

/// Result of one scheduler tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MoveProgress {
    /// No move is active
    Idle,
    /// Move in progress
    Running {
        /// Steps still to take
        remaining: StepCounts,
    },
    /// The move finished on this tick
    Complete(MoveReport),
}

/// Bookkeeping for the move being executed
#[derive(Debug, Clone, Copy)]
struct ActiveMove {
    total: StepCounts,
    remaining: StepCounts,
    started_ms: u64,
    x_finished_ms: u64,
    y_finished_ms: u64,
}

/// Drives both axes of one move to completion
pub struct StepScheduler<P, C> {
    x: AxisStepper<P>,
    y: AxisStepper<P>,
    clock: C,
    active: Option<ActiveMove>,
}

impl<P: OutputPin, C: Clock> StepScheduler<P, C> {
    /// Create a scheduler owning both axes and the clock
    pub fn new(x: AxisStepper<P>, y: AxisStepper<P>, clock: C) -> Self {
        Self {
            x,
            y,
            clock,
            active: None,
        }
    }

    /// Set X axis speed in RPM
    pub fn set_x_speed(&mut self, rpm: u32) -> Result<(), ConfigError> {
        self.x.set_speed(rpm)
    }

    /// Set Y axis speed in RPM
    pub fn set_y_speed(&mut self, rpm: u32) -> Result<(), ConfigError> {
        self.y.set_speed(rpm)
    }

    pub fn x_axis(&self) -> &AxisStepper<P> {
        &self.x
    }

    pub fn y_axis(&self) -> &AxisStepper<P> {
        &self.y
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Check if a move is in progress
    pub fn is_busy(&self) -> bool {
        self.active.is_some()
    }

    /// Steps left in the active move
    pub fn remaining(&self) -> Option<StepCounts> {
        self.active.map(|m| m.remaining)
    }

    /// Start a move without executing any step
    ///
    /// Only one move may be active. A zero count leaves that axis idle and
    /// its direction untouched; a move that is zero on both axes never
    /// becomes active.
    pub fn begin(&mut self, y_steps: i32, x_steps: i32) -> Result<(), MotionError> {
        if self.active.is_some() {
            return Err(MotionError::Busy);
        }
        if (y_steps != 0 && !self.y.has_speed()) || (x_steps != 0 && !self.x.has_speed()) {
            return Err(MotionError::NotInitialized);
        }

        let total = StepCounts::new(x_steps.unsigned_abs(), y_steps.unsigned_abs());
        if total.is_zero() {
            return Ok(());
        }

        if let Some(dir) = Direction::from_steps(y_steps) {
            self.y.set_direction(dir);
        }
        if let Some(dir) = Direction::from_steps(x_steps) {
            self.x.set_direction(dir);
        }

        let now = self.clock.now_millis();
        self.active = Some(ActiveMove {
            total,
            remaining: total,
            started_ms: now,
            x_finished_ms: now,
            y_finished_ms: now,
        });
        Ok(())
    }

    /// Poll both axes once
    ///
    /// Each axis with steps left gets one [`AxisStepper::try_advance`]
    /// probe, so at most one step per axis is taken per tick.
    pub fn tick(&mut self) -> MoveProgress {
        let Some(mut mv) = self.active else {
            return MoveProgress::Idle;
        };

        let now = self.clock.now_millis();

        if mv.remaining.y > 0 && self.y.try_advance(now) {
            mv.remaining.y -= 1;
            mv.y_finished_ms = now;
        }
        if mv.remaining.x > 0 && self.x.try_advance(now) {
            mv.remaining.x -= 1;
            mv.x_finished_ms = now;
        }

        if mv.remaining.is_zero() {
            self.active = None;
            MoveProgress::Complete(MoveReport {
                steps: mv.total,
                started_ms: mv.started_ms,
                x_finished_ms: mv.x_finished_ms,
                y_finished_ms: mv.y_finished_ms,
            })
        } else {
            self.active = Some(mv);
            MoveProgress::Running {
                remaining: mv.remaining,
            }
        }
    }

    /// Abandon the active move, returning the steps that were not taken
    ///
    /// Pins keep their last levels; the axes hold position.
    pub fn cancel(&mut self) -> Option<StepCounts> {
        self.active.take().map(|m| m.remaining)
    }

    /// Execute a move to completion
    ///
    /// Blocks the caller by polling until both counts reach zero. There is
    /// no timeout: an unpowered or stalled motor is not observable.
    pub fn run_move(&mut self, y_steps: i32, x_steps: i32) -> Result<MoveReport, MotionError> {
        self.begin(y_steps, x_steps)?;
        loop {
            match self.tick() {
                MoveProgress::Running { .. } => continue,
                MoveProgress::Complete(report) => return Ok(report),
                MoveProgress::Idle => return Ok(MoveReport::empty(self.clock.now_millis())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commutation::{Coils, Winding};
    use crate::test_utils::{MockClock, MockPin, PinLog};

    fn scheduler(log: &PinLog, clock: MockClock) -> StepScheduler<MockPin, MockClock> {
        let x = AxisStepper::new(
            200,
            Coils::from_pins(Winding::FourWire, log.pins(4)).unwrap(),
        )
        .unwrap();
        let y = AxisStepper::new(
            200,
            Coils::from_pins(Winding::FourWire, log.pins(4)).unwrap(),
        )
        .unwrap();
        StepScheduler::new(x, y, clock)
    }

    #[test]
    fn test_zero_move_returns_immediately() {
        let log = PinLog::new();
        let mut s = scheduler(&log, MockClock::new(0, 1));
        s.set_x_speed(60).unwrap();
        s.set_y_speed(60).unwrap();

        let report = s.run_move(0, 0).unwrap();
        assert_eq!(report.steps, StepCounts::new(0, 0));
        assert_eq!(log.write_count(), 0);
        assert!(!s.is_busy());
    }

    #[test]
    fn test_zero_move_without_speed_is_fine() {
        let log = PinLog::new();
        let mut s = scheduler(&log, MockClock::new(0, 1));
        assert!(s.run_move(0, 0).is_ok());
    }

    #[test]
    fn test_move_without_speed_rejected() {
        let log = PinLog::new();
        let mut s = scheduler(&log, MockClock::new(0, 1));
        s.set_x_speed(60).unwrap();
        assert_eq!(s.run_move(3, 0), Err(MotionError::NotInitialized));
        assert_eq!(log.write_count(), 0);
    }

    #[test]
    fn test_counts_exhausted_exactly() {
        let log = PinLog::new();
        let mut s = scheduler(&log, MockClock::new(0, 1));
        s.set_x_speed(60).unwrap();
        s.set_y_speed(30).unwrap();

        let report = s.run_move(-7, 12).unwrap();
        assert_eq!(report.steps, StepCounts::new(12, 7));
        assert_eq!(s.x_axis().step_index(), 12);
        assert_eq!(s.y_axis().step_index(), 200 - 7);
        assert_eq!(s.x_axis().direction(), Direction::Forward);
        assert_eq!(s.y_axis().direction(), Direction::Reverse);
        // 4 pin writes per step
        assert_eq!(log.write_count(), (12 + 7) * 4);
    }

    #[test]
    fn test_single_axis_move_leaves_other_idle() {
        let log = PinLog::new();
        let mut s = scheduler(&log, MockClock::new(0, 1));
        s.set_x_speed(60).unwrap();
        s.set_y_speed(60).unwrap();

        let report = s.run_move(0, 10).unwrap();
        assert_eq!(report.steps, StepCounts::new(10, 0));
        assert_eq!(s.y_axis().step_index(), 0);
        assert_eq!(report.y_finished_ms, report.started_ms);
        // Y pins are ids 4..8
        assert!(log.writes().iter().all(|(id, _)| *id < 4));
    }

    #[test]
    fn test_zero_count_keeps_direction() {
        let log = PinLog::new();
        let mut s = scheduler(&log, MockClock::new(0, 1));
        s.set_x_speed(60).unwrap();
        s.set_y_speed(60).unwrap();

        s.run_move(-2, 0).unwrap();
        s.run_move(0, 3).unwrap();
        assert_eq!(s.y_axis().direction(), Direction::Reverse);
    }

    #[test]
    fn test_axes_interleave() {
        let log = PinLog::new();
        let clock = MockClock::manual(0);
        let mut s = scheduler(&log, clock.clone());
        s.set_x_speed(60).unwrap(); // 5 ms
        s.set_y_speed(30).unwrap(); // 10 ms

        s.begin(2, 4).unwrap();
        let mut finished = None;
        for t in 1..=40 {
            clock.set(t);
            if let MoveProgress::Complete(report) = s.tick() {
                finished = Some(report);
                break;
            }
        }

        let report = finished.unwrap();
        assert_eq!(report.x_finished_ms, 20);
        assert_eq!(report.y_finished_ms, 20);
    }

    #[test]
    fn test_begin_while_busy_rejected() {
        let log = PinLog::new();
        let mut s = scheduler(&log, MockClock::manual(0));
        s.set_x_speed(60).unwrap();
        s.set_y_speed(60).unwrap();

        s.begin(5, 5).unwrap();
        assert!(s.is_busy());
        assert_eq!(s.begin(1, 1), Err(MotionError::Busy));
        assert_eq!(s.run_move(1, 1), Err(MotionError::Busy));
    }

    #[test]
    fn test_cancel_reports_remaining() {
        let log = PinLog::new();
        let clock = MockClock::manual(0);
        let mut s = scheduler(&log, clock.clone());
        s.set_x_speed(60).unwrap();
        s.set_y_speed(60).unwrap();

        s.begin(5, -5).unwrap();
        clock.set(5);
        assert_eq!(
            s.tick(),
            MoveProgress::Running {
                remaining: StepCounts::new(4, 4)
            }
        );

        assert_eq!(s.cancel(), Some(StepCounts::new(4, 4)));
        assert!(!s.is_busy());
        assert_eq!(s.tick(), MoveProgress::Idle);
        assert_eq!(s.cancel(), None);
    }

    #[test]
    fn test_tick_without_move_is_idle() {
        let log = PinLog::new();
        let mut s = scheduler(&log, MockClock::manual(0));
        assert_eq!(s.tick(), MoveProgress::Idle);
        assert_eq!(s.remaining(), None);
    }
}
