//! Axis stepper: one motor's phase and timing state
//!
//! Stepping is a non-blocking probe. [`AxisStepper::try_advance`] is called
//! as often as the caller likes; it only moves the motor once the step
//! delay has elapsed since the previous step.
//!
//! ```text
//!          forward: +1 mod 4
//!   ┌───┐ ─────▶ ┌───┐ ─────▶ ┌───┐ ─────▶ ┌───┐
//!   │ 0 │        │ 1 │        │ 2 │        │ 3 │
//!   └───┘ ◀───── └───┘ ◀───── └───┘ ◀───── └───┘
//!          reverse: -1 mod 4       (3 ⇄ 0 wraps)
//! ```

use tandem_hal::OutputPin;

use crate::commutation::{Coils, Winding, PHASE_COUNT};
use crate::error::ConfigError;

/// Milliseconds per minute, numerator of the step delay formula
pub const MS_PER_MINUTE: u64 = 60_000;

/// Stepping direction of one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// Step index increments
    #[default]
    Forward,
    /// Step index decrements
    Reverse,
}

impl Direction {
    /// Get the opposite direction
    pub fn opposite(self) -> Self {
        match self {
            Direction::Forward => Direction::Reverse,
            Direction::Reverse => Direction::Forward,
        }
    }

    /// Direction for a signed step count, `None` for zero
    pub fn from_steps(steps: i32) -> Option<Self> {
        match steps {
            s if s > 0 => Some(Direction::Forward),
            s if s < 0 => Some(Direction::Reverse),
            _ => None,
        }
    }
}

/// Mutable per-motor state
///
/// Invariant: `step_index < steps_per_revolution`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisState {
    step_index: u32,
    direction: Direction,
    steps_per_revolution: u32,
    /// Milliseconds between steps, `None` until a speed is set
    step_delay_ms: Option<u64>,
    last_step_ms: u64,
}

impl AxisState {
    /// Create state for a motor with `steps_per_revolution` steps
    pub fn new(steps_per_revolution: u32) -> Result<Self, ConfigError> {
        if steps_per_revolution == 0 {
            return Err(ConfigError::InvalidStepsPerRevolution);
        }
        Ok(Self {
            step_index: 0,
            direction: Direction::Forward,
            steps_per_revolution,
            step_delay_ms: None,
            last_step_ms: 0,
        })
    }

    /// Step delay for `rpm`, truncating like the integer formula
    /// `60000 / steps_per_revolution / rpm`
    pub fn delay_for_rpm(steps_per_revolution: u32, rpm: u32) -> Result<u64, ConfigError> {
        if steps_per_revolution == 0 {
            return Err(ConfigError::InvalidStepsPerRevolution);
        }
        if rpm == 0 {
            return Err(ConfigError::InvalidSpeed);
        }
        match MS_PER_MINUTE / steps_per_revolution as u64 / rpm as u64 {
            0 => Err(ConfigError::SpeedTooHigh { rpm }),
            delay => Ok(delay),
        }
    }

    /// Move the step index one position in the current direction
    fn advance_index(&mut self) {
        self.step_index = match self.direction {
            Direction::Forward => {
                let next = self.step_index + 1;
                if next == self.steps_per_revolution {
                    0
                } else {
                    next
                }
            }
            Direction::Reverse => {
                if self.step_index == 0 {
                    self.steps_per_revolution - 1
                } else {
                    self.step_index - 1
                }
            }
        };
    }

    /// Current position within the revolution
    pub fn step_index(&self) -> u32 {
        self.step_index
    }

    /// Commutation phase (row of the table) for the current index
    pub fn phase(&self) -> usize {
        self.step_index as usize % PHASE_COUNT
    }

    /// Current direction
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Steps per full revolution
    pub fn steps_per_revolution(&self) -> u32 {
        self.steps_per_revolution
    }

    /// Milliseconds between steps, if a speed has been set
    pub fn step_delay_ms(&self) -> Option<u64> {
        self.step_delay_ms
    }

    /// Timestamp of the last step
    pub fn last_step_ms(&self) -> u64 {
        self.last_step_ms
    }
}

/// One motor: state plus the coil pins it drives
#[derive(Debug)]
pub struct AxisStepper<P> {
    state: AxisState,
    coils: Coils<P>,
}

impl<P: OutputPin> AxisStepper<P> {
    /// Create an axis stepper
    ///
    /// No pin is written until the first step.
    pub fn new(steps_per_revolution: u32, coils: Coils<P>) -> Result<Self, ConfigError> {
        Ok(Self {
            state: AxisState::new(steps_per_revolution)?,
            coils,
        })
    }

    /// Set speed in revolutions per minute
    ///
    /// On error the previous speed is kept and no pin is touched.
    pub fn set_speed(&mut self, rpm: u32) -> Result<(), ConfigError> {
        let delay = AxisState::delay_for_rpm(self.state.steps_per_revolution, rpm)?;
        self.state.step_delay_ms = Some(delay);
        Ok(())
    }

    /// Set stepping direction for subsequent advances
    pub fn set_direction(&mut self, direction: Direction) {
        self.state.direction = direction;
    }

    /// Check if a speed has been configured
    pub fn has_speed(&self) -> bool {
        self.state.step_delay_ms.is_some()
    }

    /// Step once if the step delay has elapsed
    ///
    /// Returns `true` if the motor advanced. Never blocks. Elapsed time uses
    /// wrapping arithmetic so a wrapped clock cannot stall the axis.
    pub fn try_advance(&mut self, now_ms: u64) -> bool {
        let Some(delay) = self.state.step_delay_ms else {
            return false;
        };
        if now_ms.wrapping_sub(self.state.last_step_ms) < delay {
            return false;
        }

        self.state.last_step_ms = now_ms;
        self.state.advance_index();
        self.coils.energize(self.state.phase());
        true
    }

    /// Read-only view of the axis state
    pub fn state(&self) -> &AxisState {
        &self.state
    }

    pub fn step_index(&self) -> u32 {
        self.state.step_index
    }

    pub fn direction(&self) -> Direction {
        self.state.direction
    }

    pub fn step_delay_ms(&self) -> Option<u64> {
        self.state.step_delay_ms
    }

    /// Coil wiring of this axis
    pub fn winding(&self) -> Winding {
        self.coils.winding()
    }

    /// Coil pins, in table column order
    pub fn pins(&self) -> &[P] {
        self.coils.pins()
    }
}
