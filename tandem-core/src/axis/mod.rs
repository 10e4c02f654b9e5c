//! Single-axis stepping
//!
//! One [`AxisStepper`] per motor: phase position, direction and step
//! timing, plus the coil pins it exclusively owns.

pub mod stepper;

pub use stepper::{AxisState, AxisStepper, Direction, MS_PER_MINUTE};
