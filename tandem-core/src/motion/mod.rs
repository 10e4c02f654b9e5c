//! Motion planning
//!
//! Turns geometric moves (single axis, straight segment, polar vector,
//! circular arc) into per-axis step counts and speeds, and keeps the
//! cumulative carriage position.

pub mod arc;
pub mod command;
pub mod planner;
pub mod position;

pub use arc::{chord_increment, ArcPath, MAX_ARC_SEGMENTS};
pub use command::{MotionCommand, MotionStatus, Segments};
pub use planner::{
    coordinated_speeds, polar_components, AxisSpeeds, MotionPlanner, DEFAULT_ARC_INCREMENT_RAD,
};
pub use position::{CarriagePosition, Displacement};
