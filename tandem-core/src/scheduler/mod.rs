//! Two-axis step scheduler
//!
//! Runs one move at a time by polling both axes against a monotonic clock.
//! Concurrency is purely time-multiplexed: there is one flow of control and
//! no thread, interrupt or timer per axis.

pub mod executor;

pub use executor::{MoveProgress, MoveReport, StepCounts, StepScheduler};
