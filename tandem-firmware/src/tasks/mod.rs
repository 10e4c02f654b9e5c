//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod motion;

pub use motion::{motion_task, FirmwarePlanner};
