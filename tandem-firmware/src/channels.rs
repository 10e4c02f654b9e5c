//! Inter-task communication channels
//!
//! Static embassy-sync primitives connecting whoever issues motion
//! commands with the motion task.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use tandem_core::motion::{MotionCommand, MotionStatus};

/// Queued commands waiting for the motion task
const COMMAND_QUEUE_SIZE: usize = 8;

/// Status reports not yet read
const STATUS_QUEUE_SIZE: usize = 8;

/// Commands for the motion task, executed in order
pub static MOTION_CMD: Channel<CriticalSectionRawMutex, MotionCommand, COMMAND_QUEUE_SIZE> =
    Channel::new();

/// One status per command, in the same order
pub static MOTION_STATUS: Channel<CriticalSectionRawMutex, MotionStatus, STATUS_QUEUE_SIZE> =
    Channel::new();

/// Abandon the command currently executing
///
/// A signal raised while the task is idle is discarded when the next
/// command starts.
pub static MOTION_CANCEL: Signal<CriticalSectionRawMutex, ()> = Signal::new();
