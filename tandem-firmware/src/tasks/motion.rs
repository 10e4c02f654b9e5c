//! Motion task
//!
//! Owns the planner and both axes. Commands are split into straight
//! segments; each segment is submitted to the planner and advanced once per
//! millisecond tick, so a cancel request is seen between any two steps.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Ticker};

use tandem_core::motion::{MotionCommand, MotionPlanner, MotionStatus};
use tandem_core::scheduler::MoveProgress;
use tandem_core::MotionError;
use tandem_hal_rp2040::{CoilOutput, EmbassyClock};

use crate::channels::{MOTION_CANCEL, MOTION_CMD, MOTION_STATUS};

/// Scheduler tick interval, matches the 1 ms step delay resolution
const TICK_INTERVAL_MS: u64 = 1;

/// Planner type driven by the firmware
pub type FirmwarePlanner = MotionPlanner<CoilOutput, EmbassyClock>;

/// Motion task - executes commands one at a time
#[embassy_executor::task]
pub async fn motion_task(mut planner: FirmwarePlanner) {
    info!("Motion task started");

    loop {
        let cmd = MOTION_CMD.receive().await;
        debug!("Motion command: {:?}", cmd);

        // Stale cancel from an earlier command
        MOTION_CANCEL.reset();

        let status = execute(&mut planner, cmd).await;
        MOTION_STATUS.send(status).await;
    }
}

async fn execute(planner: &mut FirmwarePlanner, cmd: MotionCommand) -> MotionStatus {
    if let MotionCommand::Init { max_rpm } = cmd {
        return match planner.init(max_rpm) {
            Ok(()) => {
                info!("Axes set to {} rpm", max_rpm);
                MotionStatus::Ready
            }
            Err(e) => {
                error!("Init failed: {:?}", e);
                MotionStatus::Failed(e)
            }
        };
    }

    let segments = match cmd.segments(planner.position(), planner.arc_increment()) {
        Ok(segments) => segments,
        Err(e) => {
            error!("Rejected {:?}: {:?}", cmd, e);
            return MotionStatus::Failed(e.into());
        }
    };

    let mut ticker = Ticker::every(Duration::from_millis(TICK_INTERVAL_MS));

    for segment in segments {
        let submitted = segment
            .map_err(MotionError::from)
            .and_then(|d| planner.submit(d));
        if let Err(e) = submitted {
            error!("Segment failed: {:?}", e);
            return MotionStatus::Failed(e);
        }

        while planner.is_busy() {
            match select(MOTION_CANCEL.wait(), ticker.next()).await {
                Either::First(()) => {
                    if let Some(skipped) = planner.cancel() {
                        warn!("Move cancelled, skipped {:?}", skipped);
                    }
                    return MotionStatus::Cancelled(planner.position());
                }
                Either::Second(()) => match planner.poll() {
                    MoveProgress::Running { remaining } => trace!("Remaining {:?}", remaining),
                    MoveProgress::Complete(report) => {
                        trace!("Segment done in {} ms", report.elapsed_ms())
                    }
                    MoveProgress::Idle => {}
                },
            }
        }
    }

    let position = planner.position();
    info!("Move complete at ({}, {})", position.x, position.y);
    MotionStatus::Complete(position)
}
