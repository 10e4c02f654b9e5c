//! Tandem - Dual Stepper Motion Firmware
//!
//! Firmware binary for RP2040 boards driving two steppers straight from
//! GPIO. Axis wiring and speed limits come from `machine.toml`, embedded
//! at compile time.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use {defmt_rtt as _, panic_probe as _};

use tandem_core::axis::AxisStepper;
use tandem_core::commutation::Coils;
use tandem_core::config::{parse_config, AxisConfig, MachineConfig, MAX_COIL_PINS};
use tandem_core::motion::{MotionCommand, MotionPlanner, MotionStatus};
use tandem_core::scheduler::StepScheduler;
use tandem_core::ConfigError;
use tandem_hal_rp2040::{gpio_pins, CoilOutput, EmbassyClock, PinBank, PinError};

use crate::channels::{MOTION_CMD, MOTION_STATUS};
use crate::tasks::FirmwarePlanner;

mod channels;
mod tasks;

/// Embedded configuration (compiled into firmware)
/// Edit machine.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../machine.toml");

/// Failure while turning the configuration into hardware
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum SetupError {
    Pin(PinError),
    Config(ConfigError),
}

impl From<PinError> for SetupError {
    fn from(e: PinError) -> Self {
        SetupError::Pin(e)
    }
}

impl From<ConfigError> for SetupError {
    fn from(e: ConfigError) -> Self {
        SetupError::Config(e)
    }
}

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Tandem firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = load_config();
    let mut bank = PinBank::new(gpio_pins!(p));

    let mut planner = match build_planner(&mut bank, &config) {
        Ok(planner) => planner,
        Err(e) => {
            error!("Axis setup failed: {:?}", e);
            return;
        }
    };
    if let Err(e) = planner.set_arc_increment(config.arc_increment_rad()) {
        warn!("Ignoring arc increment: {:?}", e);
    }

    info!(
        "X: {} steps/rev, {}-wire; Y: {} steps/rev, {}-wire",
        config.x.steps_per_revolution,
        config.x.winding_width,
        config.y.steps_per_revolution,
        config.y.winding_width
    );

    spawner.spawn(unwrap!(tasks::motion_task(planner)));

    MOTION_CMD
        .send(MotionCommand::Init {
            max_rpm: config.max_speed_rpm,
        })
        .await;

    info!("Motion task spawned, firmware running");

    loop {
        match MOTION_STATUS.receive().await {
            MotionStatus::Failed(e) => warn!("Command failed: {:?}", e),
            status => debug!("Motion status: {:?}", status),
        }
    }
}

/// Parse the embedded machine.toml, falling back to defaults
fn load_config() -> MachineConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Parsed embedded configuration successfully");
            config
        }
        Err(e) => {
            // build.rs validates machine.toml, so this means the two checks disagree
            error!("Failed to parse embedded config: {:?}", e);
            warn!("Using default configuration");
            MachineConfig::default()
        }
    }
}

fn build_planner(
    bank: &mut PinBank,
    config: &MachineConfig,
) -> Result<FirmwarePlanner, SetupError> {
    let x = build_axis(bank, &config.x)?;
    let y = build_axis(bank, &config.y)?;
    Ok(MotionPlanner::new(StepScheduler::new(
        x,
        y,
        EmbassyClock::new(),
    )))
}

/// Claim an axis's coil pins and wrap them in a stepper
fn build_axis(
    bank: &mut PinBank,
    config: &AxisConfig,
) -> Result<AxisStepper<CoilOutput>, SetupError> {
    let winding = config.winding()?;
    let pins = config
        .pins
        .iter()
        .map(|pin| bank.take_coil(*pin))
        .collect::<Result<heapless::Vec<CoilOutput, MAX_COIL_PINS>, _>>()?;
    let coils = Coils::from_pins(winding, pins)?;
    Ok(AxisStepper::new(config.steps_per_revolution, coils)?)
}
