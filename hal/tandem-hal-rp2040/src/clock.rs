//! Monotonic clock from the embassy time driver

use embassy_time::Instant;
use tandem_hal::Clock;

/// [`Clock`] reading milliseconds since boot
///
/// The RP2040 timer is 64 bits wide at 1 MHz, so it does not wrap in the
/// lifetime of the device.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl EmbassyClock {
    pub const fn new() -> Self {
        Self
    }
}

impl Clock for EmbassyClock {
    fn now_millis(&self) -> u64 {
        Instant::now().as_millis()
    }
}
