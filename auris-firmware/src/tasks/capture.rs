//! Capture pipeline control
//!
//! The I2S receive and encode pipeline is outside this firmware; this
//! task is the point where it is switched on and off.

use defmt::*;

use crate::channels::CAPTURE_CMD;

/// Capture control task
#[embassy_executor::task]
pub async fn capture_task() {
    info!("Capture control task started");

    let mut running = false;
    loop {
        let on = CAPTURE_CMD.wait().await;
        if on == running {
            continue;
        }
        running = on;
        if on {
            info!("Capture pipeline started");
        } else {
            info!("Capture pipeline stopped");
        }
    }
}
