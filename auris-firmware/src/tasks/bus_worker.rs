//! Bus worker task
//!
//! Drains the event queue one event at a time and runs the registered
//! callback. Blocking coprocessor traffic (including a full update) runs
//! here; the interrupt-priority producers keep running underneath it.

use defmt::*;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use auris_core::bus::EventBus;
use auris_core::command::CommandOutcome;
use auris_drivers::service::{OutcomeSink, VoiceService};

use crate::board::AurisBoard;

/// Command results go to the defmt log
pub struct LogOutcomes;

impl OutcomeSink for LogOutcomes {
    fn publish(&mut self, outcome: CommandOutcome) {
        if outcome.is_success() {
            info!("Command result: {}", outcome);
        } else {
            warn!("Command result: {}", outcome);
        }
    }
}

pub type Service = VoiceService<'static, AurisBoard, LogOutcomes>;

pub type VoiceBus = EventBus<'static, CriticalSectionRawMutex, Service>;

/// Bus worker task
#[embassy_executor::task]
pub async fn bus_worker_task(mut bus: VoiceBus) {
    info!("Bus worker started");
    bus.run().await;
}
