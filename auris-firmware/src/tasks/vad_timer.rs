//! VAD window timer
//!
//! One-shot timer driven by [`TimerCommand`]s from the bus worker. A
//! restart replaces the running deadline. Expiry posts a
//! [`EventKind::VadTimeout`] event.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Instant, Timer};

use auris_core::event::{EventKind, InterruptEvent};

use crate::channels::{TimerCommand, EVENT_QUEUE, VAD_TIMER};

/// Retry interval when the expiry could not be queued
///
/// A full queue does not drop the expiry: a lost timeout would leave the
/// capture session open until the next voice edge, so it is re-posted.
const EXPIRY_RETRY_MS: u64 = 10;

/// VAD timer task
#[embassy_executor::task]
pub async fn vad_timer_task() {
    info!("VAD timer task started");

    let mut deadline: Option<Instant> = None;

    loop {
        let command = match deadline {
            Some(at) => match select(Timer::at(at), VAD_TIMER.wait()).await {
                Either::First(()) => {
                    let event = InterruptEvent::new(EventKind::VadTimeout, Instant::now().as_millis());
                    deadline = match EVENT_QUEUE.send(event) {
                        Ok(()) => None,
                        // Queue full: post again shortly
                        Err(_) => Some(Instant::now() + Duration::from_millis(EXPIRY_RETRY_MS)),
                    };
                    continue;
                }
                Either::Second(command) => command,
            },
            None => VAD_TIMER.wait().await,
        };

        deadline = match command {
            TimerCommand::Start(ms) => Some(Instant::now() + Duration::from_millis(u64::from(ms))),
            TimerCommand::Stop => None,
        };
    }
}
