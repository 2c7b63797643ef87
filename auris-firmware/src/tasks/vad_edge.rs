//! VAD edge watcher
//!
//! Plays the part of the VAD GPIO interrupt: on a falling edge it masks
//! itself and posts a [`EventKind::VadFallingEdge`] event. The VAD
//! controller unmasks it once the edge has been handled.

use defmt::*;
use embassy_rp::gpio::Input;
use embassy_time::Instant;
use portable_atomic::Ordering;

use auris_core::event::{EventKind, InterruptEvent};

use crate::channels::{EVENT_QUEUE, VAD_IRQ_ARM, VAD_IRQ_ENABLED};

/// Edge watcher task
///
/// Never logs inside the loop; it runs at interrupt priority.
#[embassy_executor::task]
pub async fn vad_edge_task(mut pin: Input<'static>) {
    info!("VAD edge watcher started");

    loop {
        if !VAD_IRQ_ENABLED.load(Ordering::Acquire) {
            VAD_IRQ_ARM.wait().await;
            continue;
        }

        pin.wait_for_falling_edge().await;

        // Disabled while we were waiting: drop the edge
        if !VAD_IRQ_ENABLED.swap(false, Ordering::AcqRel) {
            continue;
        }

        let event = InterruptEvent::new(EventKind::VadFallingEdge, Instant::now().as_millis());
        if EVENT_QUEUE.send(event).is_err() {
            // Nobody will re-arm a dropped edge; stay live for the next one
            VAD_IRQ_ENABLED.store(true, Ordering::Release);
        }
    }
}
