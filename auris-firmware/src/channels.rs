//! Inter-task communication channels
//!
//! The event queue is the only path from the interrupt-priority producers
//! to the bus worker. The signals carry control the other way: the worker
//! arms the edge watcher, starts and stops the VAD timer, and switches the
//! capture pipeline.

use auris_core::bus::EventQueue;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use portable_atomic::AtomicBool;

/// Interrupt events awaiting the bus worker
pub static EVENT_QUEUE: EventQueue<CriticalSectionRawMutex> = EventQueue::new();

/// VAD edge interrupt enabled; cleared by the watcher when it fires
pub static VAD_IRQ_ENABLED: AtomicBool = AtomicBool::new(false);

/// Wakes the edge watcher after the interrupt is re-enabled
pub static VAD_IRQ_ARM: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// VAD timer control
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum TimerCommand {
    /// (Re)start the one-shot with this window
    Start(u32),
    Stop,
}

/// Commands for the VAD timer task
pub static VAD_TIMER: Signal<CriticalSectionRawMutex, TimerCommand> = Signal::new();

/// Capture pipeline on/off requests
pub static CAPTURE_CMD: Signal<CriticalSectionRawMutex, bool> = Signal::new();
