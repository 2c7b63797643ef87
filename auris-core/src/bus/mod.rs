//! Interrupt event bus
//!
//! Interrupt handlers must not touch the I2C bus, the capture pipeline or
//! anything else that can block. They push an [`InterruptEvent`] into the
//! [`EventQueue`] and return; a single worker task drains the queue and
//! runs the registered callback for each event, in arrival order.
//!
//! ```text
//!  ISR / timer ──try_send──► EventQueue (depth 5) ──► EventBus::run
//!                                                        │
//!                                     CallbackRegistry ◄─┘ lookup by kind
//! ```
//!
//! [`InterruptEvent`]: crate::event::InterruptEvent

mod queue;
mod registry;
mod worker;

pub use queue::{EventQueue, QUEUE_DEPTH};
pub use registry::{Callback, CallbackRegistry, Registration, RegistryEntry};
pub use worker::{BusContext, Dispatch, EventBus};

/// Event bus errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError {
    /// Queue has not been started by a bus worker
    NotRunning,
    /// A bus worker already owns the queue
    AlreadyRunning,
    /// Queue is full; the event was dropped
    QueueFull,
    /// Kind cannot carry a callback
    InvalidKind,
    /// No callback is registered for the kind
    NotRegistered,
    /// A different callback is registered for the kind
    CallbackMismatch,
}

impl BusError {
    pub fn reason(&self) -> &'static str {
        match self {
            BusError::NotRunning => "event bus not running",
            BusError::AlreadyRunning => "event bus already running",
            BusError::QueueFull => "event queue full",
            BusError::InvalidKind => "event kind not registrable",
            BusError::NotRegistered => "no callback registered",
            BusError::CallbackMismatch => "callback does not match registration",
        }
    }
}
