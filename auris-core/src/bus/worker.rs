//! Deferred event dispatch

use embassy_sync::blocking_mutex::raw::RawMutex;

use super::{BusError, Callback, CallbackRegistry, EventQueue, Registration, RegistryEntry};
use crate::event::{EventKind, InterruptEvent};

/// State shared by every callback on the bus
pub trait BusContext {
    /// Re-arm a source that masked itself before enqueueing
    ///
    /// Called when an event of a [`EventKind::masks_source`] kind arrives
    /// with no callback registered, so the source does not stay dead.
    fn rearm_source(&mut self, kind: EventKind);
}

/// What the worker did with one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Dispatch {
    /// A registered callback ran
    Handled,
    /// No callback; the source was re-armed
    Rearmed,
    /// No callback; event dropped
    Unhandled,
}

/// The bus worker
///
/// Owns the callback registry and the context callbacks operate on.
/// Callbacks run one at a time, in queue order, never concurrently.
pub struct EventBus<'q, M: RawMutex, C> {
    queue: &'q EventQueue<M>,
    registry: CallbackRegistry<C>,
    context: C,
}

impl<'q, M: RawMutex, C: BusContext> EventBus<'q, M, C> {
    /// Create the worker and start accepting events on `queue`
    ///
    /// A queue has exactly one worker. A second call on a running queue
    /// changes nothing and fails with [`BusError::AlreadyRunning`].
    pub fn new(queue: &'q EventQueue<M>, context: C) -> Result<Self, BusError> {
        if !queue.start() {
            log_warn!("Event queue already running");
            return Err(BusError::AlreadyRunning);
        }
        Ok(Self {
            queue,
            registry: CallbackRegistry::new(),
            context,
        })
    }

    pub fn register(
        &mut self,
        kind: EventKind,
        callback: Callback<C>,
    ) -> Result<Registration, BusError> {
        self.registry.register(kind, callback)
    }

    pub fn unregister(
        &mut self,
        kind: EventKind,
        expected: Option<Callback<C>>,
    ) -> Result<(), BusError> {
        self.registry.unregister(kind, expected)
    }

    pub fn entry(&self, kind: EventKind) -> &RegistryEntry<C> {
        self.registry.entry(kind)
    }

    pub fn registry(&self) -> &CallbackRegistry<C> {
        &self.registry
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    /// Handle a single event
    pub fn dispatch(&mut self, event: &InterruptEvent) -> Dispatch {
        let kind = event.kind();
        if let Some(callback) = self.registry.get(kind) {
            callback(&mut self.context, event);
            return Dispatch::Handled;
        }

        if kind.masks_source() {
            log_debug!("No handler for {}, re-arming source", kind.name());
            self.context.rearm_source(kind);
            Dispatch::Rearmed
        } else {
            log_warn!("No handler for {}", kind.description());
            Dispatch::Unhandled
        }
    }

    /// Dispatch every event currently queued, returning how many ran
    pub fn drain(&mut self) -> usize {
        let mut count = 0;
        while let Some(event) = self.queue.try_next() {
            self.dispatch(&event);
            count += 1;
        }
        count
    }

    /// Worker loop; never returns
    pub async fn run(&mut self) {
        loop {
            let event = self.queue.next().await;
            self.dispatch(&event);
        }
    }
}
