//! Bounded interrupt-safe event queue

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;
use portable_atomic::{AtomicBool, Ordering};

use super::BusError;
use crate::event::InterruptEvent;

/// Maximum number of pending events
pub const QUEUE_DEPTH: usize = 5;

/// Fixed-capacity FIFO between interrupt producers and the bus worker
///
/// Producers never block: a full queue drops the new event. The queue
/// refuses events until a worker has started it, so early interrupts
/// cannot pile up stale work.
pub struct EventQueue<M: RawMutex> {
    channel: Channel<M, InterruptEvent, QUEUE_DEPTH>,
    running: AtomicBool,
}

impl<M: RawMutex> Default for EventQueue<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex> EventQueue<M> {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
            running: AtomicBool::new(false),
        }
    }

    /// Mark the queue as accepting events
    ///
    /// Returns `false` if it was already running.
    pub fn start(&self) -> bool {
        !self.running.swap(true, Ordering::AcqRel)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Enqueue an event without blocking
    ///
    /// Safe to call from interrupt context. Does not log.
    pub fn send(&self, event: InterruptEvent) -> Result<(), BusError> {
        if !self.is_running() {
            return Err(BusError::NotRunning);
        }
        self.channel
            .try_send(event)
            .map_err(|_| BusError::QueueFull)
    }

    /// Number of events waiting for the worker
    pub fn pending(&self) -> usize {
        self.channel.len()
    }

    pub(crate) fn try_next(&self) -> Option<InterruptEvent> {
        self.channel.try_receive().ok()
    }

    pub(crate) async fn next(&self) -> InterruptEvent {
        self.channel.receive().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    fn edge(ts: u64) -> InterruptEvent {
        InterruptEvent::new(EventKind::VadFallingEdge, ts)
    }

    #[test]
    fn test_send_before_start_rejected() {
        let queue = EventQueue::<NoopRawMutex>::new();
        assert_eq!(queue.send(edge(0)), Err(BusError::NotRunning));
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn test_start_once() {
        let queue = EventQueue::<NoopRawMutex>::new();
        assert!(queue.start());
        assert!(!queue.start());
        assert!(queue.is_running());
    }

    #[test]
    fn test_sixth_event_dropped() {
        let queue = EventQueue::<NoopRawMutex>::new();
        queue.start();

        for ts in 0..QUEUE_DEPTH as u64 {
            assert_eq!(queue.send(edge(ts)), Ok(()));
        }
        assert_eq!(queue.send(edge(99)), Err(BusError::QueueFull));
        assert_eq!(queue.pending(), QUEUE_DEPTH);

        // The dropped event never shows up; the rest come out in order
        for ts in 0..QUEUE_DEPTH as u64 {
            assert_eq!(queue.try_next().map(|e| e.timestamp_ms()), Some(ts));
        }
        assert!(queue.try_next().is_none());
    }

    #[test]
    fn test_async_receive() {
        let queue = EventQueue::<NoopRawMutex>::new();
        queue.start();
        queue.send(edge(7)).unwrap();

        let event = embassy_futures::block_on(queue.next());
        assert_eq!(event.timestamp_ms(), 7);
    }
}
