//! Interrupt event model
//!
//! Events are produced in interrupt context (or by tasks standing in for
//! one) and consumed by the bus worker. They are plain `Copy` values so a
//! producer never allocates or blocks.

/// Number of event kinds, including [`EventKind::Unknown`]
pub const EVENT_KIND_COUNT: usize = 4;

/// Kinds of event carried by the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum EventKind {
    /// Placeholder for invalid sources; never registrable
    Unknown = 0,
    /// Falling edge on the coprocessor VAD line
    VadFallingEdge = 1,
    /// VAD capture timer expired
    VadTimeout = 2,
    /// Operator command (shell, boot-time update request)
    Command = 3,
}

impl EventKind {
    /// Every kind, in index order
    pub const ALL: [EventKind; EVENT_KIND_COUNT] = [
        EventKind::Unknown,
        EventKind::VadFallingEdge,
        EventKind::VadTimeout,
        EventKind::Command,
    ];

    /// Dense index for table lookups
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Short stable name
    pub fn name(self) -> &'static str {
        match self {
            EventKind::Unknown => "UNKNOWN",
            EventKind::VadFallingEdge => "VAD_FALLING_EDGE",
            EventKind::VadTimeout => "VAD_TIMEOUT",
            EventKind::Command => "COMMAND",
        }
    }

    /// Human-readable description
    pub fn description(self) -> &'static str {
        match self {
            EventKind::Unknown => "Unknown or invalid interrupt",
            EventKind::VadFallingEdge => "VAD interrupt falling edge",
            EventKind::VadTimeout => "VAD timeout event (from timer callback)",
            EventKind::Command => "Operator command request",
        }
    }

    /// Whether a callback may be registered for this kind
    pub fn is_registrable(self) -> bool {
        !matches!(self, EventKind::Unknown)
    }

    /// Whether the producer masks its source before enqueueing
    ///
    /// Such a source stays masked until someone re-arms it, so the worker
    /// must do so when no callback is registered.
    pub fn masks_source(self) -> bool {
        matches!(self, EventKind::VadFallingEdge)
    }
}

/// A single interrupt event
///
/// Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterruptEvent {
    kind: EventKind,
    timestamp_ms: u64,
    data: Option<u32>,
}

impl InterruptEvent {
    pub const fn new(kind: EventKind, timestamp_ms: u64) -> Self {
        Self {
            kind,
            timestamp_ms,
            data: None,
        }
    }

    /// Build an event carrying a payload word
    pub const fn with_data(kind: EventKind, timestamp_ms: u64, data: u32) -> Self {
        Self {
            kind,
            timestamp_ms,
            data: Some(data),
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Monotonic uptime at which the event was produced
    pub fn timestamp_ms(&self) -> u64 {
        self.timestamp_ms
    }

    pub fn data(&self) -> Option<u32> {
        self.data
    }
}
