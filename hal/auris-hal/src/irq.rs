//! Edge interrupt line abstraction
//!
//! The VAD interrupt is level-sensitive on the coprocessor side, so the
//! handler disables its own line before deferring work. The deferred
//! handler re-enables it once the event has been consumed.

/// Falling-edge interrupt source that can be masked and re-armed
pub trait InterruptLine {
    /// Arm the line for the next falling edge
    fn enable_falling_edge(&mut self);

    /// Mask the line; pending edges are discarded
    fn disable(&mut self);

    /// Check whether the line is currently armed
    fn is_enabled(&self) -> bool;
}
