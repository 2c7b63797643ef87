//! One-shot timer abstraction

/// One-shot deadline timer
///
/// Expiry is delivered out of band (the firmware turns it into a bus
/// event), so the trait only covers arming.
pub trait OneShotTimer {
    /// Arm the timer to fire once after `ms` milliseconds
    ///
    /// Restarting an armed timer replaces the pending deadline.
    fn start(&mut self, ms: u32);

    /// Cancel any pending deadline
    fn stop(&mut self);
}
