//! VAD capture session state machine
//!
//! The coprocessor pulls its VAD line low when it hears speech. The first
//! edge starts a capture session; further edges and voice-present timeouts
//! keep it alive; a timeout with the line idle ends it.
//!
//! This module only decides. The driver performs the hardware side effects
//! and reports back which of them succeeded.

/// Capture window restarted by every edge or voice-present timeout
pub const VAD_TIMEOUT_BASE_MS: i32 = 5000;

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VadState {
    /// No capture running
    Idle,
    /// Capture running; window length last armed
    Capturing { timeout_ms: i32 },
}

/// Side effect the driver should perform next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VadAction {
    /// Enable coprocessor I2S, start capture, arm the timer
    StartCapture,
    /// Restart the timer at the base window
    RestartTimer,
    /// Disable coprocessor I2S, stop capture
    StopCapture,
    /// Nothing to do
    Ignore,
}

/// Capture session bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VadSession {
    i2s_active: bool,
    timeout_ms: i32,
}

impl Default for VadSession {
    fn default() -> Self {
        Self::new()
    }
}

impl VadSession {
    pub const fn new() -> Self {
        Self {
            i2s_active: false,
            timeout_ms: 0,
        }
    }

    pub fn state(&self) -> VadState {
        if self.i2s_active {
            VadState::Capturing {
                timeout_ms: self.timeout_ms,
            }
        } else {
            VadState::Idle
        }
    }

    pub fn is_i2s_active(&self) -> bool {
        self.i2s_active
    }

    pub fn timeout_ms(&self) -> i32 {
        self.timeout_ms
    }

    /// Decide what a falling edge means
    pub fn on_falling_edge(&self) -> VadAction {
        if self.i2s_active {
            VadAction::RestartTimer
        } else {
            VadAction::StartCapture
        }
    }

    /// Decide what a timer expiry means
    ///
    /// `voice_present` is only sampled while a session is active. A timer
    /// expiry that races a session stop is ignored.
    pub fn on_timeout(&self, voice_present: impl FnOnce() -> bool) -> VadAction {
        if !self.i2s_active {
            return VadAction::Ignore;
        }
        if voice_present() {
            VadAction::RestartTimer
        } else {
            VadAction::StopCapture
        }
    }

    /// Record that capture started and the timer was armed
    pub fn capture_started(&mut self, window_ms: i32) {
        self.i2s_active = true;
        self.timeout_ms = window_ms;
    }

    /// Record that the timer was restarted
    ///
    /// The window is reset, not extended by the remainder.
    pub fn timer_restarted(&mut self, window_ms: i32) {
        if self.i2s_active {
            self.timeout_ms = window_ms;
        }
    }

    /// Record that capture stopped
    pub fn capture_stopped(&mut self) {
        self.i2s_active = false;
        self.timeout_ms = 0;
    }
}
