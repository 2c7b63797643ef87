//! Local audio capture pipeline control
//!
//! The capture pipeline itself (I2S receiver, buffering, streaming) lives
//! outside this workspace. Drivers only switch it on and off.

/// Capture control errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CaptureError {
    /// Pipeline has not been initialised yet
    NotReady,
    /// Pipeline refused the request
    Rejected,
}

impl CaptureError {
    pub fn reason(&self) -> &'static str {
        match self {
            CaptureError::NotReady => "capture pipeline not ready",
            CaptureError::Rejected => "capture pipeline rejected request",
        }
    }
}

/// Switch for the local voice capture pipeline
pub trait CaptureControl {
    /// Start receiving audio from the coprocessor
    fn start(&mut self) -> Result<(), CaptureError>;

    /// Stop receiving audio
    fn stop(&mut self) -> Result<(), CaptureError>;

    /// Check whether capture is running
    fn is_running(&self) -> bool;
}
