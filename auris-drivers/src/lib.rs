//! Hardware driver implementations
//!
//! This crate drives the voice coprocessor through the traits defined in
//! auris-hal:
//!
//! - I2C transport and command set for the coprocessor
//! - Three-stage firmware update engine
//! - VAD capture controller
//! - The service context that wires them onto the event bus

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

// Logging shim: expands to defmt when enabled, to nothing otherwise
macro_rules! log_info {
    ($($arg:tt)*) => {
        #[cfg(feature = "defmt")]
        defmt::info!($($arg)*);
    };
}

macro_rules! log_warn {
    ($($arg:tt)*) => {
        #[cfg(feature = "defmt")]
        defmt::warn!($($arg)*);
    };
}

macro_rules! log_error {
    ($($arg:tt)*) => {
        #[cfg(feature = "defmt")]
        defmt::error!($($arg)*);
    };
}

macro_rules! log_debug {
    ($($arg:tt)*) => {
        #[cfg(feature = "defmt")]
        defmt::debug!($($arg)*);
    };
}

pub mod coproc;
pub mod service;
pub mod vad;

#[cfg(test)]
mod sim;
