//! Board-agnostic core logic for the voice coprocessor firmware
//!
//! This crate contains all logic that does not touch hardware:
//!
//! - Interrupt event model and the deferred-dispatch event bus
//! - VAD capture session state machine
//! - Boot image and firmware image layout
//! - Operator commands carried over the bus
//! - Configuration types and the embedded config parser

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

// Logging shim: expands to defmt when enabled, to nothing otherwise
macro_rules! log_warn {
    ($($arg:tt)*) => {
        #[cfg(feature = "defmt")]
        defmt::warn!($($arg)*);
    };
}

macro_rules! log_debug {
    ($($arg:tt)*) => {
        #[cfg(feature = "defmt")]
        defmt::debug!($($arg)*);
    };
}

pub mod bus;
pub mod command;
pub mod config;
pub mod event;
pub mod image;
pub mod vad;
