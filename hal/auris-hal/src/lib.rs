//! Auris Hardware Abstraction Layer
//!
//! This crate defines the hardware seams the voice pipeline is written
//! against. Board crates provide implementations; host tests provide
//! recording fakes. The same driver code runs against both.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (auris-firmware)           │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  auris-drivers (coprocessor, VAD)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  auris-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ embedded-hal  │       │ embassy tasks │
//! │  adapters     │       │  (firmware)   │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Digital I/O
//! - [`i2c::I2cBus`] - I2C bus operations
//! - [`irq::InterruptLine`] - Edge interrupt that disables itself on fire
//! - [`timer::OneShotTimer`] - Re-armable one-shot deadline
//! - [`capture::CaptureControl`] - Local audio capture pipeline

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod capture;
pub mod gpio;
pub mod i2c;
pub mod irq;
pub mod timer;

// Re-export key traits at crate root for convenience
pub use capture::{CaptureControl, CaptureError};
pub use gpio::{EhInput, EhOutput, InputPin, OutputPin};
pub use i2c::{EhI2c, I2cBus, I2cError};
pub use irq::InterruptLine;
pub use timer::OneShotTimer;
