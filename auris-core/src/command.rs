//! Operator commands
//!
//! Commands arrive from the debug shell or the boot sequence. They are
//! posted to the event bus like interrupts so that every blocking I2C
//! transaction runs on the single bus worker.
//!
//! # Encoding
//!
//! A command travels as the `data` word of an [`EventKind::Command`]
//! event: opcode in bits 0-7, argument in bits 8-15.

use crate::event::{EventKind, InterruptEvent};
use crate::image::Version;

/// Operator-issued coprocessor command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperatorCommand {
    /// Read the running firmware version
    Version,
    /// Power-cycle the coprocessor
    Reset,
    /// Run the bootloader handshake
    Handshake,
    /// Enable coprocessor I2S output
    EnableI2s,
    /// Disable coprocessor I2S output
    DisableI2s,
    /// Query microphone health
    MicState,
    /// Reset, handshake and enable I2S
    StartI2s,
    /// Flash the catalog entry at this index
    Update(u8),
}

impl OperatorCommand {
    const OP_VERSION: u8 = 0x01;
    const OP_RESET: u8 = 0x02;
    const OP_HANDSHAKE: u8 = 0x03;
    const OP_ENABLE_I2S: u8 = 0x04;
    const OP_DISABLE_I2S: u8 = 0x05;
    const OP_MIC_STATE: u8 = 0x06;
    const OP_START_I2S: u8 = 0x07;
    const OP_UPDATE: u8 = 0x08;

    pub fn encode(self) -> u32 {
        let (op, arg) = match self {
            OperatorCommand::Version => (Self::OP_VERSION, 0),
            OperatorCommand::Reset => (Self::OP_RESET, 0),
            OperatorCommand::Handshake => (Self::OP_HANDSHAKE, 0),
            OperatorCommand::EnableI2s => (Self::OP_ENABLE_I2S, 0),
            OperatorCommand::DisableI2s => (Self::OP_DISABLE_I2S, 0),
            OperatorCommand::MicState => (Self::OP_MIC_STATE, 0),
            OperatorCommand::StartI2s => (Self::OP_START_I2S, 0),
            OperatorCommand::Update(index) => (Self::OP_UPDATE, index),
        };
        u32::from(op) | (u32::from(arg) << 8)
    }

    pub fn decode(word: u32) -> Option<Self> {
        let op = (word & 0xFF) as u8;
        let arg = ((word >> 8) & 0xFF) as u8;
        let cmd = match op {
            Self::OP_VERSION => OperatorCommand::Version,
            Self::OP_RESET => OperatorCommand::Reset,
            Self::OP_HANDSHAKE => OperatorCommand::Handshake,
            Self::OP_ENABLE_I2S => OperatorCommand::EnableI2s,
            Self::OP_DISABLE_I2S => OperatorCommand::DisableI2s,
            Self::OP_MIC_STATE => OperatorCommand::MicState,
            Self::OP_START_I2S => OperatorCommand::StartI2s,
            Self::OP_UPDATE => OperatorCommand::Update(arg),
            _ => return None,
        };
        Some(cmd)
    }

    /// Wrap the command in a bus event
    pub fn to_event(self, timestamp_ms: u64) -> InterruptEvent {
        InterruptEvent::with_data(EventKind::Command, timestamp_ms, self.encode())
    }

    /// Recover a command from a bus event
    pub fn from_event(event: &InterruptEvent) -> Option<Self> {
        if event.kind() != EventKind::Command {
            return None;
        }
        event.data().and_then(Self::decode)
    }
}

/// Microphone health reported by the coprocessor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MicState {
    Abnormal,
    Normal,
    /// Any other status byte
    Unknown(u8),
}

impl From<u8> for MicState {
    fn from(raw: u8) -> Self {
        match raw {
            0 => MicState::Abnormal,
            1 => MicState::Normal,
            other => MicState::Unknown(other),
        }
    }
}

/// How an update attempt ended without error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UpdateOutcome {
    /// Version check said no update was needed
    UpToDate { remote: Version },
    /// All three stages completed
    Flashed { previous: Version },
}

/// Result of an operator command, published after it runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandOutcome {
    Version(Version),
    Reset,
    Handshake,
    I2sEnabled,
    I2sDisabled,
    MicState(MicState),
    I2sStarted,
    Update(UpdateOutcome),
    /// The command failed; human-readable reason
    Failed {
        command: OperatorCommand,
        reason: &'static str,
    },
    /// The event did not carry a valid command
    Malformed,
}

impl CommandOutcome {
    pub fn failed(command: OperatorCommand, reason: &'static str) -> Self {
        CommandOutcome::Failed { command, reason }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, CommandOutcome::Failed { .. } | CommandOutcome::Malformed)
    }
}
