//! Coprocessor bus addresses, registers and protocol bytes

/// Command register map (command address)
pub mod reg {
    /// Command trigger register
    pub const CONTROL: u8 = 0xC4;
    /// Status / mic state / handshake reply
    pub const STATUS: u8 = 0xA0;
    /// Bootloader progress reply
    pub const PROGRESS: u8 = 0xA4;
    /// Version bytes, most significant first
    pub const VERSION: [u8; 4] = [0xA0, 0xA4, 0xA8, 0xAC];
}

/// Values written to [`reg::CONTROL`]
pub mod cmd {
    /// Latch the firmware version into the version registers
    pub const QUERY_VERSION: u8 = 0x68;
    /// Latch microphone health into the status register
    pub const QUERY_MIC_STATE: u8 = 0x70;
    pub const ENABLE_I2S: u8 = 0x71;
    pub const DISABLE_I2S: u8 = 0x72;
}

/// Bootloader protocol bytes
pub mod boot {
    /// Host knock on the data address
    pub const HANDSHAKE: u8 = 0xEF;
    /// Bootloader present ([`super::reg::STATUS`])
    pub const HANDSHAKE_ACK: u8 = 0x78;
    /// Payload received ([`super::reg::PROGRESS`])
    pub const RECEIVED: u8 = 0x46;
    /// Host: run stage 1
    pub const RUN_STAGE1: u8 = 0x59;
    /// Host: run stage 2
    pub const RUN_STAGE2: u8 = 0x58;
    /// Stage started ([`super::reg::STATUS`])
    pub const STAGE_ACK: u8 = 0x55;
    /// Ready for flash image ([`super::reg::PROGRESS`])
    pub const FLASH_READY: u8 = 0x43;
    /// Ready for next flash block ([`super::reg::PROGRESS`])
    pub const NEXT_BLOCK: u8 = 0x44;
}
