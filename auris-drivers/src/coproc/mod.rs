//! Voice coprocessor driver
//!
//! ```text
//!   Coprocessor ── command set (version, I2S, mic state, handshake)
//!        │         update engine (stage 1, stage 2, flash)
//!        ▼
//!   Transport ──── data addr 0x36 (bootloader payload)
//!        │         cmd addr  0x2F (register file, polled replies)
//!        ▼
//!   I2cBus + power OutputPin + DelayNs
//! ```

pub mod regs;

mod device;
mod transport;
mod update;

pub use device::{
    CommandError, Coprocessor, DISABLE_I2S_SETTLE_MS, HANDSHAKE_ATTEMPTS,
    HANDSHAKE_REPLY_TIMEOUT_MS, HANDSHAKE_RETRY_DELAY_MS, QUERY_SETTLE_MS, START_I2S_BOOT_MS,
};
pub use transport::{Transport, TransportError, MAX_WRITE_LEN, POLL_INTERVAL_MS};
pub use update::{
    StageFailure, UpdateError, UpdateGuard, FINALIZE_DELAY_MS, FLASH_BLOCK_TIMEOUT_MS,
    FLASH_CHUNK_DELAY_MS, FLASH_DONE_TIMEOUT_MS, FLASH_READY_TIMEOUT_MS, RESET_SETTLE_MS,
    STAGE1_RECEIVED_TIMEOUT_MS, STAGE2_BURST_DELAY_MS, STAGE2_BURST_LEN,
    STAGE2_CHUNK_DELAY_MS, STAGE2_HANDSHAKE_TIMEOUT_MS, STAGE2_RECEIVED_TIMEOUT_MS,
    STAGE_ACK_TIMEOUT_MS,
};
