//! Firmware update engine
//!
//! An update streams three payloads through the coprocessor bootloader:
//!
//! ```text
//!   version check ──► reset ──► handshake
//!        │                          │
//!   up to date                      ▼
//!                  stage 1: size, payload, ack, run
//!                  stage 2: knock, checksum, size, paced payload, ack, run
//!                  flash:   offset, size, block size, payload per block
//!                                   │
//!                                   ▼
//!                       settle, reset, resume VAD
//! ```
//!
//! Payload always goes to the data address in 16-byte writes; every
//! acknowledgement is polled on the command address. Images are validated
//! before the first bus transaction. The VAD interrupt is held off from
//! the handshake until the end, whatever the outcome.

use auris_core::command::UpdateOutcome;
use auris_core::image::{
    BootImage, FirmwareImage, ImageError, Version, DATA_CHUNK_LEN, FLASH_BLOCK_LEN,
};
use auris_hal::{I2cBus, OutputPin};
use embedded_hal::delay::DelayNs;

use super::device::Coprocessor;
use super::regs::{boot, reg};
use super::transport::TransportError;

/// Wait for stage 1 receipt
pub const STAGE1_RECEIVED_TIMEOUT_MS: u32 = 2000;

/// Wait for a stage to report it is running
pub const STAGE_ACK_TIMEOUT_MS: u32 = 1000;

/// Wait for the stage 2 knock reply
pub const STAGE2_HANDSHAKE_TIMEOUT_MS: u32 = 1000;

/// Wait for stage 2 receipt
pub const STAGE2_RECEIVED_TIMEOUT_MS: u32 = 1000;

/// Pause after every stage 2 chunk
pub const STAGE2_CHUNK_DELAY_MS: u32 = 5;

/// Stage 2 bytes between longer pauses
pub const STAGE2_BURST_LEN: usize = 1600;

/// Extra pause after each full burst
pub const STAGE2_BURST_DELAY_MS: u32 = 20;

/// Wait for the flash writer to come up
pub const FLASH_READY_TIMEOUT_MS: u32 = 10_000;

/// Wait for the request of the next flash block
pub const FLASH_BLOCK_TIMEOUT_MS: u32 = 1000;

/// Wait for the final flash receipt
pub const FLASH_DONE_TIMEOUT_MS: u32 = 1000;

/// Pause after every flash chunk
pub const FLASH_CHUNK_DELAY_MS: u32 = 1;

/// Settle time after each reset of the update sequence
pub const RESET_SETTLE_MS: u32 = 10;

/// Time given to the chip to commit flash before the final reset
pub const FINALIZE_DELAY_MS: u32 = 2000;

/// Hooks around the part of an update that must not be interrupted
///
/// `suspend` runs once before the handshake and `resume` exactly once
/// afterwards, on success and on every failure.
pub trait UpdateGuard {
    fn suspend(&mut self);
    fn resume(&mut self);
}

/// Why one stage stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StageFailure {
    Transport(TransportError),
    /// `reg` never read `expected` within its timeout
    NoAck { reg: u8, expected: u8 },
}

impl StageFailure {
    pub fn reason(&self) -> &'static str {
        match self {
            StageFailure::Transport(e) => e.reason(),
            StageFailure::NoAck { .. } => "no acknowledgement",
        }
    }
}

impl From<TransportError> for StageFailure {
    fn from(e: TransportError) -> Self {
        StageFailure::Transport(e)
    }
}

/// Update failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UpdateError {
    /// Boot or firmware image rejected; nothing was sent
    Image(ImageError),
    /// Version query failed; nothing was flashed
    Version(TransportError),
    /// Bootloader never answered after reset
    Handshake,
    Stage1(StageFailure),
    Stage2(StageFailure),
    Flash(StageFailure),
}

impl UpdateError {
    pub fn reason(&self) -> &'static str {
        match self {
            UpdateError::Image(e) => e.reason(),
            UpdateError::Version(_) => "version query failed",
            UpdateError::Handshake => "handshake failed",
            UpdateError::Stage1(_) => "stage 1 failed",
            UpdateError::Stage2(_) => "stage 2 failed",
            UpdateError::Flash(_) => "flash failed",
        }
    }
}

impl From<ImageError> for UpdateError {
    fn from(e: ImageError) -> Self {
        UpdateError::Image(e)
    }
}

impl<I: I2cBus, P: OutputPin, D: DelayNs> Coprocessor<I, P, D> {
    /// Flash `firmware` through the two-stage `boot_image` if the chip is
    /// behind `current`
    ///
    /// The comparison is per byte: any remote byte greater than the local
    /// one triggers the update, whatever the bytes before it.
    pub fn update<G: UpdateGuard>(
        &mut self,
        current: &Version,
        boot_image: &[u8],
        firmware: &[u8],
        guard: &mut G,
    ) -> Result<UpdateOutcome, UpdateError> {
        let loader = BootImage::parse(boot_image)?;
        let image = FirmwareImage::new(firmware)?;

        let remote = self.version().map_err(UpdateError::Version)?;
        if !current.needs_update(&remote) {
            log_info!("Coprocessor firmware up to date");
            return Ok(UpdateOutcome::UpToDate { remote });
        }

        log_info!(
            "Updating coprocessor: {=u32} byte firmware, stage 2 {=u32} bytes",
            image.len(),
            loader.header().stage2_size
        );

        guard.suspend();
        let result = self.run_update(&loader, &image);
        guard.resume();

        match result {
            Ok(()) => {
                log_info!("Coprocessor update complete");
                Ok(UpdateOutcome::Flashed { previous: remote })
            }
            Err(e) => {
                log_error!("Coprocessor update failed: {}", e.reason());
                Err(e)
            }
        }
    }

    fn run_update(&mut self, loader: &BootImage, image: &FirmwareImage) -> Result<(), UpdateError> {
        self.reset();
        self.transport().delay_ms(RESET_SETTLE_MS);
        if !self.handshake() {
            return Err(UpdateError::Handshake);
        }

        self.send_stage1(loader).map_err(UpdateError::Stage1)?;
        log_debug!("Stage 1 running");
        self.send_stage2(loader).map_err(UpdateError::Stage2)?;
        log_debug!("Stage 2 running");
        self.send_firmware(image).map_err(UpdateError::Flash)?;

        self.transport().delay_ms(FINALIZE_DELAY_MS);
        self.reset();
        self.transport().delay_ms(RESET_SETTLE_MS);
        Ok(())
    }

    fn send_data(&mut self, bytes: &[u8]) -> Result<(), StageFailure> {
        let transport = self.transport();
        let addr = transport.data_addr();
        transport.write(addr, bytes)?;
        Ok(())
    }

    fn expect_reply(&mut self, register: u8, expected: u8, timeout_ms: u32) -> Result<(), StageFailure> {
        let transport = self.transport();
        let addr = transport.cmd_addr();
        if transport.wait_for_reply(addr, register, expected, timeout_ms) {
            Ok(())
        } else {
            Err(StageFailure::NoAck {
                reg: register,
                expected,
            })
        }
    }

    fn send_stage1(&mut self, loader: &BootImage) -> Result<(), StageFailure> {
        self.send_data(&loader.header().stage1_size.to_le_bytes())?;
        for chunk in loader.stage1().chunks(DATA_CHUNK_LEN) {
            self.send_data(chunk)?;
        }

        self.expect_reply(reg::PROGRESS, boot::RECEIVED, STAGE1_RECEIVED_TIMEOUT_MS)?;
        self.send_data(&[boot::RUN_STAGE1])?;
        self.expect_reply(reg::STATUS, boot::STAGE_ACK, STAGE_ACK_TIMEOUT_MS)
    }

    fn send_stage2(&mut self, loader: &BootImage) -> Result<(), StageFailure> {
        self.send_data(&[boot::HANDSHAKE])?;
        self.expect_reply(reg::STATUS, boot::HANDSHAKE_ACK, STAGE2_HANDSHAKE_TIMEOUT_MS)?;

        let stage2 = loader.stage2();
        self.send_data(&loader.stage2_checksum().to_le_bytes())?;
        self.send_data(&loader.header().stage2_size.to_le_bytes())?;

        let mut written = 0;
        for chunk in stage2.chunks(DATA_CHUNK_LEN) {
            self.send_data(chunk)?;
            written += chunk.len();
            self.transport().delay_ms(STAGE2_CHUNK_DELAY_MS);
            if written % STAGE2_BURST_LEN == 0 && written < stage2.len() {
                self.transport().delay_ms(STAGE2_BURST_DELAY_MS);
            }
        }

        self.expect_reply(reg::PROGRESS, boot::RECEIVED, STAGE2_RECEIVED_TIMEOUT_MS)?;
        self.send_data(&[boot::RUN_STAGE2])?;
        self.expect_reply(reg::STATUS, boot::STAGE_ACK, STAGE_ACK_TIMEOUT_MS)
    }

    fn send_firmware(&mut self, image: &FirmwareImage) -> Result<(), StageFailure> {
        self.send_data(&0u32.to_le_bytes())?;
        self.send_data(&image.len().to_le_bytes())?;
        self.send_data(&(FLASH_BLOCK_LEN as u32).to_le_bytes())?;
        self.expect_reply(reg::PROGRESS, boot::FLASH_READY, FLASH_READY_TIMEOUT_MS)?;

        let blocks = image.block_count();
        for (index, block) in image.blocks().enumerate() {
            let mut chunks = block.chunks(DATA_CHUNK_LEN).peekable();
            while let Some(chunk) = chunks.next() {
                self.send_data(chunk)?;
                if chunks.peek().is_none() && index + 1 < blocks {
                    self.expect_reply(reg::PROGRESS, boot::NEXT_BLOCK, FLASH_BLOCK_TIMEOUT_MS)?;
                }
                self.transport().delay_ms(FLASH_CHUNK_DELAY_MS);
            }
        }

        self.expect_reply(reg::PROGRESS, boot::RECEIVED, FLASH_DONE_TIMEOUT_MS)
    }
}
