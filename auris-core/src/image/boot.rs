//! Two-stage bootloader image

use super::header::{BootImageHeader, BOOT_HEADER_LEN};
use super::ImageError;

/// A validated boot image
///
/// Borrowed from the caller; the stage payloads are views into the same
/// buffer as the header.
#[derive(Debug, Clone, Copy)]
pub struct BootImage<'a> {
    header: BootImageHeader,
    stage1: &'a [u8],
    stage2: &'a [u8],
}

impl<'a> BootImage<'a> {
    /// Parse and validate `bytes`
    ///
    /// Every check here runs before the update engine touches the bus.
    pub fn parse(bytes: &'a [u8]) -> Result<Self, ImageError> {
        let header = BootImageHeader::parse(bytes)?;

        if header.stage1_size == 0 {
            return Err(ImageError::ZeroStage1Size);
        }
        if header.stage2_size == 0 {
            return Err(ImageError::ZeroStage2Size);
        }
        if header.stage2_checksum == 0 {
            return Err(ImageError::ZeroStage2Checksum);
        }

        let stage1_len = header.stage1_size as usize;
        let stage2_len = header.stage2_size as usize;
        let stage1_end = BOOT_HEADER_LEN
            .checked_add(stage1_len)
            .ok_or(ImageError::Truncated)?;
        let stage2_end = stage1_end
            .checked_add(stage2_len)
            .ok_or(ImageError::Truncated)?;

        let stage1 = bytes
            .get(BOOT_HEADER_LEN..stage1_end)
            .ok_or(ImageError::Truncated)?;
        let stage2 = bytes
            .get(stage1_end..stage2_end)
            .ok_or(ImageError::Truncated)?;

        Ok(Self {
            header,
            stage1,
            stage2,
        })
    }

    pub fn header(&self) -> &BootImageHeader {
        &self.header
    }

    /// Stage 1 payload
    pub fn stage1(&self) -> &'a [u8] {
        self.stage1
    }

    /// Stage 2 payload
    pub fn stage2(&self) -> &'a [u8] {
        self.stage2
    }

    pub fn stage2_checksum(&self) -> u32 {
        self.header.stage2_checksum
    }
}
