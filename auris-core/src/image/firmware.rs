//! Flash image, streamed in fixed-size blocks

use super::{ImageError, FLASH_BLOCK_LEN};

/// Coprocessor application image
///
/// Never owned by the update engine; it reads the caller's buffer one
/// block at a time.
#[derive(Debug, Clone, Copy)]
pub struct FirmwareImage<'a> {
    data: &'a [u8],
}

impl<'a> FirmwareImage<'a> {
    pub fn new(data: &'a [u8]) -> Result<Self, ImageError> {
        if data.is_empty() {
            return Err(ImageError::EmptyFirmware);
        }
        if u32::try_from(data.len()).is_err() {
            return Err(ImageError::FirmwareTooLarge);
        }
        Ok(Self { data })
    }

    /// Image length as sent on the wire
    pub fn len(&self) -> u32 {
        // Bounded by `new`
        self.data.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Iterate over the image in flash-block windows
    pub fn blocks(&self) -> core::slice::Chunks<'a, u8> {
        self.data.chunks(FLASH_BLOCK_LEN)
    }

    pub fn block_count(&self) -> usize {
        self.data.len().div_ceil(FLASH_BLOCK_LEN)
    }
}
