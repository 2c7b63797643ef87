//! Boot image header
//!
//! # Layout (32 bytes, packed)
//!
//! ```text
//! off  size  field              byte order
//! 0    2     chip_id            little-endian
//! 2    1     chip_type
//! 3    1     chip_version
//! 4    2     boot_delay         little-endian
//! 6    1     baud_rate
//! 7    1     reserved
//! 8    4     stage1_size        big-endian
//! 12   4     stage2_baud_rate   big-endian
//! 16   4     stage2_size        big-endian
//! 20   4     stage2_checksum    big-endian
//! 24   8     reserved
//! ```
//!
//! The image tool writes the 32-bit fields big-endian and leaves the 16-bit
//! fields in the bootloader's native order.

use super::ImageError;

/// Header length in bytes; stage 1 starts right after it
pub const BOOT_HEADER_LEN: usize = 32;

/// Decoded boot image header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BootImageHeader {
    pub chip_id: u16,
    pub chip_type: u8,
    pub chip_version: u8,
    pub boot_delay: u16,
    pub baud_rate: u8,
    pub reserved0: u8,
    pub stage1_size: u32,
    pub stage2_baud_rate: u32,
    pub stage2_size: u32,
    pub stage2_checksum: u32,
    pub reserved: [u8; 8],
}

impl BootImageHeader {
    /// Decode the header at the start of `bytes`
    ///
    /// Only the length is checked here; field validation belongs to
    /// [`BootImage`](super::BootImage).
    pub fn parse(bytes: &[u8]) -> Result<Self, ImageError> {
        let raw: &[u8; BOOT_HEADER_LEN] = bytes
            .get(..BOOT_HEADER_LEN)
            .and_then(|h| h.try_into().ok())
            .ok_or(ImageError::HeaderTooShort)?;

        let be32 = |at: usize| u32::from_be_bytes([raw[at], raw[at + 1], raw[at + 2], raw[at + 3]]);
        let mut reserved = [0u8; 8];
        reserved.copy_from_slice(&raw[24..32]);

        Ok(Self {
            chip_id: u16::from_le_bytes([raw[0], raw[1]]),
            chip_type: raw[2],
            chip_version: raw[3],
            boot_delay: u16::from_le_bytes([raw[4], raw[5]]),
            baud_rate: raw[6],
            reserved0: raw[7],
            stage1_size: be32(8),
            stage2_baud_rate: be32(12),
            stage2_size: be32(16),
            stage2_checksum: be32(20),
            reserved,
        })
    }

    /// Encode to the wire layout
    pub fn encode(&self) -> [u8; BOOT_HEADER_LEN] {
        let mut out = [0u8; BOOT_HEADER_LEN];
        out[0..2].copy_from_slice(&self.chip_id.to_le_bytes());
        out[2] = self.chip_type;
        out[3] = self.chip_version;
        out[4..6].copy_from_slice(&self.boot_delay.to_le_bytes());
        out[6] = self.baud_rate;
        out[7] = self.reserved0;
        out[8..12].copy_from_slice(&self.stage1_size.to_be_bytes());
        out[12..16].copy_from_slice(&self.stage2_baud_rate.to_be_bytes());
        out[16..20].copy_from_slice(&self.stage2_size.to_be_bytes());
        out[20..24].copy_from_slice(&self.stage2_checksum.to_be_bytes());
        out[24..32].copy_from_slice(&self.reserved);
        out
    }
}
