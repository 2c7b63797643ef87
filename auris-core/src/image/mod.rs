//! Coprocessor update images
//!
//! An update needs two inputs: a boot image (header, stage 1 loader and
//! stage 2 loader packed together) and the application image written to
//! the coprocessor's flash. Both are validated here, before the update
//! engine performs any bus I/O.

mod boot;
mod catalog;
mod firmware;
mod header;
mod version;

pub use boot::BootImage;
pub use catalog::{FirmwareCatalog, FirmwareEntry, MAX_CATALOG_ENTRIES};
pub use firmware::FirmwareImage;
pub use header::{BootImageHeader, BOOT_HEADER_LEN};
pub use version::{InvalidVersion, Version};

/// Size of each bootloader and flash data write
pub const DATA_CHUNK_LEN: usize = 16;

/// Flash image block; the coprocessor acknowledges each one
pub const FLASH_BLOCK_LEN: usize = 8192;

/// Image validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ImageError {
    /// Boot image shorter than its header
    HeaderTooShort,
    /// Header declares an empty stage 1
    ZeroStage1Size,
    /// Header declares an empty stage 2
    ZeroStage2Size,
    /// Header carries no stage 2 checksum
    ZeroStage2Checksum,
    /// Boot image ends before the declared stages do
    Truncated,
    /// Flash image is empty
    EmptyFirmware,
    /// Flash image length does not fit the 32-bit size field
    FirmwareTooLarge,
    /// No catalog entry with that name or index
    UnknownFirmware,
}

impl ImageError {
    pub fn reason(&self) -> &'static str {
        match self {
            ImageError::HeaderTooShort => "boot image shorter than header",
            ImageError::ZeroStage1Size => "stage 1 size is zero",
            ImageError::ZeroStage2Size => "stage 2 size is zero",
            ImageError::ZeroStage2Checksum => "stage 2 checksum is zero",
            ImageError::Truncated => "boot image truncated",
            ImageError::EmptyFirmware => "firmware image is empty",
            ImageError::FirmwareTooLarge => "firmware image too large",
            ImageError::UnknownFirmware => "unknown firmware",
        }
    }
}
