//! Coprocessor images bundled at build time
//!
//! build.rs scans images/: `boot.bin` is the two-stage bootloader, every
//! other `.bin` becomes a catalog entry named after its file stem. Without
//! an images/ directory the catalog is empty and updates report an unknown
//! firmware.

use defmt::*;

use auris_core::image::FirmwareCatalog;

mod bundled {
    include!(concat!(env!("OUT_DIR"), "/images.rs"));
}

pub use bundled::BOOT_IMAGE;

/// Catalog of the bundled firmware images
pub fn catalog() -> FirmwareCatalog<'static> {
    let mut catalog = FirmwareCatalog::new();
    for &(name, data) in bundled::FIRMWARE_IMAGES {
        if catalog.add(name, data).is_err() {
            warn!("Firmware catalog full, dropping '{}'", name);
        }
    }
    info!(
        "{} firmware image(s), boot image {} bytes",
        catalog.len(),
        BOOT_IMAGE.len()
    );
    catalog
}
