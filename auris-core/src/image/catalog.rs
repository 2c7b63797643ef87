//! Named firmware images bundled with the host firmware

use heapless::Vec;

use super::ImageError;

/// Maximum number of catalog entries
pub const MAX_CATALOG_ENTRIES: usize = 8;

/// One named firmware image
#[derive(Debug, Clone, Copy)]
pub struct FirmwareEntry<'a> {
    pub name: &'a str,
    pub data: &'a [u8],
}

/// Lookup table from firmware name to image bytes
#[derive(Debug, Clone, Default)]
pub struct FirmwareCatalog<'a> {
    entries: Vec<FirmwareEntry<'a>, MAX_CATALOG_ENTRIES>,
}

impl<'a> FirmwareCatalog<'a> {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add an entry; returns it back if the catalog is full
    pub fn add(&mut self, name: &'a str, data: &'a [u8]) -> Result<(), FirmwareEntry<'a>> {
        self.entries.push(FirmwareEntry { name, data })
    }

    pub fn get(&self, index: usize) -> Option<&FirmwareEntry<'a>> {
        self.entries.get(index)
    }

    /// Position of the entry called `name`
    pub fn index_of(&self, name: &str) -> Result<usize, ImageError> {
        self.entries
            .iter()
            .position(|e| e.name == name)
            .ok_or(ImageError::UnknownFirmware)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FirmwareEntry<'a>> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static V07: [u8; 3] = [7, 7, 7];
    static V08: [u8; 3] = [8, 8, 8];

    #[test]
    fn test_lookup_by_name() {
        let mut catalog = FirmwareCatalog::new();
        catalog.add("v07", &V07).unwrap();
        catalog.add("v08", &V08).unwrap();

        assert_eq!(catalog.index_of("v08"), Ok(1));
        assert_eq!(catalog.get(0).map(|e| e.data), Some(&V07[..]));
        assert_eq!(catalog.index_of("v09"), Err(ImageError::UnknownFirmware));
    }

    #[test]
    fn test_capacity() {
        let mut catalog = FirmwareCatalog::new();
        for _ in 0..MAX_CATALOG_ENTRIES {
            catalog.add("x", &V07).unwrap();
        }
        assert!(catalog.add("overflow", &V08).is_err());
        assert_eq!(catalog.len(), MAX_CATALOG_ENTRIES);
    }
}
