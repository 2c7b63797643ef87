//! Embedded configuration loader

use defmt::*;

use auris_core::config::{parse_config, AurisConfig};

/// Embedded configuration (compiled into firmware)
/// Edit auris.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../../auris.toml");

/// Parse the embedded auris.toml
///
/// build.rs has already validated the file, so a failure here means the
/// on-target parser and the build-time check disagree. Defaults are used
/// in that case.
pub fn load_config() -> AurisConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Parsed embedded configuration successfully");
            config
        }
        Err(e) => {
            error!("Failed to parse embedded config: {}", e.reason());
            error!("Using default configuration");
            AurisConfig::default()
        }
    }
}
