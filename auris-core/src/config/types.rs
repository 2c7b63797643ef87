//! Configuration type definitions

use heapless::String;

use crate::image::Version;
use crate::vad::VAD_TIMEOUT_BASE_MS;

/// Maximum length for firmware names
pub const MAX_NAME_LEN: usize = 16;

/// Default coprocessor data (bootloader) address
pub const DEFAULT_DATA_ADDR: u8 = 0x36;

/// Default coprocessor command address
pub const DEFAULT_CMD_ADDR: u8 = 0x2F;

/// Firmware version this host image was built against
pub const DEFAULT_CURRENT_VERSION: Version = Version::new(0, 0, 0, 3);

/// GPIO pin configuration
///
/// Parsed from strings like `gpio7`, `!gpio8` (active-low) or `^gpio9`
/// (pull-up enabled).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinConfig {
    /// GPIO pin number (0-29 for RP2040)
    pub pin: u8,
    /// Pin is active-low (inverted)
    pub inverted: bool,
    /// Enable internal pull-up
    pub pull_up: bool,
}

impl PinConfig {
    pub const fn new(pin: u8) -> Self {
        Self {
            pin,
            inverted: false,
            pull_up: false,
        }
    }

    /// Active-low input with pull-up, the usual open-drain wiring
    pub const fn active_low_pulled_up(pin: u8) -> Self {
        Self {
            pin,
            inverted: true,
            pull_up: true,
        }
    }
}

/// Coprocessor link settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CoprocConfig {
    /// Bootloader data address
    pub data_addr: u8,
    /// Command/register address
    pub cmd_addr: u8,
    /// I2C clock in Hz
    pub i2c_frequency: u32,
    /// How long power is held off during a reset
    pub reset_hold_ms: u32,
    /// VAD capture window
    pub vad_timeout_ms: i32,
    /// Version this host image was built against
    pub current_version: Version,
}

impl Default for CoprocConfig {
    fn default() -> Self {
        Self {
            data_addr: DEFAULT_DATA_ADDR,
            cmd_addr: DEFAULT_CMD_ADDR,
            i2c_frequency: 100_000,
            reset_hold_ms: 2000,
            vad_timeout_ms: VAD_TIMEOUT_BASE_MS,
            current_version: DEFAULT_CURRENT_VERSION,
        }
    }
}

/// Board wiring between the host and the coprocessor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BoardPins {
    /// Coprocessor power enable (output)
    pub power: PinConfig,
    /// VAD falling-edge interrupt (input)
    pub vad_irq: PinConfig,
    /// Voice-present level (input)
    pub voice: PinConfig,
    /// I2S activity indicator (output)
    pub indicator: PinConfig,
    /// I2C data line
    pub i2c_sda: u8,
    /// I2C clock line
    pub i2c_scl: u8,
}

impl Default for BoardPins {
    fn default() -> Self {
        Self {
            power: PinConfig::new(6),
            vad_irq: PinConfig::active_low_pulled_up(7),
            voice: PinConfig::active_low_pulled_up(8),
            indicator: PinConfig::new(25),
            i2c_sda: 2,
            i2c_scl: 3,
        }
    }
}

/// Boot-time update request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UpdateConfig {
    /// Catalog entry to flash at boot, if any
    pub firmware: Option<String<MAX_NAME_LEN>>,
}

/// Complete firmware configuration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AurisConfig {
    pub coproc: CoprocConfig,
    pub pins: BoardPins,
    pub update: UpdateConfig,
}
