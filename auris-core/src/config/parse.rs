//! Minimal TOML parser for the firmware configuration
//!
//! Handles only the subset `auris.toml` uses. It does NOT support the full
//! TOML grammar.
//!
//! Supported features:
//! - `[section]` headers (`coproc`, `pins`, `update`)
//! - Key = value pairs (string, integer incl. `0x` hex, boolean)
//! - Pin strings (`gpio7`, `!gpio8`, `^gpio9`)
//! - Dotted version strings (`"0.0.0.3"`)
//! - Comments (# ...)
//!
//! Unknown keys are ignored so older firmware accepts newer files.

use heapless::String;

use super::types::{AurisConfig, PinConfig};
use crate::image::Version;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Line is not `key = value`
    InvalidLine,
    /// Value has the wrong type or is out of range
    InvalidValue,
    /// Invalid pin string
    InvalidPin,
    /// Invalid version string
    InvalidVersion,
    /// String longer than its fixed capacity
    TooLong,
    /// Data and command address are the same
    AddressClash,
}

impl ParseError {
    pub fn reason(&self) -> &'static str {
        match self {
            ParseError::InvalidSection => "invalid section header",
            ParseError::InvalidLine => "expected key = value",
            ParseError::InvalidValue => "invalid value",
            ParseError::InvalidPin => "invalid pin",
            ParseError::InvalidVersion => "invalid version",
            ParseError::TooLong => "value too long",
            ParseError::AddressClash => "data and command address must differ",
        }
    }
}

/// Highest RP2040 GPIO number
const MAX_GPIO: u8 = 29;

/// Accepted I2C clock range in Hz
const I2C_FREQUENCY_RANGE: core::ops::RangeInclusive<u32> = 10_000..=1_000_000;

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Coproc,
    Pins,
    Update,
}

/// Parse configuration text into an [`AurisConfig`]
///
/// Keys left out keep their defaults.
pub fn parse_config(input: &str) -> Result<AurisConfig, ParseError> {
    let mut config = AurisConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = strip_comment(line).trim();
        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            section = parse_section_header(header)?;
            continue;
        }

        let (key, value) = split_entry(line)?;
        match section {
            Section::Root => {}
            Section::Coproc => apply_coproc(&mut config, key, value)?,
            Section::Pins => apply_pins(&mut config, key, value)?,
            Section::Update => apply_update(&mut config, key, value)?,
        }
    }

    if config.coproc.data_addr == config.coproc.cmd_addr {
        return Err(ParseError::AddressClash);
    }

    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "coproc" => Ok(Section::Coproc),
        "pins" => Ok(Section::Pins),
        "update" => Ok(Section::Update),
        _ => Err(ParseError::InvalidSection),
    }
}

fn apply_coproc(config: &mut AurisConfig, key: &str, value: &str) -> Result<(), ParseError> {
    let c = &mut config.coproc;
    match key {
        "data_addr" => c.data_addr = parse_i2c_addr(value)?,
        "cmd_addr" => c.cmd_addr = parse_i2c_addr(value)?,
        "i2c_frequency" => {
            let hz: u32 = parse_int(value)?;
            if !I2C_FREQUENCY_RANGE.contains(&hz) {
                return Err(ParseError::InvalidValue);
            }
            c.i2c_frequency = hz;
        }
        "reset_hold_ms" => c.reset_hold_ms = parse_positive(value)?,
        "vad_timeout_ms" => {
            let ms = parse_positive(value)?;
            c.vad_timeout_ms = i32::try_from(ms).map_err(|_| ParseError::InvalidValue)?;
        }
        "current_version" => c.current_version = parse_version(value)?,
        _ => {}
    }
    Ok(())
}

fn apply_pins(config: &mut AurisConfig, key: &str, value: &str) -> Result<(), ParseError> {
    let p = &mut config.pins;
    match key {
        "power" => p.power = parse_pin(value)?,
        "vad_irq" => p.vad_irq = parse_pin(value)?,
        "voice" => p.voice = parse_pin(value)?,
        "indicator" => p.indicator = parse_pin(value)?,
        "i2c_sda" => p.i2c_sda = parse_bus_pin(value)?,
        "i2c_scl" => p.i2c_scl = parse_bus_pin(value)?,
        _ => {}
    }
    Ok(())
}

fn apply_update(config: &mut AurisConfig, key: &str, value: &str) -> Result<(), ParseError> {
    if key != "firmware" {
        return Ok(());
    }
    config.update.firmware = match unquote(value) {
        "" => None,
        name => Some(String::try_from(name).map_err(|_| ParseError::TooLong)?),
    };
    Ok(())
}

/// Cut a `#` comment unless it sits inside a quoted string
fn strip_comment(line: &str) -> &str {
    let mut quoted = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => quoted = !quoted,
            '#' if !quoted => return &line[..i],
            _ => {}
        }
    }
    line
}

fn split_entry(line: &str) -> Result<(&str, &str), ParseError> {
    let (key, value) = line.split_once('=').ok_or(ParseError::InvalidLine)?;
    let (key, value) = (key.trim(), value.trim());
    if key.is_empty() || value.is_empty() {
        return Err(ParseError::InvalidLine);
    }
    Ok((key, value))
}

/// Contents of a quoted value; bare values pass through
fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Parse a decimal or `0x` hex integer
fn parse_int<T: TryFrom<u64> + core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    if let Some(hex) = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        let wide = u64::from_str_radix(hex, 16).map_err(|_| ParseError::InvalidValue)?;
        return T::try_from(wide).map_err(|_| ParseError::InvalidValue);
    }
    value.parse().map_err(|_| ParseError::InvalidValue)
}

/// Non-zero millisecond count
fn parse_positive(value: &str) -> Result<u32, ParseError> {
    match parse_int(value)? {
        0 => Err(ParseError::InvalidValue),
        ms => Ok(ms),
    }
}

/// 7-bit I2C address
fn parse_i2c_addr(value: &str) -> Result<u8, ParseError> {
    let addr: u8 = parse_int(value)?;
    if addr > 0x7F {
        return Err(ParseError::InvalidValue);
    }
    Ok(addr)
}

fn parse_version(value: &str) -> Result<Version, ParseError> {
    unquote(value)
        .parse()
        .map_err(|_| ParseError::InvalidVersion)
}

/// `gpioN` with optional `!` (active low) and `^` (pull-up) prefixes
fn parse_pin(value: &str) -> Result<PinConfig, ParseError> {
    let spec = unquote(value);
    let name = spec.trim_start_matches(['!', '^']);
    let flags = &spec[..spec.len() - name.len()];

    let pin = name
        .strip_prefix("gpio")
        .and_then(|n| n.parse::<u8>().ok())
        .filter(|&n| n <= MAX_GPIO)
        .ok_or(ParseError::InvalidPin)?;

    Ok(PinConfig {
        pin,
        inverted: flags.contains('!'),
        pull_up: flags.contains('^'),
    })
}

/// I2C lines are plain pins; polarity and pull are fixed by the bus
fn parse_bus_pin(value: &str) -> Result<u8, ParseError> {
    match parse_pin(value)? {
        PinConfig {
            pin,
            inverted: false,
            pull_up: false,
        } => Ok(pin),
        _ => Err(ParseError::InvalidPin),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{DEFAULT_CMD_ADDR, DEFAULT_DATA_ADDR};

    #[test]
    fn test_board_pin_strings() {
        assert_eq!(parse_pin("\"gpio6\""), Ok(PinConfig::new(6)));
        assert_eq!(
            parse_pin("\"^!gpio7\""),
            Ok(PinConfig::active_low_pulled_up(7))
        );
        assert_eq!(
            parse_pin("!gpio25"),
            Ok(PinConfig {
                pin: 25,
                inverted: true,
                pull_up: false,
            })
        );

        assert_eq!(parse_pin("\"GP7\""), Err(ParseError::InvalidPin));
        assert_eq!(parse_pin("gpio30"), Err(ParseError::InvalidPin));
        assert_eq!(parse_pin("!^"), Err(ParseError::InvalidPin));
    }

    #[test]
    fn test_i2c_pins_reject_modifiers() {
        assert_eq!(parse_bus_pin("\"gpio2\""), Ok(2));
        assert_eq!(
            parse_config("[pins]\ni2c_scl = \"^gpio3\""),
            Err(ParseError::InvalidPin)
        );
    }

    #[test]
    fn test_comment_inside_string_kept() {
        assert_eq!(strip_comment("firmware = \"v#2\" # note"), "firmware = \"v#2\" ");
        let config = parse_config("[update]\nfirmware = \"v#2\"").unwrap();
        assert_eq!(config.update.firmware.as_deref(), Some("v#2"));
    }

    #[test]
    fn test_coproc_addresses() {
        assert_eq!(parse_int::<u8>("0x36"), Ok(DEFAULT_DATA_ADDR));
        assert_eq!(parse_i2c_addr("0x2F"), Ok(DEFAULT_CMD_ADDR));
        assert_eq!(parse_int::<u8>("0x1FF"), Err(ParseError::InvalidValue));
        assert_eq!(parse_i2c_addr("0x80"), Err(ParseError::InvalidValue));
        assert_eq!(
            parse_config("[coproc]\ncmd_addr = 0x36"),
            Err(ParseError::AddressClash)
        );

        let config = parse_config("[coproc]\ndata_addr = 0x2F\ncmd_addr = 0x36").unwrap();
        assert_eq!(config.coproc.data_addr, 0x2F);
        assert_eq!(config.coproc.cmd_addr, 0x36);
    }

    #[test]
    fn test_reset_hold_and_frequency_ranges() {
        let config = parse_config("[coproc]\nreset_hold_ms = 500").unwrap();
        assert_eq!(config.coproc.reset_hold_ms, 500);

        assert_eq!(
            parse_config("[coproc]\nreset_hold_ms = 0"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[coproc]\nreset_hold_ms = -5"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[coproc]\ni2c_frequency = 5000"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[coproc]\nvad_timeout_ms = 3000000000"),
            Err(ParseError::InvalidValue)
        );
    }

    #[test]
    fn test_empty_input_gives_defaults() {
        assert_eq!(parse_config(""), Ok(AurisConfig::default()));
    }

    #[test]
    fn test_reference_board_file() {
        let text = r#"
# Voice coprocessor link
[coproc]
data_addr = 0x36          # bootloader payload address
cmd_addr = 0x2F           # register interface address
i2c_frequency = 400000
reset_hold_ms = 1500
vad_timeout_ms = 3000
current_version = "0.0.0.8"

[pins] # reference board
power = "gpio6"
vad_irq = "^!gpio7"
voice = "^!gpio8"
indicator = "gpio25"
i2c_sda = "gpio2"
i2c_scl = "gpio3"

[update]
firmware = "v08"
"#;
        let config = parse_config(text).unwrap();
        assert_eq!(config.coproc.data_addr, DEFAULT_DATA_ADDR);
        assert_eq!(config.coproc.cmd_addr, DEFAULT_CMD_ADDR);
        assert_eq!(config.coproc.i2c_frequency, 400_000);
        assert_eq!(config.coproc.reset_hold_ms, 1500);
        assert_eq!(config.coproc.vad_timeout_ms, 3000);
        assert_eq!(config.coproc.current_version, Version::new(0, 0, 0, 8));
        assert_eq!(config.pins, Default::default());
        assert_eq!(config.update.firmware.as_deref(), Some("v08"));
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse_config("[bogus]"), Err(ParseError::InvalidSection));
        assert_eq!(
            parse_config("[coproc]\njust words"),
            Err(ParseError::InvalidLine)
        );
        assert_eq!(
            parse_config("[coproc]\nvad_timeout_ms ="),
            Err(ParseError::InvalidLine)
        );
        assert_eq!(
            parse_config("[coproc]\nvad_timeout_ms = 0"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[coproc]\ncurrent_version = \"1.2\""),
            Err(ParseError::InvalidVersion)
        );
        assert_eq!(
            parse_config("[update]\nfirmware = \"a-name-well-past-sixteen\""),
            Err(ParseError::TooLong)
        );
    }

    #[test]
    fn test_empty_firmware_name_means_none() {
        let config = parse_config("[update]\nfirmware = \"\"").unwrap();
        assert_eq!(config.update.firmware, None);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let config = parse_config("[coproc]\nfuture_knob = 7\n[update]\nchannel = \"beta\"").unwrap();
        assert_eq!(config, AurisConfig::default());
    }
}
