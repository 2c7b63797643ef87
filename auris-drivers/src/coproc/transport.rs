//! Byte-level I2C transport
//!
//! The coprocessor answers on two 7-bit addresses: a data address used by
//! its bootloader for bulk payload, and a command address exposing a small
//! register file. Every exchange is a blocking write, a register read, or
//! a bounded poll of one register. Nothing here retries.

use auris_core::config::CoprocConfig;
use auris_hal::{I2cBus, I2cError, OutputPin};
use embedded_hal::delay::DelayNs;

/// Largest single write the coprocessor accepts
pub const MAX_WRITE_LEN: usize = 511;

/// Interval between register polls
pub const POLL_INTERVAL_MS: u32 = 1;

/// Transport errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// I2C transaction failed
    Bus(I2cError),
    /// Payload longer than [`MAX_WRITE_LEN`]; nothing was sent
    WriteTooLong(usize),
}

impl TransportError {
    pub fn reason(&self) -> &'static str {
        match self {
            TransportError::Bus(e) => e.reason(),
            TransportError::WriteTooLong(_) => "write exceeds 511 bytes",
        }
    }
}

impl From<I2cError> for TransportError {
    fn from(e: I2cError) -> Self {
        TransportError::Bus(e)
    }
}

/// I2C link plus the coprocessor power switch
pub struct Transport<I, P, D> {
    i2c: I,
    power: P,
    delay: D,
    data_addr: u8,
    cmd_addr: u8,
    reset_hold_ms: u32,
}

impl<I: I2cBus, P: OutputPin, D: DelayNs> Transport<I, P, D> {
    /// Create a transport
    ///
    /// The power pin is left as the board configured it.
    pub fn new(i2c: I, power: P, delay: D, config: &CoprocConfig) -> Self {
        Self {
            i2c,
            power,
            delay,
            data_addr: config.data_addr,
            cmd_addr: config.cmd_addr,
            reset_hold_ms: config.reset_hold_ms,
        }
    }

    /// Bootloader data address
    pub fn data_addr(&self) -> u8 {
        self.data_addr
    }

    /// Register interface address
    pub fn cmd_addr(&self) -> u8 {
        self.cmd_addr
    }

    /// Write `bytes` to `addr` in one transaction
    pub fn write(&mut self, addr: u8, bytes: &[u8]) -> Result<(), TransportError> {
        if bytes.len() > MAX_WRITE_LEN {
            return Err(TransportError::WriteTooLong(bytes.len()));
        }
        self.i2c.write(addr, bytes)?;
        Ok(())
    }

    /// Read one register byte from `addr`
    pub fn read(&mut self, addr: u8, reg: u8) -> Result<u8, TransportError> {
        let mut value = [0u8; 1];
        self.i2c.write_read(addr, &[reg], &mut value)?;
        Ok(value[0])
    }

    /// Poll `reg` until it reads `expected`
    ///
    /// Makes at most `timeout_ms` reads, sleeping [`POLL_INTERVAL_MS`]
    /// after each miss. A failed read counts as a miss.
    pub fn wait_for_reply(&mut self, addr: u8, reg: u8, expected: u8, timeout_ms: u32) -> bool {
        let mut remaining = timeout_ms;
        while remaining > 0 {
            if let Ok(value) = self.read(addr, reg) {
                if value == expected {
                    return true;
                }
            }
            remaining -= 1;
            self.delay.delay_ms(POLL_INTERVAL_MS);
        }
        false
    }

    /// Power-cycle the coprocessor
    pub fn reset(&mut self) {
        self.power.set_low();
        self.delay.delay_ms(self.reset_hold_ms);
        self.power.set_high();
    }

    pub fn is_powered(&self) -> bool {
        self.power.is_set_high()
    }

    pub fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    /// Give back the bus, power pin and delay
    pub fn release(self) -> (I, P, D) {
        (self.i2c, self.power, self.delay)
    }
}
