//! I2C bus abstractions
//!
//! Blocking I2C master operations. The coprocessor protocol is strictly
//! request/response, so there is no async variant.

use embedded_hal::i2c::{Error as _, ErrorKind, I2c, NoAcknowledgeSource};

/// I2C error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cError {
    /// Bus error (misplaced start/stop)
    Bus,
    /// Arbitration lost to another master
    ArbitrationLost,
    /// Address or data byte not acknowledged
    Nack,
    /// Receive overrun
    Overrun,
    /// Anything the driver could not classify
    Other,
}

impl I2cError {
    pub fn reason(&self) -> &'static str {
        match self {
            I2cError::Bus => "bus error",
            I2cError::ArbitrationLost => "arbitration lost",
            I2cError::Nack => "not acknowledged",
            I2cError::Overrun => "overrun",
            I2cError::Other => "i2c error",
        }
    }
}

impl From<ErrorKind> for I2cError {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Bus => I2cError::Bus,
            ErrorKind::ArbitrationLoss => I2cError::ArbitrationLost,
            ErrorKind::NoAcknowledge(
                NoAcknowledgeSource::Address
                | NoAcknowledgeSource::Data
                | NoAcknowledgeSource::Unknown,
            ) => I2cError::Nack,
            ErrorKind::Overrun => I2cError::Overrun,
            _ => I2cError::Other,
        }
    }
}

/// I2C bus master
///
/// Provides basic I2C read/write operations for communicating with
/// peripheral devices.
pub trait I2cBus {
    /// Write data to a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `data` - Bytes to write
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), I2cError>;

    /// Read data from a device at the given address
    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), I2cError>;

    /// Write then read in a single transaction (repeated start)
    ///
    /// This is commonly used to write a register address then read data.
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `write_data` - Bytes to write (typically register address)
    /// * `read_buf` - Buffer to read into
    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), I2cError>;
}

/// Adapter for any `embedded-hal` 1.0 blocking I2C master
pub struct EhI2c<T> {
    bus: T,
}

impl<T: I2c> EhI2c<T> {
    pub fn new(bus: T) -> Self {
        Self { bus }
    }

    /// Release the wrapped bus
    pub fn into_inner(self) -> T {
        self.bus
    }
}

impl<T: I2c> I2cBus for EhI2c<T> {
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), I2cError> {
        self.bus.write(address, data).map_err(|e| e.kind().into())
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), I2cError> {
        self.bus.read(address, buf).map_err(|e| e.kind().into())
    }

    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), I2cError> {
        self.bus
            .write_read(address, write_data, read_buf)
            .map_err(|e| e.kind().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction};

    #[test]
    fn test_error_kind_mapping() {
        assert_eq!(I2cError::from(ErrorKind::Bus), I2cError::Bus);
        assert_eq!(
            I2cError::from(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)),
            I2cError::Nack
        );
        assert_eq!(I2cError::from(ErrorKind::Other), I2cError::Other);
    }

    #[test]
    fn test_adapter_forwards_transactions() {
        let expectations = [
            Transaction::write(0x2F, vec![0xC4, 0x71]),
            Transaction::write_read(0x2F, vec![0xA0], vec![0x78]),
            Transaction::write(0x36, vec![0xEF]).with_error(ErrorKind::ArbitrationLoss),
        ];
        let mut bus = EhI2c::new(I2cMock::new(&expectations));

        bus.write(0x2F, &[0xC4, 0x71]).unwrap();
        let mut reply = [0u8; 1];
        bus.write_read(0x2F, &[0xA0], &mut reply).unwrap();
        assert_eq!(reply, [0x78]);
        assert_eq!(bus.write(0x36, &[0xEF]), Err(I2cError::ArbitrationLost));

        bus.into_inner().done();
    }
}
