//! Coprocessor command set
//!
//! Register-level operations on top of [`Transport`]. Each one is a short
//! blocking sequence; callers run them from the bus worker, never from
//! interrupt context.

use auris_core::command::MicState;
use auris_core::config::CoprocConfig;
use auris_core::image::Version;
use auris_hal::{I2cBus, OutputPin};
use embedded_hal::delay::DelayNs;

use super::regs::{boot, cmd, reg};
use super::transport::{Transport, TransportError};

/// Handshake attempts before giving up
pub const HANDSHAKE_ATTEMPTS: u32 = 5000;

/// Reply window per handshake attempt
pub const HANDSHAKE_REPLY_TIMEOUT_MS: u32 = 10;

/// Pause between handshake attempts
pub const HANDSHAKE_RETRY_DELAY_MS: u32 = 1;

/// Time for the chip to latch version or mic state after a query
pub const QUERY_SETTLE_MS: u32 = 200;

/// Time for the chip to stop I2S after a disable
pub const DISABLE_I2S_SETTLE_MS: u32 = 100;

/// Boot time after a reset before the bootloader listens
pub const START_I2S_BOOT_MS: u32 = 100;

/// Failure of a multi-step command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    Transport(TransportError),
    /// Bootloader never answered the knock
    Handshake,
}

impl CommandError {
    pub fn reason(&self) -> &'static str {
        match self {
            CommandError::Transport(e) => e.reason(),
            CommandError::Handshake => "handshake failed",
        }
    }
}

impl From<TransportError> for CommandError {
    fn from(e: TransportError) -> Self {
        CommandError::Transport(e)
    }
}

/// Voice coprocessor
pub struct Coprocessor<I, P, D> {
    transport: Transport<I, P, D>,
    i2s_enabled: bool,
}

impl<I: I2cBus, P: OutputPin, D: DelayNs> Coprocessor<I, P, D> {
    pub fn new(i2c: I, power: P, delay: D, config: &CoprocConfig) -> Self {
        Self {
            transport: Transport::new(i2c, power, delay, config),
            i2s_enabled: false,
        }
    }

    pub fn transport(&mut self) -> &mut Transport<I, P, D> {
        &mut self.transport
    }

    /// Whether the last enable succeeded and no disable or reset followed
    pub fn is_i2s_enabled(&self) -> bool {
        self.i2s_enabled
    }

    fn command(&mut self, value: u8) -> Result<(), TransportError> {
        let addr = self.transport.cmd_addr();
        self.transport.write(addr, &[reg::CONTROL, value])
    }

    /// Read the running firmware version
    pub fn version(&mut self) -> Result<Version, TransportError> {
        self.command(cmd::QUERY_VERSION)?;
        self.transport.delay_ms(QUERY_SETTLE_MS);

        let addr = self.transport.cmd_addr();
        let mut bytes = [0u8; 4];
        for (byte, register) in bytes.iter_mut().zip(reg::VERSION) {
            *byte = self.transport.read(addr, register)?;
        }
        Ok(Version(bytes))
    }

    /// Enable the coprocessor's I2S output
    pub fn enable_i2s(&mut self) -> Result<(), TransportError> {
        let result = self.command(cmd::ENABLE_I2S);
        self.i2s_enabled = result.is_ok();
        result
    }

    /// Disable the coprocessor's I2S output and let it settle
    pub fn disable_i2s(&mut self) -> Result<(), TransportError> {
        self.command(cmd::DISABLE_I2S)?;
        self.transport.delay_ms(DISABLE_I2S_SETTLE_MS);
        self.i2s_enabled = false;
        Ok(())
    }

    /// Query microphone health
    pub fn mic_state(&mut self) -> Result<MicState, TransportError> {
        self.command(cmd::QUERY_MIC_STATE)?;
        self.transport.delay_ms(QUERY_SETTLE_MS);

        let addr = self.transport.cmd_addr();
        let raw = self.transport.read(addr, reg::STATUS)?;
        let state = MicState::from(raw);
        if let MicState::Unknown(_raw) = state {
            log_warn!("Mic state {=u8} not recognised", _raw);
        }
        Ok(state)
    }

    /// Knock until the bootloader answers
    ///
    /// Up to [`HANDSHAKE_ATTEMPTS`] tries; a failed knock write just
    /// counts as a miss.
    pub fn handshake(&mut self) -> bool {
        let data = self.transport.data_addr();
        let cmd = self.transport.cmd_addr();

        for _attempt in 0..HANDSHAKE_ATTEMPTS {
            if self.transport.write(data, &[boot::HANDSHAKE]).is_ok()
                && self.transport.wait_for_reply(
                    cmd,
                    reg::STATUS,
                    boot::HANDSHAKE_ACK,
                    HANDSHAKE_REPLY_TIMEOUT_MS,
                )
            {
                log_debug!("Handshake after {=u32} attempts", _attempt + 1);
                return true;
            }
            self.transport.delay_ms(HANDSHAKE_RETRY_DELAY_MS);
        }

        log_error!("Handshake failed, check data address");
        false
    }

    /// Power-cycle the chip
    pub fn reset(&mut self) {
        self.transport.reset();
        self.i2s_enabled = false;
    }

    /// Bring the chip up with I2S running: reset, handshake, enable
    pub fn start_i2s(&mut self) -> Result<(), CommandError> {
        self.reset();
        self.transport.delay_ms(START_I2S_BOOT_MS);
        if !self.handshake() {
            return Err(CommandError::Handshake);
        }
        self.enable_i2s()?;
        Ok(())
    }

    /// Give back the bus, power pin and delay
    pub fn release(self) -> (I, P, D) {
        self.transport.release()
    }
}
