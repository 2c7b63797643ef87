//! RP2040 reference board
//!
//! Blocking embassy-rp I2C and GPIO drivers lifted into the auris-hal
//! traits, plus signal-backed stand-ins for the peripherals that live in
//! other tasks (edge watcher, VAD timer, capture pipeline).
//!
//! Pin assignments are board-specific. auris.toml describes the same
//! wiring; a mismatch is reported at boot and the board wiring wins.

use defmt::*;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::I2C1;
use embassy_time::Delay;
use portable_atomic::Ordering;

use auris_core::config::{AurisConfig, BoardPins, PinConfig};
use auris_drivers::service::Board;
use auris_hal::{CaptureControl, CaptureError, EhI2c, EhInput, EhOutput, InterruptLine, OneShotTimer};

use crate::channels::{TimerCommand, CAPTURE_CMD, VAD_IRQ_ARM, VAD_IRQ_ENABLED, VAD_TIMER};

/// GPIO numbers the reference board is wired to
pub const POWER_PIN: u8 = 6;
pub const VAD_IRQ_PIN: u8 = 7;
pub const VOICE_PIN: u8 = 8;
pub const INDICATOR_PIN: u8 = 25;
pub const I2C_SDA_PIN: u8 = 2;
pub const I2C_SCL_PIN: u8 = 3;

pub type CoprocI2c = I2c<'static, I2C1, i2c::Blocking>;

/// Peripheral types of the reference board
pub struct AurisBoard;

impl Board for AurisBoard {
    type I2c = EhI2c<CoprocI2c>;
    type Power = EhOutput<Output<'static>>;
    type Delay = Delay;
    type Irq = SignalIrqLine;
    type Capture = CaptureSwitch;
    type Timer = SignalTimer;
    type Voice = EhInput<Input<'static>>;
    type Indicator = EhOutput<Output<'static>>;
}

/// Warn about configured pins that differ from the board wiring
pub fn check_wiring(config: &AurisConfig) {
    let BoardPins {
        power,
        vad_irq,
        voice,
        indicator,
        i2c_sda,
        i2c_scl,
    } = config.pins;

    let wired = [
        ("power", power.pin, POWER_PIN),
        ("vad_irq", vad_irq.pin, VAD_IRQ_PIN),
        ("voice", voice.pin, VOICE_PIN),
        ("indicator", indicator.pin, INDICATOR_PIN),
        ("i2c_sda", i2c_sda, I2C_SDA_PIN),
        ("i2c_scl", i2c_scl, I2C_SCL_PIN),
    ];
    for (name, configured, actual) in wired {
        if configured != actual {
            warn!(
                "Pin {} configured as gpio{} but wired to gpio{}",
                name, configured, actual
            );
        }
    }
}

/// Pull for an input pin
pub fn pull(pin: &PinConfig) -> Pull {
    if pin.pull_up {
        Pull::Up
    } else if pin.inverted {
        Pull::None
    } else {
        Pull::Down
    }
}

/// Level that leaves an output inactive
pub fn idle_level(pin: &PinConfig) -> Level {
    if pin.inverted {
        Level::High
    } else {
        Level::Low
    }
}

/// VAD edge interrupt, serviced by the edge watcher task
///
/// Disabling only clears the flag; an edge already in flight is dropped
/// by the watcher.
pub struct SignalIrqLine;

impl InterruptLine for SignalIrqLine {
    fn enable_falling_edge(&mut self) {
        VAD_IRQ_ENABLED.store(true, Ordering::Release);
        VAD_IRQ_ARM.signal(());
    }

    fn disable(&mut self) {
        VAD_IRQ_ENABLED.store(false, Ordering::Release);
    }

    fn is_enabled(&self) -> bool {
        VAD_IRQ_ENABLED.load(Ordering::Acquire)
    }
}

/// VAD window timer, run by the timer task
pub struct SignalTimer;

impl OneShotTimer for SignalTimer {
    fn start(&mut self, ms: u32) {
        VAD_TIMER.signal(TimerCommand::Start(ms));
    }

    fn stop(&mut self) {
        VAD_TIMER.signal(TimerCommand::Stop);
    }
}

/// Switch for the capture pipeline task
#[derive(Default)]
pub struct CaptureSwitch {
    running: bool,
}

impl CaptureControl for CaptureSwitch {
    fn start(&mut self) -> Result<(), CaptureError> {
        CAPTURE_CMD.signal(true);
        self.running = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        if self.running {
            CAPTURE_CMD.signal(false);
            self.running = false;
        }
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }
}
