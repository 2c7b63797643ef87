//! Bus context for the voice path
//!
//! [`VoiceService`] owns the coprocessor and the VAD controller and is the
//! context every bus callback receives. Callbacks are plain functions
//! taking it by `&mut`, so I2C traffic only ever happens on the worker.

use auris_core::bus::{BusContext, BusError, EventBus};
use auris_core::command::{CommandOutcome, OperatorCommand, UpdateOutcome};
use auris_core::config::AurisConfig;
use auris_core::event::{EventKind, InterruptEvent};
use auris_core::image::{FirmwareCatalog, ImageError, Version};
use auris_hal::{CaptureControl, I2cBus, InputPin, InterruptLine, OneShotTimer, OutputPin};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal::delay::DelayNs;

use crate::coproc::{Coprocessor, UpdateError};
use crate::vad::VadController;

/// Peripheral types of a board
pub trait Board {
    type I2c: I2cBus;
    type Power: OutputPin;
    type Delay: DelayNs;
    type Irq: InterruptLine;
    type Capture: CaptureControl;
    type Timer: OneShotTimer;
    type Voice: InputPin;
    type Indicator: OutputPin;
}

pub type BoardCoprocessor<B> = Coprocessor<<B as Board>::I2c, <B as Board>::Power, <B as Board>::Delay>;

pub type BoardVad<B> = VadController<
    <B as Board>::Irq,
    <B as Board>::Capture,
    <B as Board>::Timer,
    <B as Board>::Voice,
    <B as Board>::Indicator,
>;

/// Where command results go (console, log, host link)
pub trait OutcomeSink {
    fn publish(&mut self, outcome: CommandOutcome);
}

/// Images available to the update command
#[derive(Debug, Clone, Default)]
pub struct UpdateImages<'a> {
    /// Two-stage bootloader streamed ahead of every firmware
    pub boot: &'a [u8],
    pub catalog: FirmwareCatalog<'a>,
}

/// The voice path, as seen by the event bus
pub struct VoiceService<'a, B: Board, S> {
    coproc: BoardCoprocessor<B>,
    vad: BoardVad<B>,
    images: UpdateImages<'a>,
    current_version: Version,
    outcomes: S,
}

impl<'a, B: Board, S: OutcomeSink> VoiceService<'a, B, S> {
    pub fn new(
        coproc: BoardCoprocessor<B>,
        vad: BoardVad<B>,
        images: UpdateImages<'a>,
        config: &AurisConfig,
        outcomes: S,
    ) -> Self {
        Self {
            coproc,
            vad,
            images,
            current_version: config.coproc.current_version,
            outcomes,
        }
    }

    /// Install the VAD and command callbacks on `bus`
    pub fn attach<M: RawMutex>(bus: &mut EventBus<'_, M, Self>) -> Result<(), BusError> {
        bus.register(EventKind::VadFallingEdge, Self::on_vad_edge)?;
        bus.register(EventKind::VadTimeout, Self::on_vad_timeout)?;
        bus.register(EventKind::Command, Self::on_command)?;
        Ok(())
    }

    /// Start listening for voice
    pub fn arm(&mut self) {
        self.vad.arm();
    }

    pub fn coproc(&mut self) -> &mut BoardCoprocessor<B> {
        &mut self.coproc
    }

    pub fn vad(&self) -> &BoardVad<B> {
        &self.vad
    }

    pub fn images(&self) -> &UpdateImages<'a> {
        &self.images
    }

    pub fn outcomes(&self) -> &S {
        &self.outcomes
    }

    fn on_vad_edge(&mut self, _event: &InterruptEvent) {
        self.vad.on_falling_edge(&mut self.coproc);
    }

    fn on_vad_timeout(&mut self, _event: &InterruptEvent) {
        self.vad.on_timeout(&mut self.coproc);
    }

    fn on_command(&mut self, event: &InterruptEvent) {
        let outcome = match OperatorCommand::from_event(event) {
            Some(command) => self.execute(command),
            None => {
                log_warn!("Malformed command event");
                CommandOutcome::Malformed
            }
        };
        self.outcomes.publish(outcome);
    }

    /// Run one operator command to completion
    pub fn execute(&mut self, command: OperatorCommand) -> CommandOutcome {
        let result = match command {
            OperatorCommand::Version => self
                .coproc
                .version()
                .map(CommandOutcome::Version)
                .map_err(|e| e.reason()),
            OperatorCommand::Reset => {
                self.coproc.reset();
                Ok(CommandOutcome::Reset)
            }
            OperatorCommand::Handshake => {
                if self.coproc.handshake() {
                    Ok(CommandOutcome::Handshake)
                } else {
                    Err("handshake failed")
                }
            }
            OperatorCommand::EnableI2s => self
                .coproc
                .enable_i2s()
                .map(|()| CommandOutcome::I2sEnabled)
                .map_err(|e| e.reason()),
            OperatorCommand::DisableI2s => self
                .coproc
                .disable_i2s()
                .map(|()| CommandOutcome::I2sDisabled)
                .map_err(|e| e.reason()),
            OperatorCommand::MicState => self
                .coproc
                .mic_state()
                .map(CommandOutcome::MicState)
                .map_err(|e| e.reason()),
            OperatorCommand::StartI2s => self
                .coproc
                .start_i2s()
                .map(|()| CommandOutcome::I2sStarted)
                .map_err(|e| e.reason()),
            OperatorCommand::Update(index) => self
                .update(usize::from(index))
                .map(CommandOutcome::Update)
                .map_err(|e| e.reason()),
        };

        result.unwrap_or_else(|reason| {
            log_warn!("Command failed: {}", reason);
            CommandOutcome::failed(command, reason)
        })
    }

    /// Flash catalog entry `index`
    pub fn update(&mut self, index: usize) -> Result<UpdateOutcome, UpdateError> {
        let entry = *self
            .images
            .catalog
            .get(index)
            .ok_or(UpdateError::Image(ImageError::UnknownFirmware))?;

        log_info!("Update with firmware '{}'", entry.name);
        self.coproc.update(
            &self.current_version,
            self.images.boot,
            entry.data,
            &mut self.vad,
        )
    }

    /// Flash the catalog entry called `name`
    pub fn update_by_name(&mut self, name: &str) -> Result<UpdateOutcome, UpdateError> {
        let index = self.images.catalog.index_of(name)?;
        self.update(index)
    }
}

impl<B: Board, S> BusContext for VoiceService<'_, B, S> {
    fn rearm_source(&mut self, kind: EventKind) {
        if kind == EventKind::VadFallingEdge {
            self.vad.rearm();
        }
    }
}
