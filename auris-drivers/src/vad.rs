//! VAD capture controller
//!
//! Runs the [`VadSession`] decisions against real peripherals:
//!
//! ```text
//!   falling edge ──► enable coproc I2S, start capture, arm timer, LED on
//!                    (or restart the timer if already capturing)
//!                    re-arm the edge interrupt
//!
//!   timer expiry ──► voice pin still active? restart the timer
//!                    otherwise disable coproc I2S, stop capture, LED off
//! ```
//!
//! Handlers run on the bus worker. The edge interrupt masks itself before
//! posting its event; [`VadController::on_falling_edge`] is what unmasks it.

use auris_core::config::AurisConfig;
use auris_core::vad::{VadAction, VadSession, VadState, VAD_TIMEOUT_BASE_MS};
use auris_hal::{CaptureControl, I2cBus, InputPin, InterruptLine, OneShotTimer, OutputPin};
use embedded_hal::delay::DelayNs;

use crate::coproc::{Coprocessor, TransportError, UpdateGuard};

/// Coprocessor I2S switch used by the controller
pub trait I2sOutput {
    fn enable_i2s(&mut self) -> Result<(), TransportError>;
    fn disable_i2s(&mut self) -> Result<(), TransportError>;
}

impl<I: I2cBus, P: OutputPin, D: DelayNs> I2sOutput for Coprocessor<I, P, D> {
    fn enable_i2s(&mut self) -> Result<(), TransportError> {
        Coprocessor::enable_i2s(self)
    }

    fn disable_i2s(&mut self) -> Result<(), TransportError> {
        Coprocessor::disable_i2s(self)
    }
}

/// Controller tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VadSettings {
    /// Capture window, restarted on every edge and every voiced expiry
    pub window_ms: i32,
    /// Voice pin reads low while voice is present
    pub voice_active_low: bool,
    /// Indicator lights when driven low
    pub indicator_active_low: bool,
}

impl Default for VadSettings {
    fn default() -> Self {
        Self {
            window_ms: VAD_TIMEOUT_BASE_MS,
            voice_active_low: true,
            indicator_active_low: false,
        }
    }
}

impl VadSettings {
    pub fn from_config(config: &AurisConfig) -> Self {
        Self {
            window_ms: config.coproc.vad_timeout_ms,
            voice_active_low: config.pins.voice.inverted,
            indicator_active_low: config.pins.indicator.inverted,
        }
    }

    fn window(&self) -> u32 {
        self.window_ms.unsigned_abs()
    }
}

/// VAD-driven capture
pub struct VadController<Q, C, T, V, L> {
    irq: Q,
    capture: C,
    timer: T,
    voice: V,
    indicator: L,
    session: VadSession,
    settings: VadSettings,
}

impl<Q, C, T, V, L> VadController<Q, C, T, V, L>
where
    Q: InterruptLine,
    C: CaptureControl,
    T: OneShotTimer,
    V: InputPin,
    L: OutputPin,
{
    /// Create an idle controller with the indicator off
    ///
    /// The edge interrupt stays masked until [`arm`](Self::arm).
    pub fn new(irq: Q, capture: C, timer: T, voice: V, indicator: L, settings: VadSettings) -> Self {
        let mut this = Self {
            irq,
            capture,
            timer,
            voice,
            indicator,
            session: VadSession::new(),
            settings,
        };
        this.set_indicator(false);
        this
    }

    /// Start listening for VAD edges
    pub fn arm(&mut self) {
        self.irq.enable_falling_edge();
    }

    /// Unmask the edge interrupt after a dropped edge event
    pub fn rearm(&mut self) {
        self.irq.enable_falling_edge();
    }

    pub fn state(&self) -> VadState {
        self.session.state()
    }

    pub fn session(&self) -> &VadSession {
        &self.session
    }

    pub fn settings(&self) -> &VadSettings {
        &self.settings
    }

    pub fn is_armed(&self) -> bool {
        self.irq.is_enabled()
    }

    pub fn is_indicator_on(&self) -> bool {
        self.indicator.is_set_high() != self.settings.indicator_active_low
    }

    fn set_indicator(&mut self, on: bool) {
        self.indicator.set_state(on != self.settings.indicator_active_low);
    }

    /// Handle a VAD falling edge
    ///
    /// A coprocessor I2S failure is logged and capture goes ahead. If local
    /// capture cannot start, no session begins. The edge interrupt is
    /// re-armed in every case.
    pub fn on_falling_edge(&mut self, i2s: &mut impl I2sOutput) {
        let window = self.settings.window_ms;
        match self.session.on_falling_edge() {
            VadAction::StartCapture => {
                log_info!("Voice detected, starting capture");
                if let Err(_e) = i2s.enable_i2s() {
                    log_warn!("Coprocessor I2S enable failed: {}", _e.reason());
                }
                match self.capture.start() {
                    Ok(()) => {
                        self.set_indicator(true);
                        self.timer.start(self.settings.window());
                        self.session.capture_started(window);
                    }
                    Err(_e) => {
                        log_error!("Capture start failed: {}", _e.reason());
                    }
                }
            }
            VadAction::RestartTimer => {
                self.timer.start(self.settings.window());
                self.session.timer_restarted(window);
            }
            VadAction::StopCapture | VadAction::Ignore => {}
        }
        self.irq.enable_falling_edge();
    }

    /// Handle expiry of the capture window
    pub fn on_timeout(&mut self, i2s: &mut impl I2sOutput) {
        let window = self.settings.window_ms;
        let active_low = self.settings.voice_active_low;
        let voice = &mut self.voice;
        let action = self
            .session
            .on_timeout(|| if active_low { voice.is_low() } else { voice.is_high() });

        match action {
            VadAction::RestartTimer => {
                log_debug!("Voice still present, extending capture");
                self.timer.start(self.settings.window());
                self.session.timer_restarted(window);
            }
            VadAction::StopCapture => {
                log_info!("Voice gone, stopping capture");
                if let Err(_e) = i2s.disable_i2s() {
                    log_warn!("Coprocessor I2S disable failed: {}", _e.reason());
                }
                self.stop_session();
            }
            VadAction::StartCapture | VadAction::Ignore => {}
        }
    }

    fn stop_session(&mut self) {
        if let Err(_e) = self.capture.stop() {
            log_warn!("Capture stop failed: {}", _e.reason());
        }
        self.set_indicator(false);
        self.session.capture_stopped();
    }
}

impl<Q, C, T, V, L> UpdateGuard for VadController<Q, C, T, V, L>
where
    Q: InterruptLine,
    C: CaptureControl,
    T: OneShotTimer,
    V: InputPin,
    L: OutputPin,
{
    /// Mask the edge interrupt and end any session
    fn suspend(&mut self) {
        self.irq.disable();
        if self.session.is_i2s_active() {
            self.timer.stop();
            self.stop_session();
        } else if self.capture.is_running() {
            if let Err(_e) = self.capture.stop() {
                log_warn!("Capture stop failed: {}", _e.reason());
            }
        }
    }

    /// Unmask the edge interrupt; capture restarts on the next edge
    fn resume(&mut self) {
        self.irq.enable_falling_edge();
    }
}
