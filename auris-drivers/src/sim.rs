//! Test doubles: a simulated coprocessor and recording fakes
//!
//! Everything is `Rc`-shared so a test can keep a handle after moving the
//! double into the code under test.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::vec::Vec;

use auris_core::image::{BootImageHeader, Version, FLASH_BLOCK_LEN};
use auris_hal::{CaptureControl, CaptureError, I2cBus, I2cError, InputPin, InterruptLine, OneShotTimer, OutputPin};
use embedded_hal::delay::DelayNs;

use crate::coproc::regs::{boot, cmd, reg};
use crate::coproc::TransportError;
use crate::vad::I2sOutput;

/// Boot image bytes wrapping the two stage payloads
pub fn boot_image(stage1: &[u8], stage2: &[u8], checksum: u32) -> Vec<u8> {
    let header = BootImageHeader {
        stage1_size: stage1.len() as u32,
        stage2_size: stage2.len() as u32,
        stage2_checksum: checksum,
        ..Default::default()
    };
    let mut bytes = header.encode().to_vec();
    bytes.extend_from_slice(stage1);
    bytes.extend_from_slice(stage2);
    bytes
}

/// Deterministic filler payload
pub fn pattern(len: usize, seed: u8) -> Vec<u8> {
    (0..len)
        .map(|i| (i as u8).wrapping_mul(7).wrapping_add(seed))
        .collect()
}

/// Delay that records each millisecond request instead of sleeping
#[derive(Clone, Default)]
pub struct RecordingDelay {
    calls: Rc<RefCell<Vec<u32>>>,
}

impl RecordingDelay {
    pub fn calls(&self) -> Vec<u32> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, ms: u32) -> usize {
        self.calls.borrow().iter().filter(|&&c| c == ms).count()
    }

    pub fn total_ms(&self) -> u64 {
        self.calls.borrow().iter().map(|&c| u64::from(c)).sum()
    }
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.calls.borrow_mut().push(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.calls.borrow_mut().push(ms);
    }
}

/// Bootloader protocol position of the simulated chip
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    App,
    Stage1Size,
    Stage1Data,
    Stage1Run,
    Stage2Knock,
    Stage2Checksum,
    Stage2Size,
    Stage2Data,
    Stage2Run,
    FlashOffset,
    FlashSize,
    FlashBlock,
    FlashData,
    Done,
}

struct ChipState {
    data_addr: u8,
    cmd_addr: u8,
    regs: [u8; 256],
    version: Version,
    mic: u8,
    responsive: bool,
    stall_at: Option<Phase>,
    withhold_next_block: bool,
    phase: Phase,
    knocks: usize,
    i2s_on: bool,
    expected: usize,
    received: usize,
    stage2_checksum: u32,
    flash_header: [u32; 3],
    chunks: Vec<(Phase, usize)>,
    payload: Vec<(Phase, Vec<u8>)>,
    irq_probe: Option<Rc<Cell<bool>>>,
    irq_enabled_in_stage2: bool,
    stage2_writes: usize,
}

fn le32(bytes: &[u8]) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[..4]);
    u32::from_le_bytes(raw)
}

impl ChipState {
    fn set(&mut self, register: u8, value: u8) {
        if self.stall_at.is_some_and(|p| self.phase >= p) {
            return;
        }
        self.regs[register as usize] = value;
    }

    fn take_payload(&mut self, phase: Phase, bytes: &[u8]) {
        self.chunks.push((phase, bytes.len()));
        match self.payload.last_mut() {
            Some((p, data)) if *p == phase => data.extend_from_slice(bytes),
            _ => self.payload.push((phase, bytes.to_vec())),
        }
        self.received += bytes.len();
    }

    fn on_data(&mut self, bytes: &[u8]) {
        match self.phase {
            Phase::App => {
                if bytes == [boot::HANDSHAKE] {
                    self.knocks += 1;
                    if self.responsive {
                        self.set(reg::STATUS, boot::HANDSHAKE_ACK);
                        self.phase = Phase::Stage1Size;
                    }
                }
            }
            Phase::Stage1Size => {
                if bytes == [boot::HANDSHAKE] {
                    self.knocks += 1;
                } else {
                    self.expected = le32(bytes) as usize;
                    self.received = 0;
                    self.phase = Phase::Stage1Data;
                }
            }
            Phase::Stage1Data => {
                self.take_payload(Phase::Stage1Data, bytes);
                if self.received >= self.expected {
                    self.phase = Phase::Stage1Run;
                    self.set(reg::PROGRESS, boot::RECEIVED);
                }
            }
            Phase::Stage1Run => {
                if bytes == [boot::RUN_STAGE1] {
                    self.phase = Phase::Stage2Knock;
                    self.set(reg::STATUS, boot::STAGE_ACK);
                }
            }
            Phase::Stage2Knock => {
                if bytes == [boot::HANDSHAKE] {
                    self.knocks += 1;
                    self.phase = Phase::Stage2Checksum;
                    self.set(reg::STATUS, boot::HANDSHAKE_ACK);
                }
            }
            Phase::Stage2Checksum => {
                self.stage2_checksum = le32(bytes);
                self.phase = Phase::Stage2Size;
            }
            Phase::Stage2Size => {
                self.expected = le32(bytes) as usize;
                self.received = 0;
                self.regs[reg::PROGRESS as usize] = 0;
                self.phase = Phase::Stage2Data;
            }
            Phase::Stage2Data => {
                self.stage2_writes += 1;
                if self.irq_probe.as_ref().is_some_and(|p| p.get()) {
                    self.irq_enabled_in_stage2 = true;
                }
                self.take_payload(Phase::Stage2Data, bytes);
                if self.received >= self.expected {
                    self.phase = Phase::Stage2Run;
                    self.set(reg::PROGRESS, boot::RECEIVED);
                }
            }
            Phase::Stage2Run => {
                if bytes == [boot::RUN_STAGE2] {
                    self.phase = Phase::FlashOffset;
                    self.regs[reg::PROGRESS as usize] = 0;
                    self.set(reg::STATUS, boot::STAGE_ACK);
                }
            }
            Phase::FlashOffset => {
                self.flash_header[0] = le32(bytes);
                self.phase = Phase::FlashSize;
            }
            Phase::FlashSize => {
                self.flash_header[1] = le32(bytes);
                self.expected = self.flash_header[1] as usize;
                self.phase = Phase::FlashBlock;
            }
            Phase::FlashBlock => {
                self.flash_header[2] = le32(bytes);
                self.received = 0;
                self.phase = Phase::FlashData;
                self.set(reg::PROGRESS, boot::FLASH_READY);
            }
            Phase::FlashData => {
                self.regs[reg::PROGRESS as usize] = 0;
                self.take_payload(Phase::FlashData, bytes);
                if self.received >= self.expected {
                    self.phase = Phase::Done;
                    self.set(reg::PROGRESS, boot::RECEIVED);
                } else if self.received % FLASH_BLOCK_LEN == 0 && !self.withhold_next_block {
                    self.set(reg::PROGRESS, boot::NEXT_BLOCK);
                }
            }
            Phase::Done => {}
        }
    }

    fn on_command(&mut self, bytes: &[u8]) {
        if bytes.len() != 2 || bytes[0] != reg::CONTROL {
            return;
        }
        match bytes[1] {
            cmd::QUERY_VERSION => {
                for (register, value) in reg::VERSION.into_iter().zip(self.version.0) {
                    self.regs[register as usize] = value;
                }
            }
            cmd::QUERY_MIC_STATE => self.regs[reg::STATUS as usize] = self.mic,
            cmd::ENABLE_I2S => self.i2s_on = true,
            cmd::DISABLE_I2S => self.i2s_on = false,
            _ => {}
        }
    }
}

/// Simulated coprocessor speaking the bootloader protocol
#[derive(Clone)]
pub struct SimChip {
    state: Rc<RefCell<ChipState>>,
}

impl SimChip {
    fn build(responsive: bool) -> Self {
        Self {
            state: Rc::new(RefCell::new(ChipState {
                data_addr: 0x36,
                cmd_addr: 0x2F,
                regs: [0; 256],
                version: Version::default(),
                mic: 1,
                responsive,
                stall_at: None,
                withhold_next_block: false,
                phase: Phase::App,
                knocks: 0,
                i2s_on: false,
                expected: 0,
                received: 0,
                stage2_checksum: 0,
                flash_header: [0; 3],
                chunks: Vec::new(),
                payload: Vec::new(),
                irq_probe: None,
                irq_enabled_in_stage2: false,
                stage2_writes: 0,
            })),
        }
    }

    /// Chip whose bootloader answers every step
    pub fn responsive() -> Self {
        Self::build(true)
    }

    /// Chip that accepts writes but never answers a knock
    pub fn silent() -> Self {
        Self::build(false)
    }

    pub fn with_version(self, version: Version) -> Self {
        self.state.borrow_mut().version = version;
        self
    }

    /// Stop acknowledging once the protocol reaches `phase`
    pub fn stall_at(self, phase: Phase) -> Self {
        self.state.borrow_mut().stall_at = Some(phase);
        self
    }

    /// Flash writer never asks for the block after the first
    pub fn withhold_next_block(self) -> Self {
        self.state.borrow_mut().withhold_next_block = true;
        self
    }

    /// Sample `probe` (interrupt enabled?) on every stage 2 write
    pub fn watch_irq(self, probe: Rc<Cell<bool>>) -> Self {
        self.state.borrow_mut().irq_probe = Some(probe);
        self
    }

    pub fn phase(&self) -> Phase {
        self.state.borrow().phase
    }

    pub fn knocks(&self) -> usize {
        self.state.borrow().knocks
    }

    pub fn i2s_on(&self) -> bool {
        self.state.borrow().i2s_on
    }

    /// Lengths of each payload write in `phase`
    pub fn chunk_lens(&self, phase: Phase) -> Vec<usize> {
        self.state
            .borrow()
            .chunks
            .iter()
            .filter(|(p, _)| *p == phase)
            .map(|(_, len)| *len)
            .collect()
    }

    /// Bytes received in `phase`
    pub fn payload(&self, phase: Phase) -> Vec<u8> {
        self.state
            .borrow()
            .payload
            .iter()
            .filter(|(p, _)| *p == phase)
            .flat_map(|(_, data)| data.iter().copied())
            .collect()
    }

    pub fn stage2_checksum(&self) -> u32 {
        self.state.borrow().stage2_checksum
    }

    /// Offset, size and block size announced for the flash image
    pub fn flash_header(&self) -> [u32; 3] {
        self.state.borrow().flash_header
    }

    pub fn stage2_writes(&self) -> usize {
        self.state.borrow().stage2_writes
    }

    pub fn irq_enabled_in_stage2(&self) -> bool {
        self.state.borrow().irq_enabled_in_stage2
    }
}

impl I2cBus for SimChip {
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), I2cError> {
        let mut s = self.state.borrow_mut();
        if address == s.data_addr {
            s.on_data(data);
            Ok(())
        } else if address == s.cmd_addr {
            s.on_command(data);
            Ok(())
        } else {
            Err(I2cError::Nack)
        }
    }

    fn read(&mut self, _address: u8, buf: &mut [u8]) -> Result<(), I2cError> {
        buf.fill(0);
        Ok(())
    }

    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), I2cError> {
        let s = self.state.borrow();
        if address != s.cmd_addr || write_data.len() != 1 {
            return Err(I2cError::Nack);
        }
        let value = s.regs[write_data[0] as usize];
        read_buf.fill(value);
        Ok(())
    }
}

/// Side effect observed by the fakes, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    I2sEnable,
    I2sDisable,
    CaptureStart,
    CaptureStop,
    TimerStart(u32),
    TimerStop,
    IrqEnable,
    IrqDisable,
    Indicator(bool),
}

pub type Journal = Rc<RefCell<Vec<Op>>>;

pub fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

/// Coprocessor I2S switch
pub struct FakeI2s {
    pub journal: Journal,
    pub fail_enable: bool,
    pub fail_disable: bool,
}

impl FakeI2s {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            fail_enable: false,
            fail_disable: false,
        }
    }
}

impl I2sOutput for FakeI2s {
    fn enable_i2s(&mut self) -> Result<(), TransportError> {
        self.journal.borrow_mut().push(Op::I2sEnable);
        if self.fail_enable {
            Err(TransportError::Bus(I2cError::Nack))
        } else {
            Ok(())
        }
    }

    fn disable_i2s(&mut self) -> Result<(), TransportError> {
        self.journal.borrow_mut().push(Op::I2sDisable);
        if self.fail_disable {
            Err(TransportError::Bus(I2cError::Nack))
        } else {
            Ok(())
        }
    }
}

pub struct FakeCapture {
    journal: Journal,
    running: bool,
    pub fail_start: Rc<Cell<bool>>,
}

impl FakeCapture {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            running: false,
            fail_start: Rc::new(Cell::new(false)),
        }
    }
}

impl CaptureControl for FakeCapture {
    fn start(&mut self) -> Result<(), CaptureError> {
        self.journal.borrow_mut().push(Op::CaptureStart);
        if self.fail_start.get() {
            return Err(CaptureError::NotReady);
        }
        self.running = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        self.journal.borrow_mut().push(Op::CaptureStop);
        self.running = false;
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

pub struct FakeTimer {
    journal: Journal,
}

impl FakeTimer {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
        }
    }
}

impl OneShotTimer for FakeTimer {
    fn start(&mut self, ms: u32) {
        self.journal.borrow_mut().push(Op::TimerStart(ms));
    }

    fn stop(&mut self) {
        self.journal.borrow_mut().push(Op::TimerStop);
    }
}

pub struct FakeIrq {
    journal: Journal,
    enabled: Rc<Cell<bool>>,
}

impl FakeIrq {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            enabled: Rc::new(Cell::new(false)),
        }
    }

    /// Shared view of the enabled flag
    pub fn probe(&self) -> Rc<Cell<bool>> {
        self.enabled.clone()
    }
}

impl InterruptLine for FakeIrq {
    fn enable_falling_edge(&mut self) {
        self.journal.borrow_mut().push(Op::IrqEnable);
        self.enabled.set(true);
    }

    fn disable(&mut self) {
        self.journal.borrow_mut().push(Op::IrqDisable);
        self.enabled.set(false);
    }

    fn is_enabled(&self) -> bool {
        self.enabled.get()
    }
}

/// Input whose level the test drives
#[derive(Clone)]
pub struct FakeLevel {
    high: Rc<Cell<bool>>,
}

impl FakeLevel {
    pub fn new(high: bool) -> Self {
        Self {
            high: Rc::new(Cell::new(high)),
        }
    }

    pub fn set_high(&self, high: bool) {
        self.high.set(high);
    }
}

impl InputPin for FakeLevel {
    fn is_high(&mut self) -> bool {
        self.high.get()
    }
}

pub struct FakeIndicator {
    journal: Journal,
    high: bool,
}

impl FakeIndicator {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            high: false,
        }
    }
}

impl OutputPin for FakeIndicator {
    fn set_high(&mut self) {
        self.journal.borrow_mut().push(Op::Indicator(true));
        self.high = true;
    }

    fn set_low(&mut self) {
        self.journal.borrow_mut().push(Op::Indicator(false));
        self.high = false;
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

/// Power switch that only tracks its level
#[derive(Default)]
pub struct FakePower {
    high: bool,
}

impl OutputPin for FakePower {
    fn set_high(&mut self) {
        self.high = true;
    }

    fn set_low(&mut self) {
        self.high = false;
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}
