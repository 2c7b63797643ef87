//! Auris firmware entry point
//!
//! Brings up the coprocessor link and the VAD pins, hands the voice
//! service to the event bus worker, and starts the interrupt-priority
//! producers that feed it.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_rp::gpio::{Input, Level, Output};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_time::{Delay, Instant, Timer};
use {defmt_rtt as _, panic_probe as _};

use auris_core::bus::EventBus;
use auris_core::command::OperatorCommand;
use auris_core::config::AurisConfig;
use auris_core::image::FirmwareCatalog;
use auris_drivers::coproc::Coprocessor;
use auris_drivers::service::UpdateImages;
use auris_drivers::vad::{VadController, VadSettings};
use auris_hal::{EhI2c, EhInput, EhOutput};

mod board;
mod channels;
mod config;
mod images;
mod tasks;

use board::{CaptureSwitch, SignalIrqLine, SignalTimer};
use channels::EVENT_QUEUE;
use tasks::{LogOutcomes, Service};

/// Executor for the edge watcher and VAD timer
///
/// Runs from a software interrupt so both keep running while the bus
/// worker is blocked in an I2C transfer or an update.
static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    unsafe { EXECUTOR_HIGH.on_interrupt() }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Auris firmware starting...");

    let p = embassy_rp::init(Default::default());

    let config = config::load_config();
    board::check_wiring(&config);
    let pins = config.pins;
    info!(
        "Coprocessor at data 0x{:02x} / cmd 0x{:02x}, {} Hz",
        config.coproc.data_addr, config.coproc.cmd_addr, config.coproc.i2c_frequency
    );

    // Coprocessor link
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = config.coproc.i2c_frequency;
    let i2c = I2c::new_blocking(p.I2C1, p.PIN_3, p.PIN_2, i2c_config);
    let power = Output::new(p.PIN_6, Level::High);
    let coproc = Coprocessor::new(
        EhI2c::new(i2c),
        EhOutput::new(power, true),
        Delay,
        &config.coproc,
    );

    // VAD pins
    let vad_irq = Input::new(p.PIN_7, board::pull(&pins.vad_irq));
    let voice = Input::new(p.PIN_8, board::pull(&pins.voice));
    let indicator_idle = board::idle_level(&pins.indicator);
    let indicator = Output::new(p.PIN_25, indicator_idle);
    let vad = VadController::new(
        SignalIrqLine,
        CaptureSwitch::default(),
        SignalTimer,
        EhInput::new(voice),
        EhOutput::new(indicator, indicator_idle == Level::High),
        VadSettings::from_config(&config),
    );

    let images = UpdateImages {
        boot: images::BOOT_IMAGE,
        catalog: images::catalog(),
    };
    let boot_update = boot_update(&config, &images.catalog);

    let service = Service::new(coproc, vad, images, &config, LogOutcomes);
    let mut bus = EventBus::new(&EVENT_QUEUE, service).unwrap();
    Service::attach(&mut bus).unwrap();
    bus.context_mut().arm();

    // Producers preempt the worker
    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let spawner_high = EXECUTOR_HIGH.start(interrupt::SWI_IRQ_1);
    spawner_high.spawn(tasks::vad_edge_task(vad_irq)).unwrap();
    spawner_high.spawn(tasks::vad_timer_task()).unwrap();

    spawner.spawn(tasks::capture_task()).unwrap();

    // Boot commands go through the worker like any other
    post(OperatorCommand::Version);
    if let Some(index) = boot_update {
        post(OperatorCommand::Update(index));
    }

    spawner.spawn(tasks::bus_worker_task(bus)).unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

/// Catalog index of the firmware named in `[update]`
fn boot_update(config: &AurisConfig, catalog: &FirmwareCatalog<'_>) -> Option<u8> {
    let name = config.update.firmware.as_ref()?;
    match catalog.index_of(name) {
        Ok(index) => match u8::try_from(index) {
            Ok(index) => {
                info!("Boot update requested: {}", name.as_str());
                Some(index)
            }
            Err(_) => None,
        },
        Err(e) => {
            warn!("Boot update '{}' skipped: {}", name.as_str(), e.reason());
            None
        }
    }
}

fn post(command: OperatorCommand) {
    if let Err(e) = EVENT_QUEUE.send(command.to_event(Instant::now().as_millis())) {
        warn!("Command {} not queued: {}", command, e.reason());
    }
}
