//! Embassy async tasks
//!
//! The edge watcher and VAD timer run on the interrupt-priority executor
//! and only ever post to the event queue. Everything that touches I2C runs
//! on the bus worker in thread mode.

pub mod bus_worker;
pub mod capture;
pub mod vad_edge;
pub mod vad_timer;

pub use bus_worker::{bus_worker_task, LogOutcomes, Service, VoiceBus};
pub use capture::capture_task;
pub use vad_edge::vad_edge_task;
pub use vad_timer::vad_timer_task;
