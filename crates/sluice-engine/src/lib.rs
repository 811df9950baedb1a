//! Cross-thread command transport and simulation tick driver.
//!
//! Producers enqueue fixed-size command records into a bounded,
//! arena-backed input queue. Once per tick the driver moves the input
//! queue's contents into a processing queue in one short critical
//! section, then dispatches them to a [`Simulation`](sluice_core::Simulation)
//! without holding up producers.
//!
//! Use [`SimulationThread`] to run a driver on its own thread, or drive a
//! [`TickDriver`] by hand with [`TickDriver::run_tick`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod control;
pub mod metrics;
pub mod queue;
pub mod realtime;
pub mod simulation;
pub mod tick;
pub mod transport;

pub use config::{ConfigError, DriverConfig, TransportConfig};
pub use control::{RunControl, RunState};
pub use metrics::{MetricsSnapshot, TickReport, TransportMetrics};
pub use queue::{CommandQueue, ProcessingBatch};
pub use realtime::{ShutdownReport, SimulationThread};
pub use simulation::GridWorld;
pub use tick::{StepMode, TickDriver};
pub use transport::{CommandSender, CommandTransport};
