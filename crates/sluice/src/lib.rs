//! Sluice: an arena-backed, cross-thread command transport for real-time
//! simulations.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Sluice sub-crates. For most users, adding `sluice` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use sluice::prelude::*;
//!
//! let transport = CommandTransport::new(&TransportConfig::for_commands(16)).unwrap();
//! let config = DriverConfig { start_paused: true, ..DriverConfig::default() };
//! let mut driver = TickDriver::new(&config, transport, GridWorld::new(8, 8)).unwrap();
//!
//! let tx = driver.sender();
//! tx.send(&Command::TerrainEdit { cell: CellCoord::new(2, 3), delta: 4 }).unwrap();
//! tx.send(&Command::Step(StepControl::Advance { steps: 2 })).unwrap();
//!
//! let report = driver.run_tick();
//! assert_eq!(report.dispatched, 2);
//! assert_eq!(report.steps_advanced, 2);
//! assert_eq!(driver.simulation().height_at(CellCoord::new(2, 3)), Some(4));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `sluice-core` | Commands, wire codec, IDs, errors, `Simulation` trait |
//! | [`arena`] | `sluice-arena` | Byte arena and slot index |
//! | [`engine`] | `sluice-engine` | Queues, transport, tick driver, simulation thread |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`sluice-core`).
pub use sluice_core as types;

/// Fixed-capacity payload storage (`sluice-arena`).
///
/// Only needed when working below [`engine::CommandQueue`].
pub use sluice_arena as arena;

/// Queues, transport, and tick driving (`sluice-engine`).
///
/// [`engine::TickDriver`] for manual ticking,
/// [`engine::SimulationThread`] for a background tick loop.
pub use sluice_engine as engine;

/// Common imports for typical Sluice usage.
///
/// ```rust
/// use sluice::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use sluice_core::{CellCoord, Command, EntityId, Simulation, StepControl, StepId, TickId};

    // Errors
    pub use sluice_core::{DecodeError, PushError, SimError, TransferError};

    // Engine
    pub use sluice_engine::{
        CommandSender, CommandTransport, ConfigError, DriverConfig, GridWorld, SimulationThread,
        TickDriver, TickReport, TransportConfig,
    };
}
