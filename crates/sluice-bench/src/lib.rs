//! Benchmark profiles for the Sluice command transport.
//!
//! - [`reference_stream`]: a seeded command stream sized to one full queue
//! - [`reference_world`]: a [`GridWorld`] that accepts every command in that stream
//! - [`reference_driver`]: a paused driver over the reference world

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use sluice_core::{CellCoord, Command, EntityId};
use sluice_engine::{CommandTransport, DriverConfig, GridWorld, TickDriver, TransportConfig};
use sluice_test_utils::CommandGenerator;

/// Grid side length of the reference world.
pub const GRID: u32 = 64;

/// Entities spawned into the reference world.
pub const ENTITIES: u64 = 32;

/// Commands per reference batch; matches the default queue capacity.
pub const BATCH: usize = TransportConfig::DEFAULT_MAX_COMMANDS;

/// `n` commands from the reference generator.
pub fn reference_stream(seed: u64, n: usize) -> Vec<Command> {
    CommandGenerator::new(seed, GRID, GRID, ENTITIES).batch(n)
}

/// A `GRID × GRID` world with [`ENTITIES`] entities along the top row.
pub fn reference_world() -> GridWorld {
    let mut world = GridWorld::new(GRID, GRID);
    for id in 0..ENTITIES {
        let x = (id % u64::from(GRID)) as i32;
        // Every id is below GRID, so the spawn cannot fail.
        let _ = world.spawn(EntityId(id), CellCoord::new(x, 0));
    }
    world
}

/// A paused driver over [`reference_world`] with default capacities.
pub fn reference_driver() -> TickDriver<GridWorld> {
    let config = DriverConfig {
        start_paused: true,
        ..DriverConfig::default()
    };
    match CommandTransport::new(&TransportConfig::default())
        .and_then(|transport| TickDriver::new(&config, transport, reference_world()))
    {
        Ok(driver) => driver,
        Err(e) => panic!("reference driver config invalid: {e}"),
    }
}
