//! Test utilities and mock simulations for Sluice development.
//!
//! [`RecordingSimulation`] logs every call the tick driver makes so tests
//! can assert on dispatch order. [`CommandGenerator`] produces seeded
//! random command streams for stress tests and benches.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod generator;

pub use generator::CommandGenerator;

use sluice_core::{CellCoord, EntityId, SimError, Simulation, StepId};

/// One call received by a [`RecordingSimulation`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimCall {
    TerrainEdit { cell: CellCoord, delta: i32 },
    Move { entity: EntityId, target: CellCoord },
    Step(StepId),
}

/// A [`Simulation`] that records accepted calls instead of simulating.
///
/// Moves of entities registered with [`rejecting`](Self::rejecting) fail
/// with [`SimError::UnknownEntity`] and are not recorded.
#[derive(Clone, Debug, Default)]
pub struct RecordingSimulation {
    calls: Vec<SimCall>,
    rejected: Vec<EntityId>,
}

impl RecordingSimulation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse every move of `entity`.
    pub fn rejecting(mut self, entity: EntityId) -> Self {
        self.rejected.push(entity);
        self
    }

    pub fn calls(&self) -> &[SimCall] {
        &self.calls
    }

    /// Step calls only, in order.
    pub fn steps(&self) -> Vec<StepId> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                SimCall::Step(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    /// Every call except steps, in order.
    pub fn commands(&self) -> Vec<SimCall> {
        self.calls
            .iter()
            .filter(|c| !matches!(c, SimCall::Step(_)))
            .copied()
            .collect()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl Simulation for RecordingSimulation {
    fn apply_terrain_edit(&mut self, cell: CellCoord, delta: i32) -> Result<(), SimError> {
        self.calls.push(SimCall::TerrainEdit { cell, delta });
        Ok(())
    }

    fn move_entity(&mut self, entity: EntityId, target: CellCoord) -> Result<(), SimError> {
        if self.rejected.contains(&entity) {
            return Err(SimError::UnknownEntity { entity });
        }
        self.calls.push(SimCall::Move { entity, target });
        Ok(())
    }

    fn step(&mut self, step: StepId) {
        self.calls.push(SimCall::Step(step));
    }
}
