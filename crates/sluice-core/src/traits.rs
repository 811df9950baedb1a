//! The dispatch seam between the tick driver and simulation state.

use crate::error::SimError;
use crate::id::{CellCoord, EntityId, StepId};

/// Simulation state mutated by drained commands.
///
/// The tick driver calls these from inside a processing batch, while the
/// processing queue's lock is held. Implementations must return quickly:
/// a slow handler stalls the producer's next push for the length of the
/// batch.
///
/// Step control (`Play`, `Pause`, `Advance`) is handled by the driver and
/// surfaces here only as calls to [`step`](Simulation::step).
pub trait Simulation: Send {
    /// Apply a signed height delta to a terrain cell.
    fn apply_terrain_edit(&mut self, cell: CellCoord, delta: i32) -> Result<(), SimError>;

    /// Move an entity to a target cell.
    fn move_entity(&mut self, entity: EntityId, target: CellCoord) -> Result<(), SimError>;

    /// Advance the simulation by one step. `step` is the new step number.
    fn step(&mut self, step: StepId);
}
