//! The command sum type carried by the transport.

use crate::id::{CellCoord, EntityId};

/// One discrete intent to mutate simulation state.
///
/// Produced on the view/input thread, consumed on the simulation thread.
/// Every variant holds plain value data so that a byte copy of the
/// encoded record is a complete, self-contained command.
///
/// # Examples
///
/// ```
/// use sluice_core::{CellCoord, Command, EntityId, StepControl};
///
/// let edit = Command::TerrainEdit {
///     cell: CellCoord::new(1, 2),
///     delta: 1,
/// };
/// let mv = Command::EntityMove {
///     entity: EntityId(5),
///     target: CellCoord::new(3, 3),
/// };
/// let pause = Command::Step(StepControl::Pause);
///
/// assert_eq!(edit.kind_name(), "terrain_edit");
/// assert_eq!(mv.kind_name(), "entity_move");
/// assert_eq!(pause.kind_name(), "step_pause");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Raise or lower the terrain height at a cell.
    TerrainEdit {
        /// The target cell.
        cell: CellCoord,
        /// Signed height delta.
        delta: i32,
    },
    /// Move an entity to a target cell.
    ///
    /// Rejected by the simulation if `entity` is unknown or `target`
    /// is out of bounds.
    EntityMove {
        /// The entity to move.
        entity: EntityId,
        /// The destination cell.
        target: CellCoord,
    },
    /// Step control: play, pause, or advance a batch of steps.
    Step(StepControl),
}

/// Step-control intents consumed by the tick driver itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepControl {
    /// Advance the simulation by `steps` steps on the next tick,
    /// in addition to any auto-run step.
    Advance {
        /// Number of steps to run.
        steps: u32,
    },
    /// Auto-run: advance one step every tick.
    Play,
    /// Stop auto-running. Commands are still drained every tick.
    Pause,
}

impl Command {
    /// Stable snake-case name of the command kind, for logs and metrics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::TerrainEdit { .. } => "terrain_edit",
            Self::EntityMove { .. } => "entity_move",
            Self::Step(StepControl::Advance { .. }) => "step_advance",
            Self::Step(StepControl::Play) => "step_play",
            Self::Step(StepControl::Pause) => "step_pause",
        }
    }
}

impl From<StepControl> for Command {
    fn from(step: StepControl) -> Self {
        Self::Step(step)
    }
}
