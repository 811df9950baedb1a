//! Seeded random command streams.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use sluice_core::{CellCoord, Command, EntityId, StepControl};

/// Deterministic random [`Command`] source.
///
/// Cells fall inside a `width × height` grid and entity IDs inside
/// `0..entities`, so every generated command is valid against a matching
/// `GridWorld`. `Advance` requests at most four steps.
pub struct CommandGenerator {
    rng: ChaCha8Rng,
    width: i32,
    height: i32,
    entities: u64,
}

impl CommandGenerator {
    /// A generator over a `width × height` grid with `entities` entities.
    ///
    /// Zero dimensions are clamped to one.
    pub fn new(seed: u64, width: u32, height: u32, entities: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            width: width.clamp(1, i32::MAX as u32) as i32,
            height: height.clamp(1, i32::MAX as u32) as i32,
            entities: entities.max(1),
        }
    }

    /// The next command. Terrain edits and moves dominate; step controls
    /// appear roughly one time in ten.
    pub fn next_command(&mut self) -> Command {
        match self.rng.random_range(0..20u32) {
            0..=9 => Command::TerrainEdit {
                cell: self.cell(),
                delta: self.rng.random_range(-8..=8),
            },
            10..=17 => Command::EntityMove {
                entity: EntityId(self.rng.random_range(0..self.entities)),
                target: self.cell(),
            },
            18 => Command::Step(StepControl::Advance {
                steps: self.rng.random_range(1..=4),
            }),
            _ => {
                if self.rng.random_bool(0.5) {
                    Command::Step(StepControl::Play)
                } else {
                    Command::Step(StepControl::Pause)
                }
            }
        }
    }

    /// The next `n` commands.
    pub fn batch(&mut self, n: usize) -> Vec<Command> {
        (0..n).map(|_| self.next_command()).collect()
    }

    fn cell(&mut self) -> CellCoord {
        CellCoord::new(
            self.rng.random_range(0..self.width),
            self.rng.random_range(0..self.height),
        )
    }
}

impl Iterator for CommandGenerator {
    type Item = Command;

    fn next(&mut self) -> Option<Command> {
        Some(self.next_command())
    }
}
