//! A reference [`Simulation`]: terrain heightmap plus entity positions.

use indexmap::IndexMap;

use sluice_core::{CellCoord, EntityId, SimError, Simulation, StepId};

/// Rectangular grid world.
///
/// Terrain is a row-major `width × height` heightmap; edits add a signed
/// delta with saturation. Entities occupy a cell each and are kept in
/// spawn order.
#[derive(Clone, Debug)]
pub struct GridWorld {
    width: u32,
    height: u32,
    heights: Vec<i32>,
    entities: IndexMap<EntityId, CellCoord>,
    step: StepId,
}

impl GridWorld {
    /// A flat world with no entities.
    pub fn new(width: u32, height: u32) -> Self {
        let cells = width as usize * height as usize;
        Self {
            width,
            height,
            heights: vec![0; cells],
            entities: IndexMap::new(),
            step: StepId::default(),
        }
    }

    /// Place `entity` at `at`, returning its previous position if it
    /// already existed.
    pub fn spawn(&mut self, entity: EntityId, at: CellCoord) -> Result<Option<CellCoord>, SimError> {
        self.index(at).ok_or(SimError::OutOfBounds { cell: at })?;
        Ok(self.entities.insert(entity, at))
    }

    /// Remove `entity`, returning its last position.
    pub fn despawn(&mut self, entity: EntityId) -> Option<CellCoord> {
        self.entities.shift_remove(&entity)
    }

    /// Terrain height at `cell`, or `None` outside the grid.
    pub fn height_at(&self, cell: CellCoord) -> Option<i32> {
        self.index(cell).map(|i| self.heights[i])
    }

    /// Current position of `entity`.
    pub fn position(&self, entity: EntityId) -> Option<CellCoord> {
        self.entities.get(&entity).copied()
    }

    /// Entities in spawn order.
    pub fn entities(&self) -> impl Iterator<Item = (EntityId, CellCoord)> + '_ {
        self.entities.iter().map(|(&id, &cell)| (id, cell))
    }

    /// The row-major heightmap.
    pub fn heights(&self) -> &[i32] {
        &self.heights
    }

    /// Grid width in cells.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in cells.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Last step applied.
    pub fn current_step(&self) -> StepId {
        self.step
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        let x = u32::try_from(cell.x).ok().filter(|&x| x < self.width)?;
        let y = u32::try_from(cell.y).ok().filter(|&y| y < self.height)?;
        Some(y as usize * self.width as usize + x as usize)
    }
}

impl Simulation for GridWorld {
    fn apply_terrain_edit(&mut self, cell: CellCoord, delta: i32) -> Result<(), SimError> {
        let i = self.index(cell).ok_or(SimError::OutOfBounds { cell })?;
        self.heights[i] = self.heights[i].saturating_add(delta);
        Ok(())
    }

    fn move_entity(&mut self, entity: EntityId, target: CellCoord) -> Result<(), SimError> {
        self.index(target)
            .ok_or(SimError::OutOfBounds { cell: target })?;
        let slot = self
            .entities
            .get_mut(&entity)
            .ok_or(SimError::UnknownEntity { entity })?;
        *slot = target;
        Ok(())
    }

    fn step(&mut self, step: StepId) {
        self.step = step;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terrain_edits_accumulate_and_saturate() {
        let mut w = GridWorld::new(4, 3);
        let c = CellCoord::new(3, 2);
        w.apply_terrain_edit(c, 5).unwrap();
        w.apply_terrain_edit(c, -2).unwrap();
        assert_eq!(w.height_at(c), Some(3));
        assert_eq!(w.heights()[2 * 4 + 3], 3);

        w.apply_terrain_edit(c, i32::MAX).unwrap();
        assert_eq!(w.height_at(c), Some(i32::MAX));
    }

    #[test]
    fn out_of_bounds_edits_rejected() {
        let mut w = GridWorld::new(2, 2);
        for cell in [
            CellCoord::new(-1, 0),
            CellCoord::new(0, -1),
            CellCoord::new(2, 0),
            CellCoord::new(0, 2),
        ] {
            assert_eq!(
                w.apply_terrain_edit(cell, 1),
                Err(SimError::OutOfBounds { cell })
            );
        }
        assert!(w.heights().iter().all(|&h| h == 0));
    }

    #[test]
    fn move_requires_known_entity_and_valid_target() {
        let mut w = GridWorld::new(8, 8);
        let id = EntityId(7);
        assert_eq!(
            w.move_entity(id, CellCoord::new(1, 1)),
            Err(SimError::UnknownEntity { entity: id })
        );

        assert_eq!(w.spawn(id, CellCoord::new(0, 0)), Ok(None));
        w.move_entity(id, CellCoord::new(5, 6)).unwrap();
        assert_eq!(w.position(id), Some(CellCoord::new(5, 6)));

        let outside = CellCoord::new(8, 0);
        assert_eq!(
            w.move_entity(id, outside),
            Err(SimError::OutOfBounds { cell: outside })
        );
        assert_eq!(w.position(id), Some(CellCoord::new(5, 6)));
    }

    #[test]
    fn entities_iterate_in_spawn_order() {
        let mut w = GridWorld::new(4, 4);
        w.spawn(EntityId(9), CellCoord::new(0, 0)).unwrap();
        w.spawn(EntityId(2), CellCoord::new(1, 0)).unwrap();
        w.spawn(EntityId(5), CellCoord::new(2, 0)).unwrap();
        w.despawn(EntityId(2));
        let ids: Vec<_> = w.entities().map(|(id, _)| id.0).collect();
        assert_eq!(ids, vec![9, 5]);
    }

    #[test]
    fn spawn_outside_grid_rejected() {
        let mut w = GridWorld::new(1, 1);
        assert!(w.spawn(EntityId(1), CellCoord::new(1, 1)).is_err());
        assert_eq!(w.entities().count(), 0);
    }

    #[test]
    fn step_records_latest() {
        let mut w = GridWorld::new(1, 1);
        w.step(StepId(4));
        assert_eq!(w.current_step(), StepId(4));
    }
}
