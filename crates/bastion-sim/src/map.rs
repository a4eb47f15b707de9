//! A map: the ECS world of everything on it plus its grid, regions and
//! interception registry.

use glam::IVec2;
use hecs::{Entity, World};

use bastion_core::types::{MapId, ThingId};
use bastion_map::{MapGrid, RegionMap};

use crate::systems::interception::ShieldManager;

pub struct Map {
    pub id: MapId,
    pub world: World,
    pub grid: MapGrid,
    pub regions: RegionMap,
    /// Interception registry. `None` means nothing on this map is ever
    /// blocked.
    pub shields: Option<ShieldManager>,
}

impl Map {
    pub fn new(id: MapId, grid: MapGrid) -> Self {
        let regions = RegionMap::build(&grid);
        Self {
            id,
            world: World::new(),
            grid,
            regions,
            shields: Some(ShieldManager::default()),
        }
    }

    /// A map without an interception registry.
    pub fn without_registry(id: MapId, grid: MapGrid) -> Self {
        Self {
            shields: None,
            ..Self::new(id, grid)
        }
    }

    /// Whether any active field covers `cell`. False without a registry.
    pub fn shielded(&self, cell: IVec2) -> bool {
        self.shields.as_ref().is_some_and(|m| m.shielded(cell))
    }

    /// Try to absorb an impact at `cell`. Never blocks without a registry.
    pub fn block(&mut self, cell: IVec2, damage: f32) -> bool {
        match self.shields.as_ref() {
            Some(manager) => manager.block(&mut self.world, cell, damage),
            None => false,
        }
    }

    pub fn entity(&self, id: ThingId) -> Option<Entity> {
        entity_of(id).filter(|e| self.world.contains(*e))
    }
}

pub fn thing_id(entity: Entity) -> ThingId {
    ThingId(entity.to_bits().get())
}

pub fn entity_of(id: ThingId) -> Option<Entity> {
    Entity::from_bits(id.0)
}
