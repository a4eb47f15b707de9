//! Shield structure lifecycle: spawn, despawn and respawn from a record.
//!
//! A `StructureRecord` is what a save keeps of a structure. Everything the
//! controller derives at runtime (bindings, edge history, field coverage)
//! is skipped on serialization and rebuilt by `spawn_setup`.

use hecs::{Entity, World};
use serde::{Deserialize, Serialize};

use bastion_core::capabilities::CapabilitySet;
use bastion_core::components::{ShieldController, Structure};
use bastion_core::types::Position;
use bastion_map::MapGrid;

use crate::error::SimError;
use crate::map::{thing_id, Map};
use crate::systems::shield_controller;

/// Persisted form of a shield structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureRecord {
    pub structure: Structure,
    pub position: Position,
    pub capabilities: CapabilitySet,
    pub controller: ShieldController,
}

impl StructureRecord {
    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(data: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(data)?)
    }
}

/// Put a structure into the world and run its setup.
pub fn spawn(map: &mut Map, record: StructureRecord) -> Result<Entity, SimError> {
    let cell = record.position.0;
    if !map.grid.in_bounds(cell) {
        return Err(SimError::OutOfBounds(cell));
    }
    let entity = map.world.spawn((
        record.structure,
        record.position,
        record.capabilities,
        record.controller,
    ));
    spawn_setup(&mut map.world, &map.grid, entity)?;
    tracing::debug!(
        target: "bastion::shield",
        id = thing_id(entity).0,
        x = cell.x,
        y = cell.y,
        "shield.spawned"
    );
    Ok(entity)
}

/// Per-spawn setup: clear edge history, resolve bindings, compute coverage.
/// The field comes up on its first controller tick, never from a record.
pub fn spawn_setup(world: &mut World, grid: &MapGrid, entity: Entity) -> Result<(), SimError> {
    let (position, caps, controller) = world
        .query_one_mut::<(&Position, &mut CapabilitySet, &mut ShieldController)>(entity)
        .map_err(|_| SimError::NotAShield(thing_id(entity)))?;

    controller.active_last_tick = false;
    shield_controller::post_init(controller, caps);
    if let Some(field) = caps.field_mut(controller.bindings.field) {
        let cells = grid.radial_cells(position.0, field.radius);
        field.set_coverage(cells);
    }
    Ok(())
}

/// Take a structure out of the world, returning what a save would keep.
pub fn despawn(map: &mut Map, entity: Entity) -> Result<StructureRecord, SimError> {
    let id = thing_id(entity);
    if !map.world.contains(entity) {
        return Err(SimError::UnknownThing(id));
    }
    let (controller, caps) = map
        .world
        .query_one_mut::<(&mut ShieldController, &mut CapabilitySet)>(entity)
        .map_err(|_| SimError::NotAShield(id))?;
    shield_controller::on_removed_from_world(controller, caps);

    if let Some(manager) = map.shields.as_mut() {
        manager.unregister(entity);
    }

    let (structure, position, capabilities, controller) = map
        .world
        .remove::<(Structure, Position, CapabilitySet, ShieldController)>(entity)
        .map_err(|_| SimError::NotAShield(id))?;
    map.world
        .despawn(entity)
        .map_err(|_| SimError::UnknownThing(id))?;

    tracing::debug!(target: "bastion::shield", id = id.0, "shield.despawned");
    Ok(StructureRecord {
        structure,
        position,
        capabilities,
        controller,
    })
}

/// Bring a saved structure back. Same path as a fresh spawn.
pub fn respawn(map: &mut Map, record: StructureRecord) -> Result<Entity, SimError> {
    spawn(map, record)
}
