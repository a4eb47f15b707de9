//! Entity spawn factories for setting up a map.
//!
//! Creates shield structures, agents and bombardments with the right
//! component bundles, plus the demo drill layout the CLI and tests use.

use glam::IVec2;
use hecs::Entity;

use bastion_core::capabilities::{Capability, CapabilitySet, EnergySource, Heatsink, ShieldField};
use bastion_core::components::*;
use bastion_core::settings::{BombardmentSettings, Settings, ShieldSettings};
use bastion_core::types::Position;
use bastion_map::{MapGrid, Terrain};

use crate::error::SimError;
use crate::lifecycle::{self, StructureRecord};
use crate::map::Map;

/// Which capabilities a new shield structure gets.
#[derive(Debug, Clone)]
pub struct ShieldBlueprint {
    pub label: String,
    pub energy: Option<EnergySource>,
    pub heatsink: Option<Heatsink>,
    pub field: Option<ShieldField>,
    /// Unrelated sub-components installed ahead of the shield parts.
    pub extras: Vec<Capability>,
}

impl ShieldBlueprint {
    /// Battery-backed emitter with a passive heatsink.
    pub fn standard(settings: &ShieldSettings) -> Self {
        Self {
            label: "shield generator".to_string(),
            energy: Some(EnergySource::new(1000.0, 1000.0).with_recharge(0.5)),
            heatsink: Some(Heatsink {
                heat_capacity: 10.0,
                dissipation_per_tick: 0.05,
                ..Heatsink::new(20.0, 100.0)
            }),
            field: Some(field_from_settings(settings)),
            extras: Vec::new(),
        }
    }

    /// Bare emitter: nothing to run out of, nothing to overheat.
    pub fn field_only(settings: &ShieldSettings) -> Self {
        Self {
            label: "field emitter".to_string(),
            energy: None,
            heatsink: None,
            field: Some(field_from_settings(settings)),
            extras: Vec::new(),
        }
    }

    pub fn capabilities(&self) -> CapabilitySet {
        let mut installed = self.extras.clone();
        installed.extend(self.energy.clone().map(Capability::Energy));
        installed.extend(self.heatsink.clone().map(Capability::Heatsink));
        installed.extend(self.field.clone().map(Capability::Field));
        CapabilitySet::new(installed)
    }
}

fn field_from_settings(settings: &ShieldSettings) -> ShieldField {
    ShieldField {
        heat_per_tile: settings.heat_per_tile,
        energy_per_damage: settings.energy_per_damage,
        heat_per_damage: settings.heat_per_damage,
        ..ShieldField::new(settings.field_radius)
    }
}

fn require_passable(map: &Map, cell: IVec2) -> Result<(), SimError> {
    if !map.grid.in_bounds(cell) {
        return Err(SimError::OutOfBounds(cell));
    }
    if !map.grid.passable(cell) {
        return Err(SimError::Impassable(cell));
    }
    Ok(())
}

/// Build a shield structure at `cell`.
pub fn construct_shield(
    map: &mut Map,
    blueprint: &ShieldBlueprint,
    cell: IVec2,
    settings: &ShieldSettings,
) -> Result<Entity, SimError> {
    require_passable(map, cell)?;
    let record = StructureRecord {
        structure: Structure {
            label: blueprint.label.clone(),
            map: map.id,
        },
        position: Position(cell),
        capabilities: blueprint.capabilities(),
        controller: ShieldController {
            power_per_tile: settings.power_per_tile,
            ..Default::default()
        },
    };
    lifecycle::spawn(map, record)
}

pub fn spawn_agent(map: &mut Map, name: &str, cell: IVec2) -> Result<Entity, SimError> {
    require_passable(map, cell)?;
    Ok(map.world.spawn((
        Agent {
            name: name.to_string(),
            health: 100.0,
            max_health: 100.0,
            downed: false,
            dead: false,
            drafted: false,
        },
        Position(cell),
        JobTracker::default(),
    )))
}

pub fn spawn_bombardment(
    map: &mut Map,
    cell: IVec2,
    settings: &BombardmentSettings,
) -> Result<Entity, SimError> {
    if !map.grid.in_bounds(cell) {
        return Err(SimError::OutOfBounds(cell));
    }
    Ok(map.world.spawn((
        Position(cell),
        Bombardment {
            impact_area_radius: settings.impact_area_radius,
            effective_radius: settings.effective_radius,
            explosion_interval_ticks: settings.explosion_interval_ticks,
            warmup_ticks: settings.warmup_ticks,
            ticks_until_next: 0,
            remaining_ticks: settings.duration_ticks,
            blocked_this_tick: false,
            destroyed: false,
            impacts: 0,
            blocked_impacts: 0,
        },
    )))
}

/// 64x48 open ground with a walled compound in the middle. The compound
/// has one door on its south wall.
pub fn demo_grid() -> MapGrid {
    let mut grid = MapGrid::new(64, 48);
    let (min, max) = (IVec2::new(20, 14), IVec2::new(43, 33));
    for x in min.x..=max.x {
        grid.set_terrain(IVec2::new(x, min.y), Terrain::Wall);
        grid.set_terrain(IVec2::new(x, max.y), Terrain::Wall);
    }
    for y in min.y..=max.y {
        grid.set_terrain(IVec2::new(min.x, y), Terrain::Wall);
        grid.set_terrain(IVec2::new(max.x, y), Terrain::Wall);
    }
    grid.set_terrain(IVec2::new(31, min.y), Terrain::Door);
    grid
}

/// Cell the demo drill aims its bombardment at.
pub const DEMO_TARGET: IVec2 = IVec2::new(31, 24);

/// Demo colonists: two inside the compound, three outside.
pub const DRILL_COLONISTS: [(&str, IVec2); 5] = [
    ("Ash", IVec2::new(28, 22)),
    ("Bram", IVec2::new(35, 27)),
    ("Cora", IVec2::new(31, 10)),
    ("Dell", IVec2::new(12, 24)),
    ("Esk", IVec2::new(55, 40)),
];

/// Populate a demo map: one standard shield in the compound plus the
/// drill colonists.
pub fn setup_drill(map: &mut Map, settings: &Settings) -> Result<(), SimError> {
    let blueprint = ShieldBlueprint::standard(&settings.shields);
    construct_shield(map, &blueprint, DEMO_TARGET, &settings.shields)?;
    for (name, cell) in DRILL_COLONISTS {
        spawn_agent(map, name, cell)?;
    }
    Ok(())
}
