//! Snapshot system: queries a map and builds a complete MapSnapshot.
//!
//! Read-only. Lists are ordered by entity id so equal worlds give equal
//! snapshots.

use hecs::World;

use bastion_core::capabilities::CapabilitySet;
use bastion_core::components::*;
use bastion_core::enums::*;
use bastion_core::events::{Message, SimEvent};
use bastion_core::lexicon::Lexicon;
use bastion_core::state::*;
use bastion_core::types::{Position, SimTime};

use crate::map::{thing_id, Map};
use crate::systems::shield_controller;

pub fn build_snapshot(
    map: &Map,
    time: &SimTime,
    phase: SimPhase,
    lexicon: &Lexicon,
    messages: Vec<Message>,
    events: Vec<SimEvent>,
) -> MapSnapshot {
    MapSnapshot {
        map: map.id,
        time: *time,
        phase,
        shields: build_shields(&map.world, lexicon),
        agents: build_agents(&map.world),
        hazards: build_hazards(&map.world),
        explosions: build_explosions(&map.world),
        shielded_cells: map
            .shields
            .as_ref()
            .map_or(0, |manager| manager.shielded_cell_count()),
        messages,
        events,
    }
}

fn build_shields(world: &World, lexicon: &Lexicon) -> Vec<ShieldView> {
    let mut shields: Vec<ShieldView> = world
        .query::<(&Structure, &Position, &CapabilitySet, &ShieldController)>()
        .iter()
        .map(|(entity, (structure, position, caps, controller))| {
            let b = controller.bindings;
            ShieldView {
                id: thing_id(entity),
                label: structure.label.clone(),
                cell: position.0,
                status: shield_controller::status(controller, caps),
                active: shield_controller::is_active(controller, caps),
                protected_cells: caps.field(b.field).map_or(0, |f| f.protected_cell_count()),
                energy: caps.energy(b.energy).map(|e| e.stored),
                temp: caps.heatsink(b.heatsink).map(|h| h.temp),
                inspect: shield_controller::describe(controller, caps, lexicon),
            }
        })
        .collect();
    shields.sort_by_key(|s| s.id);
    shields
}

fn build_agents(world: &World) -> Vec<AgentView> {
    let mut agents: Vec<AgentView> = world
        .query::<(&Agent, &Position, &JobTracker)>()
        .iter()
        .map(|(entity, (agent, position, tracker))| AgentView {
            id: thing_id(entity),
            name: agent.name.clone(),
            cell: position.0,
            health: agent.health,
            downed: agent.downed,
            dead: agent.dead,
            drafted: agent.drafted,
            job: tracker.current.as_ref().map_or(JobDef::Wait, |job| job.def),
            destination: tracker.current.as_ref().and_then(|job| job.destination),
        })
        .collect();
    agents.sort_by_key(|a| a.id);
    agents
}

fn build_hazards(world: &World) -> Vec<HazardView> {
    let mut hazards: Vec<HazardView> = world
        .query::<(&Position, &Bombardment)>()
        .iter()
        .map(|(entity, (position, bombardment))| HazardView {
            id: thing_id(entity),
            center: position.0,
            remaining_ticks: bombardment.remaining_ticks,
            impacts: bombardment.impacts,
            blocked_impacts: bombardment.blocked_impacts,
        })
        .collect();
    hazards.sort_by_key(|h| h.id);
    hazards
}

fn build_explosions(world: &World) -> Vec<ExplosionView> {
    let mut explosions: Vec<(u64, ExplosionView)> = world
        .query::<&Explosion>()
        .iter()
        .map(|(entity, explosion)| {
            (
                entity.to_bits().get(),
                ExplosionView {
                    cell: explosion.cell,
                    radius: explosion.radius,
                    damage: explosion.damage,
                },
            )
        })
        .collect();
    explosions.sort_by_key(|(id, _)| *id);
    explosions.into_iter().map(|(_, view)| view).collect()
}
