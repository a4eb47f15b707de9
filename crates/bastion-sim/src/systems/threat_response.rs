//! Threat response: tells agents near an unopposed bombardment to run.
//!
//! Stateless and one-shot. Candidates are gathered from the regions around
//! the hazard with a capped breadth-first traversal, filtered, and each
//! eligible agent gets a flee job toward a cell clear of the blast.

use std::collections::HashMap;

use glam::IVec2;
use hecs::Entity;

use bastion_ai::{flee, jobs};
use bastion_core::components::{Agent, JobTracker};
use bastion_core::enums::{DirectivePriority, JobEndCondition};
use bastion_core::settings::ResponseSettings;
use bastion_core::types::{cell_distance, Position, ThingId};
use bastion_map::{RegionId, RegionKindSet};

use crate::map::{thing_id, Map};

/// One flee order handed to an agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FleeDirective {
    pub agent: Entity,
    pub destination: IVec2,
    pub threat: ThingId,
    pub priority: DirectivePriority,
}

/// Inclusive: an agent exactly at the limit still runs.
pub fn is_within_trigger_distance(distance: f32, limit: f32) -> bool {
    distance <= limit
}

/// Whether an agent at `distance` from the hazard should be told to flee.
pub fn eligible(agent: &Agent, tracker: &JobTracker, distance: f32, limit: f32) -> bool {
    !agent.downed
        && !agent.dead
        && !agent.drafted
        && !jobs::is_fleeing(tracker)
        && is_within_trigger_distance(distance, limit)
}

/// Issue flee jobs to every eligible agent around `origin`.
pub fn dispatch(
    map: &mut Map,
    hazard: Entity,
    origin: IVec2,
    effective_radius: f32,
    settings: &ResponseSettings,
    tick: u64,
) -> Vec<FleeDirective> {
    let mut by_region: HashMap<RegionId, Vec<(Entity, IVec2)>> = HashMap::new();
    for (entity, (_agent, position)) in map.world.query::<(&Agent, &Position)>().iter() {
        if let Some(region) = map.regions.region_id_at(position.0) {
            by_region.entry(region).or_default().push((entity, position.0));
        }
    }
    for agents in by_region.values_mut() {
        agents.sort_by_key(|(entity, _)| entity.to_bits());
    }

    let mut candidates: Vec<(Entity, IVec2)> = Vec::new();
    let visited = map.regions.breadth_first_traverse(
        origin,
        |_, _| true,
        |region| {
            if let Some(agents) = by_region.get(&region.id) {
                candidates.extend(agents.iter().copied());
            }
            false
        },
        settings.max_regions,
        RegionKindSet::ALL,
    );

    let threat = thing_id(hazard);
    let mut directives = Vec::new();
    for (entity, cell) in candidates {
        let Ok((agent, tracker)) = map.world.query_one_mut::<(&Agent, &mut JobTracker)>(entity)
        else {
            continue;
        };
        let distance = cell_distance(cell, origin);
        if !eligible(agent, tracker, distance, settings.flee_trigger_distance) {
            continue;
        }

        let min_distance = distance + effective_radius;
        let Some(destination) = flee::find_flee_dest(
            &map.grid,
            cell,
            &[origin],
            min_distance,
            settings.search_cell_budget,
        ) else {
            tracing::debug!(
                target: "bastion::response",
                agent = %agent.name,
                x = cell.x,
                y = cell.y,
                "response.no_flee_destination"
            );
            continue;
        };

        let job = jobs::flee_job(destination, threat, tick);
        let priority = job.priority;
        jobs::start_job(tracker, job, JobEndCondition::InterruptOptional);
        tracing::info!(
            target: "bastion::response",
            agent = %agent.name,
            from_x = cell.x,
            from_y = cell.y,
            to_x = destination.x,
            to_y = destination.y,
            tick,
            "response.flee_issued"
        );
        directives.push(FleeDirective {
            agent: entity,
            destination,
            threat,
            priority,
        });
    }

    tracing::debug!(
        target: "bastion::response",
        regions = visited,
        directives = directives.len(),
        "response.dispatch_done"
    );
    directives
}
