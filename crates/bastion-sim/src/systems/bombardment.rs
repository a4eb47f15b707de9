//! Bombardment hazards: warmup, periodic impacts and expiry.
//!
//! Each impact picks a random cell in the impact area, then consults the
//! pre-impact hooks before anything else is rolled. A blocked impact leaves
//! no explosion and touches nothing. After the hazard's tick the post-tick
//! hooks run unless the hazard expired.

use hecs::Entity;
use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use bastion_core::components::{Agent, Bombardment, Explosion};
use bastion_core::constants::{DOWNED_HEALTH_FRACTION, EXPLOSION_LINGER_TICKS};
use bastion_core::enums::ImpactVerdict;
use bastion_core::events::SimEvent;
use bastion_core::settings::Settings;
use bastion_core::types::Position;

use crate::hooks::{HookContext, HookRegistry};
use crate::map::{thing_id, Map};

/// Step the hazard's clocks. Returns true when an impact is due this tick.
///
/// The hazard is marked destroyed on the tick its lifetime runs out; an
/// impact due on that same tick still lands.
pub fn advance(bombardment: &mut Bombardment) -> bool {
    bombardment.blocked_this_tick = false;
    if bombardment.destroyed {
        return false;
    }
    if bombardment.warmup_ticks > 0 {
        bombardment.warmup_ticks -= 1;
        return false;
    }
    if bombardment.remaining_ticks == 0 {
        bombardment.destroyed = true;
        return false;
    }

    bombardment.remaining_ticks -= 1;
    let due = bombardment.ticks_until_next == 0;
    if due {
        bombardment.ticks_until_next = bombardment.explosion_interval_ticks;
    } else {
        bombardment.ticks_until_next -= 1;
    }
    if bombardment.remaining_ticks == 0 {
        bombardment.destroyed = true;
    }
    due
}

/// Tick every bombardment on the map, oldest first.
pub fn run(
    map: &mut Map,
    hooks: &mut HookRegistry,
    settings: &Settings,
    rng: &mut ChaCha8Rng,
    events: &mut Vec<SimEvent>,
    tick: u64,
) {
    let mut hazards: Vec<Entity> = map
        .world
        .query::<&Bombardment>()
        .iter()
        .map(|(entity, _)| entity)
        .collect();
    hazards.sort_by_key(|entity| entity.to_bits());

    for hazard in hazards {
        let Ok(bombardment) = map.world.query_one_mut::<&mut Bombardment>(hazard) else {
            continue;
        };
        if advance(bombardment) {
            create_random_explosion(map, hooks, settings, rng, events, hazard, tick);
        }

        let alive = map
            .world
            .get::<&Bombardment>(hazard)
            .is_ok_and(|b| !b.destroyed);
        if alive {
            let mut ctx = HookContext {
                map: &mut *map,
                settings,
                events: &mut *events,
                tick,
            };
            hooks.run_post_tick(&mut ctx, hazard);
        }
    }
}

/// Resolve one impact of `hazard`.
pub fn create_random_explosion(
    map: &mut Map,
    hooks: &mut HookRegistry,
    settings: &Settings,
    rng: &mut ChaCha8Rng,
    events: &mut Vec<SimEvent>,
    hazard: Entity,
    tick: u64,
) {
    let Ok((position, bombardment)) = map
        .world
        .query_one_mut::<(&Position, &Bombardment)>(hazard)
    else {
        return;
    };
    let area = map.grid.radial_cells(position.0, bombardment.impact_area_radius);
    let Some(&cell) = area.choose(rng) else {
        return;
    };

    let verdict = {
        let mut ctx = HookContext {
            map: &mut *map,
            settings,
            events: &mut *events,
            tick,
        };
        hooks.run_pre_impact(&mut ctx, hazard, cell)
    };
    if verdict == ImpactVerdict::Block {
        if let Ok(bombardment) = map.world.query_one_mut::<&mut Bombardment>(hazard) {
            bombardment.blocked_impacts += 1;
            bombardment.blocked_this_tick = true;
        }
        return;
    }

    let s = &settings.bombardment;
    let radius = rng.gen_range(s.explosion_radius_min..=s.explosion_radius_max);
    let damage = rng.gen_range(s.explosion_damage_min..=s.explosion_damage_max);

    if let Ok(bombardment) = map.world.query_one_mut::<&mut Bombardment>(hazard) {
        bombardment.impacts += 1;
    }
    let source = thing_id(hazard);
    map.world.spawn((Explosion {
        cell,
        radius,
        damage,
        source: Some(source),
        ticks_left: EXPLOSION_LINGER_TICKS,
    },));

    tracing::info!(
        target: "bastion::intercept",
        x = cell.x,
        y = cell.y,
        radius,
        damage,
        tick,
        "bombardment.impact_landed"
    );
    events.push(SimEvent::ImpactLanded {
        hazard: source,
        cell,
        radius,
        damage,
    });

    for (entity, (agent, position)) in map.world.query_mut::<(&mut Agent, &Position)>() {
        if agent.dead || position.distance_to(cell) > radius {
            continue;
        }
        agent.health = (agent.health - damage).max(0.0);
        let was_downed = agent.downed;
        if agent.health <= 0.0 {
            agent.dead = true;
            agent.downed = true;
            events.push(SimEvent::AgentCasualty {
                agent: thing_id(entity),
                dead: true,
            });
        } else if !was_downed && agent.health < agent.max_health * DOWNED_HEALTH_FRACTION {
            agent.downed = true;
            events.push(SimEvent::AgentCasualty {
                agent: thing_id(entity),
                dead: false,
            });
        }
    }
}
