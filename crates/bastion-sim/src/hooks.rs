//! Host extension points for area-damage hazards.
//!
//! A hazard's impact routine calls the pre-impact hooks once the impact
//! cell is known and before it rolls anything else; a `Block` verdict ends
//! that impact on the spot. After a hazard's own tick, if the hazard still
//! exists, the post-tick hooks run.

use glam::IVec2;
use hecs::Entity;

use bastion_core::components::Bombardment;
use bastion_core::enums::ImpactVerdict;
use bastion_core::events::SimEvent;
use bastion_core::settings::Settings;
use bastion_core::types::Position;

use crate::map::{thing_id, Map};
use crate::systems::threat_response;

/// Everything a hook may touch.
pub struct HookContext<'a> {
    pub map: &'a mut Map,
    pub settings: &'a Settings,
    pub events: &'a mut Vec<SimEvent>,
    pub tick: u64,
}

pub trait PreImpactHook {
    fn before_impact(
        &mut self,
        ctx: &mut HookContext<'_>,
        hazard: Entity,
        cell: IVec2,
    ) -> ImpactVerdict;
}

pub trait PostHazardTickHook {
    fn after_hazard_tick(&mut self, ctx: &mut HookContext<'_>, hazard: Entity);
}

/// Registered hooks, called in registration order.
pub struct HookRegistry {
    pre_impact: Vec<Box<dyn PreImpactHook>>,
    post_tick: Vec<Box<dyn PostHazardTickHook>>,
}

impl HookRegistry {
    pub fn empty() -> Self {
        Self {
            pre_impact: Vec::new(),
            post_tick: Vec::new(),
        }
    }

    /// Shield interception before impacts, threat response after hazard ticks.
    pub fn with_defaults() -> Self {
        let mut hooks = Self::empty();
        hooks.add_pre_impact(ShieldInterception);
        hooks.add_post_tick(ThreatResponse);
        hooks
    }

    pub fn add_pre_impact(&mut self, hook: impl PreImpactHook + 'static) {
        self.pre_impact.push(Box::new(hook));
    }

    pub fn add_post_tick(&mut self, hook: impl PostHazardTickHook + 'static) {
        self.post_tick.push(Box::new(hook));
    }

    /// First `Block` wins; later hooks are not consulted.
    pub fn run_pre_impact(
        &mut self,
        ctx: &mut HookContext<'_>,
        hazard: Entity,
        cell: IVec2,
    ) -> ImpactVerdict {
        for hook in &mut self.pre_impact {
            if hook.before_impact(ctx, hazard, cell) == ImpactVerdict::Block {
                return ImpactVerdict::Block;
            }
        }
        ImpactVerdict::Proceed
    }

    pub fn run_post_tick(&mut self, ctx: &mut HookContext<'_>, hazard: Entity) {
        for hook in &mut self.post_tick {
            hook.after_hazard_tick(ctx, hazard);
        }
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Blocks impacts landing on cells covered by an active shield field.
pub struct ShieldInterception;

impl PreImpactHook for ShieldInterception {
    fn before_impact(
        &mut self,
        ctx: &mut HookContext<'_>,
        hazard: Entity,
        cell: IVec2,
    ) -> ImpactVerdict {
        let map = &mut *ctx.map;
        let Some(manager) = map.shields.as_ref() else {
            tracing::debug!(
                target: "bastion::intercept",
                map = map.id.0,
                "intercept.no_registry"
            );
            return ImpactVerdict::Proceed;
        };

        let damage = ctx.settings.shields.skyfaller_damage;
        match manager.absorb(&mut map.world, cell, damage) {
            Some(absorber) => {
                tracing::info!(
                    target: "bastion::intercept",
                    x = cell.x,
                    y = cell.y,
                    damage,
                    tick = ctx.tick,
                    "intercept.impact_blocked"
                );
                ctx.events.push(SimEvent::ImpactBlocked {
                    hazard: thing_id(hazard),
                    cell,
                    absorbed_by: Some(thing_id(absorber)),
                });
                ImpactVerdict::Block
            }
            None => ImpactVerdict::Proceed,
        }
    }
}

/// Sends nearby agents running while a bombardment lands unopposed.
pub struct ThreatResponse;

impl PostHazardTickHook for ThreatResponse {
    fn after_hazard_tick(&mut self, ctx: &mut HookContext<'_>, hazard: Entity) {
        let Ok((position, bombardment)) = ctx
            .map
            .world
            .query_one_mut::<(&Position, &Bombardment)>(hazard)
        else {
            return;
        };
        if bombardment.destroyed || bombardment.blocked_this_tick {
            return;
        }
        let origin = position.0;
        let effective_radius = bombardment.effective_radius;

        let directives = threat_response::dispatch(
            ctx.map,
            hazard,
            origin,
            effective_radius,
            &ctx.settings.response,
            ctx.tick,
        );
        for directive in directives {
            ctx.events.push(SimEvent::FleeIssued {
                agent: thing_id(directive.agent),
                hazard: thing_id(hazard),
                destination: directive.destination,
            });
        }
    }
}
