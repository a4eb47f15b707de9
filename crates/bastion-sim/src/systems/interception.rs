//! Interception registry: which cells are covered by an active shield field,
//! and which structure pays to absorb an impact.
//!
//! Rebuilt from the world once per tick, after the shield controllers ran.
//! Impacts are resolved in the order they arrive; the first covering
//! structure that can afford the absorption takes it.

use std::collections::HashMap;

use glam::IVec2;
use hecs::{Entity, World};

use bastion_core::capabilities::CapabilitySet;
use bastion_core::components::ShieldController;

#[derive(Debug, Default)]
pub struct ShieldManager {
    coverage: HashMap<IVec2, Vec<Entity>>,
    registered: Vec<Entity>,
}

impl ShieldManager {
    /// Re-register every structure whose field is active.
    /// Registration order is ascending entity id so outcomes are reproducible.
    pub fn rebuild(&mut self, world: &World) {
        self.coverage.clear();
        self.registered.clear();

        let mut active: Vec<(Entity, Vec<IVec2>)> = world
            .query::<(&CapabilitySet, &ShieldController)>()
            .iter()
            .filter_map(|(entity, (caps, controller))| {
                caps.field(controller.bindings.field)
                    .filter(|field| field.is_active())
                    .map(|field| (entity, field.protected.clone()))
            })
            .collect();
        active.sort_by_key(|(entity, _)| entity.to_bits());

        for (entity, cells) in active {
            for cell in cells {
                self.coverage.entry(cell).or_default().push(entity);
            }
            self.registered.push(entity);
        }
    }

    /// Drop a structure, e.g. when it leaves the world mid-tick.
    pub fn unregister(&mut self, entity: Entity) {
        self.registered.retain(|e| *e != entity);
        self.coverage.retain(|_, owners| {
            owners.retain(|e| *e != entity);
            !owners.is_empty()
        });
    }

    pub fn is_registered(&self, entity: Entity) -> bool {
        self.registered.contains(&entity)
    }

    pub fn shielded(&self, cell: IVec2) -> bool {
        self.coverage.contains_key(&cell)
    }

    /// Number of distinct covered cells.
    pub fn shielded_cell_count(&self) -> usize {
        self.coverage.len()
    }

    pub fn block(&self, world: &mut World, cell: IVec2, damage: f32) -> bool {
        self.absorb(world, cell, damage).is_some()
    }

    /// Absorb an impact at `cell`, returning the structure that paid for it.
    ///
    /// The absorber's energy is debited `damage × energy_per_damage` and its
    /// heatsink takes the absorption heat. A structure without an energy
    /// source absorbs for free.
    pub fn absorb(&self, world: &mut World, cell: IVec2, damage: f32) -> Option<Entity> {
        let owners = self.coverage.get(&cell)?;
        for &entity in owners {
            let Ok((caps, controller)) =
                world.query_one_mut::<(&mut CapabilitySet, &ShieldController)>(entity)
            else {
                continue;
            };
            let b = controller.bindings;
            let Some((cost, heat)) = caps
                .field(b.field)
                .filter(|field| field.is_active())
                .map(|field| (field.absorb_cost(damage), field.absorb_heat(damage)))
            else {
                continue;
            };

            if let Some(energy) = caps.energy_mut(b.energy) {
                if energy.energy_available() < cost {
                    tracing::debug!(
                        target: "bastion::intercept",
                        x = cell.x,
                        y = cell.y,
                        available = energy.energy_available(),
                        cost,
                        "intercept.absorber_short_of_energy"
                    );
                    continue;
                }
                energy.draw(cost);
            }
            if let Some(sink) = caps.heatsink_mut(b.heatsink) {
                sink.push_heat(heat);
            }
            return Some(entity);
        }
        None
    }
}
