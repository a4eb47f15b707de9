//! Cleanup system: removes faded explosions and expired hazards.

use hecs::{Entity, World};

use bastion_core::components::{Bombardment, Explosion};

/// Age explosions and despawn everything that is finished.
/// Uses a pre-allocated buffer to avoid per-tick allocation.
pub fn run(world: &mut World, despawn_buffer: &mut Vec<Entity>) {
    despawn_buffer.clear();

    for (entity, explosion) in world.query_mut::<&mut Explosion>() {
        explosion.ticks_left = explosion.ticks_left.saturating_sub(1);
        if explosion.ticks_left == 0 {
            despawn_buffer.push(entity);
        }
    }

    for (entity, bombardment) in world.query_mut::<&Bombardment>() {
        if bombardment.destroyed {
            despawn_buffer.push(entity);
        }
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
}
