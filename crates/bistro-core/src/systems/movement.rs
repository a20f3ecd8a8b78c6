//! Movement system - updates positions for entities with a Movement component.
//!
//! This is the core's only spatial collaborator: state machines express
//! "travelling" by inserting a Movement component and treat its removal as
//! the arrival notification. No pathfinding, no collision.

use hecs::World;
use crate::components::{Movement, Position};

/// Distance under which an entity counts as arrived.
const ARRIVAL_EPSILON: f32 = 0.1;

/// Move entities toward their destinations; remove Movement on arrival.
pub fn movement_system(world: &mut World, delta_seconds: f32) {
    let mut arrivals: Vec<hecs::Entity> = Vec::new();

    for (entity, (pos, movement)) in world.query_mut::<(&mut Position, &Movement)>() {
        let current = pos.0;
        let target = movement.destination;

        let diff = target - current;
        let distance = diff.length();
        let step = movement.speed * delta_seconds;

        if distance < ARRIVAL_EPSILON || step >= distance {
            pos.0 = target;
            arrivals.push(entity);
        } else {
            pos.0 = current + diff.normalize() * step;
        }
    }

    for entity in arrivals {
        let _ = world.remove_one::<Movement>(entity);
    }
}

/// Has the entity finished its last requested walk? An entity that was never
/// given a Movement component counts as arrived.
pub fn has_arrived(world: &World, entity: hecs::Entity) -> bool {
    world.get::<&Movement>(entity).is_err()
}
