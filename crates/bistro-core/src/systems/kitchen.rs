//! Kitchen pipeline - cook timers and staff skill progression.
//!
//! Preparation is folded into the staff machine: a staff member in
//! `WaitingForPrep` owns exactly one cook timer. This system ticks those
//! timers; the staff system picks up the finished dish on its next pass.

use hecs::World;

use crate::components::{Staff, StaffState};
use crate::events::{EventFeed, SimEvent};

/// Skill multiplier applied after every completed cook cycle.
pub const SKILL_GROWTH: f32 = 1.05;

/// Floor on effective preparation time, regardless of skill.
pub const MIN_PREP_TIME: f32 = 0.5;

/// Preparation time scaled by staff skill: higher skill, shorter time,
/// never below the floor.
pub fn effective_prep_time(base: f32, skill: f32) -> f32 {
    (base / skill.max(f32::EPSILON)).max(MIN_PREP_TIME)
}

/// Tick every active cook timer. When a timer crosses zero the cook cycle is
/// complete: the staff member's skill grows and the dish is ready for pickup.
pub fn kitchen_system(world: &mut World, events: &mut EventFeed, delta_seconds: f32) {
    for (entity, staff) in world.query_mut::<&mut Staff>() {
        if staff.state != StaffState::WaitingForPrep || staff.cook_timer <= 0.0 {
            continue;
        }

        staff.cook_timer -= delta_seconds;
        if staff.cook_timer <= 0.0 {
            staff.cook_timer = 0.0;
            staff.skill *= SKILL_GROWTH;

            if let Some(order) = &staff.order {
                log::debug!("staff {} finished cooking {}", entity.id(), order.dish);
                events.push(SimEvent::OrderReady {
                    staff: entity.id(),
                    dish: order.dish.clone(),
                });
            }
        }
    }
}
