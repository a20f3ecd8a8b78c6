//! Systems - per-tick logic that queries and updates components.

pub mod guest;
pub mod kitchen;
pub mod movement;
pub mod staff;

pub use guest::{guest_system, ABANDON_PENALTY};
pub use kitchen::{effective_prep_time, kitchen_system, MIN_PREP_TIME, SKILL_GROWTH};
pub use movement::{has_arrived, movement_system};
pub use staff::staff_system;
