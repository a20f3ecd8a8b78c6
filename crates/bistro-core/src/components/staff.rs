//! Staff components: lifecycle state, current assignment, cooking skill.

use hecs::Entity;
use serde::{Deserialize, Serialize};

use super::orders::Order;

/// Staff lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StaffState {
    /// Ready for the dispatcher to hand out the next task
    Idle,
    /// Walking to a queued guest's table
    MovingToGuest,
    /// At the table, waiting for the guest to hand over the order
    TakingOrder,
    /// Walking to the kitchen with the order
    MovingToKitchen,
    /// At the kitchen; the cook timer is running
    WaitingForPrep,
    /// Walking back to the guest with the finished dish
    DeliveringOrder,
    /// Walking to a dirty table; cleans it on arrival
    CleaningTable,
}

/// A service worker. Serves at most one guest at a time and never holds more
/// than one order; the dispatcher will not hand out a new task while
/// `state != Idle`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Staff {
    pub state: StaffState,
    /// Guest currently being served (Entity is not serializable)
    #[serde(skip)]
    pub guest: Option<Entity>,
    /// Order in hand, taken from the guest and returned on delivery
    pub order: Option<Order>,
    /// Dirty table this staff member is on the way to clean
    #[serde(skip)]
    pub cleaning_target: Option<Entity>,
    /// Seconds of preparation left, meaningful only in `WaitingForPrep`
    pub cook_timer: f32,
    /// Walking speed, consumed by the movement collaborator only
    pub speed: f32,
    /// Cooking skill multiplier; grows with every completed cook cycle and
    /// shortens effective preparation time
    pub skill: f32,
}

impl Staff {
    pub fn new(speed: f32) -> Self {
        Self {
            state: StaffState::Idle,
            guest: None,
            order: None,
            cleaning_target: None,
            cook_timer: 0.0,
            speed,
            skill: 1.0,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.state == StaffState::Idle
    }

    /// Clear the current assignment and return to `Idle`, ready for the next
    /// task.
    pub fn reset(&mut self) {
        self.guest = None;
        self.order = None;
        self.cleaning_target = None;
        self.cook_timer = 0.0;
        self.state = StaffState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staff_reset() {
        let mut staff = Staff::new(3.0);
        staff.state = StaffState::DeliveringOrder;
        staff.order = Some(Order::new("Burger", 10.0, 7.0, 8.0));
        staff.cook_timer = 4.0;

        staff.reset();
        assert!(staff.is_idle());
        assert!(staff.order.is_none());
        assert!(staff.guest.is_none());
        assert_eq!(staff.cook_timer, 0.0);
    }
}
