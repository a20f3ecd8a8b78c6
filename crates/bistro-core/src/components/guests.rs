//! Guest components: lifecycle state, held resources, patience budget.

use hecs::Entity;
use serde::{Deserialize, Serialize};

use super::orders::Order;

/// Guest lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuestState {
    /// Waiting (in the seating queue) for a clean, free table
    SeekingTable,
    /// Seated, enrolled for service, waiting for a staff member to arrive
    WaitingForService,
    /// Staff has arrived; guest is picking a dish and holding out the order
    GivingOrder,
    /// Staff has acknowledged receipt of the order
    OrderAccepted,
    /// Order is with the kitchen; guest polls for delivery
    WaitingForFood,
    /// Dish delivered; eating timer is running
    Eating,
    /// Finished eating; settles the bill and releases the table
    Paying,
    /// Walking to the exit; despawned on arrival
    Leaving,
}

impl GuestState {
    /// States in which the patience budget drains.
    pub fn is_waiting(&self) -> bool {
        matches!(self, GuestState::WaitingForService | GuestState::WaitingForFood)
    }

    /// States in which a staff member may take the guest's order.
    pub fn can_hand_order(&self) -> bool {
        matches!(self, GuestState::GivingOrder | GuestState::OrderAccepted)
    }
}

/// A guest progressing through the seating -> ordering -> eating -> departure
/// lifecycle. Holds at most one table and at most one active order at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Guest {
    pub state: GuestState,
    /// Assigned table entity (Entity is not serializable)
    #[serde(skip)]
    pub table: Option<Entity>,
    /// The guest's order. Moves to the serving staff member at `TakingOrder`
    /// and moves back, delivered, at delivery.
    pub order: Option<Order>,
    /// Seconds of eating left, meaningful only in `Eating`
    pub eating_timer: f32,
    /// Set once the order has been handed to a staff member
    pub order_handed: bool,
    /// Set once the guest has enrolled in the service queue, so a guest
    /// dequeued by a staff assignment is not enrolled a second time
    pub enrolled: bool,
    /// Walking speed, consumed by the movement collaborator only
    pub speed: f32,
    /// Budget for the meal; limits which dishes the guest considers
    pub wallet: f32,
}

impl Guest {
    pub fn new(speed: f32, wallet: f32) -> Self {
        Self {
            state: GuestState::SeekingTable,
            table: None,
            order: None,
            eating_timer: 0.0,
            order_handed: false,
            enrolled: false,
            speed,
            wallet,
        }
    }

    /// Staff member has arrived at the table. Returns true if the guest is in
    /// a state where it should now produce an order; any other state makes
    /// this a no-op (the guest may have abandoned in the meantime).
    pub fn notify_staff_arrived(&mut self) -> bool {
        if self.state == GuestState::WaitingForService && !self.order_handed {
            self.state = GuestState::GivingOrder;
            true
        } else {
            false
        }
    }

    /// Staff member has taken the order. Completes the order handshake.
    pub fn on_order_taken(&mut self) {
        if self.state == GuestState::GivingOrder {
            self.state = GuestState::OrderAccepted;
            self.order_handed = true;
        }
    }
}

/// Remaining tolerance for waiting before the guest abandons service.
/// Drains only while the guest is in a waiting state; never increases.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Patience {
    pub remaining: f32,
    pub initial: f32,
}

impl Patience {
    pub fn new(budget: f32) -> Self {
        Self {
            remaining: budget,
            initial: budget,
        }
    }

    pub fn drain(&mut self, delta_seconds: f32) {
        self.remaining = (self.remaining - delta_seconds).max(0.0);
    }

    pub fn exhausted(&self) -> bool {
        self.remaining <= 0.0
    }
}
