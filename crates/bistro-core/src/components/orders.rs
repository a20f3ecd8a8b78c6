//! Order value - one guest's food request and its fulfillment status.

use serde::{Deserialize, Serialize};

/// A food order placed by a guest.
///
/// The order is owned by the guest that placed it until a staff member takes
/// it for fulfillment; it moves back to the guest on delivery. `delivered`
/// transitions false -> true exactly once, at the moment of delivery.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Name of the ordered dish
    pub dish: String,
    /// Base preparation time in seconds (before staff skill scaling)
    pub prep_time: f32,
    /// How long the guest takes to eat the dish, in seconds
    pub eating_duration: f32,
    /// Price charged on payment
    pub price: f32,
    /// Whether the dish has reached the guest
    pub delivered: bool,
}

impl Order {
    pub fn new(dish: impl Into<String>, prep_time: f32, eating_duration: f32, price: f32) -> Self {
        Self {
            dish: dish.into(),
            prep_time,
            eating_duration,
            price,
            delivered: false,
        }
    }
}
