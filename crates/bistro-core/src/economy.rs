//! Economy ledger - income from payments, penalties from bad outcomes.
//!
//! The ledger is an external sink as far as the coordination core is
//! concerned; balancing the amounts is configuration, not core logic.

use serde::{Deserialize, Serialize};

/// Balance ceiling; keeps display widths bounded.
pub const MAX_BALANCE: f32 = 9999.0;

/// Running balance of the restaurant.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Ledger {
    balance: f32,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit a successful payment.
    pub fn add_income(&mut self, amount: f32) {
        self.set(self.balance + amount.max(0.0));
    }

    /// Debit a negative outcome (abandonment, queue overflow).
    pub fn penalize(&mut self, amount: f32) {
        self.set(self.balance - amount.max(0.0));
    }

    pub fn balance(&self) -> f32 {
        self.balance
    }

    fn set(&mut self, value: f32) {
        self.balance = value.clamp(0.0, MAX_BALANCE);
    }
}
