//! Simulation event feed - notifications for presentation layers.
//!
//! The core pushes events as state transitions happen; subscribers drain the
//! feed between ticks. The simulation is correct with no subscribers at all:
//! the feed holds at most [`MAX_PENDING_EVENTS`], dropping the oldest event
//! on overflow, so an undrained run stays bounded.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Cap on undrained events; the oldest event is dropped beyond this.
pub const MAX_PENDING_EVENTS: usize = 1024;

/// Events emitted by the coordination core. Entity handles are reported as
/// their raw ids, suitable for display and log correlation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// A guest was assigned a table
    GuestSeated { guest: u32, table: u32 },
    /// A cook cycle finished; the dish is ready for pickup
    OrderReady { staff: u32, dish: String },
    /// The dish reached the guest
    OrderDelivered { guest: u32, dish: String },
    /// A guest vacated a table, leaving it dirty
    TableDirty { table: u32 },
    /// A staff member finished cleaning a table
    TableCleaned { table: u32 },
    /// A guest walked out through the exit
    GuestLeft { guest: u32 },
    /// A guest ran out of patience and abandoned service
    GuestAbandoned { guest: u32 },
    /// A guest was turned away because the seating queue was full
    QueueFull { guest: u32 },
    /// A guest paid for their meal
    PaymentReceived { guest: u32, amount: f32 },
}

/// Accumulates events during a tick for external subscribers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventFeed {
    events: VecDeque<SimEvent>,
}

impl EventFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: SimEvent) {
        if self.events.len() >= MAX_PENDING_EVENTS {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    /// Take all pending events, oldest first, leaving the feed empty.
    pub fn drain(&mut self) -> Vec<SimEvent> {
        self.events.drain(..).collect()
    }

    /// Iterate the pending events, oldest first.
    pub fn pending(&self) -> impl Iterator<Item = &SimEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
