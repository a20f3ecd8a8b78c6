//! Table component - a fixed seating resource with occupancy and cleanliness state.

use serde::{Deserialize, Serialize};

/// A table in the restaurant.
///
/// `occupied` and `dirty` are independent: a table may be dirty while
/// unoccupied (waiting for cleaning). Assignment to a new guest requires
/// `!occupied && !dirty`. Tables are created once at startup and never
/// despawned during a session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Table {
    /// Table number, also the registration order used for first-fit seating
    pub number: u32,
    /// Seats at this table
    pub capacity: u8,
    pub occupied: bool,
    pub dirty: bool,
}

impl Table {
    pub fn new(number: u32, capacity: u8) -> Self {
        Self {
            number,
            capacity,
            occupied: false,
            dirty: false,
        }
    }

    /// Can this table be assigned to a new guest?
    pub fn available(&self) -> bool {
        !self.occupied && !self.dirty
    }

    pub fn occupy(&mut self) {
        self.occupied = true;
    }

    /// Release the table. The leaving guest always leaves it dirty.
    pub fn vacate(&mut self) {
        self.occupied = false;
        self.dirty = true;
    }

    pub fn clean(&mut self) {
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_lifecycle() {
        let mut table = Table::new(1, 2);
        assert!(table.available());

        table.occupy();
        assert!(table.occupied);
        assert!(!table.available());

        table.vacate();
        assert!(!table.occupied);
        assert!(table.dirty);
        // Dirty while unoccupied: still not assignable
        assert!(!table.available());

        table.clean();
        assert!(table.available());
    }
}
