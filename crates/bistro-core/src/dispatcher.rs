//! Dispatcher - owns the queues and resolves all resource and task assignment.
//!
//! Table acquisition and staff task hand-out go through here exclusively.
//! Guests and staff never scan or mutate shared state on their own, so a
//! table freed during a tick cannot be claimed twice: it only becomes
//! assignable in the next dispatcher phase.

use hecs::{Entity, World};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::components::{Guest, GuestState, Movement, Position, Table};
use crate::events::{EventFeed, SimEvent};

/// Default cap on guests waiting for a table.
pub const DEFAULT_MAX_WAITING: usize = 5;

/// A task handed to an idle staff member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Walk to this guest's table and take their order
    Serve(Entity),
    /// Walk to this table and clean it
    Clean(Entity),
}

/// Queue owner and assignment authority.
///
/// Three FIFO queues: guests waiting to be seated, seated guests waiting for
/// service, and dirty tables waiting for cleaning. Every enqueue is
/// idempotent - an entity already present is never enqueued twice.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dispatcher {
    #[serde(skip)]
    seating_queue: VecDeque<Entity>,
    #[serde(skip)]
    service_queue: VecDeque<Entity>,
    #[serde(skip)]
    cleaning_queue: VecDeque<Entity>,
    max_waiting: usize,
}

impl Dispatcher {
    pub fn new(max_waiting: usize) -> Self {
        Self {
            seating_queue: VecDeque::new(),
            service_queue: VecDeque::new(),
            cleaning_queue: VecDeque::new(),
            max_waiting,
        }
    }

    /// Admit an arriving guest into the seating queue. Returns `false` when
    /// the queue is full; the caller decides what to do with the rejected
    /// guest. Re-admitting a queued guest is a no-op that still succeeds.
    pub fn admit(&mut self, guest: Entity) -> bool {
        if self.seating_queue.contains(&guest) {
            return true;
        }
        if self.seating_queue.len() >= self.max_waiting {
            return false;
        }
        self.seating_queue.push_back(guest);
        true
    }

    /// Enroll a seated guest for service. Idempotent: enqueueing a guest
    /// already present does not change queue length.
    pub fn enqueue_service(&mut self, guest: Entity) -> bool {
        if self.service_queue.contains(&guest) {
            return false;
        }
        self.service_queue.push_back(guest);
        true
    }

    /// Schedule a dirty table for cleaning. Idempotent.
    pub fn enqueue_cleaning(&mut self, table: Entity) -> bool {
        if self.cleaning_queue.contains(&table) {
            return false;
        }
        self.cleaning_queue.push_back(table);
        true
    }

    /// Remove a guest from every queue it occupies. Called on abandonment
    /// and departure so no queue entry outlives its guest.
    pub fn remove_guest(&mut self, guest: Entity) {
        self.seating_queue.retain(|g| *g != guest);
        self.service_queue.retain(|g| *g != guest);
    }

    pub fn seating_len(&self) -> usize {
        self.seating_queue.len()
    }

    pub fn service_len(&self) -> usize {
        self.service_queue.len()
    }

    pub fn cleaning_len(&self) -> usize {
        self.cleaning_queue.len()
    }

    pub fn in_service_queue(&self, guest: Entity) -> bool {
        self.service_queue.contains(&guest)
    }

    /// Seat queued guests, strictly in arrival order. First-fit over the
    /// table registry: the first table with `!occupied && !dirty` wins. Stops
    /// at the first guest that cannot be seated so later arrivals never
    /// overtake earlier ones.
    pub fn assign_seating(&mut self, world: &mut World, tables: &[Entity], events: &mut EventFeed) {
        while let Some(&guest) = self.seating_queue.front() {
            if !world.contains(guest) {
                self.seating_queue.pop_front();
                continue;
            }

            let Some(table) = first_free_table(world, tables) else {
                break;
            };

            self.seating_queue.pop_front();

            let (table_number, table_pos) = {
                let mut t = world
                    .get::<&mut Table>(table)
                    .expect("table registry entry lost its Table component");
                t.occupy();
                let pos = world
                    .get::<&Position>(table)
                    .map(|p| p.0)
                    .unwrap_or_default();
                (t.number, pos)
            };

            let speed = {
                let mut g = world
                    .get::<&mut Guest>(guest)
                    .expect("seating queue entry lost its Guest component");
                g.table = Some(table);
                g.state = GuestState::WaitingForService;
                g.speed
            };

            // Walk to the table; service enrollment happens in the guest
            // phase of the same tick.
            let _ = world.insert_one(guest, Movement::new(table_pos, speed));

            log::debug!("guest {} seated at table {}", guest.id(), table_number);
            events.push(SimEvent::GuestSeated {
                guest: guest.id(),
                table: table_number,
            });
        }
    }

    /// Hand the next task to an idle staff member. A seated guest waiting
    /// for service always takes precedence over cleaning; the oldest dirty
    /// table comes next; otherwise there is nothing to do.
    pub fn next_task(&mut self, world: &World) -> Option<Task> {
        // Drop stale service entries (despawned guests) from the front as we
        // scan; take the first guest actually waiting for first contact.
        let mut picked = None;
        self.service_queue.retain(|&g| {
            if picked.is_some() {
                return true;
            }
            match world.get::<&Guest>(g) {
                Ok(guest) if guest.state == GuestState::WaitingForService => {
                    picked = Some(g);
                    false
                }
                Ok(_) => true,
                Err(_) => false,
            }
        });
        if let Some(guest) = picked {
            return Some(Task::Serve(guest));
        }

        while let Some(table) = self.cleaning_queue.pop_front() {
            match world.get::<&Table>(table) {
                Ok(t) if t.dirty && !t.occupied => return Some(Task::Clean(table)),
                _ => continue,
            }
        }

        None
    }
}

/// First table in registration order that can take a new guest.
fn first_free_table(world: &World, tables: &[Entity]) -> Option<Entity> {
    tables
        .iter()
        .copied()
        .find(|&t| world.get::<&Table>(t).map(|t| t.available()).unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Patience;

    fn spawn_guest(world: &mut World, state: GuestState) -> Entity {
        let mut guest = Guest::new(1.0, 20.0);
        guest.state = state;
        world.spawn((guest, Patience::new(10.0), Position::new(0.0, 0.0)))
    }

    fn spawn_table(world: &mut World, number: u32) -> Entity {
        world.spawn((Table::new(number, 2), Position::new(number as f32, 0.0)))
    }

    #[test]
    fn test_service_enqueue_idempotent() {
        let mut world = World::new();
        let mut dispatcher = Dispatcher::new(5);
        let guest = spawn_guest(&mut world, GuestState::WaitingForService);

        assert!(dispatcher.enqueue_service(guest));
        assert!(!dispatcher.enqueue_service(guest));
        assert_eq!(dispatcher.service_len(), 1);
    }

    #[test]
    fn test_cleaning_enqueue_idempotent() {
        let mut world = World::new();
        let mut dispatcher = Dispatcher::new(5);
        let table = spawn_table(&mut world, 1);

        assert!(dispatcher.enqueue_cleaning(table));
        assert!(!dispatcher.enqueue_cleaning(table));
        assert_eq!(dispatcher.cleaning_len(), 1);
    }

    #[test]
    fn test_seating_queue_cap() {
        let mut world = World::new();
        let mut dispatcher = Dispatcher::new(2);

        let g1 = spawn_guest(&mut world, GuestState::SeekingTable);
        let g2 = spawn_guest(&mut world, GuestState::SeekingTable);
        let g3 = spawn_guest(&mut world, GuestState::SeekingTable);

        assert!(dispatcher.admit(g1));
        assert!(dispatcher.admit(g2));
        assert!(!dispatcher.admit(g3));
        // Re-admitting a queued guest is fine and changes nothing
        assert!(dispatcher.admit(g1));
        assert_eq!(dispatcher.seating_len(), 2);
    }

    #[test]
    fn test_first_fit_seating_order() {
        let mut world = World::new();
        let mut dispatcher = Dispatcher::new(5);
        let mut events = EventFeed::new();

        let t1 = spawn_table(&mut world, 1);
        let t2 = spawn_table(&mut world, 2);
        world.get::<&mut Table>(t1).unwrap().dirty = true;

        let guest = spawn_guest(&mut world, GuestState::SeekingTable);
        dispatcher.admit(guest);
        dispatcher.assign_seating(&mut world, &[t1, t2], &mut events);

        // Table 1 is dirty, so first fit lands on table 2
        let g = world.get::<&Guest>(guest).unwrap();
        assert_eq!(g.table, Some(t2));
        assert_eq!(g.state, GuestState::WaitingForService);
        assert!(world.get::<&Table>(t2).unwrap().occupied);
        assert!(!world.get::<&Table>(t1).unwrap().occupied);
    }

    #[test]
    fn test_no_table_means_no_seat() {
        let mut world = World::new();
        let mut dispatcher = Dispatcher::new(5);
        let mut events = EventFeed::new();

        let t1 = spawn_table(&mut world, 1);
        world.get::<&mut Table>(t1).unwrap().occupy();

        let guest = spawn_guest(&mut world, GuestState::SeekingTable);
        dispatcher.admit(guest);
        dispatcher.assign_seating(&mut world, &[t1], &mut events);

        assert_eq!(world.get::<&Guest>(guest).unwrap().state, GuestState::SeekingTable);
        assert_eq!(dispatcher.seating_len(), 1);
    }

    #[test]
    fn test_service_takes_precedence_over_cleaning() {
        let mut world = World::new();
        let mut dispatcher = Dispatcher::new(5);

        let table = spawn_table(&mut world, 1);
        world.get::<&mut Table>(table).unwrap().vacate();
        dispatcher.enqueue_cleaning(table);

        let guest = spawn_guest(&mut world, GuestState::WaitingForService);
        dispatcher.enqueue_service(guest);

        assert_eq!(dispatcher.next_task(&world), Some(Task::Serve(guest)));
        assert_eq!(dispatcher.next_task(&world), Some(Task::Clean(table)));
        assert_eq!(dispatcher.next_task(&world), None);
    }

    #[test]
    fn test_unseated_guest_not_served() {
        let mut world = World::new();
        let mut dispatcher = Dispatcher::new(5);

        // A guest that is queued but still seeking a table is skipped
        let seeking = spawn_guest(&mut world, GuestState::SeekingTable);
        dispatcher.enqueue_service(seeking);

        assert_eq!(dispatcher.next_task(&world), None);
        // The entry stays queued for when the guest is seated
        assert!(dispatcher.in_service_queue(seeking));
    }

    #[test]
    fn test_remove_guest_clears_queues() {
        let mut world = World::new();
        let mut dispatcher = Dispatcher::new(5);

        let guest = spawn_guest(&mut world, GuestState::WaitingForService);
        dispatcher.admit(guest);
        dispatcher.enqueue_service(guest);

        dispatcher.remove_guest(guest);
        assert_eq!(dispatcher.seating_len(), 0);
        assert_eq!(dispatcher.service_len(), 0);
    }
}
