//! Simulation engine - main entry point for running the simulation.
//!
//! `SimulationEngine` is the explicit simulation context: it owns the ECS
//! world, the dispatcher, the menu catalog, the ledger, the event feed and
//! the seeded RNG, and drives every system in a fixed order each tick. Two
//! runs with the same configuration and seed produce identical histories.

use hecs::{Entity, World};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::components::{Guest, GuestState, Movement, Patience, Position, Staff, Table, Vec2};
use crate::dispatcher::{Dispatcher, DEFAULT_MAX_WAITING};
use crate::economy::Ledger;
use crate::events::{EventFeed, SimEvent};
use crate::menu::MenuCatalog;
use crate::spawn::{GuestSpawner, SpawnConfig};
use crate::systems::{guest_system, kitchen_system, movement_system, staff_system};

/// Ledger debit for turning a guest away at the door.
pub const QUEUE_FULL_PENALTY: f32 = 2.0;

/// Fixed points of interest on the restaurant floor.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct FloorPlan {
    /// Where arriving guests appear
    pub entry: Vec2,
    /// Where departing guests walk to before despawning
    pub exit: Vec2,
    /// Where orders are cooked and picked up
    pub kitchen: Vec2,
    /// Where idle staff drift back to
    pub staff_rest: Vec2,
}

impl Default for FloorPlan {
    fn default() -> Self {
        Self {
            entry: Vec2::new(0.0, -6.0),
            exit: Vec2::new(0.0, -6.0),
            kitchen: Vec2::new(8.0, 2.0),
            staff_rest: Vec2::new(4.0, -2.0),
        }
    }
}

/// Startup configuration for the restaurant.
#[derive(Debug, Clone)]
pub struct RestaurantConfig {
    pub num_tables: usize,
    pub table_capacity: u8,
    pub staff_count: usize,
    pub staff_speed: f32,
    /// Cap on guests waiting to be seated
    pub max_waiting: usize,
    pub plan: FloorPlan,
    /// Automatic guest arrivals; `None` means guests are spawned manually
    pub spawn: Option<SpawnConfig>,
}

impl Default for RestaurantConfig {
    fn default() -> Self {
        Self {
            num_tables: 4,
            table_capacity: 2,
            staff_count: 1,
            staff_speed: 3.0,
            max_waiting: DEFAULT_MAX_WAITING,
            plan: FloorPlan::default(),
            spawn: Some(SpawnConfig::default()),
        }
    }
}

/// Main simulation engine.
pub struct SimulationEngine {
    /// ECS world containing guests, staff and tables
    pub world: World,
    /// Queue owner and assignment authority
    pub dispatcher: Dispatcher,
    /// Read-only dish catalog
    pub menu: MenuCatalog,
    /// Income and penalties
    pub ledger: Ledger,
    /// Notifications for presentation layers
    pub events: EventFeed,
    /// Floor layout
    pub plan: FloorPlan,
    spawner: Option<GuestSpawner>,
    /// Tables in registration order; first-fit seating scans this
    tables: Vec<Entity>,
    rng: StdRng,
    sim_time: f64,
    ticks: u64,
}

impl SimulationEngine {
    /// Build an engine from a validated menu and a restaurant configuration.
    pub fn new(menu: MenuCatalog, config: RestaurantConfig, seed: u64) -> Self {
        let mut world = World::new();
        let plan = config.plan;

        let tables: Vec<Entity> = (0..config.num_tables)
            .map(|i| {
                world.spawn((
                    Table::new(i as u32 + 1, config.table_capacity),
                    Position::new(2.0 * i as f32, 2.0),
                ))
            })
            .collect();

        for _ in 0..config.staff_count {
            world.spawn((Staff::new(config.staff_speed), Position(plan.staff_rest)));
        }

        Self {
            world,
            dispatcher: Dispatcher::new(config.max_waiting),
            menu,
            ledger: Ledger::new(),
            events: EventFeed::new(),
            plan,
            spawner: config.spawn.map(GuestSpawner::new),
            tables,
            rng: StdRng::seed_from_u64(seed),
            sim_time: 0.0,
            ticks: 0,
        }
    }

    /// Spawn one guest at the entry. A guest that does not fit in the
    /// seating queue is turned away on the spot: penalty, `QueueFull`
    /// event, and a walk straight back out.
    pub fn spawn_guest(&mut self, patience: f32, speed: f32, wallet: f32) -> Entity {
        let entity = self.world.spawn((
            Guest::new(speed, wallet),
            Patience::new(patience),
            Position(self.plan.entry),
        ));

        if !self.dispatcher.admit(entity) {
            log::info!("guest {} turned away: seating queue full", entity.id());
            self.ledger.penalize(QUEUE_FULL_PENALTY);
            self.events.push(SimEvent::QueueFull {
                guest: entity.id(),
            });
            let mut g = self.world.get::<&mut Guest>(entity).unwrap();
            g.state = GuestState::Leaving;
            let exit_walk = Movement::new(self.plan.exit, g.speed);
            drop(g);
            if self.plan.entry.distance(&self.plan.exit) >= 0.1 {
                let _ = self.world.insert_one(entity, exit_walk);
            }
        }

        entity
    }

    /// Advance the simulation by one tick of `delta_seconds`.
    ///
    /// Phase order is fixed for determinism: arrivals, then seating and all
    /// resource assignment, then movement, kitchen, staff and guests, then
    /// the despawn sweep. A table freed in the guest phase only becomes
    /// assignable in the next tick's seating phase.
    pub fn tick(&mut self, delta_seconds: f32) {
        self.sim_time += delta_seconds as f64;
        self.ticks += 1;

        // 1. Arrivals
        let stats = self
            .spawner
            .as_mut()
            .and_then(|s| s.tick(delta_seconds, &mut self.rng));
        if let Some(stats) = stats {
            self.spawn_guest(stats.patience, stats.speed, stats.wallet);
        }

        // 2. Seating: the dispatcher is the only authority that assigns tables
        self.dispatcher
            .assign_seating(&mut self.world, &self.tables, &mut self.events);

        // 3. Movement (arrivals feed this tick's state machines)
        movement_system(&mut self.world, delta_seconds);

        // 4. Kitchen timers
        kitchen_system(&mut self.world, &mut self.events, delta_seconds);

        // 5. Staff machines (pull tasks from the dispatcher)
        staff_system(
            &mut self.world,
            &mut self.dispatcher,
            &mut self.events,
            &self.plan,
        );

        // 6. Guest machines
        let departed = guest_system(
            &mut self.world,
            &mut self.dispatcher,
            &mut self.events,
            &mut self.ledger,
            &self.menu,
            &mut self.rng,
            &self.plan,
            delta_seconds,
        );

        // 7. Despawn sweep: departed guests release queue entries and vanish
        for entity in departed {
            self.dispatcher.remove_guest(entity);
            let _ = self.world.despawn(entity);
        }
    }

    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Tables in registration order.
    pub fn tables(&self) -> &[Entity] {
        &self.tables
    }

    pub fn guest_count(&self) -> usize {
        self.world.query::<&Guest>().iter().count()
    }

    pub fn staff_count(&self) -> usize {
        self.world.query::<&Staff>().iter().count()
    }

    pub fn free_table_count(&self) -> usize {
        self.world
            .query::<&Table>()
            .iter()
            .filter(|(_, t)| t.available())
            .count()
    }

    pub fn dirty_table_count(&self) -> usize {
        self.world
            .query::<&Table>()
            .iter()
            .filter(|(_, t)| t.dirty)
            .count()
    }

    /// Take all pending events for external subscribers.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        self.events.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MENU: &str = r#"[
        { "name": "Salad", "prep_time": 2.0, "eating_duration": 3.0, "price": 4.0 }
    ]"#;

    fn engine(config: RestaurantConfig) -> SimulationEngine {
        let menu = MenuCatalog::from_json_str(MENU).unwrap();
        SimulationEngine::new(menu, config, 42)
    }

    #[test]
    fn test_engine_setup() {
        let engine = engine(RestaurantConfig {
            num_tables: 3,
            staff_count: 2,
            spawn: None,
            ..Default::default()
        });

        assert_eq!(engine.tables().len(), 3);
        assert_eq!(engine.staff_count(), 2);
        assert_eq!(engine.guest_count(), 0);
        assert_eq!(engine.free_table_count(), 3);
    }

    #[test]
    fn test_tick_advances_time() {
        let mut engine = engine(RestaurantConfig {
            spawn: None,
            ..Default::default()
        });
        for _ in 0..10 {
            engine.tick(0.5);
        }
        assert!((engine.sim_time() - 5.0).abs() < 0.001);
        assert_eq!(engine.ticks(), 10);
    }

    #[test]
    fn test_queue_full_rejection() {
        let mut engine = engine(RestaurantConfig {
            num_tables: 0,
            max_waiting: 1,
            spawn: None,
            ..Default::default()
        });

        engine.spawn_guest(30.0, 3.0, 20.0);
        let rejected = engine.spawn_guest(30.0, 3.0, 20.0);

        assert_eq!(
            engine.world.get::<&Guest>(rejected).unwrap().state,
            GuestState::Leaving
        );
        assert!(engine
            .events
            .pending()
            .any(|e| matches!(e, SimEvent::QueueFull { .. })));
        assert_eq!(engine.ledger.balance(), 0.0); // penalties clamp at zero
    }

    #[test]
    fn test_determinism_same_seed_same_history() {
        let run = |seed: u64| {
            let menu = MenuCatalog::from_json_str(MENU).unwrap();
            let mut engine = SimulationEngine::new(menu, RestaurantConfig::default(), seed);
            let mut history = Vec::new();
            for _ in 0..400 {
                engine.tick(1.0);
                history.extend(engine.drain_events());
            }
            (history, engine.ledger.balance())
        };

        let (events_a, balance_a) = run(7);
        let (events_b, balance_b) = run(7);
        assert_eq!(events_a, events_b);
        assert_eq!(balance_a, balance_b);
    }
}
