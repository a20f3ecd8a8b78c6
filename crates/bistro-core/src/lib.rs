//! Bistro Core - Restaurant Service-Flow Simulation Engine
//!
//! A deterministic, tick-driven simulation of a restaurant: guests arrive,
//! wait for a table, order, wait for preparation, eat, pay and leave, while
//! a bounded pool of staff and tables is shared between everyone present.
//!
//! # Architecture
//!
//! The simulation uses an Entity Component System (ECS) architecture via `hecs`:
//! - **Entities**: Guests, staff members, tables
//! - **Components**: Pure data attached to entities (Guest, Staff, Table, Position, ...)
//! - **Systems**: Per-tick logic that queries and updates components
//!
//! All shared state - the table pool and the queues - is mutated only through
//! the [`dispatcher::Dispatcher`], so resource acquisition is resolved by a
//! single authority and every run with the same seed and configuration
//! produces the same history.
//!
//! # Example
//!
//! ```rust,no_run
//! use bistro_core::prelude::*;
//!
//! let menu = MenuCatalog::from_json_str(include_str!("../../../data/menu.json"))
//!     .expect("menu manifest is invalid");
//! let mut engine = SimulationEngine::new(menu, RestaurantConfig::default(), 42);
//!
//! // Run the lunch rush
//! loop {
//!     engine.tick(1.0);
//!     for event in engine.drain_events() {
//!         println!("{:?}", event);
//!     }
//! }
//! ```

pub mod components;
pub mod dispatcher;
pub mod economy;
pub mod engine;
pub mod events;
pub mod menu;
pub mod spawn;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::dispatcher::{Dispatcher, Task};
    pub use crate::economy::Ledger;
    pub use crate::engine::{FloorPlan, RestaurantConfig, SimulationEngine};
    pub use crate::events::{EventFeed, SimEvent};
    pub use crate::menu::{ConfigError, Dish, MenuCatalog};
    pub use crate::spawn::{GuestSpawner, SpawnConfig};
}
