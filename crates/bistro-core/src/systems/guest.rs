//! Guest system - drives the guest state machine from seating to departure.
//!
//! Patience drains while the guest waits for service or for food; exhausting
//! it unwinds every held resource (queue entries, table, pending order)
//! synchronously within the same tick before the guest walks out.

use hecs::{Entity, World};
use rand::Rng;

use crate::components::{Guest, GuestState, Movement, Patience, Position, Table, Vec2};
use crate::dispatcher::Dispatcher;
use crate::economy::Ledger;
use crate::engine::FloorPlan;
use crate::events::{EventFeed, SimEvent};
use crate::menu::MenuCatalog;
use crate::systems::movement::has_arrived;

/// Ledger debit for a guest that abandons service.
pub const ABANDON_PENALTY: f32 = 2.0;

/// Advance every guest by one tick. Returns the guests that completed their
/// departure this tick; the engine despawns them afterwards.
pub fn guest_system<R: Rng>(
    world: &mut World,
    dispatcher: &mut Dispatcher,
    events: &mut EventFeed,
    ledger: &mut Ledger,
    menu: &MenuCatalog,
    rng: &mut R,
    plan: &FloorPlan,
    delta_seconds: f32,
) -> Vec<Entity> {
    let guests: Vec<Entity> = world.query::<&Guest>().iter().map(|(e, _)| e).collect();
    let mut departed = Vec::new();

    for entity in guests {
        let Ok(state) = world.get::<&Guest>(entity).map(|g| g.state) else {
            continue;
        };

        // Patience drains in the waiting states; hitting zero forces the
        // guest out, releasing everything it holds.
        if state.is_waiting() {
            let exhausted = world
                .get::<&mut Patience>(entity)
                .map(|mut p| {
                    p.drain(delta_seconds);
                    p.exhausted()
                })
                .unwrap_or(false);

            if exhausted {
                abandon(world, dispatcher, events, ledger, plan, entity);
                continue;
            }
        }

        match state {
            // Seating is the dispatcher's job; nothing to do but wait.
            GuestState::SeekingTable => {}

            GuestState::WaitingForService => {
                let mut g = world.get::<&mut Guest>(entity).unwrap();
                if !g.enrolled {
                    g.enrolled = true;
                    drop(g);
                    dispatcher.enqueue_service(entity);
                    log::debug!("guest {} enrolled for service", entity.id());
                }
            }

            GuestState::GivingOrder => {
                let (needs_order, wallet) = {
                    let g = world.get::<&Guest>(entity).unwrap();
                    (g.order.is_none() && !g.order_handed, g.wallet)
                };
                if needs_order {
                    match menu.choose(rng, wallet) {
                        Some(dish) => {
                            let order = dish.to_order();
                            log::debug!("guest {} orders {}", entity.id(), order.dish);
                            world.get::<&mut Guest>(entity).unwrap().order = Some(order);
                        }
                        None => {
                            // Nothing on the menu fits the wallet; give up.
                            log::warn!("guest {} cannot afford any dish", entity.id());
                            abandon(world, dispatcher, events, ledger, plan, entity);
                        }
                    }
                }
            }

            GuestState::OrderAccepted => {
                world.get::<&mut Guest>(entity).unwrap().state = GuestState::WaitingForFood;
            }

            GuestState::WaitingForFood => {
                // Poll for delivery: the staff member hands the order back
                // with `delivered` set.
                let mut g = world.get::<&mut Guest>(entity).unwrap();
                if g.order.as_ref().map_or(false, |o| o.delivered) {
                    g.eating_timer = g.order.as_ref().unwrap().eating_duration;
                    g.state = GuestState::Eating;
                    log::debug!("guest {} started eating", entity.id());
                }
            }

            GuestState::Eating => {
                let mut g = world.get::<&mut Guest>(entity).unwrap();
                g.eating_timer -= delta_seconds;
                if g.eating_timer <= 0.0 {
                    g.eating_timer = 0.0;
                    g.state = GuestState::Paying;
                }
            }

            GuestState::Paying => {
                let price = world
                    .get::<&Guest>(entity)
                    .ok()
                    .and_then(|g| g.order.as_ref().map(|o| o.price));
                if let Some(price) = price {
                    ledger.add_income(price);
                    events.push(SimEvent::PaymentReceived {
                        guest: entity.id(),
                        amount: price,
                    });
                }
                vacate_table(world, dispatcher, events, entity);
                start_leaving(world, entity, plan);
            }

            GuestState::Leaving => {
                if has_arrived(world, entity) {
                    // Mandatory cleanup: a guest may reach the exit still
                    // holding a table (rejected at the door, or a forced
                    // departure path).
                    vacate_table(world, dispatcher, events, entity);
                    events.push(SimEvent::GuestLeft { guest: entity.id() });
                    departed.push(entity);
                }
            }
        }
    }

    departed
}

/// Patience ran out (or the guest cannot order): unwind queue entries, the
/// pending order and the table, all in this tick, then head for the exit.
/// An order already taken by a staff member is left to finish cooking; the
/// delivery attempt will find the guest gone and discard the dish.
fn abandon(
    world: &mut World,
    dispatcher: &mut Dispatcher,
    events: &mut EventFeed,
    ledger: &mut Ledger,
    plan: &FloorPlan,
    entity: Entity,
) {
    log::info!("guest {} ran out of patience, leaving", entity.id());

    dispatcher.remove_guest(entity);
    if let Ok(mut g) = world.get::<&mut Guest>(entity) {
        g.order = None;
    }
    vacate_table(world, dispatcher, events, entity);

    ledger.penalize(ABANDON_PENALTY);
    events.push(SimEvent::GuestAbandoned { guest: entity.id() });
    start_leaving(world, entity, plan);
}

/// Release the guest's table, mark it dirty and schedule cleaning.
fn vacate_table(world: &mut World, dispatcher: &mut Dispatcher, events: &mut EventFeed, entity: Entity) {
    let table = world
        .get::<&mut Guest>(entity)
        .ok()
        .and_then(|mut g| g.table.take());
    let Some(table) = table else {
        return;
    };

    if let Ok(mut t) = world.get::<&mut Table>(table) {
        t.vacate();
        let number = t.number;
        drop(t);
        events.push(SimEvent::TableDirty { table: number });
    }
    dispatcher.enqueue_cleaning(table);
}

fn start_leaving(world: &mut World, entity: Entity, plan: &FloorPlan) {
    let speed = match world.get::<&mut Guest>(entity) {
        Ok(mut g) => {
            g.state = GuestState::Leaving;
            g.speed
        }
        Err(_) => return,
    };

    let here = world
        .get::<&Position>(entity)
        .map(|p| p.0)
        .unwrap_or(Vec2::ZERO);
    if here.distance(&plan.exit) >= 0.1 {
        let _ = world.insert_one(entity, Movement::new(plan.exit, speed));
    } else {
        let _ = world.remove_one::<Movement>(entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Order;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const MENU: &str = r#"[
        { "name": "Salad", "prep_time": 5.0, "eating_duration": 6.0, "price": 4.0 }
    ]"#;

    struct Fixture {
        world: World,
        dispatcher: Dispatcher,
        events: EventFeed,
        ledger: Ledger,
        menu: MenuCatalog,
        rng: StdRng,
        plan: FloorPlan,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                world: World::new(),
                dispatcher: Dispatcher::new(5),
                events: EventFeed::new(),
                ledger: Ledger::new(),
                menu: MenuCatalog::from_json_str(MENU).unwrap(),
                rng: StdRng::seed_from_u64(11),
                plan: FloorPlan::default(),
            }
        }

        fn tick(&mut self, dt: f32) -> Vec<Entity> {
            guest_system(
                &mut self.world,
                &mut self.dispatcher,
                &mut self.events,
                &mut self.ledger,
                &self.menu,
                &mut self.rng,
                &self.plan,
                dt,
            )
        }

        fn spawn_guest(&mut self, state: GuestState, patience: f32) -> Entity {
            let mut guest = Guest::new(1.0, 20.0);
            guest.state = state;
            self.world
                .spawn((guest, Patience::new(patience), Position::new(0.0, 0.0)))
        }
    }

    #[test]
    fn test_enrollment_happens_once() {
        let mut fx = Fixture::new();
        let guest = fx.spawn_guest(GuestState::WaitingForService, 30.0);

        fx.tick(1.0);
        assert_eq!(fx.dispatcher.service_len(), 1);

        // Simulate a staff assignment dequeuing the guest
        fx.dispatcher.remove_guest(guest);
        fx.tick(1.0);
        // The guest does not re-enroll after being claimed
        assert_eq!(fx.dispatcher.service_len(), 0);
    }

    #[test]
    fn test_delivery_starts_eating_timer() {
        let mut fx = Fixture::new();
        let guest = fx.spawn_guest(GuestState::WaitingForFood, 30.0);
        {
            let mut g = fx.world.get::<&mut Guest>(guest).unwrap();
            let mut order = Order::new("Salad", 5.0, 6.0, 4.0);
            order.delivered = true;
            g.order = Some(order);
        }

        fx.tick(1.0);

        let g = fx.world.get::<&Guest>(guest).unwrap();
        assert_eq!(g.state, GuestState::Eating);
        assert!((g.eating_timer - 6.0).abs() < 0.001);
    }

    #[test]
    fn test_payment_and_table_release() {
        let mut fx = Fixture::new();
        let table = fx
            .world
            .spawn((Table::new(1, 2), Position::new(2.0, 0.0)));
        fx.world.get::<&mut Table>(table).unwrap().occupy();

        let guest = fx.spawn_guest(GuestState::Eating, 30.0);
        {
            let mut g = fx.world.get::<&mut Guest>(guest).unwrap();
            g.table = Some(table);
            let mut order = Order::new("Salad", 5.0, 6.0, 4.0);
            order.delivered = true;
            g.order = Some(order);
            g.eating_timer = 1.0;
        }

        fx.tick(1.0); // finishes eating -> Paying
        fx.tick(1.0); // pays, vacates, starts leaving

        let g = fx.world.get::<&Guest>(guest).unwrap();
        assert_eq!(g.state, GuestState::Leaving);
        assert!(g.table.is_none());

        let t = fx.world.get::<&Table>(table).unwrap();
        assert!(!t.occupied);
        assert!(t.dirty);
        assert_eq!(fx.dispatcher.cleaning_len(), 1);
        assert!((fx.ledger.balance() - 4.0).abs() < 0.001);
        assert!(fx
            .events
            .pending()
            .any(|e| matches!(e, SimEvent::PaymentReceived { amount, .. } if *amount == 4.0)));
    }

    #[test]
    fn test_patience_exhaustion_releases_everything() {
        let mut fx = Fixture::new();
        let table = fx
            .world
            .spawn((Table::new(1, 2), Position::new(2.0, 0.0)));
        fx.world.get::<&mut Table>(table).unwrap().occupy();

        let guest = fx.spawn_guest(GuestState::WaitingForService, 2.0);
        {
            let mut g = fx.world.get::<&mut Guest>(guest).unwrap();
            g.table = Some(table);
        }

        fx.tick(1.0); // patience 2 -> 1, enrolls
        assert_eq!(fx.dispatcher.service_len(), 1);
        fx.tick(1.0); // patience 1 -> 0, abandons

        let g = fx.world.get::<&Guest>(guest).unwrap();
        assert_eq!(g.state, GuestState::Leaving);
        assert!(g.table.is_none());
        assert!(g.order.is_none());

        // Same-tick unwind: queues cleared, table vacated and dirty
        assert_eq!(fx.dispatcher.service_len(), 0);
        let t = fx.world.get::<&Table>(table).unwrap();
        assert!(!t.occupied);
        assert!(t.dirty);
        assert_eq!(fx.dispatcher.cleaning_len(), 1);
        assert!(fx
            .events
            .pending()
            .any(|e| matches!(e, SimEvent::GuestAbandoned { .. })));
    }

    #[test]
    fn test_abandoned_guest_never_waits_again() {
        let mut fx = Fixture::new();
        let guest = fx.spawn_guest(GuestState::WaitingForFood, 1.0);

        fx.tick(1.0);
        assert_eq!(fx.world.get::<&Guest>(guest).unwrap().state, GuestState::Leaving);

        for _ in 0..10 {
            fx.tick(1.0);
            if !fx.world.contains(guest) {
                break;
            }
            let state = fx.world.get::<&Guest>(guest).unwrap().state;
            assert!(!state.is_waiting());
        }
    }

    #[test]
    fn test_departure_at_exit() {
        let mut fx = Fixture::new();
        // Exit is at the default plan position; guest already stands there
        let exit = fx.plan.exit;
        let mut guest = Guest::new(1.0, 20.0);
        guest.state = GuestState::Leaving;
        let entity = fx
            .world
            .spawn((guest, Patience::new(5.0), Position(exit)));

        let departed = fx.tick(1.0);
        assert_eq!(departed, vec![entity]);
        assert!(fx
            .events
            .pending()
            .any(|e| matches!(e, SimEvent::GuestLeft { .. })));
    }
}
