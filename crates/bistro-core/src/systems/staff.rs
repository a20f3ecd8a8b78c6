//! Staff system - drives the service worker state machine.
//!
//! Idle staff ask the dispatcher for work, walk to guests, take orders, cook
//! (via the kitchen pipeline) and deliver. Every guard here is a no-op with a
//! log line, never a panic: guests can vanish or abandon at any point in the
//! transaction and the staff member must simply fall back to Idle.

use hecs::{Entity, World};

use crate::components::{Guest, GuestState, Movement, Position, Staff, StaffState, Table, Vec2};
use crate::dispatcher::{Dispatcher, Task};
use crate::engine::FloorPlan;
use crate::events::{EventFeed, SimEvent};
use crate::systems::kitchen::effective_prep_time;
use crate::systems::movement::has_arrived;

/// Advance every staff member by one tick.
pub fn staff_system(
    world: &mut World,
    dispatcher: &mut Dispatcher,
    events: &mut EventFeed,
    plan: &FloorPlan,
) {
    let members: Vec<Entity> = world.query::<&Staff>().iter().map(|(e, _)| e).collect();

    for entity in members {
        let Ok(state) = world.get::<&Staff>(entity).map(|s| s.state) else {
            continue;
        };

        match state {
            StaffState::Idle => idle(world, dispatcher, entity, plan),
            StaffState::MovingToGuest => moving_to_guest(world, entity),
            StaffState::TakingOrder => taking_order(world, entity, plan),
            StaffState::MovingToKitchen => moving_to_kitchen(world, entity),
            StaffState::WaitingForPrep => waiting_for_prep(world, entity),
            StaffState::DeliveringOrder => delivering_order(world, events, entity),
            StaffState::CleaningTable => cleaning_table(world, events, entity),
        }
    }
}

fn idle(world: &mut World, dispatcher: &mut Dispatcher, entity: Entity, plan: &FloorPlan) {
    // Precondition before dequeuing anything: `next_task` pops the queue
    // entry, and a guest claimed once never re-enrolls. A staff member that
    // ended up Idle while still holding an order must not consume a task.
    if world.get::<&Staff>(entity).unwrap().order.is_some() {
        log::warn!(
            "staff {} idle while holding an order; not taking tasks",
            entity.id()
        );
        return;
    }

    match dispatcher.next_task(world) {
        Some(Task::Serve(guest)) => {
            {
                let mut staff = world.get::<&mut Staff>(entity).unwrap();
                staff.guest = Some(guest);
                staff.state = StaffState::MovingToGuest;
            }
            walk_to_entity(world, entity, guest);
            log::debug!("staff {} heading to guest {}", entity.id(), guest.id());
        }
        Some(Task::Clean(table)) => {
            {
                let mut staff = world.get::<&mut Staff>(entity).unwrap();
                staff.cleaning_target = Some(table);
                staff.state = StaffState::CleaningTable;
            }
            walk_to_entity(world, entity, table);
        }
        None => {
            // Nothing to do: drift back to the rest position.
            walk_to_point(world, entity, plan.staff_rest);
        }
    }
}

fn moving_to_guest(world: &mut World, entity: Entity) {
    if !has_arrived(world, entity) {
        return;
    }

    let guest = world.get::<&Staff>(entity).unwrap().guest;
    let Some(guest) = guest else {
        abort_service(world, entity, "lost guest reference en route");
        return;
    };

    let notified = world
        .get::<&mut Guest>(guest)
        .map(|mut g| g.notify_staff_arrived())
        .unwrap_or(false);

    if notified {
        world.get::<&mut Staff>(entity).unwrap().state = StaffState::TakingOrder;
    } else {
        abort_service(world, entity, "guest not waiting on arrival");
    }
}

fn taking_order(world: &mut World, entity: Entity, plan: &FloorPlan) {
    let guest = world.get::<&Staff>(entity).unwrap().guest;
    let Some(guest) = guest else {
        abort_service(world, entity, "lost guest reference while taking order");
        return;
    };

    let Ok(mut g) = world.get::<&mut Guest>(guest) else {
        abort_service(world, entity, "guest despawned while taking order");
        return;
    };

    if !g.state.can_hand_order() {
        drop(g);
        abort_service(world, entity, "guest no longer in an order-giving state");
        return;
    }

    let Some(order) = g.order.take() else {
        // Guest is still picking a dish this tick; try again next tick.
        return;
    };
    g.on_order_taken();
    drop(g);

    {
        let mut staff = world.get::<&mut Staff>(entity).unwrap();
        log::debug!(
            "staff {} took order {} from guest {}",
            entity.id(),
            order.dish,
            guest.id()
        );
        staff.order = Some(order);
        staff.state = StaffState::MovingToKitchen;
    }
    walk_to_point(world, entity, plan.kitchen);
}

fn moving_to_kitchen(world: &mut World, entity: Entity) {
    if !has_arrived(world, entity) {
        return;
    }

    let mut staff = world.get::<&mut Staff>(entity).unwrap();
    match &staff.order {
        Some(order) => {
            staff.cook_timer = effective_prep_time(order.prep_time, staff.skill);
            staff.state = StaffState::WaitingForPrep;
        }
        None => {
            drop(staff);
            abort_service(world, entity, "reached kitchen with no order in hand");
        }
    }
}

fn waiting_for_prep(world: &mut World, entity: Entity) {
    // The kitchen system owns the timer; move out once it has run down.
    if world.get::<&Staff>(entity).unwrap().cook_timer > 0.0 {
        return;
    }

    let guest = world.get::<&Staff>(entity).unwrap().guest;
    let target = guest.filter(|g| world.contains(*g));
    match target {
        Some(guest) => {
            world.get::<&mut Staff>(entity).unwrap().state = StaffState::DeliveringOrder;
            walk_to_entity(world, entity, guest);
        }
        None => {
            // Guest left while the dish was cooking; discard it silently.
            abort_service(world, entity, "guest gone before delivery");
        }
    }
}

fn delivering_order(world: &mut World, events: &mut EventFeed, entity: Entity) {
    if !has_arrived(world, entity) {
        return;
    }

    let (guest, order) = {
        let mut staff = world.get::<&mut Staff>(entity).unwrap();
        (staff.guest, staff.order.take())
    };

    let Some(mut order) = order else {
        abort_service(world, entity, "arrived to deliver with no order in hand");
        return;
    };

    let delivered = guest
        .and_then(|g| world.get::<&mut Guest>(g).ok().map(|guest| (g, guest)))
        .filter(|(_, g)| g.state == GuestState::WaitingForFood)
        .map(|(id, mut g)| {
            order.delivered = true;
            let dish = order.dish.clone();
            g.order = Some(order);
            events.push(SimEvent::OrderDelivered {
                guest: id.id(),
                dish,
            });
        })
        .is_some();

    if !delivered {
        // The guest abandoned or left while we were carrying the dish; the
        // order is dropped without ever being marked delivered.
        log::debug!("staff {} discarding undeliverable dish", entity.id());
    }

    world.get::<&mut Staff>(entity).unwrap().reset();
}

fn cleaning_table(world: &mut World, events: &mut EventFeed, entity: Entity) {
    if !has_arrived(world, entity) {
        return;
    }

    let target = world.get::<&Staff>(entity).unwrap().cleaning_target;
    if let Some(table) = target {
        if let Ok(mut t) = world.get::<&mut Table>(table) {
            // Guard: the table may have been re-dirtied and re-queued, or
            // cleaned by someone else already.
            if t.dirty && !t.occupied {
                t.clean();
                let number = t.number;
                drop(t);
                log::debug!("staff {} cleaned table {}", entity.id(), number);
                events.push(SimEvent::TableCleaned { table: number });
            }
        }
    }

    world.get::<&mut Staff>(entity).unwrap().reset();
}

/// Drop the current assignment with a diagnostic and return to Idle. Any
/// order in hand is discarded here; `delivered` is never set on this path.
fn abort_service(world: &mut World, entity: Entity, reason: &str) {
    log::warn!("staff {} aborting task: {}", entity.id(), reason);
    if let Ok(mut staff) = world.get::<&mut Staff>(entity) {
        staff.reset();
    }
    let _ = world.remove_one::<Movement>(entity);
}

fn walk_to_entity(world: &mut World, walker: Entity, target: Entity) {
    if let Ok(pos) = world.get::<&Position>(target).map(|p| p.0) {
        walk_to_point(world, walker, pos);
    }
}

fn walk_to_point(world: &mut World, walker: Entity, target: Vec2) {
    let Ok(speed) = world.get::<&Staff>(walker).map(|s| s.speed) else {
        return;
    };
    let here = world
        .get::<&Position>(walker)
        .map(|p| p.0)
        .unwrap_or_default();
    if here.distance(&target) < 0.1 {
        return;
    }
    let _ = world.insert_one(walker, Movement::new(target, speed));
}
