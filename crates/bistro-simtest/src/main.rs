//! Bistro Headless Simulation Harness
//!
//! Validates the coordination core and its data without any rendering.
//! Runs entirely in-process — no graphics, no networking, no wall clock.
//!
//! Usage:
//!   cargo run -p bistro-simtest
//!   cargo run -p bistro-simtest -- --verbose

use bistro_core::prelude::*;
use bistro_core::systems::{effective_prep_time, MIN_PREP_TIME, SKILL_GROWTH};
use serde::Deserialize;

// ── Menu manifest (same JSON a frontend would ship) ─────────────────────
const MENU_JSON: &str = include_str!("../../../data/menu.json");

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct DishSpec {
    name: String,
    prep_time: f32,
    eating_duration: f32,
    price: f32,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    env_logger::init();
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== Bistro Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Menu manifest validation
    results.extend(validate_menu_manifest(verbose));

    // 2. Seating & queue sweep
    results.extend(validate_seating_and_queue(verbose));

    // 3. Full service flow
    results.extend(validate_service_flow(verbose));

    // 4. Abandonment & cleanup
    results.extend(validate_abandonment(verbose));

    // 5. Kitchen skill curve
    results.extend(validate_skill_curve(verbose));

    // 6. Determinism
    results.extend(validate_determinism(verbose));

    // 7. Long soak run
    results.extend(validate_soak_run(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn default_engine(num_tables: usize, staff_count: usize, seed: u64) -> SimulationEngine {
    let menu = MenuCatalog::from_json_str(MENU_JSON).expect("menu manifest broken");
    let config = RestaurantConfig {
        num_tables,
        staff_count,
        spawn: None,
        ..Default::default()
    };
    SimulationEngine::new(menu, config, seed)
}

// ── 1. Menu Manifest ────────────────────────────────────────────────────

fn validate_menu_manifest(verbose: bool) -> Vec<TestResult> {
    println!("--- Menu Manifest ---");
    let mut results = Vec::new();

    let manifest: Vec<DishSpec> = match serde_json::from_str(MENU_JSON) {
        Ok(m) => m,
        Err(e) => {
            results.push(TestResult {
                name: "menu_parse".into(),
                passed: false,
                detail: format!("JSON parse error: {}", e),
            });
            return results;
        }
    };

    results.push(TestResult {
        name: "menu_not_empty".into(),
        passed: !manifest.is_empty(),
        detail: format!("{} dishes loaded", manifest.len()),
    });

    let bad_prep: Vec<_> = manifest.iter().filter(|d| d.prep_time <= 0.0).collect();
    results.push(TestResult {
        name: "menu_positive_prep".into(),
        passed: bad_prep.is_empty(),
        detail: if bad_prep.is_empty() {
            "all dishes have positive prep time".into()
        } else {
            format!("{} dishes with non-positive prep time", bad_prep.len())
        },
    });

    let bad_price: Vec<_> = manifest.iter().filter(|d| d.price <= 0.0).collect();
    results.push(TestResult {
        name: "menu_positive_price".into(),
        passed: bad_price.is_empty(),
        detail: if bad_price.is_empty() {
            "all dishes have positive price".into()
        } else {
            format!(
                "{} dishes priced at zero or less: {}",
                bad_price.len(),
                bad_price
                    .iter()
                    .map(|d| d.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        },
    });

    // The catalog applies the same checks at load time
    let catalog = MenuCatalog::from_json_str(MENU_JSON);
    results.push(TestResult {
        name: "menu_catalog_loads".into(),
        passed: catalog.is_ok(),
        detail: match &catalog {
            Ok(c) => format!("catalog accepts all {} dishes", c.len()),
            Err(e) => format!("catalog rejected manifest: {}", e),
        },
    });

    // A guest with the default wallet can afford at least one dish
    if let Ok(catalog) = catalog {
        let base_wallet = SpawnConfig::default().base_wallet;
        let floor_wallet = base_wallet * 0.5;
        let affordable = catalog.affordable(floor_wallet).len();
        results.push(TestResult {
            name: "menu_affordable_floor".into(),
            passed: affordable > 0,
            detail: format!(
                "{} dishes affordable at the poorest wallet ({:.1})",
                affordable, floor_wallet
            ),
        });
    }

    if verbose {
        println!("  Dishes:");
        for d in &manifest {
            println!(
                "    {:10} prep {:4.1}s  eat {:4.1}s  {:5.1} credits",
                d.name, d.prep_time, d.eating_duration, d.price
            );
        }
    }

    results
}

// ── 2. Seating & Queue ──────────────────────────────────────────────────

fn validate_seating_and_queue(_verbose: bool) -> Vec<TestResult> {
    println!("--- Seating & Queue ---");
    let mut results = Vec::new();

    // Three tables, five guests: exactly three seated, two queued
    let mut engine = default_engine(3, 0, 7);
    for _ in 0..5 {
        engine.spawn_guest(100.0, 3.0, 20.0);
    }
    engine.tick(1.0);
    results.push(TestResult {
        name: "seating_first_fit".into(),
        passed: engine.free_table_count() == 0 && engine.dispatcher.seating_len() == 2,
        detail: format!(
            "{} free tables, {} guests still queued",
            engine.free_table_count(),
            engine.dispatcher.seating_len()
        ),
    });

    // Queue cap: one table, arrivals past max_waiting are turned away
    let mut engine = default_engine(1, 0, 7);
    let cap = RestaurantConfig::default().max_waiting;
    for _ in 0..cap + 4 {
        engine.spawn_guest(100.0, 3.0, 20.0);
    }
    let rejections = engine
        .drain_events()
        .iter()
        .filter(|e| matches!(e, SimEvent::QueueFull { .. }))
        .count();
    results.push(TestResult {
        name: "queue_cap_rejects".into(),
        passed: rejections == 4 && engine.dispatcher.seating_len() == cap,
        detail: format!(
            "{} turned away, {}/{} in queue",
            rejections,
            engine.dispatcher.seating_len(),
            cap
        ),
    });

    // Queued guests are seated in arrival order as tables free up
    engine.tick(1.0);
    results.push(TestResult {
        name: "queue_fifo_seating".into(),
        passed: engine.free_table_count() == 0 && engine.dispatcher.seating_len() == cap - 1,
        detail: format!("front of queue seated, {} remain", engine.dispatcher.seating_len()),
    });

    results
}

// ── 3. Full Service Flow ────────────────────────────────────────────────

fn validate_service_flow(verbose: bool) -> Vec<TestResult> {
    println!("--- Service Flow ---");
    let mut results = Vec::new();

    let mut engine = default_engine(1, 1, 11);
    engine.spawn_guest(1000.0, 3.0, 50.0);

    let mut events = Vec::new();
    let mut ticks_used = 0;
    for t in 0..300 {
        engine.tick(1.0);
        events.extend(engine.drain_events());
        if engine.guest_count() == 0 && engine.dirty_table_count() == 0 {
            ticks_used = t + 1;
            break;
        }
    }

    results.push(TestResult {
        name: "flow_completes".into(),
        passed: ticks_used > 0,
        detail: if ticks_used > 0 {
            format!("guest served and gone in {} ticks", ticks_used)
        } else {
            "service cycle never finished".into()
        },
    });

    // GuestLeft races TableCleaned (the walkout and the cleanup overlap),
    // so only the causal chain is order-checked.
    let expected = [
        "GuestSeated",
        "OrderReady",
        "OrderDelivered",
        "PaymentReceived",
        "TableDirty",
        "TableCleaned",
    ];
    let sequence: Vec<&str> = events
        .iter()
        .map(|e| match e {
            SimEvent::GuestSeated { .. } => "GuestSeated",
            SimEvent::OrderReady { .. } => "OrderReady",
            SimEvent::OrderDelivered { .. } => "OrderDelivered",
            SimEvent::TableDirty { .. } => "TableDirty",
            SimEvent::TableCleaned { .. } => "TableCleaned",
            SimEvent::GuestLeft { .. } => "GuestLeft",
            SimEvent::GuestAbandoned { .. } => "GuestAbandoned",
            SimEvent::QueueFull { .. } => "QueueFull",
            SimEvent::PaymentReceived { .. } => "PaymentReceived",
        })
        .collect();
    let mut last = 0;
    let ordered = expected.iter().all(|name| {
        match sequence[last..].iter().position(|s| s == name) {
            Some(p) => {
                last += p + 1;
                true
            }
            None => false,
        }
    });
    let guest_left = sequence.iter().any(|&s| s == "GuestLeft");
    results.push(TestResult {
        name: "flow_event_order".into(),
        passed: ordered && guest_left,
        detail: format!("{} events, milestones in order: {}", events.len(), ordered),
    });

    results.push(TestResult {
        name: "flow_payment_received".into(),
        passed: engine.ledger.balance() > 0.0,
        detail: format!("balance {:.1} after one served guest", engine.ledger.balance()),
    });

    results.push(TestResult {
        name: "flow_nothing_left_behind".into(),
        passed: engine.free_table_count() == 1
            && engine.dispatcher.service_len() == 0
            && engine.dispatcher.cleaning_len() == 0,
        detail: "table cleaned, queues empty".into(),
    });

    if verbose {
        println!("  Event sequence: {}", sequence.join(" → "));
    }

    results
}

// ── 4. Abandonment & Cleanup ────────────────────────────────────────────

fn validate_abandonment(_verbose: bool) -> Vec<TestResult> {
    println!("--- Abandonment ---");
    let mut results = Vec::new();

    // No staff: a seated guest runs out of patience
    let mut engine = default_engine(1, 0, 13);
    engine.spawn_guest(3.0, 3.0, 20.0);
    let mut abandoned = false;
    for _ in 0..20 {
        engine.tick(1.0);
        if engine
            .drain_events()
            .iter()
            .any(|e| matches!(e, SimEvent::GuestAbandoned { .. }))
        {
            abandoned = true;
            break;
        }
    }
    results.push(TestResult {
        name: "abandon_on_patience".into(),
        passed: abandoned,
        detail: "seated guest with no service walks out".into(),
    });

    // Resources unwound the same tick: table free but dirty, queued for cleaning
    results.push(TestResult {
        name: "abandon_unwinds_table".into(),
        passed: engine.free_table_count() == 0
            && engine.dirty_table_count() == 1
            && engine.dispatcher.cleaning_len() == 1
            && engine.dispatcher.service_len() == 0,
        detail: format!(
            "{} dirty tables, cleaning queue {}, service queue {}",
            engine.dirty_table_count(),
            engine.dispatcher.cleaning_len(),
            engine.dispatcher.service_len()
        ),
    });

    // The walkout despawns at the exit
    for _ in 0..20 {
        engine.tick(1.0);
    }
    results.push(TestResult {
        name: "abandon_guest_despawns".into(),
        passed: engine.guest_count() == 0,
        detail: format!("{} guests left in world", engine.guest_count()),
    });

    results
}

// ── 5. Kitchen Skill Curve ──────────────────────────────────────────────

fn validate_skill_curve(verbose: bool) -> Vec<TestResult> {
    println!("--- Kitchen Skill ---");
    let mut results = Vec::new();

    // Higher skill never increases prep time
    let base = 10.0;
    let mut monotone = true;
    let mut prev = f32::MAX;
    let mut skill = 1.0f32;
    for _ in 0..200 {
        let t = effective_prep_time(base, skill);
        if t > prev + f32::EPSILON {
            monotone = false;
        }
        prev = t;
        skill *= SKILL_GROWTH;
    }
    results.push(TestResult {
        name: "skill_monotone_speedup".into(),
        passed: monotone,
        detail: format!("prep time after 200 cooks: {:.2}s (from {:.1}s)", prev, base),
    });

    // Floor: prep time never drops below the minimum
    results.push(TestResult {
        name: "skill_floor_holds".into(),
        passed: (prev - MIN_PREP_TIME).abs() < 0.001
            && effective_prep_time(base, 1e9) >= MIN_PREP_TIME,
        detail: format!("floor {:.2}s reached and held", MIN_PREP_TIME),
    });

    if verbose {
        println!("  Prep time for a {:.0}s dish by cook count:", base);
        let mut skill = 1.0f32;
        for cooks in [0u32, 5, 10, 25, 50, 100] {
            let t = effective_prep_time(base, skill);
            println!("    {:3} cooks → {:.2}s", cooks, t);
            for _ in 0..5 {
                skill *= SKILL_GROWTH;
            }
        }
    }

    results
}

// ── 6. Determinism ──────────────────────────────────────────────────────

fn validate_determinism(_verbose: bool) -> Vec<TestResult> {
    println!("--- Determinism ---");
    let mut results = Vec::new();

    let run = |seed: u64| {
        let menu = MenuCatalog::from_json_str(MENU_JSON).expect("menu manifest broken");
        let config = RestaurantConfig::default(); // spawner enabled
        let mut engine = SimulationEngine::new(menu, config, seed);
        let mut events = Vec::new();
        for _ in 0..500 {
            engine.tick(1.0);
            events.extend(engine.drain_events());
        }
        (events, engine.ledger.balance(), engine.guest_count())
    };

    let (ev_a, bal_a, guests_a) = run(99);
    let (ev_b, bal_b, guests_b) = run(99);
    results.push(TestResult {
        name: "determinism_same_seed".into(),
        passed: ev_a == ev_b && bal_a == bal_b && guests_a == guests_b,
        detail: format!(
            "{} events, balance {:.1}, identical across runs: {}",
            ev_a.len(),
            bal_a,
            ev_a == ev_b
        ),
    });

    let (ev_c, _, _) = run(100);
    results.push(TestResult {
        name: "determinism_seed_matters".into(),
        passed: ev_a != ev_c,
        detail: "different seed produced a different history".into(),
    });

    results
}

// ── 7. Soak Run ─────────────────────────────────────────────────────────

fn validate_soak_run(verbose: bool) -> Vec<TestResult> {
    println!("--- Soak Run ---");
    let mut results = Vec::new();

    let menu = MenuCatalog::from_json_str(MENU_JSON).expect("menu manifest broken");
    let config = RestaurantConfig {
        num_tables: 4,
        staff_count: 2,
        ..Default::default()
    };
    let mut engine = SimulationEngine::new(menu, config, 2024);

    let mut exclusivity_ok = true;
    let mut tally = [0usize; 9];
    for _ in 0..2000 {
        engine.tick(1.0);
        for event in engine.drain_events() {
            let slot = match event {
                SimEvent::GuestSeated { .. } => 0,
                SimEvent::OrderReady { .. } => 1,
                SimEvent::OrderDelivered { .. } => 2,
                SimEvent::TableDirty { .. } => 3,
                SimEvent::TableCleaned { .. } => 4,
                SimEvent::GuestLeft { .. } => 5,
                SimEvent::GuestAbandoned { .. } => 6,
                SimEvent::QueueFull { .. } => 7,
                SimEvent::PaymentReceived { .. } => 8,
            };
            tally[slot] += 1;
        }

        for &table in engine.tables() {
            let holders = engine
                .world
                .query::<&Guest>()
                .iter()
                .filter(|(_, g)| g.table == Some(table))
                .count();
            if holders > 1 {
                exclusivity_ok = false;
            }
        }
    }

    results.push(TestResult {
        name: "soak_table_exclusivity".into(),
        passed: exclusivity_ok,
        detail: "no table ever held by two guests over 2000 ticks".into(),
    });

    results.push(TestResult {
        name: "soak_restaurant_alive".into(),
        passed: tally[0] > 50 && tally[8] > 10,
        detail: format!("{} seatings, {} payments", tally[0], tally[8]),
    });

    results.push(TestResult {
        name: "soak_deliveries_paid_for".into(),
        passed: tally[8] <= tally[2] && tally[2] <= tally[1],
        detail: format!(
            "{} ready ≥ {} delivered ≥ {} paid",
            tally[1], tally[2], tally[8]
        ),
    });

    results.push(TestResult {
        name: "soak_cleanup_keeps_pace".into(),
        passed: tally[3].abs_diff(tally[4]) <= config_tables(&engine),
        detail: format!("{} dirtied vs {} cleaned", tally[3], tally[4]),
    });

    let balance = engine.ledger.balance();
    results.push(TestResult {
        name: "soak_balance_in_range".into(),
        passed: (0.0..=9999.0).contains(&balance),
        detail: format!("final balance {:.1}", balance),
    });

    if verbose {
        let names = [
            "GuestSeated",
            "OrderReady",
            "OrderDelivered",
            "TableDirty",
            "TableCleaned",
            "GuestLeft",
            "GuestAbandoned",
            "QueueFull",
            "PaymentReceived",
        ];
        println!("  Event tally over 2000 ticks:");
        for (i, name) in names.iter().enumerate() {
            println!("    {:16}: {}", name, tally[i]);
        }
    }

    results
}

fn config_tables(engine: &SimulationEngine) -> usize {
    engine.tables().len()
}
