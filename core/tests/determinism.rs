//! Two engines, same seed, same configuration.
//! They must produce identical datasets and event logs.

use mailsim_core::engine::SimEngine;

fn run(run_id: &str, seed: u64) -> SimEngine {
    let mut engine = SimEngine::build_test(run_id.into(), seed).expect("build");
    engine.run().expect("run");
    engine
}

fn collect_event_log(engine: &SimEngine) -> Vec<String> {
    (0..=engine.clock.elapsed_days)
        .flat_map(|tick| {
            engine
                .store_events_for_tick(tick)
                .expect("read events")
                .into_iter()
                .map(|e| e.payload)
                // The init payload carries the run id, which differs between runs.
                .filter(|p| !p.contains("run_initialized"))
        })
        .collect()
}

#[test]
fn same_seed_produces_identical_datasets() {
    const SEED: u64 = 0xDEAD_BEEF_CAFE_1234;
    let a = run("det-a", SEED);
    let b = run("det-b", SEED);

    let (da, db) = (a.dataset(), b.dataset());
    assert_eq!(da.rows.len(), db.rows.len());
    for (i, (x, y)) in da.rows.iter().zip(&db.rows).enumerate() {
        assert_eq!(x, y, "dataset diverged at row {i}");
    }
    assert_eq!(da.daily_aggregates, db.daily_aggregates);
    assert_eq!(da.summary, db.summary);
}

#[test]
fn same_seed_produces_identical_event_logs() {
    let a = run("log-a", 77);
    let b = run("log-b", 77);
    let log_a = collect_event_log(&a);
    let log_b = collect_event_log(&b);
    assert!(!log_a.is_empty());
    assert_eq!(log_a, log_b);
}

#[test]
fn different_seeds_produce_different_datasets() {
    let a = run("diff-a", 42);
    let b = run("diff-b", 99);
    let ages_a: Vec<u32> = a.consumers().iter().map(|c| c.age).collect();
    let ages_b: Vec<u32> = b.consumers().iter().map(|c| c.age).collect();
    assert_ne!(ages_a, ages_b, "seed is not reaching the population");
}
