//! Lock-On Headless Scenario Harness
//!
//! Validates target selection, cycling and the per-frame self-check without
//! a game engine. Runs entirely in-process: no rendering, no physics engine.
//!
//! Usage:
//!   cargo run -p lockon-simtest
//!   cargo run -p lockon-simtest -- --verbose
//!   cargo run -p lockon-simtest -- --config data/lockon_settings.json
//!   cargo run -p lockon-simtest -- --seed 7

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use clap::Parser;
use hecs::Entity;
use lockon_core::capability::lockable_handle;
use lockon_core::prelude::*;
use lockon_logic::config::LockConfig;
use lockon_logic::ranking::{rank_by_distance, Candidate};
use lockon_logic::selector::cycle_index;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ── Bundled settings (same file the game ships) ─────────────────────────
const SETTINGS_JSON: &str = include_str!("../../../data/lockon_settings.json");

const FRAME: f32 = 1.0 / 60.0;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

/// Headless scenario harness for lock-on targeting
#[derive(Parser, Debug)]
#[command(name = "lockon-simtest")]
#[command(about = "Headless scenario harness for lock-on targeting")]
struct Args {
    /// Print every check, not just failures
    #[arg(short, long)]
    verbose: bool,

    /// Lock-on settings JSON to run the scenarios with
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for the randomized sweeps
    #[arg(long, default_value_t = 0x5eed)]
    seed: u64,
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    println!("=== Lock-On Scenario Harness ===\n");

    let mut results = Vec::new();

    // 1. Settings loading and validation
    let settings = match load_settings(&args, &mut results) {
        Some(settings) => settings,
        None => LockOnSettings::default(),
    };

    // 2. Cyclic index selection
    results.extend(validate_cycle_index(args.seed));

    // 3. Distance ranking
    results.extend(validate_ranking(args.seed));

    // 4. Scripted lock transitions
    results.extend(validate_transitions(&settings));

    // 5. Self-healing under random churn
    results.extend(validate_self_check(&settings, args.seed, args.verbose));

    // 6. Lock-driven followers
    results.extend(validate_followers(&settings));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || args.verbose {
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

fn check(name: &str, passed: bool, detail: impl Into<String>) -> TestResult {
    TestResult {
        name: name.into(),
        passed,
        detail: detail.into(),
    }
}

// ── 1. Settings ─────────────────────────────────────────────────────────

fn load_settings(args: &Args, results: &mut Vec<TestResult>) -> Option<LockOnSettings> {
    println!("--- Settings ---");

    let bundled = LockOnSettings::from_json_str(SETTINGS_JSON);
    results.push(check(
        "settings_bundled_parse",
        bundled.is_ok(),
        match &bundled {
            Ok(s) => format!(
                "near {} far {} radius {}",
                s.lock.near_distance(),
                s.lock.far_distance(),
                s.lock.radius()
            ),
            Err(e) => format!("bundled settings rejected: {}", e),
        },
    ));

    let inverted = LockOnSettings::from_json_str(
        r#"{ "lock": { "near_distance": 900.0, "far_distance": 100.0 } }"#,
    );
    results.push(check(
        "settings_reject_inverted_range",
        inverted.is_err(),
        "near beyond far must not load",
    ));

    let flat = LockOnSettings::from_json_str(r#"{ "lock": { "radius": 0.0 } }"#);
    results.push(check(
        "settings_reject_zero_radius",
        flat.is_err(),
        "zero sweep radius must not load",
    ));

    match &args.config {
        Some(path) => {
            let loaded = LockOnSettings::from_json_file(path);
            results.push(check(
                "settings_config_file",
                loaded.is_ok(),
                match &loaded {
                    Ok(_) => format!("loaded {}", path.display()),
                    Err(e) => format!("{}: {}", path.display(), e),
                },
            ));
            loaded.ok()
        }
        None => bundled.ok(),
    }
}

// ── 2. Cyclic index ─────────────────────────────────────────────────────

fn validate_cycle_index(seed: u64) -> Vec<TestResult> {
    println!("--- Cyclic Index ---");
    let mut results = Vec::new();

    let fixed = [
        (3usize, 1i64, 4usize, 0usize),
        (0, -1, 4, 3),
        (0, -1, 5, 4),
        (2, -7, 3, 1),
    ];
    let wrong: Vec<_> = fixed
        .iter()
        .filter(|(current, offset, count, want)| {
            cycle_index(*current, *offset, *count) != Some(*want)
        })
        .collect();
    results.push(check(
        "index_fixed_cases",
        wrong.is_empty(),
        if wrong.is_empty() {
            format!("{} wraparound cases", fixed.len())
        } else {
            format!("wrong: {:?}", wrong)
        },
    ));

    results.push(check(
        "index_empty_list",
        cycle_index(0, 1, 0).is_none(),
        "no index into an empty list",
    ));

    let mut rng = StdRng::seed_from_u64(seed);
    let mut out_of_range = 0;
    let samples = 10_000;
    for _ in 0..samples {
        let count = rng.gen_range(1..100usize);
        let current = rng.gen_range(0..count);
        let offset: i64 = rng.gen();
        match cycle_index(current, offset, count) {
            Some(i) if i < count => {}
            _ => out_of_range += 1,
        }
    }
    results.push(check(
        "index_always_in_range",
        out_of_range == 0,
        format!("{}/{} random offsets out of range", out_of_range, samples),
    ));

    results
}

// ── 3. Ranking ──────────────────────────────────────────────────────────

fn validate_ranking(seed: u64) -> Vec<TestResult> {
    println!("--- Distance Ranking ---");
    let mut results = Vec::new();

    // [5, 5, 10] with the tie at positions 0 and 1
    let tied = [
        Candidate::new(0usize, Vec3::new(5.0, 0.0, 0.0)),
        Candidate::new(1, Vec3::new(0.0, -5.0, 0.0)),
        Candidate::new(2, Vec3::new(0.0, 0.0, 10.0)),
    ];
    let ranked = rank_by_distance(Vec3::ZERO, &tied);
    results.push(check(
        "rank_tie_keeps_order",
        ranked == vec![0, 1, 2],
        format!("{:?}", ranked),
    ));

    let mut rng = StdRng::seed_from_u64(seed ^ 0xa11);
    let mut violations = 0;
    let rounds = 1000;
    for _ in 0..rounds {
        let n = rng.gen_range(1..32);
        let candidates: Vec<Candidate<usize>> = (0..n)
            .map(|i| {
                let p = Vec3::new(
                    rng.gen_range(-3..=3) as f32,
                    rng.gen_range(-3..=3) as f32,
                    0.0,
                );
                Candidate::new(i, p)
            })
            .collect();
        let ranked = rank_by_distance(Vec3::ZERO, &candidates);
        let ordered = ranked.windows(2).all(|w| {
            let d0 = candidates[w[0]].position.length_squared();
            let d1 = candidates[w[1]].position.length_squared();
            d0 < d1 || (d0 == d1 && w[0] < w[1])
        });
        if !ordered || ranked.len() != n {
            violations += 1;
        }
    }
    results.push(check(
        "rank_sorted_and_stable",
        violations == 0,
        format!("{}/{} random sets misordered", violations, rounds),
    ));

    results
}

// ── 4. Scripted transitions ─────────────────────────────────────────────

type Events = Arc<Mutex<Vec<Option<Entity>>>>;

fn record(engine: &mut LockOnEngine, owner: Entity) -> Events {
    let events: Events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    engine.on_lock_changed(owner, move |target| {
        if let Ok(mut events) = sink.lock() {
            events.push(target);
        }
    });
    events
}

fn drain(events: &Events) -> Vec<Option<Entity>> {
    events
        .lock()
        .map(|mut e| std::mem::take(&mut *e))
        .unwrap_or_default()
}

/// Hunter at the origin facing +X with targets spread through its sweep.
fn line_scene(settings: &LockOnSettings, count: usize) -> (LockOnEngine, Entity, Vec<Entity>) {
    let mut engine = LockOnEngine::new();
    let hunter = engine.spawn_character(Vec3::ZERO, Vec3::X, settings);
    let near = settings.lock.near_distance();
    let span = settings.lock.far_distance() - near;
    let targets = (0..count)
        .map(|i| {
            let x = near + span * (i as f32 + 1.0) / (count as f32 + 1.0);
            engine.spawn_target(Vec3::new(x, 0.0, 0.0), 1.0)
        })
        .collect();
    (engine, hunter, targets)
}

fn validate_transitions(settings: &LockOnSettings) -> Vec<TestResult> {
    println!("--- Lock Transitions ---");
    let mut results = Vec::new();

    // Begin picks the closest, once
    let (mut engine, hunter, targets) = line_scene(settings, 4);
    let events = record(&mut engine, hunter);
    let began = engine.begin_lock_on(hunter);
    let emitted = drain(&events);
    results.push(check(
        "begin_closest",
        began
            && engine.locked_target(hunter) == Some(targets[0])
            && emitted == vec![Some(targets[0])],
        format!("locked {:?}, events {:?}", engine.locked_target(hunter), emitted),
    ));

    // Begin while locked is refused without side effects
    let again = engine.try_begin_lock_on(hunter);
    results.push(check(
        "begin_while_locked",
        again == Err(LockError::InvalidTransition) && drain(&events).is_empty(),
        format!("{:?}", again),
    ));

    // Cycle walks forward and wraps backward
    let forward = engine.cycle_lock(hunter, 1) && engine.locked_target(hunter) == Some(targets[1]);
    let wrapped = engine.cycle_lock(hunter, -2) && engine.locked_target(hunter) == Some(targets[3]);
    results.push(check(
        "cycle_wraps",
        forward && wrapped,
        format!("now on {:?}", engine.locked_target(hunter)),
    ));
    drain(&events);

    // Lockable flag flips: hands over to the closest remaining, one event
    engine.end_lock_on(hunter);
    engine.begin_lock_on(hunter);
    drain(&events);
    engine.set_lockable(targets[0], false);
    let changed = engine.update(FRAME);
    let emitted = drain(&events);
    results.push(check(
        "self_check_hands_over",
        changed == vec![(hunter, TickOutcome::Cycled(targets[1]))]
            && emitted == vec![Some(targets[1])],
        format!("{:?}, events {:?}", changed, emitted),
    ));

    // Cycle with nothing left unlocks
    for target in &targets {
        engine.set_lockable(*target, false);
    }
    let cycled = engine.cycle_lock(hunter, 1);
    let emitted = drain(&events);
    results.push(check(
        "cycle_empty_unlocks",
        !cycled && !engine.is_locked(hunter) && emitted == vec![None],
        format!("cycled {}, events {:?}", cycled, emitted),
    ));

    // End is idempotent
    engine.end_lock_on(hunter);
    results.push(check(
        "end_idempotent",
        drain(&events).is_empty(),
        "second end emits nothing",
    ));

    // Destroyed target ends the lock on the next frame
    let (mut engine, hunter, targets) = line_scene(settings, 2);
    engine.begin_lock_on(hunter);
    engine.despawn(targets[0]);
    let changed = engine.update(FRAME);
    results.push(check(
        "despawned_target_ends",
        changed == vec![(hunter, TickOutcome::Ended)] && !engine.is_locked(hunter),
        format!("{:?}", changed),
    ));

    results
}

// ── 5. Self-check under churn ───────────────────────────────────────────

fn validate_self_check(settings: &LockOnSettings, seed: u64, verbose: bool) -> Vec<TestResult> {
    println!("--- Self-Check Under Churn ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(seed ^ 0xc4a5e);

    let near = settings.lock.near_distance();
    let far = settings.lock.far_distance();
    let rounds = 50;
    let frames = 240;

    let mut stale_locks = 0;
    let mut listener_mismatches = 0;
    let mut locked_frames = 0;
    let mut handovers = 0;

    for _ in 0..rounds {
        let mut engine = LockOnEngine::new();
        let hunter = engine.spawn_character(Vec3::ZERO, Vec3::X, settings);
        let mut targets: Vec<Entity> = (0..rng.gen_range(3..12))
            .map(|_| {
                let p = Vec3::new(rng.gen_range(near..=far), rng.gen_range(-200.0..200.0), 0.0);
                engine.spawn_target(p, rng.gen_range(10.0..60.0))
            })
            .collect();
        let events = record(&mut engine, hunter);
        engine.begin_lock_on(hunter);

        for _ in 0..frames {
            if !targets.is_empty() && rng.gen_bool(0.05) {
                let pick = targets[rng.gen_range(0..targets.len())];
                match rng.gen_range(0..4) {
                    0 => {
                        let lockable = lockable_handle(&engine.world, pick).map(|h| h.lockable);
                        engine.set_lockable(pick, !lockable.unwrap_or(true));
                    }
                    1 => {
                        engine.despawn(pick);
                        targets.retain(|t| *t != pick);
                    }
                    _ => {
                        let x = rng.gen_range(-far..=far * 1.5);
                        let y = rng.gen_range(-400.0..400.0);
                        engine.move_to(pick, Vec3::new(x, y, 0.0));
                    }
                }
            }
            if !engine.is_locked(hunter) && rng.gen_bool(0.1) {
                engine.begin_lock_on(hunter);
            }

            for (_, outcome) in engine.update(FRAME) {
                if matches!(outcome, TickOutcome::Cycled(_)) {
                    handovers += 1;
                }
            }

            // After a tick a lock always points at a live, lockable target
            if engine.is_locked(hunter) {
                locked_frames += 1;
                let healthy = engine
                    .locked_target(hunter)
                    .and_then(|t| lockable_handle(&engine.world, t))
                    .map(|h| h.lockable)
                    .unwrap_or(false);
                if !healthy {
                    stale_locks += 1;
                }
            }

            let last = events.lock().ok().and_then(|e| e.last().copied());
            if let Some(last) = last {
                if last != engine.locked_target(hunter) {
                    listener_mismatches += 1;
                }
            }
        }
    }

    if verbose {
        println!(
            "  {} rounds x {} frames: {} locked frames, {} handovers",
            rounds, frames, locked_frames, handovers
        );
    }

    results.push(check(
        "churn_no_stale_lock",
        stale_locks == 0,
        format!("{} frames ended on a dead or unlockable target", stale_locks),
    ));
    results.push(check(
        "churn_listener_agrees",
        listener_mismatches == 0,
        format!("{} frames where the last event disagreed with the lock", listener_mismatches),
    ));
    results.push(check(
        "churn_exercised",
        locked_frames > 0,
        format!("{} locked frames, {} handovers", locked_frames, handovers),
    ));

    results
}

// ── 6. Followers ────────────────────────────────────────────────────────

fn validate_followers(settings: &LockOnSettings) -> Vec<TestResult> {
    println!("--- Followers ---");
    let mut results = Vec::new();

    // Camera settles on look-at plus offset
    let mut engine = LockOnEngine::new();
    let camera = Vec3::new(0.0, 0.0, 60.0);
    let player = engine.spawn_player(Vec3::ZERO, camera, Rotator::ZERO, settings);
    let mid = (settings.lock.near_distance() + settings.lock.far_distance()) * 0.5;
    let target = engine.spawn_target(Vec3::new(mid, mid * 0.1, 60.0), 40.0);
    let locked = engine.begin_lock_on(player) && engine.locked_target(player) == Some(target);
    for _ in 0..600 {
        engine.update(FRAME);
    }
    let expected = (mid * 0.1).atan2(mid).to_degrees() + settings.camera.offset.yaw;
    let yaw = engine.control_rotation(player).map(|r| r.yaw).unwrap_or(f32::NAN);
    results.push(check(
        "camera_settles_on_target",
        locked && (yaw - expected).abs() < 0.5,
        format!("yaw {:.2}, expected {:.2}", yaw, expected),
    ));

    // Flick cycles once, then waits for the stick to center
    let (mut engine, hunter, targets) = line_scene(settings, 3);
    engine.begin_lock_on(hunter);
    let flick = engine.turn(hunter, TurnAxis::Right, 1.0);
    let held = engine.turn(hunter, TurnAxis::Right, 1.0);
    results.push(check(
        "driver_flick_cycles_once",
        flick == Some(TurnAction::Cycle(1))
            && held == Some(TurnAction::Hold)
            && engine.locked_target(hunter) == Some(targets[1]),
        format!("{:?} then {:?}", flick, held),
    ));

    // Side-step bends around the target
    let velocity = engine.dodge(hunter, Vec3::new(0.0, 1.0, 0.0)).unwrap_or(Vec3::ZERO);
    let yaw = velocity.rotation().yaw;
    results.push(check(
        "dodge_bends_around_target",
        (yaw - 45.0).abs() < 0.1,
        format!("launch yaw {:.2}", yaw),
    ));

    // Receive-only machines ignore the self-check
    let mut engine = LockOnEngine::new();
    let receive_only = LockOnSettings {
        lock: LockConfig::receive_only(),
        ..*settings
    };
    let turret = engine.spawn_character(Vec3::ZERO, Vec3::X, &receive_only);
    let ahead = Vec3::new(receive_only.lock.near_distance() + 100.0, 0.0, 0.0);
    let target = engine.spawn_target(ahead, 40.0);
    engine.begin_lock_on(turret);
    engine.set_lockable(target, false);
    let changed = engine.update(FRAME);
    results.push(check(
        "receive_only_not_ticked",
        changed.is_empty() && engine.locked_target(turret) == Some(target),
        format!("{:?}", changed),
    ));

    // ...but a target that is gone still releases the lock
    engine.despawn(target);
    let changed = engine.update(FRAME);
    results.push(check(
        "receive_only_releases_lost_target",
        changed == vec![(turret, TickOutcome::Ended)] && !engine.is_locked(turret),
        format!("{:?}", changed),
    ));

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["lockon-simtest"]).unwrap();
        assert!(!args.verbose);
        assert_eq!(args.config, None);
        assert_eq!(args.seed, 0x5eed);
    }

    #[test]
    fn test_args_all_flags() {
        let args = Args::try_parse_from([
            "lockon-simtest",
            "--verbose",
            "--config",
            "data/lockon_settings.json",
            "--seed",
            "7",
        ])
        .unwrap();
        assert!(args.verbose);
        assert_eq!(args.config, Some(PathBuf::from("data/lockon_settings.json")));
        assert_eq!(args.seed, 7);
    }

    #[test]
    fn test_args_rejects_bad_input() {
        assert!(Args::try_parse_from(["lockon-simtest", "--config"]).is_err());
        assert!(Args::try_parse_from(["lockon-simtest", "--seed", "abc"]).is_err());
        assert!(Args::try_parse_from(["lockon-simtest", "--frobnicate"]).is_err());
    }
}
