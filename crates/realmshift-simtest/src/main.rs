//! Realmshift Headless Simulation Harness
//!
//! Drives the realm-switch logic with synthetic frames and checks its
//! behavioral guarantees without an engine.
//! Runs entirely in-process with no rendering, audio or input devices.
//!
//! Usage:
//!   cargo run -p realmshift-simtest
//!   cargo run -p realmshift-simtest -- --verbose
//!   cargo run -p realmshift-simtest -- --level path/to/level.json

mod scene;

use anyhow::Context;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use realmshift_logic::activation::ActivationStore;
use realmshift_logic::collaborators::{FrameContext, RespawnReason};
use realmshift_logic::config::LevelConfig;
use realmshift_logic::dimension::{DimensionMachine, SwitchOutcome};
use realmshift_logic::dissolve::DissolveSet;
use realmshift_logic::error::ConfigurationError;
use realmshift_logic::realm::RealmId;
use realmshift_logic::timer::{SurvivalTimer, TimerEvent};

use scene::SimLevel;

// ── Default level (same JSON a level designer would ship) ───────────────
const DEFAULT_LEVEL_JSON: &str = include_str!("../../../data/level_default.json");

/// 120 frames per second.
const FRAME_120: f32 = 1.0 / 120.0;
/// 60 frames per second.
const FRAME_60: f32 = 1.0 / 60.0;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let verbose = args.iter().any(|a| a == "--verbose");
    let level_path = args
        .iter()
        .position(|a| a == "--level")
        .and_then(|i| args.get(i + 1))
        .map(String::as_str);

    let default_filter = if verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .try_init();

    println!("=== Realmshift Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Level config
    let (config, config_results) = validate_level_config(level_path, verbose);
    results.extend(config_results);

    // 2. Cross-fade timeline at 120 Hz
    results.extend(validate_switch_timeline(verbose));

    // 3. Request rules (ignored, no-op, configuration errors)
    results.extend(validate_request_rules(&config, verbose));

    // 4. Survival timer coupling
    results.extend(validate_timer_coupling(&config, verbose));

    // 5. Randomized request sweep
    results.extend(validate_random_sweep(&config, verbose));

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

fn load_level(path: Option<&str>) -> anyhow::Result<LevelConfig> {
    let (source, text) = match path {
        Some(p) => (
            p.to_string(),
            std::fs::read_to_string(p).with_context(|| format!("reading level file {}", p))?,
        ),
        None => ("embedded default level".to_string(), DEFAULT_LEVEL_JSON.to_string()),
    };
    serde_json::from_str(&text).with_context(|| format!("parsing {}", source))
}

// ── 1. Level Config ─────────────────────────────────────────────────────

fn validate_level_config(path: Option<&str>, verbose: bool) -> (LevelConfig, Vec<TestResult>) {
    println!("--- Level Config ---");
    let mut results = Vec::new();

    let config = match load_level(path) {
        Ok(c) => c,
        Err(e) => {
            results.push(TestResult {
                name: "level_parse".into(),
                passed: false,
                detail: format!("{:#}", e),
            });
            return (LevelConfig::default(), results);
        }
    };

    results.push(TestResult {
        name: "level_parse".into(),
        passed: true,
        detail: path.unwrap_or("embedded default level").to_string(),
    });

    let errors = config.validate();
    results.push(TestResult {
        name: "level_valid".into(),
        passed: errors.is_empty(),
        detail: if errors.is_empty() {
            "all level constants valid".into()
        } else {
            errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ")
        },
    });

    let roundtrip: Result<LevelConfig, _> =
        serde_json::to_string(&config).and_then(|s| serde_json::from_str(&s));
    results.push(TestResult {
        name: "level_roundtrip".into(),
        passed: roundtrip.as_ref().map(|c| *c == config).unwrap_or(false),
        detail: "level config survives serialize → parse".into(),
    });

    if verbose {
        println!(
            "  transition={:.2}s survival={:.2}s start={} home={} param={}",
            config.transition_duration,
            config.survival_duration,
            config.initial_realm,
            config.home_realm,
            config.dissolve_parameter
        );
    }

    (config, results)
}

// ── 2. Switch Timeline ──────────────────────────────────────────────────

fn validate_switch_timeline(verbose: bool) -> Vec<TestResult> {
    println!("--- Switch Timeline (0.5s @ 120 Hz) ---");
    let mut results = Vec::new();

    let config = LevelConfig {
        transition_duration: 0.5,
        ..LevelConfig::default()
    };
    let mut level = SimLevel::started(&config);
    let _ = level.machine.toggle();

    // Dissolve monotonic across the whole fade
    let mut monotonic = true;
    let mut prev_out = 0.0;
    let mut prev_in = 1.0;
    let mut half_way = (0.0, 0.0);
    for frame in 1..=60 {
        level.tick(FRAME_120);
        let out = level.sample(RealmId::Light).unwrap_or(f32::NAN);
        let inc = level.sample(RealmId::Dark).unwrap_or(f32::NAN);
        if !(out >= prev_out && inc <= prev_in) {
            monotonic = false;
        }
        prev_out = out;
        prev_in = inc;
        if frame == 30 {
            half_way = (out, inc);
        }
        if verbose && frame % 10 == 0 {
            println!("  frame {:2}: out={:.3} in={:.3}", frame, out, inc);
        }
    }

    results.push(TestResult {
        name: "timeline_halfway".into(),
        passed: (half_way.0 - 0.5).abs() < 0.01 && (half_way.1 - 0.5).abs() < 0.01,
        detail: format!("after 30 frames out={:.3} in={:.3}", half_way.0, half_way.1),
    });

    results.push(TestResult {
        name: "timeline_monotonic".into(),
        passed: monotonic,
        detail: "outgoing never decreases, incoming never increases".into(),
    });

    results.push(TestResult {
        name: "timeline_snapped".into(),
        passed: level.is_settled_cleanly(),
        detail: format!(
            "after 60 frames out={:?} in={:?}",
            level.sample(RealmId::Light),
            level.sample(RealmId::Dark)
        ),
    });

    results.push(TestResult {
        name: "timeline_lands_in_dark".into(),
        passed: level.machine.active_realm() == RealmId::Dark && !level.machine.is_transitioning(),
        detail: format!("active realm {}", level.machine.active_realm()),
    });

    let before = *level.machine.timer();
    level.tick(FRAME_120);
    let after = *level.machine.timer();
    results.push(TestResult {
        name: "timeline_timer_next_frame".into(),
        passed: before == SurvivalTimer::Stopped && after.is_running(),
        detail: format!("frame 60: {:?}, frame 61: {:?}", before, after),
    });

    results.push(TestResult {
        name: "timeline_one_audio_cue".into(),
        passed: level.speaker.played.len() == 1,
        detail: format!("{} switch cue(s) played", level.speaker.played.len()),
    });

    results
}

// ── 3. Request Rules ────────────────────────────────────────────────────

fn validate_request_rules(config: &LevelConfig, _verbose: bool) -> Vec<TestResult> {
    println!("--- Request Rules ---");
    let mut results = Vec::new();

    // Toggle while transitioning is dropped and changes nothing
    let mut level = SimLevel::started(config);
    let _ = level.machine.toggle();
    level.tick(FRAME_60);
    let transition_before = *level.machine.transition();
    let outcome = level.machine.toggle();
    let unchanged = *level.machine.transition() == transition_before;
    let settled = level.settle(FRAME_60, 10_000);
    results.push(TestResult {
        name: "request_midfade_toggle_ignored".into(),
        passed: matches!(outcome, Ok(SwitchOutcome::Ignored)) && unchanged && settled,
        detail: format!(
            "outcome={:?}, unchanged={}, finished in {}",
            outcome,
            unchanged,
            level.machine.active_realm()
        ),
    });

    // Forcing the current realm while idle does nothing at all
    let mut level = SimLevel::new(config);
    let current = level.machine.active_realm();
    let outcome = level.machine.force_switch(current);
    level.run(30, FRAME_60);
    results.push(TestResult {
        name: "request_force_current_noop".into(),
        passed: matches!(outcome, Ok(SwitchOutcome::AlreadyActive))
            && level.scene.writes == 0
            && level.speaker.played.is_empty(),
        detail: format!(
            "outcome={:?}, writes={}, cues={}",
            outcome,
            level.scene.writes,
            level.speaker.played.len()
        ),
    });

    // Missing realm container is a configuration error with no state change
    let mut broken = DimensionMachine::new(
        config.clone(),
        ActivationStore::new(Some(scene::LIGHT_ROOT), None),
        DissolveSet::empty(),
        DissolveSet::empty(),
    );
    let realm_before = broken.active_realm();
    let err = broken.toggle();
    results.push(TestResult {
        name: "request_missing_container".into(),
        passed: matches!(
            err,
            Err(ConfigurationError::MissingRealmContainer(RealmId::Dark))
        ) && !broken.is_transitioning()
            && broken.active_realm() == realm_before,
        detail: match &err {
            Err(e) => e.to_string(),
            Ok(o) => format!("unexpected {:?}", o),
        },
    });

    results
}

// ── 4. Survival Timer ───────────────────────────────────────────────────

fn validate_timer_coupling(config: &LevelConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Survival Timer ---");
    let mut results = Vec::new();

    let fade_frames = (config.transition_duration / FRAME_60).ceil() as usize;

    // Forcing Light at any frame before the Dark fade lands: timer never runs
    let mut leaked_at = Vec::new();
    for cut in 0..fade_frames.max(1) {
        let mut level = SimLevel::started(config);
        let _ = level.machine.toggle();
        level.run(cut, FRAME_60);
        if !level.machine.is_transitioning() {
            break;
        }
        let _ = level.machine.force_switch(RealmId::Light);
        for _ in 0..(fade_frames * 4 + 10) {
            level.tick(FRAME_60);
            if level.machine.timer().is_running() {
                leaked_at.push(cut);
                break;
            }
        }
    }
    results.push(TestResult {
        name: "timer_early_exit_cancels".into(),
        passed: leaked_at.is_empty(),
        detail: if leaked_at.is_empty() {
            format!("no timer started across {} cut points", fade_frames)
        } else {
            format!("timer started after cuts at frames {:?}", leaked_at)
        },
    });

    // Expiry: back to Light and exactly one respawn
    let short = LevelConfig {
        survival_duration: 1.0,
        ..config.clone()
    };
    let mut level = SimLevel::started(&short);
    let _ = level.machine.toggle();
    level.settle(FRAME_60, 10_000);
    let mut expiries = 0;
    for _ in 0..(60 * 10) {
        if level.tick(FRAME_60).timer == TimerEvent::Expired {
            expiries += 1;
        }
    }
    results.push(TestResult {
        name: "timer_expiry_effect".into(),
        passed: expiries == 1
            && level.machine.active_realm() == RealmId::Light
            && level.player.respawns == vec![RespawnReason::TimeExpired],
        detail: format!(
            "expiries={}, realm={}, respawns={:?}",
            expiries,
            level.machine.active_realm(),
            level.player.respawns
        ),
    });

    // Leaving Dark by hand cancels the countdown the moment it is requested
    let mut level = SimLevel::started(config);
    let _ = level.machine.toggle();
    level.settle(FRAME_60, 10_000);
    level.tick(FRAME_60);
    let was_running = level.machine.timer().is_running();
    let _ = level.machine.toggle();
    let cancelled = *level.machine.timer() == SurvivalTimer::Stopped;
    results.push(TestResult {
        name: "timer_manual_exit_cancels".into(),
        passed: was_running && cancelled && level.machine.is_transitioning(),
        detail: format!("running before={}, stopped after={}", was_running, cancelled),
    });

    // Dying away from home: respawn then forced home
    let away = config.home_realm.opposite();
    let mut level = SimLevel::started(config);
    let _ = level.machine.force_switch(away);
    level.settle(FRAME_60, 10_000);
    level.player.died_in = Some(away);
    let outcome = {
        let mut ctx = FrameContext::new(&mut level.scene).with_respawn(&mut level.player);
        level.machine.player_died(RespawnReason::Hazard, &mut ctx)
    };
    level.settle(FRAME_60, 10_000);
    results.push(TestResult {
        name: "timer_death_away_returns_home".into(),
        passed: matches!(outcome, Ok(SwitchOutcome::Started { .. }))
            && level.machine.active_realm() == config.home_realm,
        detail: format!("outcome={:?}, realm={}", outcome, level.machine.active_realm()),
    });

    // Dying mid-switch away from home: queued, then sent home after landing
    let mut level = SimLevel::started(config);
    let _ = level.machine.force_switch(away);
    level.tick(FRAME_60);
    level.player.died_in = Some(away);
    let outcome = {
        let mut ctx = FrameContext::new(&mut level.scene).with_respawn(&mut level.player);
        level.machine.player_died(RespawnReason::Enemy, &mut ctx)
    };
    let mut timer_ran = false;
    for _ in 0..(fade_frames * 4 + 10) {
        level.tick(FRAME_60);
        timer_ran |= level.machine.timer().is_running() && away == RealmId::Dark;
    }
    results.push(TestResult {
        name: "timer_death_mid_switch_returns_home".into(),
        passed: matches!(
            outcome,
            Ok(SwitchOutcome::Ignored | SwitchOutcome::Started { .. })
        ) && !level.machine.is_transitioning()
            && level.machine.active_realm() == config.home_realm
            && !timer_ran,
        detail: format!(
            "outcome={:?}, realm={}, timer ran={}",
            outcome,
            level.machine.active_realm(),
            timer_ran
        ),
    });

    if verbose {
        if let Some(r) = level.machine.timer().readout() {
            println!("  HUD: {} ({:.2})", r.text, r.slider);
        }
    }

    results
}

// ── 5. Randomized Sweep ─────────────────────────────────────────────────

fn validate_random_sweep(config: &LevelConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Randomized Request Sweep ---");
    let mut results = Vec::new();

    let sweep = LevelConfig {
        survival_duration: config.survival_duration.min(1.5),
        ..config.clone()
    };

    let seeds = 50u64;
    let steps = 5_000;
    let mut violations: Vec<String> = Vec::new();
    let mut total_switches = 0usize;
    let mut total_expiries = 0usize;

    for seed in 0..seeds {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut level = SimLevel::started(&sweep);
        let mut expiries = 0usize;

        for step in 0..steps {
            match rng.gen_range(0..12) {
                0 => {
                    let was = level.machine.is_transitioning();
                    match level.machine.toggle() {
                        Ok(SwitchOutcome::Ignored) if was => {}
                        Ok(SwitchOutcome::Started { .. }) if !was => total_switches += 1,
                        other => violations.push(format!(
                            "seed {} step {}: toggle (transitioning={}) → {:?}",
                            seed, step, was, other
                        )),
                    }
                }
                1 => {
                    let _ = level.machine.force_switch(RealmId::Light);
                }
                2 => {
                    let _ = level.machine.force_switch(RealmId::Dark);
                }
                _ => {
                    let dt = rng.gen_range(0.0..0.05);
                    if level.tick(dt).timer == TimerEvent::Expired {
                        expiries += 1;
                    }
                }
            }

            let m = &level.machine;
            if m.timer().is_running()
                && (m.active_realm() != RealmId::Dark || m.destination() == Some(RealmId::Light))
            {
                violations.push(format!(
                    "seed {} step {}: timer running in {} toward {:?}",
                    seed,
                    step,
                    m.active_realm(),
                    m.destination()
                ));
            }
            if !m.is_transitioning() && !level.is_settled_cleanly() {
                violations.push(format!(
                    "seed {} step {}: idle but {} not cleanly shown",
                    seed,
                    step,
                    m.active_realm()
                ));
            }
        }

        if level.player.respawns.len() != expiries {
            violations.push(format!(
                "seed {}: {} expiries but {} respawns",
                seed,
                expiries,
                level.player.respawns.len()
            ));
        }
        total_expiries += expiries;
    }

    if verbose {
        println!(
            "  {} seeds x {} steps: {} switches, {} expiries",
            seeds, steps, total_switches, total_expiries
        );
        for v in violations.iter().take(5) {
            println!("  {}", v);
        }
    }

    results.push(TestResult {
        name: "sweep_invariants".into(),
        passed: violations.is_empty(),
        detail: if violations.is_empty() {
            format!(
                "{} seeds, {} switches, {} expiries, no violations",
                seeds, total_switches, total_expiries
            )
        } else {
            format!("{} violations, first: {}", violations.len(), violations[0])
        },
    });

    results
}
