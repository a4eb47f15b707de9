//! shield-drill: run a bombardment drill against the demo compound.
//!
//! Usage:
//!   shield-drill run --seed 7 --ticks 600 --settings tuning.json
//!   shield-drill run --target 10,10 --no-shield
//!   shield-drill settings --settings tuning.json

use std::path::PathBuf;
use std::process;

use glam::IVec2;

use bastion_core::commands::PlayerCommand;
use bastion_core::events::SimEvent;
use bastion_core::lexicon::Lexicon;
use bastion_core::settings::{load_settings, load_settings_from_env, Settings};
use bastion_sim::world_setup::{self, ShieldBlueprint, DEMO_TARGET, DRILL_COLONISTS};
use bastion_sim::{SimConfig, SimulationEngine};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    match args[1].as_str() {
        "run" => cmd_run(&args[2..]),
        "settings" => cmd_settings(&args[2..]),
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!(
        "shield-drill: bombardment drill against a shielded compound\n\
         \n\
         Commands:\n\
         \n\
         run       Build the demo map, call a bombardment and print the final snapshot\n\
         \n\
           --settings <path>  Settings JSON (default: $BASTION_SETTINGS_PATH or builtin)\n\
           --seed <N>         RNG seed (default: 42)\n\
           --ticks <N>        Ticks to simulate (default: 600)\n\
           --target <x,y>     Bombardment center (default: compound center)\n\
           --lexicon <path>   Display text overrides (JSON object)\n\
           --no-shield        Leave the compound unshielded\n\
         \n\
         settings  Print the effective settings as JSON\n\
         \n\
           --settings <path>  Settings JSON to load\n\
         \n\
         Log output goes to stderr and is filtered with RUST_LOG, e.g.\n\
         \n\
           RUST_LOG=bastion::intercept=info shield-drill run --seed 3\n"
    );
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn parse_number<T: std::str::FromStr>(args: &[String], flag: &str, default: T) -> T {
    match flag_value(args, flag) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            eprintln!("Error: {flag} expects a number, got {raw}");
            process::exit(1);
        }),
        None => default,
    }
}

fn parse_cell(args: &[String], flag: &str) -> Option<IVec2> {
    let raw = flag_value(args, flag)?;
    let (x, y) = raw.split_once(',')?;
    Some(IVec2::new(x.trim().parse().ok()?, y.trim().parse().ok()?))
}

fn settings_from_args(args: &[String]) -> Settings {
    match flag_value(args, "--settings") {
        Some(path) => load_settings(Some(&PathBuf::from(path))),
        None => load_settings_from_env(),
    }
}

fn cmd_run(args: &[String]) {
    let settings = settings_from_args(args);
    let seed: u64 = parse_number(args, "--seed", 42);
    let ticks: u64 = parse_number(args, "--ticks", 600);
    let target = match flag_value(args, "--target") {
        Some(_) => parse_cell(args, "--target").unwrap_or_else(|| {
            eprintln!("Error: --target expects x,y");
            process::exit(1);
        }),
        None => DEMO_TARGET,
    };

    let mut engine = SimulationEngine::new(SimConfig {
        seed,
        settings: settings.clone(),
        ..Default::default()
    });

    if let Some(path) = flag_value(args, "--lexicon") {
        let lexicon = std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|data| Lexicon::from_json(&data).map_err(|e| e.to_string()));
        match lexicon {
            Ok(lexicon) => engine.set_lexicon(lexicon),
            Err(err) => tracing::warn!(path, error = %err, "lexicon.load_failed"),
        }
    }

    let setup = if args.iter().any(|a| a == "--no-shield") {
        populate_without_shield(&mut engine)
    } else {
        world_setup::setup_drill(engine.map_mut(), &settings)
    };
    if let Err(err) = setup {
        eprintln!("Error: drill setup failed: {err}");
        process::exit(1);
    }

    engine.queue_command(PlayerCommand::CallBombardment { cell: target });

    let mut landed = 0;
    let mut blocked = 0;
    let mut flee_orders = 0;
    let mut messages = Vec::new();
    let mut last = None;
    for _ in 0..ticks {
        let snapshot = engine.tick();
        for event in &snapshot.events {
            match event {
                SimEvent::ImpactLanded { .. } => landed += 1,
                SimEvent::ImpactBlocked { .. } => blocked += 1,
                SimEvent::FleeIssued { .. } => flee_orders += 1,
                _ => {}
            }
        }
        messages.extend(snapshot.messages.iter().cloned());
        last = Some(snapshot);
    }

    tracing::info!(
        seed,
        ticks,
        landed,
        blocked,
        flee_orders,
        messages = messages.len(),
        "drill.finished"
    );

    let Some(mut snapshot) = last else {
        return;
    };
    snapshot.messages = messages;
    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => println!("{json}"),
        Err(err) => {
            eprintln!("Error: failed to encode snapshot: {err}");
            process::exit(1);
        }
    }
}

/// Same colonists as the drill, but the compound has only an unpowered
/// emitter frame.
fn populate_without_shield(engine: &mut SimulationEngine) -> Result<(), bastion_sim::SimError> {
    let mut frame = ShieldBlueprint::standard(&engine.settings().shields);
    frame.label = "emitter frame".to_string();
    frame.field = None;
    engine.construct_shield(&frame, DEMO_TARGET)?;
    for (name, cell) in DRILL_COLONISTS {
        engine.spawn_agent(name, cell)?;
    }
    Ok(())
}

fn cmd_settings(args: &[String]) {
    let settings = settings_from_args(args);
    match serde_json::to_string_pretty(&settings) {
        Ok(json) => println!("{json}"),
        Err(err) => {
            eprintln!("Error: failed to encode settings: {err}");
            process::exit(1);
        }
    }
}
