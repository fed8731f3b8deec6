//! Replays a scripted AR scene through the simulation and prints what
//! happened: events as they occur, a status line every second of game time,
//! and a summary at the end.

use anyhow::{bail, Context};
use clap::Parser;
use sim_artd::scene::SCENE_NAMES;
use sim_artd::{ArtdConfig, ArtdEvent, ArtdGame, ArtdSetup, Scene};
use sim_core::Game;
use sim_host::SimHost;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "headless-runner")]
#[command(about = "Run an AR tower defense scene without a device")]
struct Args {
    /// Scene to replay
    #[arg(long, default_value = "tabletop")]
    scene: String,

    /// TOML file overriding the default tuning
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value = "12345")]
    seed: u64,

    /// Ticks to simulate
    #[arg(long, default_value = "7200")]
    ticks: u64,

    /// Pace ticks at wall-clock speed
    #[arg(short, long)]
    realtime: bool,

    /// Print the final observation as JSON
    #[arg(long)]
    json: bool,
}

type Host = SimHost<ArtdGame>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            ArtdConfig::from_toml_str(&source)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => ArtdConfig::default(),
    };
    let Some(scene) = Scene::by_name(&args.scene) else {
        bail!("unknown scene {:?}, expected one of {:?}", args.scene, SCENE_NAMES);
    };

    let tick_hz = config.tick_hz;
    tracing::info!(scene = %args.scene, seed = args.seed, tick_hz, "starting run");
    let inputs = scene.inputs.clone();
    let mut host = Host::new(ArtdSetup { config, scene }, args.seed, tick_hz);
    println!("Scene {:?}: {} scripted inputs", args.scene, inputs.len());
    for input in inputs {
        host.submit_at(input.tick, input.action);
    }

    let events = if args.realtime {
        run_realtime(&mut host, args.ticks).await
    } else {
        run_fast(&mut host, args.ticks)
    };

    println!("\n=== AR Tower Defense Run Complete ===");
    println!("Outcome: {:?}", host.is_terminal());
    println!("Final tick: {}", host.current_tick());
    print_status(&host);
    print_event_summary(&events);

    if args.json {
        let obs = host.game().observe(host.current_tick(), 0);
        println!("{}", serde_json::to_string_pretty(&obs)?);
    }
    Ok(())
}

fn run_fast(host: &mut Host, ticks: u64) -> Vec<ArtdEvent> {
    let mut all_events = Vec::new();
    for _ in 0..ticks {
        let Some(events) = host.step_one_tick() else {
            break;
        };
        report(host, &events);
        all_events.extend(events);
    }
    all_events
}

async fn run_realtime(host: &mut Host, ticks: u64) -> Vec<ArtdEvent> {
    let tick_duration = Duration::from_secs_f64(1.0 / host.tick_hz() as f64);
    let mut interval = interval(tick_duration);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    println!("=== Running in Real-Time Mode ({}Hz) ===", host.tick_hz());
    let mut all_events = Vec::new();
    for _ in 0..ticks {
        interval.tick().await;
        let Some(events) = host.step_one_tick() else {
            break;
        };
        report(host, &events);
        all_events.extend(events);
    }
    all_events
}

/// Prints this tick's events and feedback, plus a status line once a second.
fn report(host: &mut Host, events: &[ArtdEvent]) {
    let tick = host.current_tick();
    for event in events {
        print_event(tick, event);
    }
    for message in host.game_mut().session_mut().feedback_mut().drain() {
        println!("[{:>6}] ({:?}) {}", message.tick, message.severity, message.text);
    }
    if tick % host.tick_hz().max(1) as u64 == 0 {
        print_status(host);
    }
}

fn print_event(tick: u64, event: &ArtdEvent) {
    match event {
        ArtdEvent::ModeChanged { from, to } => {
            println!("[{:>6}] Mode {} -> {}", tick, from.as_str(), to.as_str())
        }
        ArtdEvent::TowerPlaced { position, placed, .. } => println!(
            "[{:>6}] Cube {} placed at ({:.2}, {:.2}, {:.2})",
            tick, placed, position.x, position.y, position.z
        ),
        ArtdEvent::GameStarted => println!("[{:>6}] === Game started ===", tick),
        ArtdEvent::WaveStarted { wave } => println!("[{:>6}] === Wave {} started ===", tick, wave),
        ArtdEvent::WaveSpawned { wave, spawned } => {
            println!("[{:>6}] Wave {} fully spawned ({} slots)", tick, wave, spawned)
        }
        ArtdEvent::EnemySpawned {
            position, strategy, ..
        } => println!(
            "[{:>6}] Enemy spawned at ({:.2}, {:.2}, {:.2}) via {:?}",
            tick, position.x, position.y, position.z, strategy
        ),
        ArtdEvent::SpawnSkipped { wave } => println!("[{:>6}] Spawn skipped in wave {}", tick, wave),
        ArtdEvent::EnemyStuck { id } => println!("[{:>6}] Enemy {:?} stuck", tick, id),
        ArtdEvent::EnemyKilled { id } => println!("[{:>6}] Enemy {:?} killed", tick, id),
        ArtdEvent::MarkerSpawned { trackable, .. } => {
            println!("[{:>6}] Marker on image {}", tick, trackable.0)
        }
        ArtdEvent::MarkerReleased { trackable, .. } => {
            println!("[{:>6}] Marker off image {}", tick, trackable.0)
        }
        ArtdEvent::WavesStopped => println!("[{:>6}] Waves stopped", tick),
        ArtdEvent::SessionReset => println!("[{:>6}] Session reset", tick),
        // Per-shot and per-hit events are only counted in the summary.
        _ => {}
    }
}

fn print_status(host: &Host) {
    let session = host.game().session();
    let director = session.director();
    let time_secs = host.current_tick() as f64 / host.tick_hz() as f64;
    println!(
        "  [{:>6.1}s] Mode: {}, Wave {}, Cubes: {}/{}, Enemies: {}, Killed: {}",
        time_secs,
        session.mode().as_str(),
        director.current_wave(),
        director.placed(),
        director.max_cubes(),
        session.world().enemy_count(),
        director.enemies_killed(),
    );
}

fn print_event_summary(events: &[ArtdEvent]) {
    let mut placed = 0;
    let mut rejected = 0;
    let mut waves = 0;
    let mut spawned = 0;
    let mut killed = 0;
    let mut shots = 0;
    let mut hits = 0;
    let mut stuck = 0;

    for event in events {
        match event {
            ArtdEvent::TowerPlaced { .. } => placed += 1,
            ArtdEvent::PlacementRejected { .. } => rejected += 1,
            ArtdEvent::WaveStarted { .. } => waves += 1,
            ArtdEvent::EnemySpawned { .. } => spawned += 1,
            ArtdEvent::EnemyKilled { .. } => killed += 1,
            ArtdEvent::ProjectileFired { .. } | ArtdEvent::AreaAttack { .. } => shots += 1,
            ArtdEvent::ProjectileHit { .. } => hits += 1,
            ArtdEvent::EnemyStuck { .. } => stuck += 1,
            _ => {}
        }
    }

    println!("\n=== Event Summary ===");
    println!("Cubes placed: {}", placed);
    println!("Placements rejected: {}", rejected);
    println!("Waves started: {}", waves);
    println!("Enemies spawned: {}", spawned);
    println!("Enemies killed: {}", killed);
    println!("Attacks: {}", shots);
    println!("Projectile hits: {}", hits);
    println!("Stuck recoveries: {}", stuck);
}
