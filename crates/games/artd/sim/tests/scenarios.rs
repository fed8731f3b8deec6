use glam::Vec3;
use sim_artd::config::{ENEMY_POOL_TAG, MARKER_POOL_TAG};
use sim_artd::placement::{MSG_MAX_CUBES, MSG_NO_SURFACE, MSG_SURFACE_UNSTABLE};
use sim_artd::scene::ScriptedInput;
use sim_artd::{ArMode, ArtdAction, ArtdConfig, ArtdEvent, ArtdGame, ArtdSetup, Scene};
use sim_core::{Game, Micros, TerminalOutcome, Tick};
use sim_host::SimHost;

type Host = SimHost<ArtdGame>;

fn host(config: ArtdConfig, scene: Scene) -> Host {
    let tick_hz = config.tick_hz;
    let inputs = scene.inputs.clone();
    let mut host = Host::new(ArtdSetup { config, scene }, 42, tick_hz);
    for input in inputs {
        host.submit_at(input.tick, input.action);
    }
    host
}

/// Tabletop surface with placement selected at tick 1 and a single tap on
/// the table centre at tick 120.
fn one_cube_scene() -> Scene {
    let mut scene = Scene::tabletop();
    scene.inputs = vec![ScriptedInput {
        tick: 1,
        action: ArtdAction::SelectMode {
            mode: ArMode::Placement,
        },
    }];
    scene.push_tap(120, Vec3::ZERO);
    scene
}

fn one_cube_config() -> ArtdConfig {
    let mut config = ArtdConfig::default();
    config.waves.max_cubes = 1;
    config
}

/// Weak, stationary enemies against an area tower.
fn fragile_config() -> ArtdConfig {
    let mut config = one_cube_config();
    config.tower.projectile = None;
    config.enemy.max_health = 25.0;
    config.enemy.move_speed = 0.0;
    config
}

fn run(host: &mut Host, ticks: u64) -> Vec<(Tick, ArtdEvent)> {
    let mut out = Vec::new();
    for _ in 0..ticks {
        let Some(events) = host.step_one_tick() else {
            break;
        };
        let tick = host.current_tick();
        out.extend(events.into_iter().map(|e| (tick, e)));
    }
    out
}

fn count(events: &[(Tick, ArtdEvent)], pred: impl Fn(&ArtdEvent) -> bool) -> usize {
    events.iter().filter(|(_, e)| pred(e)).count()
}

#[test]
fn single_cube_starts_a_wave_aimed_at_it() {
    let mut host = host(one_cube_config(), one_cube_scene());
    // Tap at 120, settle 4.5 s, then five spawns two seconds apart.
    let events = run(&mut host, 120 + 270 + 4 * 120 + 1);

    let tower = events
        .iter()
        .find_map(|(_, e)| match e {
            ArtdEvent::TowerPlaced { id, .. } => Some(*id),
            _ => None,
        })
        .expect("cube placed");
    assert_eq!(count(&events, |e| *e == ArtdEvent::GameStarted), 1);
    assert!(events.iter().any(|(t, e)| *t == 120 && *e == ArtdEvent::WaveStarted { wave: 1 }));

    let spawns: Vec<Tick> = events
        .iter()
        .filter(|(_, e)| matches!(e, ArtdEvent::EnemySpawned { .. }))
        .map(|(t, _)| *t)
        .collect();
    assert_eq!(spawns, vec![390, 510, 630, 750, 870]);
    assert!(events
        .iter()
        .any(|(_, e)| *e == ArtdEvent::WaveSpawned { wave: 1, spawned: 5 }));

    for (_, event) in &events {
        if let ArtdEvent::EnemyRetargeted { target, .. } = event {
            assert_eq!(*target, tower);
        }
    }

    let obs = host.game().observe(host.current_tick(), 0);
    assert!(obs.game_started);
    assert_eq!(obs.current_wave, 1);
    assert_eq!(obs.hud.wave_text, "Wave: 1");
    assert_eq!(obs.hud.cube_text, "Cubes: 1/1");
    let tower_id = obs.towers[0].id.clone();
    assert_eq!(obs.enemies.len(), 5);
    assert!(obs
        .enemies
        .iter()
        .all(|e| e.target.as_deref() == Some(tower_id.as_str())));
}

#[test]
fn area_tower_kills_weak_enemy_within_three_seconds() {
    let mut host = host(fragile_config(), one_cube_scene());
    let events = run(&mut host, 390 + 3 * 60);

    let (spawned_at, first) = events
        .iter()
        .find_map(|(t, e)| match e {
            ArtdEvent::EnemySpawned { id, .. } => Some((*t, *id)),
            _ => None,
        })
        .expect("enemy spawned");
    let killed_at = events
        .iter()
        .find_map(|(t, e)| (*e == ArtdEvent::EnemyKilled { id: first }).then_some(*t))
        .expect("enemy killed");
    assert!(killed_at - spawned_at <= 3 * 60);
    assert_eq!(host.game().session().director().enemies_killed(), 1);
}

#[test]
fn projectile_tower_kills_weak_enemy_within_three_seconds() {
    let mut config = fragile_config();
    config.tower.projectile = ArtdConfig::default().tower.projectile;
    let mut host = host(config, one_cube_scene());
    let events = run(&mut host, 390 + 3 * 60);

    let (spawned_at, first) = events
        .iter()
        .find_map(|(t, e)| match e {
            ArtdEvent::EnemySpawned { id, .. } => Some((*t, *id)),
            _ => None,
        })
        .expect("enemy spawned");
    let killed_at = events
        .iter()
        .find_map(|(t, e)| (*e == ArtdEvent::EnemyKilled { id: first }).then_some(*t))
        .expect("enemy killed");
    assert!(killed_at - spawned_at <= 3 * 60);
    assert_eq!(count(&events, |e| matches!(e, ArtdEvent::AreaAttack { .. })), 0);
    assert!(count(&events, |e| matches!(e, ArtdEvent::ProjectileHit { .. })) >= 3);
}

#[test]
fn enemy_pool_is_reused_across_waves() {
    let mut config = fragile_config();
    config.waves.time_between_waves = Micros::from_secs(2);
    let mut host = host(config, one_cube_scene());
    let events = run(&mut host, 2400);

    assert!(count(&events, |e| matches!(e, ArtdEvent::WaveStarted { .. })) >= 2);
    assert!(count(&events, |e| matches!(e, ArtdEvent::EnemySpawned { .. })) >= 10);

    let obs = host.game().observe(host.current_tick(), 0);
    let pool = obs.pools.iter().find(|p| p.tag == ENEMY_POOL_TAG).unwrap();
    assert_eq!(pool.active + pool.idle, 5);
}

#[test]
fn placement_cap_rejects_extra_taps() {
    let mut config = ArtdConfig::default();
    config.waves.max_cubes = 3;
    let mut host = host(config, Scene::tabletop());
    let events = run(&mut host, 300);

    assert_eq!(count(&events, |e| matches!(e, ArtdEvent::TowerPlaced { .. })), 3);
    assert_eq!(count(&events, |e| *e == ArtdEvent::GameStarted), 1);
    let feedback = host.game().session().feedback();
    assert_eq!(feedback.count(MSG_MAX_CUBES), 2);
    assert_eq!(host.game().session().world().tower_ids().len(), 3);
}

#[test]
fn taps_report_surface_problems() {
    let mut scene = one_cube_scene();
    scene.inputs.truncate(1);
    // Nothing tracked yet: ignored without a message.
    scene.push_tap(20, Vec3::ZERO);
    // Surface seen but still settling.
    scene.push_tap(60, Vec3::ZERO);
    // Off the table.
    scene.push_tap(100, Vec3::new(2.0, 0.0, 0.0));
    let mut host = host(ArtdConfig::default(), scene);
    run(&mut host, 120);

    let texts: Vec<(Tick, String)> = host
        .game()
        .session()
        .feedback()
        .messages()
        .iter()
        .map(|m| (m.tick, m.text.clone()))
        .collect();
    assert_eq!(
        texts,
        vec![
            (1, "Placement mode enabled".to_string()),
            (60, MSG_SURFACE_UNSTABLE.to_string()),
            (100, MSG_NO_SURFACE.to_string()),
        ]
    );
    assert!(host.game().session().world().tower_ids().is_empty());
}

#[test]
fn image_markers_follow_posters_until_idle() {
    let mut host = host(ArtdConfig::default(), Scene::images());
    let events = run(&mut host, 400);
    assert_eq!(count(&events, |e| matches!(e, ArtdEvent::MarkerSpawned { .. })), 2);
    assert_eq!(count(&events, |e| matches!(e, ArtdEvent::MarkerReleased { .. })), 1);

    let obs = host.game().observe(host.current_tick(), 0);
    assert_eq!(obs.markers.len(), 1);
    assert_eq!(obs.markers[0].trackable, 101);

    run(&mut host, 100);
    let obs = host.game().observe(host.current_tick(), 0);
    assert!(obs.markers.is_empty());
    let pool = obs.pools.iter().find(|p| p.tag == MARKER_POOL_TAG).unwrap();
    assert_eq!(pool.active, 0);
}

#[test]
fn stopping_waves_ends_once_enemies_are_gone() {
    let mut scene = one_cube_scene();
    scene.inputs.push(ScriptedInput {
        tick: 400,
        action: ArtdAction::StopWaves,
    });
    let mut host = host(fragile_config(), scene);
    let result = host.run_for_ticks(2000);

    assert_eq!(result.outcome, Some(TerminalOutcome::Stopped));
    assert!(result.final_tick < 2000);
    assert_eq!(
        result
            .events
            .iter()
            .filter(|e| matches!(e, ArtdEvent::EnemySpawned { .. }))
            .count(),
        1
    );
    assert!(result.events.contains(&ArtdEvent::WavesStopped));
}

#[test]
fn stop_before_placement_is_ignored() {
    let mut scene = one_cube_scene();
    scene.inputs.push(ScriptedInput {
        tick: 50,
        action: ArtdAction::StopWaves,
    });
    let mut host = host(one_cube_config(), scene);
    let events = run(&mut host, 130);

    assert!(host.is_terminal().is_none());
    assert_eq!(host.current_tick(), 130);
    assert_eq!(count(&events, |e| *e == ArtdEvent::WavesStopped), 0);
    assert_eq!(count(&events, |e| *e == ArtdEvent::GameStarted), 1);
    assert_eq!(host.game().session().director().placed(), 1);
}

#[test]
fn reset_empties_the_board() {
    let mut scene = one_cube_scene();
    scene.inputs.push(ScriptedInput {
        tick: 520,
        action: ArtdAction::ResetSession,
    });
    let mut host = host(one_cube_config(), scene);
    run(&mut host, 530);

    let obs = host.game().observe(host.current_tick(), 0);
    assert!(!obs.game_started);
    assert_eq!(obs.placed_cubes, 0);
    assert!(obs.towers.is_empty());
    assert!(obs.enemies.is_empty());
    assert!(obs.projectiles.is_empty());
    assert!(obs.pools.iter().all(|p| p.active == 0));
    assert!(host.is_terminal().is_none());
}

#[test]
fn same_seed_replays_identically() {
    let mut a = host(ArtdConfig::default(), Scene::blocked());
    let mut b = host(ArtdConfig::default(), Scene::blocked());
    assert_eq!(run(&mut a, 1500), run(&mut b, 1500));
}

#[test]
fn observation_serializes_for_the_hud() {
    let mut host = host(one_cube_config(), one_cube_scene());
    run(&mut host, 400);

    let obs = host.game().observe(host.current_tick(), 0);
    let json = serde_json::to_value(&obs).unwrap();
    assert_eq!(json["mode"], "placement");
    assert_eq!(json["wave_status"]["type"], "Spawning");
    assert_eq!(json["hud"]["cube_text"], "Cubes: 1/1");
    assert_eq!(json["towers"][0]["attack_mode"], "projectile");

    let back: artd_types::ArtdObservation = serde_json::from_value(json).unwrap();
    assert_eq!(back.placed_cubes, 1);
    assert_eq!(back.hud, obs.hud);
    assert_eq!(back.pools, obs.pools);
}
