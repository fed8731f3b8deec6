use crate::feedback::Feedback;
use crate::geometry::to_position;
use crate::modes::ArMode;
use crate::navigation::Navigation;
use crate::session::Session;
use crate::tracking::Tracking;
use crate::waves::{WaveDirector, WavePhase};
use crate::world::{EnemyId, TowerId};
use artd_types::{
    ArtdObservation, EnemyInfo, HudInfo, MarkerInfo, PoolInfo, ProjectileInfo, TowerInfo,
    WaveStatus,
};
use sim_core::Tick;
use slotmap::Key;

pub fn tower_id_to_string(id: TowerId) -> String {
    id.data().as_ffi().to_string()
}

pub fn enemy_id_to_string(id: EnemyId) -> String {
    id.data().as_ffi().to_string()
}

pub fn wave_status(phase: &WavePhase) -> WaveStatus {
    match *phase {
        WavePhase::AwaitingPlacement => WaveStatus::AwaitingPlacement,
        WavePhase::Settling { until_tick } => WaveStatus::Settling { until_tick },
        WavePhase::Spawning {
            spawned,
            wave_size,
            next_spawn_tick,
        } => WaveStatus::Spawning {
            spawned,
            wave_size,
            next_spawn_tick,
        },
        WavePhase::Resting { until_tick } => WaveStatus::Resting { until_tick },
        WavePhase::Stopped => WaveStatus::Stopped,
    }
}

/// HUD contents. Shown once the game runs, or while placing after the
/// first cube is down.
pub fn hud(director: &WaveDirector, mode: ArMode) -> HudInfo {
    let placing = mode == ArMode::Placement && director.placed() > 0;
    HudInfo {
        visible: director.has_game_started() || placing,
        wave_text: format!("Wave: {}", director.current_wave()),
        cube_text: format!("Cubes: {}/{}", director.placed(), director.max_cubes()),
    }
}

pub fn build_observation<N: Navigation, T: Tracking, F: Feedback>(
    session: &Session<N, T, F>,
    tick: Tick,
) -> ArtdObservation {
    let world = session.world();
    let director = session.director();

    let towers = world
        .live_towers()
        .into_iter()
        .filter_map(|(id, position)| {
            let tower = world.towers.get(id)?;
            Some(TowerInfo {
                id: tower_id_to_string(id),
                position: to_position(position),
                attack_radius: tower.attack_radius,
                damage: tower.damage,
                attack_mode: tower.attack_mode().to_string(),
                next_attack_tick: tower.next_attack_tick,
            })
        })
        .collect();

    let enemies = world
        .enemy_ids()
        .iter()
        .filter_map(|&id| {
            let slot = world.enemies.slot(id)?;
            let enemy = &slot.value;
            Some(EnemyInfo {
                id: enemy_id_to_string(id),
                position: to_position(slot.pose.position),
                health: enemy.health,
                max_health: enemy.max_health,
                state: enemy.state.as_str().to_string(),
                target: enemy.target.map(tower_id_to_string),
                flashing: enemy.is_flashing(tick),
            })
        })
        .collect();

    let projectiles = world
        .projectiles
        .iter_active()
        .map(|(_, slot)| ProjectileInfo {
            position: to_position(slot.pose.position),
            direction: to_position(slot.value.direction),
            remaining_ticks: slot.value.remaining_ticks,
        })
        .collect();

    let markers = world
        .markers
        .iter_active()
        .filter_map(|(_, slot)| {
            let trackable = slot.value.trackable?;
            Some(MarkerInfo {
                trackable: trackable.0,
                position: to_position(slot.pose.position),
            })
        })
        .collect();

    let pools = world
        .towers
        .stats()
        .into_iter()
        .chain(world.enemies.stats())
        .chain(world.projectiles.stats())
        .chain(world.markers.stats())
        .map(|s| PoolInfo {
            tag: s.tag,
            active: s.active,
            idle: s.idle,
        })
        .collect();

    ArtdObservation {
        tick,
        ticks_per_second: session.config().tick_hz,

        mode: session.mode().to_info(),
        game_started: director.has_game_started(),
        current_wave: director.current_wave(),
        wave_status: wave_status(director.phase()),

        placed_cubes: director.placed(),
        max_cubes: director.max_cubes(),
        enemies_killed: director.enemies_killed(),

        hud: hud(director, session.mode()),

        towers,
        enemies,
        projectiles,
        markers,
        pools,
    }
}
