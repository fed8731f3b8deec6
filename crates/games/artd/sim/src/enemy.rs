use crate::config::{ArtdConfig, ENEMY_POOL_TAG};
use crate::events::ArtdEvent;
use crate::geometry::Pose;
use crate::navigation::Navigation;
use crate::world::{EnemyId, EnemyState, TowerId, World};
use glam::Vec3;
use sim_core::Tick;
use tracing::debug;

/// Subtracts `amount` from the enemy's health and starts its hit flash.
/// Marks it dead when health reaches zero; removal happens at end of tick.
///
/// Returns true when this hit was the killing one.
pub fn apply_damage(
    world: &mut World,
    id: EnemyId,
    amount: f32,
    tick: Tick,
    events: &mut Vec<ArtdEvent>,
) -> bool {
    let Some(enemy) = world.enemies.get_mut(id) else {
        return false;
    };
    if enemy.is_dead() {
        return false;
    }
    enemy.health -= amount;
    enemy.flash_until = tick + enemy.hit_flash_ticks;
    events.push(ArtdEvent::EnemyDamaged {
        id,
        amount,
        health: enemy.health,
    });
    if enemy.health <= 0.0 {
        enemy.state = EnemyState::Dead;
        enemy.velocity = Vec3::ZERO;
        events.push(ArtdEvent::EnemyKilled { id });
        debug!(?id, "enemy killed");
        return true;
    }
    false
}

/// Takes an enemy from the pool at `position`, registers it and resolves
/// its first target straight away.
pub fn spawn<N: Navigation>(
    world: &mut World,
    nav: &mut N,
    position: Vec3,
    tick: Tick,
    wave: u32,
    config: &ArtdConfig,
    events: &mut Vec<ArtdEvent>,
) -> Option<EnemyId> {
    let id = world.enemies.acquire(ENEMY_POOL_TAG, Pose::at(position))?;
    world.register_enemy(id);
    if let Some(enemy) = world.enemies.get_mut(id) {
        enemy.wave = wave;
    }
    force_update_target(world, nav, id, tick, config, events);
    Some(id)
}

/// Nearest live tower to `from`; ties go to the earliest placed.
pub fn nearest_tower(world: &World, from: Vec3) -> Option<(TowerId, f32)> {
    let mut best: Option<(TowerId, f32)> = None;
    for (id, position) in world.live_towers() {
        let d = from.distance(position);
        if best.map_or(true, |(_, bd)| d < bd) {
            best = Some((id, d));
        }
    }
    best
}

/// Re-evaluates the target right away and restarts the evaluation timer.
pub fn force_update_target<N: Navigation>(
    world: &mut World,
    nav: &mut N,
    id: EnemyId,
    tick: Tick,
    config: &ArtdConfig,
    events: &mut Vec<ArtdEvent>,
) {
    update_target(world, nav, id, events);
    let interval = config.duration_to_ticks(config.enemy.target_update_interval);
    if let Some(enemy) = world.enemies.get_mut(id) {
        enemy.next_target_tick = tick + interval.max(1);
    }
}

/// Switches to the nearest tower only if it is strictly nearer than the
/// current one. Any switch issues a new path request.
fn update_target<N: Navigation>(
    world: &mut World,
    nav: &mut N,
    id: EnemyId,
    events: &mut Vec<ArtdEvent>,
) {
    let Some(slot) = world.enemies.slot(id) else {
        return;
    };
    let position = slot.pose.position;
    let current = slot.value.target;
    let state = slot.value.state;

    let Some((nearest, nearest_distance)) = nearest_tower(world, position) else {
        if let Some(enemy) = world.enemies.get_mut(id) {
            enemy.target = None;
            enemy.state = EnemyState::Seeking;
        }
        return;
    };

    let current_distance = current
        .and_then(|t| world.tower_position(t))
        .map(|p| position.distance(p));
    let switch = match current_distance {
        Some(d) => nearest_distance < d && Some(nearest) != current,
        None => true,
    };

    let (target, needs_path) = if switch {
        (nearest, true)
    } else {
        // Keep the current target; retry the path if the last request failed.
        match current {
            Some(t) => (t, state == EnemyState::Seeking || state == EnemyState::Spawned),
            None => return,
        }
    };

    if switch {
        debug!(?id, ?target, "new target");
        events.push(ArtdEvent::EnemyRetargeted { id, target });
    }
    if !needs_path {
        return;
    }

    let Some(destination) = world.tower_position(target) else {
        return;
    };
    let pathing = nav.request_path(id, position, destination);
    if let Some(enemy) = world.enemies.get_mut(id) {
        enemy.target = Some(target);
        enemy.stalled_since = None;
        enemy.state = if pathing {
            EnemyState::Moving
        } else {
            EnemyState::Seeking
        };
    }
}

/// Per-tick agent update: target validation and periodic reacquisition,
/// steering, and stuck detection.
pub fn update_enemies<N: Navigation>(
    world: &mut World,
    nav: &mut N,
    tick: Tick,
    config: &ArtdConfig,
    events: &mut Vec<ArtdEvent>,
) {
    let dt = config.dt();
    let interval = config.duration_to_ticks(config.enemy.target_update_interval).max(1);
    let stuck_speed = config.enemy.stuck_speed;
    let stuck_margin = config.enemy.stuck_margin;

    let ids: Vec<EnemyId> = world.enemy_ids().to_vec();
    for id in ids {
        let Some(enemy) = world.enemies.get(id) else {
            continue;
        };
        if enemy.is_dead() {
            continue;
        }

        // A target that left the registry is dropped and replaced immediately.
        if let Some(target) = enemy.target {
            if !world.is_live_tower(target) {
                debug!(?id, ?target, "target gone, reacquiring");
                nav.reset_path(id);
                if let Some(enemy) = world.enemies.get_mut(id) {
                    enemy.target = None;
                    enemy.state = EnemyState::Seeking;
                    enemy.next_target_tick = tick;
                }
                events.push(ArtdEvent::TargetLost { id });
            }
        }

        let due = world
            .enemies
            .get(id)
            .is_some_and(|e| tick >= e.next_target_tick);
        if due {
            update_target(world, nav, id, events);
            if let Some(enemy) = world.enemies.get_mut(id) {
                enemy.next_target_tick = tick + interval;
            }
        }

        let Some(slot) = world.enemies.slot(id) else {
            continue;
        };
        let (position, speed, stopping) = (
            slot.pose.position,
            slot.value.speed,
            slot.value.stopping_distance,
        );
        let Some(target) = slot.value.target else {
            continue;
        };
        let Some(target_position) = world.tower_position(target) else {
            continue;
        };

        let steering = nav.steer(id, position, speed, stopping, dt);
        let Some(slot) = world.enemies.slot_mut(id) else {
            continue;
        };
        slot.pose.position = steering.position;
        slot.value.velocity = steering.velocity;

        let remaining = steering.position.distance(target_position);
        let stalled = steering.velocity.length() < stuck_speed && remaining > stopping + stuck_margin;
        let enemy = &mut slot.value;
        if !stalled {
            enemy.stalled_since = None;
            if enemy.state == EnemyState::Stuck {
                enemy.state = EnemyState::Moving;
            }
            continue;
        }

        let since = *enemy.stalled_since.get_or_insert(tick);
        if tick - since < interval {
            continue;
        }

        debug!(?id, "stuck, forcing repath");
        enemy.state = EnemyState::Stuck;
        enemy.stalled_since = Some(tick);
        events.push(ArtdEvent::EnemyStuck { id });
        nav.reset_path(id);
        nav.request_path(id, steering.position, target_position);
    }
}

/// Removes every dead enemy from the registry and pool.
pub fn remove_dead<N: Navigation>(world: &mut World, nav: &mut N) -> u32 {
    let dead: Vec<EnemyId> = world
        .enemy_ids()
        .iter()
        .copied()
        .filter(|&id| world.enemies.get(id).map_or(true, |e| e.is_dead()))
        .collect();
    let mut removed = 0;
    for id in dead {
        nav.forget(id);
        if world.remove_enemy(id) {
            removed += 1;
        }
    }
    removed
}
