use crate::config::{ProjectileSpec, PROJECTILE_POOL_TAG};
use crate::enemy;
use crate::events::ArtdEvent;
use crate::geometry::{segment_hits_sphere, Pose};
use crate::world::{ProjectileId, ProjectilePhase, TowerId, World};
use glam::Vec3;
use sim_core::Tick;
use tracing::{debug, warn};

/// Acquires a projectile at `origin` and sends it towards `aim`.
///
/// The aim point is fixed at launch; nothing leads the target.
pub fn launch(
    world: &mut World,
    tower: TowerId,
    origin: Vec3,
    aim: Vec3,
    spec: &ProjectileSpec,
    damage: f32,
    lifetime_ticks: u64,
) -> Option<ProjectileId> {
    let direction = (aim - origin).normalize_or_zero();
    if direction == Vec3::ZERO {
        debug!(?tower, "target at muzzle, not firing");
        return None;
    }
    let id = world
        .projectiles
        .acquire(PROJECTILE_POOL_TAG, Pose::at(origin))?;
    let projectile = world.projectiles.get_mut(id)?;
    projectile.phase = ProjectilePhase::InFlight;
    projectile.direction = direction;
    projectile.speed = spec.speed;
    projectile.remaining_ticks = lifetime_ticks.max(1);
    projectile.damage = damage;
    projectile.radius = spec.radius;
    projectile.destroy_on_hit = spec.destroy_on_hit;
    projectile.source = Some(tower);
    projectile.hits.clear();
    Some(id)
}

/// Moves every projectile in flight, resolves hits along its path this tick,
/// and returns spent projectiles to the pool.
pub fn update_projectiles(world: &mut World, tick: Tick, dt: f32, events: &mut Vec<ArtdEvent>) {
    for id in world.projectiles.active_keys() {
        let Some(slot) = world.projectiles.slot(id) else {
            continue;
        };
        if slot.value.phase != ProjectilePhase::InFlight {
            continue;
        }
        let from = slot.pose.position;
        let p = &slot.value;
        let to = from + p.direction * p.speed * dt;
        let (damage, radius, destroy_on_hit) = (p.damage, p.radius, p.destroy_on_hit);
        let already_hit = p.hits.clone();

        let mut consumed = false;
        let candidates: Vec<_> = world
            .enemy_ids()
            .iter()
            .copied()
            .filter(|e| !already_hit.contains(e))
            .collect();
        for enemy_id in candidates {
            let Some(enemy) = world.enemies.slot(enemy_id) else {
                continue;
            };
            if enemy.value.is_dead() {
                continue;
            }
            if !segment_hits_sphere(from, to, enemy.pose.position, enemy.value.radius + radius) {
                continue;
            }

            enemy::apply_damage(world, enemy_id, damage, tick, events);
            events.push(ArtdEvent::ProjectileHit { id, enemy: enemy_id });
            if let Some(p) = world.projectiles.get_mut(id) {
                p.hits.push(enemy_id);
                if destroy_on_hit {
                    p.phase = ProjectilePhase::HitTarget;
                }
            }
            if destroy_on_hit {
                consumed = true;
                break;
            }
        }

        if consumed {
            retire(world, id);
            continue;
        }

        let Some(slot) = world.projectiles.slot_mut(id) else {
            continue;
        };
        slot.pose.position = to;
        slot.value.remaining_ticks = slot.value.remaining_ticks.saturating_sub(1);
        if slot.value.remaining_ticks == 0 {
            slot.value.phase = ProjectilePhase::LifetimeExpired;
            events.push(ArtdEvent::ProjectileExpired { id });
            retire(world, id);
        }
    }
}

fn retire(world: &mut World, id: ProjectileId) {
    if let Err(err) = world.projectiles.release(PROJECTILE_POOL_TAG, id) {
        warn!(?id, %err, "projectile release failed");
    }
}
