use crate::enemy;
use crate::events::ArtdEvent;
use crate::projectile;
use crate::world::{EnemyId, TowerId, World};
use sim_core::Tick;
use tracing::debug;

/// Enemies within a tower's radius, and the nearest of them.
#[derive(Debug, Default)]
pub struct Scan {
    pub in_range: Vec<EnemyId>,
    pub nearest: Option<EnemyId>,
}

/// Enumerates live enemies in spawn order; the first at the minimum
/// distance wins.
pub fn scan(world: &World, tower: TowerId) -> Scan {
    let Some(slot) = world.towers.slot(tower) else {
        return Scan::default();
    };
    let origin = slot.pose.position;
    let radius = slot.value.attack_radius;

    let mut scan = Scan::default();
    let mut best = f32::MAX;
    for &id in world.enemy_ids() {
        let Some(enemy) = world.enemies.slot(id) else {
            continue;
        };
        if enemy.value.is_dead() {
            continue;
        }
        let d = origin.distance(enemy.pose.position);
        if d > radius {
            continue;
        }
        scan.in_range.push(id);
        if d < best {
            best = d;
            scan.nearest = Some(id);
        }
    }
    scan
}

/// Runs every tower's scan and, when its cooldown has elapsed and something
/// is in range, one attack. The cooldown restarts on every attack.
pub fn update_towers(world: &mut World, tick: Tick, tick_hz: u32, events: &mut Vec<ArtdEvent>) {
    let towers: Vec<TowerId> = world.tower_ids().to_vec();
    for tower_id in towers {
        let Some(tower) = world.towers.get(tower_id) else {
            continue;
        };
        if tick < tower.next_attack_tick {
            continue;
        }
        let scan = scan(world, tower_id);
        let Some(target) = scan.nearest else {
            continue;
        };
        let Some(slot) = world.towers.slot(tower_id) else {
            continue;
        };
        let origin = slot.pose.position;
        let tower = slot.value.clone();

        match &tower.projectile {
            Some(spec) => {
                let Some(aim) = world.enemy_position(target) else {
                    continue;
                };
                let lifetime = spec.lifetime.to_ticks(tick_hz);
                match projectile::launch(world, tower_id, origin, aim, spec, tower.damage, lifetime) {
                    Some(id) => events.push(ArtdEvent::ProjectileFired {
                        id,
                        tower: tower_id,
                        target,
                    }),
                    None => debug!(?tower_id, "no projectile available"),
                }
            }
            None => {
                for &enemy_id in &scan.in_range {
                    enemy::apply_damage(world, enemy_id, tower.damage, tick, events);
                }
                events.push(ArtdEvent::AreaAttack {
                    tower: tower_id,
                    hits: scan.in_range.len() as u32,
                });
            }
        }

        if let Some(tower) = world.towers.get_mut(tower_id) {
            tower.next_attack_tick = tick + tower.attack_interval_ticks;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ArtdConfig, ENEMY_POOL_TAG, TOWER_POOL_TAG};
    use crate::geometry::Pose;
    use glam::Vec3;

    fn world_with_tower(config: &ArtdConfig) -> (World, TowerId) {
        let mut world = World::new(config);
        let id = world.towers.acquire(TOWER_POOL_TAG, Pose::IDENTITY).unwrap();
        world.register_tower(id);
        (world, id)
    }

    fn enemy(world: &mut World, at: Vec3) -> EnemyId {
        let id = world.enemies.acquire(ENEMY_POOL_TAG, Pose::at(at)).unwrap();
        world.register_enemy(id);
        id
    }

    #[test]
    fn scan_picks_nearest_in_radius() {
        let config = ArtdConfig::default();
        let (mut world, tower) = world_with_tower(&config);
        let _outside = enemy(&mut world, Vec3::new(6.0, 0.0, 0.0));
        let mid = enemy(&mut world, Vec3::new(3.0, 0.0, 0.0));
        let near = enemy(&mut world, Vec3::new(0.0, 0.0, -2.0));
        let tie = enemy(&mut world, Vec3::new(2.0, 0.0, 0.0));

        let scan = scan(&world, tower);
        assert_eq!(scan.in_range, vec![mid, near, tie]);
        assert_eq!(scan.nearest, Some(near));
    }

    #[test]
    fn fires_then_waits_for_cooldown() {
        let config = ArtdConfig::default();
        let (mut world, tower) = world_with_tower(&config);
        let target = enemy(&mut world, Vec3::new(3.0, 0.0, 0.0));

        let mut events = Vec::new();
        update_towers(&mut world, 1, 60, &mut events);
        assert!(matches!(
            events[0],
            ArtdEvent::ProjectileFired { tower: t, target: e, .. } if t == tower && e == target
        ));
        assert_eq!(world.towers.get(tower).unwrap().next_attack_tick, 61);

        events.clear();
        update_towers(&mut world, 60, 60, &mut events);
        assert!(events.is_empty());
        update_towers(&mut world, 61, 60, &mut events);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn idle_tower_keeps_cooldown_ready() {
        let config = ArtdConfig::default();
        let (mut world, tower) = world_with_tower(&config);
        let mut events = Vec::new();
        update_towers(&mut world, 100, 60, &mut events);
        assert!(events.is_empty());
        assert_eq!(world.towers.get(tower).unwrap().next_attack_tick, 0);
    }

    #[test]
    fn area_mode_hits_everything_in_range() {
        let mut config = ArtdConfig::default();
        config.tower.projectile = None;
        let (mut world, tower) = world_with_tower(&config);
        let a = enemy(&mut world, Vec3::new(1.0, 0.0, 0.0));
        let b = enemy(&mut world, Vec3::new(-4.0, 0.0, 0.0));
        let c = enemy(&mut world, Vec3::new(9.0, 0.0, 0.0));

        let mut events = Vec::new();
        update_towers(&mut world, 1, 60, &mut events);
        assert!(events.contains(&ArtdEvent::AreaAttack { tower, hits: 2 }));
        assert_eq!(world.enemies.get(a).unwrap().health, 90.0);
        assert_eq!(world.enemies.get(b).unwrap().health, 90.0);
        assert_eq!(world.enemies.get(c).unwrap().health, 100.0);
        assert_eq!(world.projectiles.active_count(crate::config::PROJECTILE_POOL_TAG), 0);
    }
}
