//! Spawn point search around the placed towers.
//!
//! Strategies degrade in a fixed order; the last resort always yields a
//! point as long as at least one tower exists.

use crate::config::SpawnSpec;
use crate::navigation::Navigation;
use crate::world::World;
use glam::Vec3;
use rand::Rng;
use tracing::{debug, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnStrategy {
    /// Random offsets around a random tower.
    Random,
    /// Fixed offsets around the first tower.
    FixedOffset,
    /// Snapped from the first tower's own position.
    TowerCenter,
    /// Vertical probes above each tower.
    HeightProbe,
    /// Directly above the first tower, unsnapped.
    LastResort,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnPoint {
    pub position: Vec3,
    pub strategy: SpawnStrategy,
}

const PROBE_STEP: f32 = 0.3;
const PROBE_MAX: f32 = 1.5;
const LAST_RESORT_HEIGHT: f32 = 1.0;

/// Finds where the next enemy appears. The first enemy of a wave tries the
/// fixed offsets before anything random.
pub fn resolve_spawn<N: Navigation, R: Rng>(
    world: &World,
    nav: &N,
    rng: &mut R,
    spec: &SpawnSpec,
    first_of_wave: bool,
) -> Option<SpawnPoint> {
    let towers: Vec<Vec3> = world.live_towers().into_iter().map(|(_, p)| p).collect();
    let Some(&first) = towers.first() else {
        warn!("no towers to spawn around");
        return None;
    };

    let found = if first_of_wave {
        fixed_offsets(nav, first, spec).or_else(|| random_offsets(nav, rng, &towers, spec))
    } else {
        random_offsets(nav, rng, &towers, spec).or_else(|| fixed_offsets(nav, first, spec))
    };
    if let Some(point) = found.or_else(|| height_probes(nav, &towers, spec)) {
        return Some(point);
    }

    warn!("no navigable spawn point, using position above first tower");
    Some(SpawnPoint {
        position: first + Vec3::Y * LAST_RESORT_HEIGHT,
        strategy: SpawnStrategy::LastResort,
    })
}

fn random_offsets<N: Navigation, R: Rng>(
    nav: &N,
    rng: &mut R,
    towers: &[Vec3],
    spec: &SpawnSpec,
) -> Option<SpawnPoint> {
    for _ in 0..spec.search_attempts {
        let center = towers[rng.gen_range(0..towers.len())];
        for &max_radius in &spec.radii {
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            let radius = if max_radius > spec.min_radius {
                rng.gen_range(spec.min_radius..=max_radius)
            } else {
                max_radius
            };
            let candidate = center
                + Vec3::new(angle.cos() * radius, spec.height_offset, angle.sin() * radius);
            if let Some(position) = nav.sample_position(candidate, spec.sample_radius) {
                return Some(SpawnPoint {
                    position,
                    strategy: SpawnStrategy::Random,
                });
            }
        }
    }
    debug!("random spawn search exhausted");
    None
}

fn fixed_offsets<N: Navigation>(nav: &N, first: Vec3, spec: &SpawnSpec) -> Option<SpawnPoint> {
    let h = spec.height_offset;
    for &d in &spec.radii {
        let directions = [
            Vec3::new(0.0, h, d),
            Vec3::new(d, h, 0.0),
            Vec3::new(-d, h, 0.0),
            Vec3::new(0.0, h, -d),
            Vec3::new(d, h, d),
            Vec3::new(-d, h, -d),
        ];
        for offset in directions {
            if let Some(position) = nav.sample_position(first + offset, spec.fixed_sample_radius) {
                return Some(SpawnPoint {
                    position,
                    strategy: SpawnStrategy::FixedOffset,
                });
            }
        }
    }
    nav.sample_position(first, spec.sample_radius)
        .map(|position| SpawnPoint {
            position,
            strategy: SpawnStrategy::TowerCenter,
        })
}

fn height_probes<N: Navigation>(nav: &N, towers: &[Vec3], spec: &SpawnSpec) -> Option<SpawnPoint> {
    let steps = (PROBE_MAX / PROBE_STEP).round() as u32;
    for &tower in towers {
        for step in 1..=steps {
            let probe = tower + Vec3::Y * (PROBE_STEP * step as f32);
            if let Some(position) = nav.sample_position(probe, spec.sample_radius) {
                return Some(SpawnPoint {
                    position,
                    strategy: SpawnStrategy::HeightProbe,
                });
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ArtdConfig, TOWER_POOL_TAG};
    use crate::geometry::Pose;
    use crate::navigation::SurfaceNavigation;
    use crate::tracking::{TrackableId, TrackedSurface, TrackingState};
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn surface(center: Vec3, half: f32) -> TrackedSurface {
        TrackedSurface {
            id: TrackableId(1),
            pose: Pose::at(center),
            half_extents: Vec2::splat(half),
            state: TrackingState::Tracking,
        }
    }

    fn world_with_tower(at: Vec3) -> World {
        let mut world = World::new(&ArtdConfig::default());
        let id = world.towers.acquire(TOWER_POOL_TAG, Pose::at(at)).unwrap();
        world.register_tower(id);
        world
    }

    #[test]
    fn no_towers_skips_the_slot() {
        let world = World::new(&ArtdConfig::default());
        let nav = SurfaceNavigation::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let spec = ArtdConfig::default().spawn;
        assert!(resolve_spawn(&world, &nav, &mut rng, &spec, false).is_none());
    }

    #[test]
    fn random_spawn_lands_on_surface_near_tower() {
        let world = world_with_tower(Vec3::ZERO);
        let mut nav = SurfaceNavigation::default();
        nav.rebuild(&[surface(Vec3::ZERO, 1.0)]);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let spec = ArtdConfig::default().spawn;

        for _ in 0..20 {
            let point = resolve_spawn(&world, &nav, &mut rng, &spec, false).unwrap();
            assert_eq!(point.strategy, SpawnStrategy::Random);
            assert_eq!(point.position.y, 0.0);
            assert!(point.position.x.abs() <= 1.0 && point.position.z.abs() <= 1.0);
        }
    }

    #[test]
    fn first_of_wave_uses_fixed_offsets() {
        let world = world_with_tower(Vec3::ZERO);
        let mut nav = SurfaceNavigation::default();
        nav.rebuild(&[surface(Vec3::ZERO, 2.0)]);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let spec = ArtdConfig::default().spawn;

        let point = resolve_spawn(&world, &nav, &mut rng, &spec, true).unwrap();
        assert_eq!(point.strategy, SpawnStrategy::FixedOffset);
        assert_eq!(point.position, Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn falls_through_to_height_probes() {
        // A small ledge 3.2 m up: out of reach of every horizontal search,
        // but the upper vertical probes get within sampling range.
        let world = world_with_tower(Vec3::ZERO);
        let mut nav = SurfaceNavigation::default();
        nav.rebuild(&[surface(Vec3::new(0.0, 3.2, 0.0), 0.1)]);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let spec = ArtdConfig::default().spawn;

        let point = resolve_spawn(&world, &nav, &mut rng, &spec, false).unwrap();
        assert_eq!(point.strategy, SpawnStrategy::HeightProbe);
    }

    #[test]
    fn last_resort_spawns_above_first_tower() {
        let world = world_with_tower(Vec3::new(1.0, 0.0, 1.0));
        let nav = SurfaceNavigation::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let spec = ArtdConfig::default().spawn;

        let point = resolve_spawn(&world, &nav, &mut rng, &spec, true).unwrap();
        assert_eq!(point.strategy, SpawnStrategy::LastResort);
        assert_eq!(point.position, Vec3::new(1.0, 1.0, 1.0));
    }
}
