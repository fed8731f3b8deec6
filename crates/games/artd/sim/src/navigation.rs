//! Navigation boundary and a straight-line implementation over tracked surfaces.

use crate::scene::Obstacle;
use crate::tracking::{TrackedSurface, TrackingState};
use crate::world::EnemyId;
use glam::Vec3;
use slotmap::SecondaryMap;
use tracing::debug;

/// Result of advancing an agent one step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Steering {
    pub position: Vec3,
    pub velocity: Vec3,
}

/// Pathfinding as an opaque service. The game only reads back positions and
/// velocities; it never inspects paths.
pub trait Navigation {
    /// Rebuilds the walkable area from the current surfaces.
    fn rebuild(&mut self, surfaces: &[TrackedSurface]);

    /// Nearest walkable point within `max_distance` of `point`.
    fn sample_position(&self, point: Vec3, max_distance: f32) -> Option<Vec3>;

    /// Sets the agent's destination. False when no path can be started.
    fn request_path(&mut self, agent: EnemyId, from: Vec3, to: Vec3) -> bool;

    fn reset_path(&mut self, agent: EnemyId);

    fn steer(
        &mut self,
        agent: EnemyId,
        position: Vec3,
        speed: f32,
        stopping_distance: f32,
        dt: f32,
    ) -> Steering;

    /// Drops all state for a removed agent.
    fn forget(&mut self, agent: EnemyId);
}

#[derive(Clone, Copy, Debug)]
struct AgentPath {
    destination: Vec3,
    /// Forced repaths so far; each one flips the side a detour is tried on.
    repaths: u32,
}

/// Agents walk straight at their destination across the union of tracked
/// surfaces. Steps that would leave every surface or enter an obstacle are
/// refused, which leaves the agent stalled until a repath sends it sideways.
#[derive(Clone, Debug, Default)]
pub struct SurfaceNavigation {
    areas: Vec<TrackedSurface>,
    obstacles: Vec<Obstacle>,
    paths: SecondaryMap<EnemyId, AgentPath>,
    pending_repaths: SecondaryMap<EnemyId, u32>,
    rebuilds: u64,
}

impl SurfaceNavigation {
    pub fn new(obstacles: Vec<Obstacle>) -> Self {
        Self {
            obstacles,
            ..Self::default()
        }
    }

    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    pub fn has_area(&self) -> bool {
        !self.areas.is_empty()
    }

    pub fn destination(&self, agent: EnemyId) -> Option<Vec3> {
        self.paths.get(agent).map(|p| p.destination)
    }

    fn walkable(&self, point: Vec3) -> bool {
        self.areas.iter().any(|a| a.contains_xz(point))
            && !self.obstacles.iter().any(|o| {
                let d = point - o.center;
                d.x * d.x + d.z * d.z < o.radius * o.radius
            })
    }
}

impl Navigation for SurfaceNavigation {
    fn rebuild(&mut self, surfaces: &[TrackedSurface]) {
        self.areas = surfaces
            .iter()
            .filter(|s| s.state == TrackingState::Tracking)
            .cloned()
            .collect();
        self.rebuilds += 1;
    }

    fn sample_position(&self, point: Vec3, max_distance: f32) -> Option<Vec3> {
        self.areas
            .iter()
            .map(|area| area.clamp(point))
            .filter(|p| self.walkable(*p))
            .map(|p| (p.distance(point), p))
            .filter(|(d, _)| *d <= max_distance)
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, p)| p)
    }

    fn request_path(&mut self, agent: EnemyId, from: Vec3, to: Vec3) -> bool {
        if self.areas.is_empty() || self.sample_position(from, 0.5).is_none() {
            return false;
        }
        let repaths = self.pending_repaths.remove(agent).unwrap_or(0);
        self.paths.insert(
            agent,
            AgentPath {
                destination: to,
                repaths,
            },
        );
        true
    }

    fn reset_path(&mut self, agent: EnemyId) {
        if let Some(path) = self.paths.remove(agent) {
            self.pending_repaths.insert(agent, path.repaths + 1);
        }
    }

    fn steer(
        &mut self,
        agent: EnemyId,
        position: Vec3,
        speed: f32,
        stopping_distance: f32,
        dt: f32,
    ) -> Steering {
        let still = Steering {
            position,
            velocity: Vec3::ZERO,
        };
        let Some(path) = self.paths.get(agent).copied() else {
            return still;
        };

        let mut to_goal = path.destination - position;
        to_goal.y = 0.0;
        let distance = to_goal.length();
        if distance <= stopping_distance || dt <= 0.0 {
            return still;
        }

        let step = (speed * dt).min(distance - stopping_distance);
        let forward = to_goal / distance;
        let mut candidates = vec![forward];
        if path.repaths > 0 {
            let side = Vec3::new(-forward.z, 0.0, forward.x);
            let side = if path.repaths % 2 == 1 { side } else { -side };
            candidates.push((forward + side).normalize());
            candidates.push(side);
        }

        for dir in candidates {
            let next = position + dir * step;
            if self.walkable(next) {
                return Steering {
                    position: next,
                    velocity: dir * (step / dt),
                };
            }
        }
        debug!(?agent, "steering blocked");
        still
    }

    fn forget(&mut self, agent: EnemyId) {
        self.paths.remove(agent);
        self.pending_repaths.remove(agent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Pose;
    use crate::tracking::TrackableId;
    use glam::Vec2;
    use slotmap::SlotMap;

    fn table(state: TrackingState) -> TrackedSurface {
        TrackedSurface {
            id: TrackableId(1),
            pose: Pose::IDENTITY,
            half_extents: Vec2::splat(1.0),
            state,
        }
    }

    fn agent() -> EnemyId {
        let mut keys: SlotMap<EnemyId, ()> = SlotMap::with_key();
        keys.insert(())
    }

    #[test]
    fn only_stable_surfaces_are_walkable() {
        let mut nav = SurfaceNavigation::default();
        nav.rebuild(&[table(TrackingState::Limited)]);
        assert!(!nav.has_area());
        assert!(nav.sample_position(Vec3::ZERO, 1.0).is_none());

        nav.rebuild(&[table(TrackingState::Tracking)]);
        assert_eq!(nav.rebuild_count(), 2);
        assert_eq!(
            nav.sample_position(Vec3::new(0.2, 0.5, 0.2), 1.0),
            Some(Vec3::new(0.2, 0.0, 0.2))
        );
        assert!(nav.sample_position(Vec3::new(3.0, 0.0, 0.0), 1.0).is_none());
    }

    #[test]
    fn agent_walks_to_stopping_distance() {
        let mut nav = SurfaceNavigation::default();
        nav.rebuild(&[table(TrackingState::Tracking)]);
        let id = agent();
        let goal = Vec3::new(0.9, 0.0, 0.0);
        assert!(nav.request_path(id, Vec3::new(-0.9, 0.0, 0.0), goal));

        let mut pos = Vec3::new(-0.9, 0.0, 0.0);
        for _ in 0..120 {
            pos = nav.steer(id, pos, 3.0, 0.5, 1.0 / 60.0).position;
        }
        assert!((pos.distance(goal) - 0.5).abs() < 1e-3);
        let rest = nav.steer(id, pos, 3.0, 0.5, 1.0 / 60.0);
        assert!(rest.velocity.length() < 1e-3);
    }

    #[test]
    fn obstacle_stalls_until_repath() {
        let mut nav = SurfaceNavigation::new(vec![Obstacle {
            center: Vec3::ZERO,
            radius: 0.2,
        }]);
        nav.rebuild(&[table(TrackingState::Tracking)]);
        let id = agent();
        let start = Vec3::new(-0.3, 0.0, 0.0);
        let goal = Vec3::new(0.9, 0.0, 0.0);
        nav.request_path(id, start, goal);

        let mut pos = start;
        for _ in 0..30 {
            pos = nav.steer(id, pos, 3.0, 0.5, 1.0 / 60.0).position;
        }
        let stalled = nav.steer(id, pos, 3.0, 0.5, 1.0 / 60.0);
        assert_eq!(stalled.velocity, Vec3::ZERO);

        nav.reset_path(id);
        assert!(nav.destination(id).is_none());
        nav.request_path(id, pos, goal);
        let moving = nav.steer(id, pos, 3.0, 0.5, 1.0 / 60.0);
        assert!(moving.velocity.length() > 0.1);
    }

    #[test]
    fn no_path_without_area() {
        let mut nav = SurfaceNavigation::default();
        let id = agent();
        assert!(!nav.request_path(id, Vec3::ZERO, Vec3::X));
        let s = nav.steer(id, Vec3::ZERO, 3.0, 0.5, 1.0 / 60.0);
        assert_eq!(s.velocity, Vec3::ZERO);
    }
}
