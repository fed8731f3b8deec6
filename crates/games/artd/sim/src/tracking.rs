//! Surface and image tracking boundary.
//!
//! The game never talks to a device; it reads poses from a [`Tracking`]
//! implementation once per tick. [`ScriptedTracking`] replays a
//! [`Scene`](crate::scene::Scene) for headless runs and tests.

use crate::geometry::Pose;
use crate::scene::Scene;
use glam::{Vec2, Vec3};
use sim_core::Tick;

/// Stable identifier of a tracked surface or image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TrackableId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackingState {
    /// Pose is current.
    Tracking,
    /// Pose is known but recently lost or degraded.
    Limited,
    None,
}

/// A detected horizontal surface, centred on `pose` with half-size `half_extents`
/// along its local x and z axes.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackedSurface {
    pub id: TrackableId,
    pub pose: Pose,
    pub half_extents: Vec2,
    pub state: TrackingState,
}

impl TrackedSurface {
    pub fn contains_xz(&self, point: Vec3) -> bool {
        let local = point - self.pose.position;
        local.x.abs() <= self.half_extents.x && local.z.abs() <= self.half_extents.y
    }

    /// Closest point on the surface to `point`.
    pub fn clamp(&self, point: Vec3) -> Vec3 {
        let c = self.pose.position;
        Vec3::new(
            point.x.clamp(c.x - self.half_extents.x, c.x + self.half_extents.x),
            c.y,
            point.z.clamp(c.z - self.half_extents.y, c.z + self.half_extents.y),
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TrackedImage {
    pub id: TrackableId,
    pub name: String,
    pub pose: Pose,
    pub state: TrackingState,
}

/// Result of casting a screen-space ray at tracked surfaces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceHit {
    pub trackable: TrackableId,
    pub pose: Pose,
}

pub trait Tracking {
    /// Advances the provider to `tick`.
    fn update(&mut self, tick: Tick);

    /// Surfaces currently known to the provider, in detection order.
    fn surfaces(&self) -> &[TrackedSurface];

    fn images(&self) -> &[TrackedImage];

    /// Casts a ray from a screen position; hits are ordered nearest first.
    fn hit_test(&self, screen: Vec2) -> Vec<SurfaceHit>;

    fn surface(&self, id: TrackableId) -> Option<&TrackedSurface> {
        self.surfaces().iter().find(|s| s.id == id)
    }
}

/// Replays a scene: surfaces and images appear and disappear on their
/// scheduled ticks, and screen points map onto the ground plane by a fixed
/// scale around the screen centre.
#[derive(Clone, Debug)]
pub struct ScriptedTracking {
    scene: Scene,
    max_extent: Option<f32>,
    surfaces: Vec<TrackedSurface>,
    images: Vec<TrackedImage>,
}

impl ScriptedTracking {
    pub fn new(scene: Scene, max_extent: Option<f32>) -> Self {
        let mut tracking = Self {
            scene,
            max_extent,
            surfaces: Vec::new(),
            images: Vec::new(),
        };
        tracking.update(0);
        tracking
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// World point under a screen position, at height `y`.
    pub fn unproject(&self, screen: Vec2, y: f32) -> Vec3 {
        let projection = &self.scene.projection;
        let offset = (screen - projection.screen_center) * projection.metres_per_pixel;
        Vec3::new(
            projection.origin.x + offset.x,
            y,
            projection.origin.z - offset.y,
        )
    }

    fn oversized(&self, half_extents: Vec2) -> bool {
        self.max_extent
            .is_some_and(|limit| half_extents.length() > limit)
    }
}

impl Tracking for ScriptedTracking {
    fn update(&mut self, tick: Tick) {
        let surfaces: Vec<TrackedSurface> = self
            .scene
            .surfaces
            .iter()
            .filter(|s| tick >= s.appear_tick)
            .filter(|s| !self.oversized(s.half_extents))
            .map(|s| TrackedSurface {
                id: s.id,
                pose: Pose::at(s.center),
                half_extents: s.half_extents,
                state: if tick >= s.stable_tick {
                    TrackingState::Tracking
                } else {
                    TrackingState::Limited
                },
            })
            .collect();
        self.surfaces = surfaces;

        self.images = self
            .scene
            .images
            .iter()
            .filter(|img| tick >= img.appear_tick)
            .map(|img| {
                let visible = img.lost_tick.map_or(true, |lost| tick < lost);
                TrackedImage {
                    id: img.id,
                    name: img.name.clone(),
                    pose: Pose::at(img.position + img.drift * (tick - img.appear_tick) as f32),
                    state: if visible {
                        TrackingState::Tracking
                    } else {
                        TrackingState::Limited
                    },
                }
            })
            .collect();
    }

    fn surfaces(&self) -> &[TrackedSurface] {
        &self.surfaces
    }

    fn images(&self) -> &[TrackedImage] {
        &self.images
    }

    fn hit_test(&self, screen: Vec2) -> Vec<SurfaceHit> {
        let mut hits: Vec<(f32, SurfaceHit)> = self
            .surfaces
            .iter()
            .filter_map(|surface| {
                let point = self.unproject(screen, surface.pose.position.y);
                surface.contains_xz(point).then(|| {
                    let depth = self.scene.projection.camera_height - point.y;
                    (
                        depth,
                        SurfaceHit {
                            trackable: surface.id,
                            pose: Pose {
                                position: point,
                                rotation: surface.pose.rotation,
                            },
                        },
                    )
                })
            })
            .collect();
        hits.sort_by(|a, b| a.0.total_cmp(&b.0));
        hits.into_iter().map(|(_, hit)| hit).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{ImageSpec, Scene, SurfaceSpec};

    fn scene() -> Scene {
        let mut scene = Scene::empty();
        scene.surfaces.push(SurfaceSpec {
            id: TrackableId(1),
            center: Vec3::ZERO,
            half_extents: Vec2::new(0.5, 0.5),
            appear_tick: 10,
            stable_tick: 20,
        });
        scene.surfaces.push(SurfaceSpec {
            id: TrackableId(2),
            center: Vec3::new(0.0, 0.8, 0.0),
            half_extents: Vec2::new(0.2, 0.2),
            appear_tick: 0,
            stable_tick: 0,
        });
        scene.images.push(ImageSpec {
            id: TrackableId(7),
            name: "poster".into(),
            position: Vec3::new(1.0, 0.0, 0.0),
            drift: Vec3::ZERO,
            appear_tick: 5,
            lost_tick: Some(15),
        });
        scene
    }

    #[test]
    fn surfaces_appear_then_stabilise() {
        let mut tracking = ScriptedTracking::new(scene(), None);
        assert_eq!(tracking.surfaces().len(), 1);

        tracking.update(12);
        let floor = tracking.surface(TrackableId(1)).unwrap();
        assert_eq!(floor.state, TrackingState::Limited);

        tracking.update(20);
        let floor = tracking.surface(TrackableId(1)).unwrap();
        assert_eq!(floor.state, TrackingState::Tracking);
    }

    #[test]
    fn oversized_surfaces_are_ignored() {
        let mut tracking = ScriptedTracking::new(scene(), Some(0.5));
        tracking.update(30);
        assert!(tracking.surface(TrackableId(1)).is_none());
        assert!(tracking.surface(TrackableId(2)).is_some());
    }

    #[test]
    fn hit_test_orders_nearest_surface_first() {
        let mut tracking = ScriptedTracking::new(scene(), None);
        tracking.update(30);
        let center = tracking.scene().projection.screen_center;
        let hits = tracking.hit_test(center);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].trackable, TrackableId(2));
        assert_eq!(hits[1].trackable, TrackableId(1));

        assert!(tracking.hit_test(Vec2::new(-10_000.0, 0.0)).is_empty());
    }

    #[test]
    fn images_go_limited_after_loss() {
        let mut tracking = ScriptedTracking::new(scene(), None);
        assert!(tracking.images().is_empty());
        tracking.update(6);
        assert_eq!(tracking.images()[0].state, TrackingState::Tracking);
        tracking.update(15);
        assert_eq!(tracking.images()[0].state, TrackingState::Limited);
    }
}
