//! Scripted AR scenes for headless runs.
//!
//! Ticks in a scene are absolute and assume the default 60 Hz rate.

use crate::actions::ArtdAction;
use crate::modes::ArMode;
use crate::tracking::TrackableId;
use glam::{Vec2, Vec3};
use sim_core::Tick;

#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceSpec {
    pub id: TrackableId,
    pub center: Vec3,
    pub half_extents: Vec2,
    /// First tick the surface is reported at all.
    pub appear_tick: Tick,
    /// First tick it is reported as `Tracking` rather than `Limited`.
    pub stable_tick: Tick,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImageSpec {
    pub id: TrackableId,
    pub name: String,
    pub position: Vec3,
    /// Movement per tick while visible.
    pub drift: Vec3,
    pub appear_tick: Tick,
    pub lost_tick: Option<Tick>,
}

/// Something on a surface agents cannot walk through.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Obstacle {
    pub center: Vec3,
    pub radius: f32,
}

/// Maps screen pixels onto the ground plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    pub screen_center: Vec2,
    pub metres_per_pixel: f32,
    /// World point under the screen centre.
    pub origin: Vec3,
    pub camera_height: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            screen_center: Vec2::new(540.0, 960.0),
            metres_per_pixel: 0.002,
            origin: Vec3::ZERO,
            camera_height: 1.6,
        }
    }
}

impl Projection {
    /// Screen position that unprojects onto `world`.
    pub fn screen_point(&self, world: Vec3) -> Vec2 {
        let dx = world.x - self.origin.x;
        let dz = self.origin.z - world.z;
        self.screen_center + Vec2::new(dx, dz) / self.metres_per_pixel
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScriptedInput {
    pub tick: Tick,
    pub action: ArtdAction,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    pub name: String,
    pub surfaces: Vec<SurfaceSpec>,
    pub images: Vec<ImageSpec>,
    pub obstacles: Vec<Obstacle>,
    pub projection: Projection,
    pub inputs: Vec<ScriptedInput>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::tabletop()
    }
}

pub const SCENE_NAMES: &[&str] = &["tabletop", "blocked", "images", "empty"];

impl Scene {
    pub fn empty() -> Self {
        Self {
            name: "empty".into(),
            surfaces: Vec::new(),
            images: Vec::new(),
            obstacles: Vec::new(),
            projection: Projection::default(),
            inputs: Vec::new(),
        }
    }

    /// A single table surface; five cubes get tapped down once it stabilises.
    pub fn tabletop() -> Self {
        let mut scene = Self::empty();
        scene.name = "tabletop".into();
        scene.surfaces.push(SurfaceSpec {
            id: TrackableId(1),
            center: Vec3::ZERO,
            half_extents: Vec2::new(0.9, 0.9),
            appear_tick: 30,
            stable_tick: 90,
        });
        scene.inputs.push(ScriptedInput {
            tick: 1,
            action: ArtdAction::SelectMode {
                mode: ArMode::Placement,
            },
        });
        let spots = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.5, 0.0, 0.5),
            Vec3::new(-0.5, 0.0, 0.5),
            Vec3::new(0.5, 0.0, -0.5),
            Vec3::new(-0.5, 0.0, -0.5),
        ];
        for (i, spot) in spots.into_iter().enumerate() {
            scene.push_tap(120 + 30 * i as Tick, spot);
        }
        scene
    }

    /// Tabletop with a wall between the corner cubes and the centre.
    pub fn blocked() -> Self {
        let mut scene = Self::tabletop();
        scene.name = "blocked".into();
        scene.obstacles.push(Obstacle {
            center: Vec3::new(0.0, 0.0, 0.7),
            radius: 0.15,
        });
        scene
    }

    /// Two posters that come and go while in tracking mode.
    pub fn images() -> Self {
        let mut scene = Self::empty();
        scene.name = "images".into();
        scene.images.push(ImageSpec {
            id: TrackableId(100),
            name: "poster-a".into(),
            position: Vec3::new(0.3, 0.0, -1.0),
            drift: Vec3::new(0.001, 0.0, 0.0),
            appear_tick: 60,
            lost_tick: Some(360),
        });
        scene.images.push(ImageSpec {
            id: TrackableId(101),
            name: "poster-b".into(),
            position: Vec3::new(-0.3, 0.0, -1.0),
            drift: Vec3::ZERO,
            appear_tick: 120,
            lost_tick: None,
        });
        scene.inputs.push(ScriptedInput {
            tick: 1,
            action: ArtdAction::SelectMode {
                mode: ArMode::Tracking,
            },
        });
        scene.inputs.push(ScriptedInput {
            tick: 480,
            action: ArtdAction::SelectMode { mode: ArMode::Idle },
        });
        scene
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "tabletop" => Some(Self::tabletop()),
            "blocked" => Some(Self::blocked()),
            "images" => Some(Self::images()),
            "empty" => Some(Self::empty()),
            _ => None,
        }
    }

    /// Queues a tap on the screen point above `world`.
    pub fn push_tap(&mut self, tick: Tick, world: Vec3) {
        let screen = self.projection.screen_point(world);
        self.inputs.push(ScriptedInput {
            tick,
            action: ArtdAction::Tap {
                x: screen.x,
                y: screen.y,
            },
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::{ScriptedTracking, Tracking};

    #[test]
    fn every_listed_scene_resolves() {
        for name in SCENE_NAMES {
            assert_eq!(Scene::by_name(name).unwrap().name, *name);
        }
        assert!(Scene::by_name("nope").is_none());
    }

    #[test]
    fn screen_point_inverts_unproject() {
        let scene = Scene::tabletop();
        let world = Vec3::new(0.5, 0.0, -0.5);
        let screen = scene.projection.screen_point(world);
        let tracking = ScriptedTracking::new(scene, None);
        let back = tracking.unproject(screen, 0.0);
        assert!(back.distance(world) < 1e-4);
    }

    #[test]
    fn tabletop_taps_land_on_the_table() {
        let scene = Scene::tabletop();
        let mut tracking = ScriptedTracking::new(scene.clone(), Some(1.5));
        tracking.update(200);
        let taps = scene
            .inputs
            .iter()
            .filter_map(|input| match input.action {
                ArtdAction::Tap { x, y } => Some(Vec2::new(x, y)),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(taps.len(), 5);
        for tap in taps {
            assert_eq!(tracking.hit_test(tap).len(), 1);
        }
    }
}
