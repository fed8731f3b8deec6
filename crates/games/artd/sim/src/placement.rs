use crate::config::{ArtdConfig, TOWER_POOL_TAG};
use crate::events::ArtdEvent;
use crate::feedback::{Feedback, Severity};
use crate::tracking::{SurfaceHit, Tracking, TrackingState};
use crate::waves::WaveDirector;
use crate::world::{TowerId, World};
use glam::Vec2;
use sim_core::Tick;
use tracing::{debug, info, warn};

pub const MSG_PLACEMENT_ENABLED: &str = "Placement mode enabled";
pub const MSG_CUBE_PLACED: &str = "Cube placed!";
pub const MSG_MAX_CUBES: &str = "Maximum cubes reached!";
pub const MSG_NO_SURFACE: &str = "No surface detected";
pub const MSG_SURFACE_NOT_FOUND: &str = "Surface not found";
pub const MSG_SURFACE_UNSTABLE: &str = "Surface not stable";
pub const MSG_PLACEMENT_FAILED: &str = "Placement failed";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlacementRejection {
    /// The ray hit nothing.
    NoSurface,
    /// The hit surface is no longer reported.
    SurfaceNotFound,
    /// The hit surface is not fully tracked.
    SurfaceNotStable,
    CapReached,
    /// The tower pool handed out nothing.
    PoolUnavailable,
}

impl PlacementRejection {
    pub fn message(self) -> &'static str {
        match self {
            PlacementRejection::NoSurface => MSG_NO_SURFACE,
            PlacementRejection::SurfaceNotFound => MSG_SURFACE_NOT_FOUND,
            PlacementRejection::SurfaceNotStable => MSG_SURFACE_UNSTABLE,
            PlacementRejection::CapReached => MSG_MAX_CUBES,
            PlacementRejection::PoolUnavailable => MSG_PLACEMENT_FAILED,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlacementOutcome {
    Placed(TowerId),
    Rejected(PlacementRejection),
    /// Placement is off or nothing is tracked yet.
    Ignored,
}

#[derive(Clone, Debug)]
struct HitCache {
    screen: Vec2,
    hits: Vec<SurfaceHit>,
    tick: Tick,
}

/// Turns taps on tracked surfaces into placed cubes.
#[derive(Clone, Debug)]
pub struct PlacementController {
    available: bool,
    enabled: bool,
    cache: Option<HitCache>,
    cache_ticks: u64,
}

impl PlacementController {
    pub fn new(config: &ArtdConfig) -> Self {
        Self {
            available: true,
            enabled: false,
            cache: None,
            cache_ticks: config.duration_to_ticks(config.raycast_cache_duration),
        }
    }

    /// A controller whose configuration was rejected; it never enables.
    pub fn unavailable(config: &ArtdConfig) -> Self {
        Self {
            available: false,
            ..Self::new(config)
        }
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn enable<F: Feedback>(&mut self, feedback: &mut F) {
        if !self.available {
            warn!("placement requested but unavailable");
            return;
        }
        self.enabled = true;
        feedback.show_message(MSG_PLACEMENT_ENABLED, Severity::Success);
    }

    pub fn disable(&mut self) {
        self.enabled = false;
        self.cache = None;
    }

    pub fn clear_cache(&mut self) {
        self.cache = None;
    }

    /// Shows the tracking indicator iff any surface is known. Returns whether
    /// taps can be handled this tick.
    pub fn update<T: Tracking, F: Feedback>(&self, tracking: &T, feedback: &mut F) -> bool {
        if !self.enabled {
            return false;
        }
        let tracking_any = !tracking.surfaces().is_empty();
        feedback.show_tracking_indicator(tracking_any);
        tracking_any
    }

    fn hits<T: Tracking>(&mut self, tick: Tick, screen: Vec2, tracking: &T) -> Vec<SurfaceHit> {
        if let Some(cache) = &self.cache {
            if cache.screen == screen && tick.saturating_sub(cache.tick) < self.cache_ticks {
                debug!(?screen, "reusing cached hit test");
                return cache.hits.clone();
            }
        }
        let hits = tracking.hit_test(screen);
        if !hits.is_empty() {
            self.cache = Some(HitCache {
                screen,
                hits: hits.clone(),
                tick,
            });
        }
        hits
    }

    /// Resolves a tap: hit test, surface stability, cap, then a pooled cube
    /// handed to the director. Every rejection is reported as feedback.
    #[allow(clippy::too_many_arguments)]
    pub fn handle_tap<T: Tracking, F: Feedback>(
        &mut self,
        tick: Tick,
        screen: Vec2,
        tracking: &T,
        feedback: &mut F,
        world: &mut World,
        director: &mut WaveDirector,
        config: &ArtdConfig,
        events: &mut Vec<ArtdEvent>,
    ) -> PlacementOutcome {
        if !self.enabled || tracking.surfaces().is_empty() {
            return PlacementOutcome::Ignored;
        }

        let outcome = self.try_place(tick, screen, tracking, world, director, config, events);
        match outcome {
            Ok(id) => {
                feedback.show_message(MSG_CUBE_PLACED, Severity::Success);
                PlacementOutcome::Placed(id)
            }
            Err(reason) => {
                feedback.show_message(reason.message(), Severity::Error);
                events.push(ArtdEvent::PlacementRejected { reason });
                PlacementOutcome::Rejected(reason)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn try_place<T: Tracking>(
        &mut self,
        tick: Tick,
        screen: Vec2,
        tracking: &T,
        world: &mut World,
        director: &mut WaveDirector,
        config: &ArtdConfig,
        events: &mut Vec<ArtdEvent>,
    ) -> Result<TowerId, PlacementRejection> {
        let hits = self.hits(tick, screen, tracking);
        let hit = hits.first().ok_or(PlacementRejection::NoSurface)?;
        let surface = tracking
            .surface(hit.trackable)
            .ok_or(PlacementRejection::SurfaceNotFound)?;
        if surface.state != TrackingState::Tracking {
            return Err(PlacementRejection::SurfaceNotStable);
        }
        if !director.can_place() {
            return Err(PlacementRejection::CapReached);
        }

        let id = world
            .towers
            .acquire(TOWER_POOL_TAG, hit.pose)
            .ok_or(PlacementRejection::PoolUnavailable)?;
        if let Some(tower) = world.towers.get_mut(id) {
            tower.placed_tick = tick;
            tower.surface = Some(hit.trackable);
        }
        if !director.add_tower(world, id, tick, config, events) {
            if let Err(err) = world.towers.release(TOWER_POOL_TAG, id) {
                warn!(%err, "could not return rejected cube");
            }
            return Err(PlacementRejection::CapReached);
        }

        let position = hit.pose.position;
        info!(?id, x = position.x, z = position.z, "cube placed on surface");
        events.push(ArtdEvent::TowerPlaced {
            id,
            position,
            placed: director.placed(),
        });
        Ok(id)
    }
}
