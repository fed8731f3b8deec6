//! One AR play session: every component wired together and stepped in a
//! fixed order each tick.

use crate::actions::ArtdAction;
use crate::config::ArtdConfig;
use crate::enemy;
use crate::events::ArtdEvent;
use crate::feedback::Feedback;
use crate::image_tracking::ImageTracker;
use crate::modes::{self, ArMode, ModeTargets};
use crate::navigation::Navigation;
use crate::placement::{PlacementController, PlacementOutcome};
use crate::projectile;
use crate::tower;
use crate::tracking::Tracking;
use crate::waves::WaveDirector;
use crate::world::World;
use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sim_core::Tick;
use tracing::{error, info};

pub struct Session<N: Navigation, T: Tracking, F: Feedback> {
    config: ArtdConfig,
    world: World,
    director: WaveDirector,
    placement: PlacementController,
    images: ImageTracker,
    mode: ArMode,
    rng: ChaCha8Rng,
    nav: N,
    tracking: T,
    feedback: F,
    nav_interval: u64,
    next_nav_rebuild: Tick,
}

impl<N: Navigation, T: Tracking, F: Feedback> Session<N, T, F> {
    /// Builds a session. Sections that fail validation are logged and the
    /// component owning them is disabled: a bad projectile falls back to
    /// area attacks, and a bad wave, tower or enemy section leaves placement
    /// unavailable so no game can start.
    pub fn new(mut config: ArtdConfig, nav: N, tracking: T, feedback: F, seed: u64) -> Self {
        if config.tick_hz == 0 {
            error!("tick_hz must be at least 1, using 60");
            config.tick_hz = 60;
        }
        if let Some(Err(err)) = config.tower.projectile.as_ref().map(|p| p.validate()) {
            error!(%err, "projectile settings rejected, towers use area attacks");
            config.tower.projectile = None;
        }

        let mut usable = true;
        for (section, result) in [
            ("waves", config.waves.validate()),
            ("tower", config.tower.validate()),
            ("enemy", config.enemy.validate()),
        ] {
            if let Err(err) = result {
                error!(section, %err, "configuration rejected, placement disabled");
                usable = false;
            }
        }
        let placement = if usable {
            PlacementController::new(&config)
        } else {
            PlacementController::unavailable(&config)
        };

        Self {
            world: World::new(&config),
            director: WaveDirector::new(config.waves.max_cubes),
            placement,
            images: ImageTracker::new(),
            mode: ArMode::Idle,
            rng: ChaCha8Rng::seed_from_u64(seed),
            nav,
            tracking,
            feedback,
            nav_interval: config.duration_to_ticks(config.nav_rebuild_interval).max(1),
            next_nav_rebuild: 0,
            config,
        }
    }

    pub fn config(&self) -> &ArtdConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn director(&self) -> &WaveDirector {
        &self.director
    }

    pub fn placement(&self) -> &PlacementController {
        &self.placement
    }

    pub fn images(&self) -> &ImageTracker {
        &self.images
    }

    pub fn mode(&self) -> ArMode {
        self.mode
    }

    pub fn nav(&self) -> &N {
        &self.nav
    }

    pub fn tracking(&self) -> &T {
        &self.tracking
    }

    pub fn feedback(&self) -> &F {
        &self.feedback
    }

    pub fn feedback_mut(&mut self) -> &mut F {
        &mut self.feedback
    }

    /// Advances one tick.
    pub fn step<'a>(
        &mut self,
        tick: Tick,
        actions: impl IntoIterator<Item = &'a ArtdAction>,
        events: &mut Vec<ArtdEvent>,
    ) {
        // 1. Refresh device state
        self.feedback.begin_tick(tick);
        self.tracking.update(tick);

        // 2. Input
        for action in actions {
            self.apply(tick, action, events);
        }

        // 3. Mode-owned features
        match self.mode {
            ArMode::Placement => {
                self.placement.update(&self.tracking, &mut self.feedback);
            }
            ArMode::Tracking => self.images.update(&self.tracking, &mut self.world, events),
            ArMode::Idle => {}
        }

        // 4. Walkable area
        if tick >= self.next_nav_rebuild {
            self.rebuild_nav(tick);
        }

        // 5. Waves
        self.director.update(
            tick,
            &mut self.world,
            &mut self.nav,
            self.tracking.surfaces(),
            &mut self.rng,
            &self.config,
            events,
        );

        // 6. Agents, then attacks, then projectiles
        enemy::update_enemies(&mut self.world, &mut self.nav, tick, &self.config, events);
        tower::update_towers(&mut self.world, tick, self.config.tick_hz, events);
        projectile::update_projectiles(&mut self.world, tick, self.config.dt(), events);

        // 7. Deferred removal
        let killed = enemy::remove_dead(&mut self.world, &mut self.nav);
        self.director.record_kills(killed);
    }

    fn apply(&mut self, tick: Tick, action: &ArtdAction, events: &mut Vec<ArtdEvent>) {
        match action {
            ArtdAction::SelectMode { mode } => modes::select(
                &mut self.mode,
                *mode,
                ModeTargets {
                    placement: &mut self.placement,
                    images: &mut self.images,
                    world: &mut self.world,
                    feedback: &mut self.feedback,
                },
                events,
            ),
            ArtdAction::Tap { x, y } => {
                let outcome = self.placement.handle_tap(
                    tick,
                    Vec2::new(*x, *y),
                    &self.tracking,
                    &mut self.feedback,
                    &mut self.world,
                    &mut self.director,
                    &self.config,
                    events,
                );
                if let PlacementOutcome::Placed(_) = outcome {
                    self.rebuild_nav(tick);
                }
            }
            ArtdAction::StopWaves => self.director.stop(events),
            ArtdAction::ResetSession => self.reset(events),
        }
    }

    fn rebuild_nav(&mut self, tick: Tick) {
        self.nav.rebuild(self.tracking.surfaces());
        self.next_nav_rebuild = tick + self.nav_interval;
    }

    /// Returns every entity to its pool and the wave loop to its initial
    /// state. The active mode is kept.
    pub fn reset(&mut self, events: &mut Vec<ArtdEvent>) {
        for &id in self.world.enemy_ids() {
            self.nav.forget(id);
        }
        self.world.reset();
        self.director.reset();
        self.images.clear();
        self.placement.clear_cache();
        info!("session reset");
        events.push(ArtdEvent::SessionReset);
    }
}
