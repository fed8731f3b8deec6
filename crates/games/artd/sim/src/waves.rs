use crate::config::ArtdConfig;
use crate::enemy;
use crate::events::ArtdEvent;
use crate::navigation::Navigation;
use crate::spawn;
use crate::tracking::TrackedSurface;
use crate::world::{TowerId, World};
use rand::Rng;
use sim_core::Tick;
use tracing::{debug, info, warn};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WavePhase {
    /// Cubes are still being placed.
    AwaitingPlacement,
    /// Wave announced; waiting for surfaces and navigation to settle.
    Settling { until_tick: Tick },
    Spawning {
        spawned: u16,
        wave_size: u16,
        next_spawn_tick: Tick,
    },
    Resting { until_tick: Tick },
    Stopped,
}

/// Placement gating and the repeating wave loop.
///
/// `game_started` only ever goes false→true through placement; the explicit
/// [`stop`](Self::stop) and [`reset`](Self::reset) calls are the only ways back.
#[derive(Clone, Debug)]
pub struct WaveDirector {
    max_cubes: u32,
    placed: u32,
    game_started: bool,
    current_wave: u32,
    phase: WavePhase,
    enemies_killed: u32,
}

impl WaveDirector {
    pub fn new(max_cubes: u32) -> Self {
        Self {
            max_cubes,
            placed: 0,
            game_started: false,
            current_wave: 0,
            phase: WavePhase::AwaitingPlacement,
            enemies_killed: 0,
        }
    }

    pub fn can_place(&self) -> bool {
        self.placed < self.max_cubes
    }

    pub fn placed(&self) -> u32 {
        self.placed
    }

    pub fn max_cubes(&self) -> u32 {
        self.max_cubes
    }

    pub fn has_game_started(&self) -> bool {
        self.game_started
    }

    pub fn current_wave(&self) -> u32 {
        self.current_wave
    }

    pub fn phase(&self) -> &WavePhase {
        &self.phase
    }

    pub fn enemies_killed(&self) -> u32 {
        self.enemies_killed
    }

    pub fn record_kills(&mut self, count: u32) {
        self.enemies_killed += count;
    }

    /// Registers a placed cube. Reaching the cap starts the game, once.
    ///
    /// Returns false (and registers nothing) when the cap is already reached.
    pub fn add_tower(
        &mut self,
        world: &mut World,
        id: TowerId,
        tick: Tick,
        config: &ArtdConfig,
        events: &mut Vec<ArtdEvent>,
    ) -> bool {
        if !self.can_place() {
            warn!(placed = self.placed, max = self.max_cubes, "placement cap reached");
            return false;
        }
        self.placed += 1;
        world.register_tower(id);
        info!(placed = self.placed, max = self.max_cubes, "cube placed");

        let first_crossing = !self.game_started && self.phase == WavePhase::AwaitingPlacement;
        if self.placed >= self.max_cubes && first_crossing {
            self.game_started = true;
            info!("placement complete, game starting");
            events.push(ArtdEvent::GameStarted);
            self.start_wave(tick, config, events);
        }
        true
    }

    fn start_wave(&mut self, tick: Tick, config: &ArtdConfig, events: &mut Vec<ArtdEvent>) {
        self.current_wave += 1;
        info!(wave = self.current_wave, "wave starting");
        events.push(ArtdEvent::WaveStarted {
            wave: self.current_wave,
        });
        self.phase = WavePhase::Settling {
            until_tick: tick + config.duration_to_ticks(config.waves.settle_delay),
        };
    }

    /// Advances the wave loop. Rebuilds navigation from `surfaces` when a
    /// rest ends and again right before a wave's first spawn.
    #[allow(clippy::too_many_arguments)]
    pub fn update<N: Navigation, R: Rng>(
        &mut self,
        tick: Tick,
        world: &mut World,
        nav: &mut N,
        surfaces: &[TrackedSurface],
        rng: &mut R,
        config: &ArtdConfig,
        events: &mut Vec<ArtdEvent>,
    ) {
        if !self.game_started {
            return;
        }

        match self.phase.clone() {
            WavePhase::AwaitingPlacement | WavePhase::Stopped => {}
            WavePhase::Settling { until_tick } => {
                if tick >= until_tick {
                    nav.rebuild(surfaces);
                    self.phase = WavePhase::Spawning {
                        spawned: 0,
                        wave_size: config.waves.enemies_per_wave,
                        next_spawn_tick: tick,
                    };
                    self.spawn_due(tick, world, nav, rng, config, events);
                }
            }
            WavePhase::Spawning { .. } => self.spawn_due(tick, world, nav, rng, config, events),
            WavePhase::Resting { until_tick } => {
                if tick >= until_tick {
                    self.start_wave(tick, config, events);
                    nav.rebuild(surfaces);
                }
            }
        }
    }

    fn spawn_due<N: Navigation, R: Rng>(
        &mut self,
        tick: Tick,
        world: &mut World,
        nav: &mut N,
        rng: &mut R,
        config: &ArtdConfig,
        events: &mut Vec<ArtdEvent>,
    ) {
        let WavePhase::Spawning {
            spawned,
            wave_size,
            next_spawn_tick,
        } = self.phase
        else {
            return;
        };
        if tick < next_spawn_tick {
            return;
        }

        let wave = self.current_wave;
        match spawn::resolve_spawn(world, nav, rng, &config.spawn, spawned == 0) {
            Some(point) => {
                match enemy::spawn(world, nav, point.position, tick, wave, config, events) {
                    Some(id) => {
                        debug!(?id, strategy = ?point.strategy, "enemy spawned");
                        events.push(ArtdEvent::EnemySpawned {
                            id,
                            position: point.position,
                            strategy: point.strategy,
                        });
                    }
                    None => events.push(ArtdEvent::SpawnSkipped { wave }),
                }
            }
            None => {
                warn!(wave, slot = spawned, "spawn slot skipped");
                events.push(ArtdEvent::SpawnSkipped { wave });
            }
        }

        let spawned = spawned + 1;
        let interval = config.duration_to_ticks(config.waves.spawn_interval);
        if spawned >= wave_size {
            events.push(ArtdEvent::WaveSpawned { wave, spawned });
            // The batch ends with one more spawn interval before the rest.
            let rest = interval + config.duration_to_ticks(config.waves.time_between_waves);
            self.phase = WavePhase::Resting {
                until_tick: tick + rest.max(1),
            };
        } else {
            self.phase = WavePhase::Spawning {
                spawned,
                wave_size,
                next_spawn_tick: tick + interval.max(1),
            };
        }
    }

    /// Halts the wave loop. Enemies already spawned keep going.
    ///
    /// Ignored until placement has started the game.
    pub fn stop(&mut self, events: &mut Vec<ArtdEvent>) {
        if !self.game_started {
            debug!("stop ignored, game not started");
            return;
        }
        info!(wave = self.current_wave, "waves stopped");
        self.game_started = false;
        self.phase = WavePhase::Stopped;
        events.push(ArtdEvent::WavesStopped);
    }

    /// Back to an empty board.
    pub fn reset(&mut self) {
        *self = Self::new(self.max_cubes);
    }
}
