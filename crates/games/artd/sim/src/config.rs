use crate::error::ConfigError;
use serde::Deserialize;
use sim_core::Micros;

/// Pool tag for placed defense cubes.
pub const TOWER_POOL_TAG: &str = "PlacedObject";
/// Pool tag for enemy agents.
pub const ENEMY_POOL_TAG: &str = "Enemy";
/// Pool tag for tower projectiles.
pub const PROJECTILE_POOL_TAG: &str = "Projectile";
/// Pool tag for instances that follow tracked images.
pub const MARKER_POOL_TAG: &str = "TrackedImage";

#[derive(Clone, Debug, PartialEq)]
pub struct ProjectileSpec {
    /// Metres per second along the launch direction.
    pub speed: f32,
    pub lifetime: Micros,
    /// Collision radius used for the swept hit test.
    pub radius: f32,
    /// Consume the projectile on its first hit. When false it pierces,
    /// striking each enemy at most once.
    pub destroy_on_hit: bool,
}

impl ProjectileSpec {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.speed > 0.0) {
            return Err(ConfigError::invalid("tower.projectile.speed", "must be positive"));
        }
        if self.lifetime.is_zero() {
            return Err(ConfigError::invalid("tower.projectile.lifetime", "must be non-zero"));
        }
        if self.radius < 0.0 {
            return Err(ConfigError::invalid("tower.projectile.radius", "must not be negative"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TowerSpec {
    pub attack_radius: f32,
    pub damage: f32,
    pub attack_interval: Micros,
    /// `None` selects area mode: every enemy in range takes damage on each attack.
    pub projectile: Option<ProjectileSpec>,
}

impl TowerSpec {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.attack_radius > 0.0) {
            return Err(ConfigError::invalid("tower.attack_radius", "must be positive"));
        }
        if self.damage < 0.0 {
            return Err(ConfigError::invalid("tower.damage", "must not be negative"));
        }
        if self.attack_interval.is_zero() {
            return Err(ConfigError::invalid("tower.attack_interval", "must be non-zero"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnemySpec {
    pub max_health: f32,
    pub move_speed: f32,
    /// How often an agent re-evaluates its nearest tower.
    pub target_update_interval: Micros,
    pub stopping_distance: f32,
    /// Collision radius for projectile hits.
    pub radius: f32,
    /// Below this speed (m/s) an agent with a distant destination counts as stalled.
    pub stuck_speed: f32,
    /// Extra distance beyond `stopping_distance` before stalling counts as stuck.
    pub stuck_margin: f32,
    pub hit_flash: Micros,
}

impl EnemySpec {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_health > 0.0) {
            return Err(ConfigError::invalid("enemy.max_health", "must be positive"));
        }
        if self.move_speed < 0.0 {
            return Err(ConfigError::invalid("enemy.move_speed", "must not be negative"));
        }
        if self.target_update_interval.is_zero() {
            return Err(ConfigError::invalid(
                "enemy.target_update_interval",
                "must be non-zero",
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct WaveSpec {
    /// Placement cap; reaching it starts the game.
    pub max_cubes: u32,
    pub enemies_per_wave: u16,
    pub spawn_interval: Micros,
    pub time_between_waves: Micros,
    /// Wait between announcing a wave and its first spawn.
    pub settle_delay: Micros,
}

impl WaveSpec {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_cubes == 0 {
            return Err(ConfigError::invalid("waves.max_cubes", "must be at least 1"));
        }
        if self.enemies_per_wave == 0 {
            return Err(ConfigError::invalid("waves.enemies_per_wave", "must be at least 1"));
        }
        Ok(())
    }
}

/// Spawn point search around placed towers.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnSpec {
    /// Randomised passes; each pass picks a random tower and tries every radius.
    pub search_attempts: u32,
    pub radii: Vec<f32>,
    pub min_radius: f32,
    pub height_offset: f32,
    /// Snap distance for randomised and height-probe candidates.
    pub sample_radius: f32,
    /// Snap distance for the fixed-offset candidates.
    pub fixed_sample_radius: f32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolSizes {
    pub towers: usize,
    pub enemies: usize,
    pub projectiles: usize,
    pub markers: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ArtdConfig {
    pub tick_hz: u32,
    pub waves: WaveSpec,
    pub tower: TowerSpec,
    pub enemy: EnemySpec,
    pub spawn: SpawnSpec,
    pub pools: PoolSizes,
    pub nav_rebuild_interval: Micros,
    /// How long a hit-test result is reused for repeated taps at one spot.
    pub raycast_cache_duration: Micros,
    /// Tracked surfaces whose extents exceed this length are ignored.
    pub max_surface_extent: Option<f32>,
}

impl ArtdConfig {
    pub fn duration_to_ticks(&self, d: Micros) -> u64 {
        d.to_ticks(self.tick_hz)
    }

    /// Seconds per tick.
    pub fn dt(&self) -> f32 {
        if self.tick_hz == 0 {
            return 0.0;
        }
        1.0 / self.tick_hz as f32
    }

    /// Checks every section, returning the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_hz == 0 {
            return Err(ConfigError::invalid("tick_hz", "must be at least 1"));
        }
        self.waves.validate()?;
        self.tower.validate()?;
        if let Some(projectile) = &self.tower.projectile {
            projectile.validate()?;
        }
        self.enemy.validate()?;
        if self.spawn.radii.is_empty() {
            return Err(ConfigError::invalid("spawn.radii", "must not be empty"));
        }
        Ok(())
    }

    /// Parses a TOML document on top of the defaults. Durations are in seconds.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig =
            toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let mut config = Self::default();
        raw.apply(&mut config)?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for ArtdConfig {
    fn default() -> Self {
        Self {
            tick_hz: 60,
            waves: WaveSpec {
                max_cubes: 5,
                enemies_per_wave: 5,
                spawn_interval: Micros::from_secs(2),
                time_between_waves: Micros::from_secs(30),
                settle_delay: Micros::from_millis(4500),
            },
            tower: TowerSpec {
                attack_radius: 5.0,
                damage: 10.0,
                attack_interval: Micros::from_secs(1),
                projectile: Some(ProjectileSpec {
                    speed: 10.0,
                    lifetime: Micros::from_secs(2),
                    radius: 0.1,
                    destroy_on_hit: true,
                }),
            },
            enemy: EnemySpec {
                max_health: 100.0,
                move_speed: 3.0,
                target_update_interval: Micros::from_secs(1),
                stopping_distance: 0.5,
                radius: 0.5,
                stuck_speed: 0.1,
                stuck_margin: 0.5,
                hit_flash: Micros::from_millis(100),
            },
            spawn: SpawnSpec {
                search_attempts: 20,
                radii: vec![1.0, 1.5, 2.0, 3.0, 0.5],
                min_radius: 0.5,
                height_offset: 0.5,
                sample_radius: 2.0,
                fixed_sample_radius: 1.0,
            },
            pools: PoolSizes {
                towers: 5,
                enemies: 5,
                projectiles: 10,
                markers: 2,
            },
            nav_rebuild_interval: Micros::from_secs(1),
            raycast_cache_duration: Micros::from_millis(100),
            max_surface_extent: Some(1.5),
        }
    }
}

// On-disk shape: every key optional, durations in seconds.

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    tick_hz: Option<u32>,
    nav_rebuild_interval: Option<f32>,
    raycast_cache_duration: Option<f32>,
    max_surface_extent: Option<f32>,
    waves: RawWaves,
    tower: RawTower,
    enemy: RawEnemy,
    spawn: RawSpawn,
    pools: RawPools,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawWaves {
    max_cubes: Option<u32>,
    enemies_per_wave: Option<u16>,
    spawn_interval: Option<f32>,
    time_between_waves: Option<f32>,
    settle_delay: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawTower {
    attack_radius: Option<f32>,
    damage: Option<f32>,
    attack_interval: Option<f32>,
    /// `"projectile"` or `"area"`.
    mode: Option<String>,
    projectile: RawProjectile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawProjectile {
    speed: Option<f32>,
    lifetime: Option<f32>,
    radius: Option<f32>,
    destroy_on_hit: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawEnemy {
    max_health: Option<f32>,
    move_speed: Option<f32>,
    target_update_interval: Option<f32>,
    stopping_distance: Option<f32>,
    radius: Option<f32>,
    stuck_speed: Option<f32>,
    stuck_margin: Option<f32>,
    hit_flash: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawSpawn {
    search_attempts: Option<u32>,
    radii: Option<Vec<f32>>,
    min_radius: Option<f32>,
    height_offset: Option<f32>,
    sample_radius: Option<f32>,
    fixed_sample_radius: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawPools {
    towers: Option<usize>,
    enemies: Option<usize>,
    projectiles: Option<usize>,
    markers: Option<usize>,
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn set_secs(slot: &mut Micros, value: Option<f32>) {
    if let Some(secs) = value {
        *slot = Micros::from_secs_f32(secs);
    }
}

impl RawConfig {
    fn apply(self, config: &mut ArtdConfig) -> Result<(), ConfigError> {
        set(&mut config.tick_hz, self.tick_hz);
        set_secs(&mut config.nav_rebuild_interval, self.nav_rebuild_interval);
        set_secs(&mut config.raycast_cache_duration, self.raycast_cache_duration);
        if let Some(extent) = self.max_surface_extent {
            config.max_surface_extent = (extent > 0.0).then_some(extent);
        }

        let waves = &mut config.waves;
        set(&mut waves.max_cubes, self.waves.max_cubes);
        set(&mut waves.enemies_per_wave, self.waves.enemies_per_wave);
        set_secs(&mut waves.spawn_interval, self.waves.spawn_interval);
        set_secs(&mut waves.time_between_waves, self.waves.time_between_waves);
        set_secs(&mut waves.settle_delay, self.waves.settle_delay);

        let tower = &mut config.tower;
        set(&mut tower.attack_radius, self.tower.attack_radius);
        set(&mut tower.damage, self.tower.damage);
        set_secs(&mut tower.attack_interval, self.tower.attack_interval);
        match self.tower.mode.as_deref() {
            Some("area") => tower.projectile = None,
            Some("projectile") => {
                if tower.projectile.is_none() {
                    tower.projectile = ArtdConfig::default().tower.projectile;
                }
            }
            Some(_) => {
                return Err(ConfigError::invalid(
                    "tower.mode",
                    "expected \"projectile\" or \"area\"",
                ));
            }
            None => {}
        }
        if let Some(projectile) = tower.projectile.as_mut() {
            let raw = self.tower.projectile;
            set(&mut projectile.speed, raw.speed);
            set_secs(&mut projectile.lifetime, raw.lifetime);
            set(&mut projectile.radius, raw.radius);
            set(&mut projectile.destroy_on_hit, raw.destroy_on_hit);
        }

        let enemy = &mut config.enemy;
        set(&mut enemy.max_health, self.enemy.max_health);
        set(&mut enemy.move_speed, self.enemy.move_speed);
        set_secs(
            &mut enemy.target_update_interval,
            self.enemy.target_update_interval,
        );
        set(&mut enemy.stopping_distance, self.enemy.stopping_distance);
        set(&mut enemy.radius, self.enemy.radius);
        set(&mut enemy.stuck_speed, self.enemy.stuck_speed);
        set(&mut enemy.stuck_margin, self.enemy.stuck_margin);
        set_secs(&mut enemy.hit_flash, self.enemy.hit_flash);

        let spawn = &mut config.spawn;
        set(&mut spawn.search_attempts, self.spawn.search_attempts);
        set(&mut spawn.radii, self.spawn.radii);
        set(&mut spawn.min_radius, self.spawn.min_radius);
        set(&mut spawn.height_offset, self.spawn.height_offset);
        set(&mut spawn.sample_radius, self.spawn.sample_radius);
        set(&mut spawn.fixed_sample_radius, self.spawn.fixed_sample_radius);

        let pools = &mut config.pools;
        set(&mut pools.towers, self.pools.towers);
        set(&mut pools.enemies, self.pools.enemies);
        set(&mut pools.projectiles, self.pools.projectiles);
        set(&mut pools.markers, self.pools.markers);
        Ok(())
    }
}
