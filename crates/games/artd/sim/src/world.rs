use crate::config::{
    ArtdConfig, ProjectileSpec, ENEMY_POOL_TAG, MARKER_POOL_TAG, PROJECTILE_POOL_TAG,
    TOWER_POOL_TAG,
};
use crate::pool::ObjectPool;
use crate::tracking::TrackableId;
use glam::Vec3;
use sim_core::Tick;
use slotmap::new_key_type;

new_key_type! { pub struct TowerId; }
new_key_type! { pub struct EnemyId; }
new_key_type! { pub struct ProjectileId; }
new_key_type! { pub struct MarkerId; }

#[derive(Clone, Debug)]
pub struct Tower {
    pub attack_radius: f32,
    pub damage: f32,
    pub attack_interval_ticks: u64,
    /// `None` means area attacks.
    pub projectile: Option<ProjectileSpec>,
    pub next_attack_tick: Tick,
    pub placed_tick: Tick,
    /// Surface the cube was placed on.
    pub surface: Option<TrackableId>,
}

impl Tower {
    pub fn attack_mode(&self) -> &'static str {
        if self.projectile.is_some() {
            "projectile"
        } else {
            "area"
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyState {
    Spawned,
    /// No valid target.
    Seeking,
    /// Has a target and a path request.
    Moving,
    /// Stalled past the grace window; a repath has been forced.
    Stuck,
    Dead,
}

impl EnemyState {
    pub fn as_str(self) -> &'static str {
        match self {
            EnemyState::Spawned => "spawned",
            EnemyState::Seeking => "seeking",
            EnemyState::Moving => "moving",
            EnemyState::Stuck => "stuck",
            EnemyState::Dead => "dead",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Enemy {
    /// May go negative between the killing hit and removal.
    pub health: f32,
    pub max_health: f32,
    pub speed: f32,
    pub stopping_distance: f32,
    pub radius: f32,
    pub state: EnemyState,
    /// Non-owning; validated against the tower registry before every use.
    pub target: Option<TowerId>,
    pub next_target_tick: Tick,
    /// Last observed velocity from the navigation provider.
    pub velocity: Vec3,
    pub stalled_since: Option<Tick>,
    pub flash_until: Tick,
    pub hit_flash_ticks: u64,
    pub wave: u32,
}

impl Enemy {
    pub fn is_dead(&self) -> bool {
        self.state == EnemyState::Dead
    }

    pub fn is_flashing(&self, tick: Tick) -> bool {
        tick < self.flash_until
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectilePhase {
    /// Fresh out of the pool.
    Idle,
    InFlight,
    HitTarget,
    LifetimeExpired,
}

#[derive(Clone, Debug)]
pub struct Projectile {
    pub phase: ProjectilePhase,
    pub direction: Vec3,
    pub speed: f32,
    pub remaining_ticks: u64,
    pub damage: f32,
    pub radius: f32,
    pub destroy_on_hit: bool,
    pub source: Option<TowerId>,
    /// Enemies already struck; a piercing projectile hits each one once.
    pub hits: Vec<EnemyId>,
}

/// Instance spawned on a tracked image.
#[derive(Clone, Debug, Default)]
pub struct Marker {
    pub trackable: Option<TrackableId>,
    pub image: String,
}

/// Every live entity, plus the pools they come from.
///
/// Towers and enemies are additionally listed in insertion-ordered registries;
/// that order is the enumeration order for targeting and tie-breaks.
#[derive(Clone, Debug)]
pub struct World {
    pub towers: ObjectPool<TowerId, Tower>,
    pub enemies: ObjectPool<EnemyId, Enemy>,
    pub projectiles: ObjectPool<ProjectileId, Projectile>,
    pub markers: ObjectPool<MarkerId, Marker>,
    tower_registry: Vec<TowerId>,
    enemy_registry: Vec<EnemyId>,
}

impl World {
    pub fn new(config: &ArtdConfig) -> Self {
        let mut towers = ObjectPool::new();
        towers.configure(TOWER_POOL_TAG, tower_template(config), config.pools.towers);

        let mut enemies = ObjectPool::new();
        enemies.configure(ENEMY_POOL_TAG, enemy_template(config), config.pools.enemies);

        let mut projectiles = ObjectPool::new();
        projectiles.configure(
            PROJECTILE_POOL_TAG,
            projectile_template(config),
            config.pools.projectiles,
        );

        let mut markers = ObjectPool::new();
        markers.configure(MARKER_POOL_TAG, Marker::default(), config.pools.markers);

        Self {
            towers,
            enemies,
            projectiles,
            markers,
            tower_registry: Vec::new(),
            enemy_registry: Vec::new(),
        }
    }

    pub fn register_tower(&mut self, id: TowerId) {
        if !self.tower_registry.contains(&id) {
            self.tower_registry.push(id);
        }
    }

    /// Towers in placement order.
    pub fn tower_ids(&self) -> &[TowerId] {
        &self.tower_registry
    }

    pub fn is_live_tower(&self, id: TowerId) -> bool {
        self.tower_registry.contains(&id) && self.towers.is_active(id)
    }

    pub fn tower_position(&self, id: TowerId) -> Option<Vec3> {
        if !self.is_live_tower(id) {
            return None;
        }
        self.towers.slot(id).map(|s| s.pose.position)
    }

    /// Live towers with their positions, in placement order.
    pub fn live_towers(&self) -> Vec<(TowerId, Vec3)> {
        self.tower_registry
            .iter()
            .filter_map(|&id| self.towers.slot(id).map(|s| (id, s.pose.position)))
            .collect()
    }

    pub fn first_tower_position(&self) -> Option<Vec3> {
        self.live_towers().first().map(|&(_, p)| p)
    }

    pub fn register_enemy(&mut self, id: EnemyId) {
        if !self.enemy_registry.contains(&id) {
            self.enemy_registry.push(id);
        }
    }

    /// Enemies in spawn order.
    pub fn enemy_ids(&self) -> &[EnemyId] {
        &self.enemy_registry
    }

    pub fn enemy_count(&self) -> usize {
        self.enemy_registry.len()
    }

    pub fn enemy_position(&self, id: EnemyId) -> Option<Vec3> {
        self.enemies.slot(id).map(|s| s.pose.position)
    }

    /// Drops an enemy from the registry and returns it to its pool.
    /// Returns false if it was already gone.
    pub fn remove_enemy(&mut self, id: EnemyId) -> bool {
        let Some(index) = self.enemy_registry.iter().position(|&e| e == id) else {
            return false;
        };
        self.enemy_registry.remove(index);
        self.enemies.release(ENEMY_POOL_TAG, id).is_ok()
    }

    /// Releases every entity and clears the registries.
    pub fn reset(&mut self) {
        self.towers.release_all(TOWER_POOL_TAG);
        self.enemies.release_all(ENEMY_POOL_TAG);
        self.projectiles.release_all(PROJECTILE_POOL_TAG);
        self.markers.release_all(MARKER_POOL_TAG);
        self.tower_registry.clear();
        self.enemy_registry.clear();
    }
}

fn tower_template(config: &ArtdConfig) -> Tower {
    let spec = &config.tower;
    Tower {
        attack_radius: spec.attack_radius,
        damage: spec.damage,
        attack_interval_ticks: config.duration_to_ticks(spec.attack_interval).max(1),
        projectile: spec.projectile.clone(),
        next_attack_tick: 0,
        placed_tick: 0,
        surface: None,
    }
}

fn enemy_template(config: &ArtdConfig) -> Enemy {
    let spec = &config.enemy;
    Enemy {
        health: spec.max_health,
        max_health: spec.max_health,
        speed: spec.move_speed,
        stopping_distance: spec.stopping_distance,
        radius: spec.radius,
        state: EnemyState::Spawned,
        target: None,
        next_target_tick: 0,
        velocity: Vec3::ZERO,
        stalled_since: None,
        flash_until: 0,
        hit_flash_ticks: config.duration_to_ticks(spec.hit_flash),
        wave: 0,
    }
}

fn projectile_template(config: &ArtdConfig) -> Projectile {
    let spec = config.tower.projectile.clone().unwrap_or(ProjectileSpec {
        speed: 0.0,
        lifetime: sim_core::Micros::ZERO,
        radius: 0.0,
        destroy_on_hit: true,
    });
    Projectile {
        phase: ProjectilePhase::Idle,
        direction: Vec3::ZERO,
        speed: spec.speed,
        remaining_ticks: config.duration_to_ticks(spec.lifetime),
        damage: config.tower.damage,
        radius: spec.radius,
        destroy_on_hit: spec.destroy_on_hit,
        source: None,
        hits: Vec::new(),
    }
}
