//! Canonical serializable types for the AR tower defense game.
//!
//! This is the boundary between `sim_artd` (the gameplay simulation) and
//! whatever renders it: a HUD, a spectator, or the headless runner's JSON dump.

use serde::{Deserialize, Serialize};

/// World-space point in metres.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Which AR feature currently owns input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeInfo {
    #[default]
    Idle,
    Placement,
    Tracking,
}

/// Current wave loop status.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WaveStatus {
    /// Waiting for the placement threshold to be reached.
    AwaitingPlacement,
    /// A wave was announced; spawning starts once the surface settles.
    Settling {
        /// Tick when the first enemy of the wave spawns.
        until_tick: u64,
    },
    /// Currently spawning enemies.
    Spawning {
        /// Number of spawn slots processed so far this wave.
        spawned: u16,
        /// Total enemies in this wave.
        wave_size: u16,
        /// Tick when the next enemy spawns.
        next_spawn_tick: u64,
    },
    /// Between waves.
    Resting {
        /// Tick when the next wave starts.
        until_tick: u64,
    },
    /// The loop was halted explicitly.
    Stopped,
}

impl Default for WaveStatus {
    fn default() -> Self {
        Self::AwaitingPlacement
    }
}

/// Information about a placed defense cube.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TowerInfo {
    pub id: String,
    pub position: Position,
    pub attack_radius: f32,
    pub damage: f32,
    /// `"projectile"` or `"area"`.
    pub attack_mode: String,
    pub next_attack_tick: u64,
}

/// Information about an enemy agent.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EnemyInfo {
    pub id: String,
    pub position: Position,
    pub health: f32,
    pub max_health: f32,
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// True while the hit flash is showing.
    pub flashing: bool,
}

/// Information about a projectile in flight.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProjectileInfo {
    pub position: Position,
    pub direction: Position,
    pub remaining_ticks: u64,
}

/// A pooled instance following a tracked image.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MarkerInfo {
    pub trackable: u64,
    pub position: Position,
}

/// Occupancy of one pool tag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolInfo {
    pub tag: String,
    pub active: usize,
    pub idle: usize,
}

/// What the heads-up display should show.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HudInfo {
    pub visible: bool,
    pub wave_text: String,
    pub cube_text: String,
}

/// Full game state observation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ArtdObservation {
    pub tick: u64,
    pub ticks_per_second: u32,

    pub mode: ModeInfo,
    pub game_started: bool,
    pub current_wave: u32,
    pub wave_status: WaveStatus,

    pub placed_cubes: u32,
    pub max_cubes: u32,
    pub enemies_killed: u32,

    pub hud: HudInfo,

    pub towers: Vec<TowerInfo>,
    pub enemies: Vec<EnemyInfo>,
    pub projectiles: Vec<ProjectileInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub markers: Vec<MarkerInfo>,
    pub pools: Vec<PoolInfo>,
}
