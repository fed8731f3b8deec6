use crate::modes::ArMode;
use crate::placement::PlacementRejection;
use crate::spawn::SpawnStrategy;
use crate::tracking::TrackableId;
use crate::world::{EnemyId, MarkerId, ProjectileId, TowerId};
use glam::Vec3;

#[derive(Clone, Debug, PartialEq)]
pub enum ArtdEvent {
    ModeChanged {
        from: ArMode,
        to: ArMode,
    },
    TowerPlaced {
        id: TowerId,
        position: Vec3,
        placed: u32,
    },
    PlacementRejected {
        reason: PlacementRejection,
    },
    GameStarted,
    WaveStarted {
        wave: u32,
    },
    /// Every spawn slot of the wave has been processed.
    WaveSpawned {
        wave: u32,
        spawned: u16,
    },
    EnemySpawned {
        id: EnemyId,
        position: Vec3,
        strategy: SpawnStrategy,
    },
    SpawnSkipped {
        wave: u32,
    },
    EnemyRetargeted {
        id: EnemyId,
        target: TowerId,
    },
    /// The enemy's target tower disappeared.
    TargetLost {
        id: EnemyId,
    },
    EnemyStuck {
        id: EnemyId,
    },
    EnemyDamaged {
        id: EnemyId,
        amount: f32,
        health: f32,
    },
    EnemyKilled {
        id: EnemyId,
    },
    ProjectileFired {
        id: ProjectileId,
        tower: TowerId,
        target: EnemyId,
    },
    ProjectileHit {
        id: ProjectileId,
        enemy: EnemyId,
    },
    ProjectileExpired {
        id: ProjectileId,
    },
    AreaAttack {
        tower: TowerId,
        hits: u32,
    },
    MarkerSpawned {
        id: MarkerId,
        trackable: TrackableId,
    },
    MarkerReleased {
        id: MarkerId,
        trackable: TrackableId,
    },
    WavesStopped,
    SessionReset,
}
