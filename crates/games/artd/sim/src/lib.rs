//! Tick-driven simulation of an AR tower defense session: cubes placed on
//! tracked surfaces shoot at waves of agents that walk toward them.

pub mod actions;
pub mod config;
pub mod enemy;
pub mod error;
pub mod events;
pub mod feedback;
pub mod game;
pub mod geometry;
pub mod image_tracking;
pub mod modes;
pub mod navigation;
pub mod observe;
pub mod placement;
pub mod pool;
pub mod projectile;
pub mod scene;
pub mod session;
pub mod spawn;
pub mod tower;
pub mod tracking;
pub mod waves;
pub mod world;

pub use actions::ArtdAction;
pub use config::ArtdConfig;
pub use error::{ConfigError, PoolError};
pub use events::ArtdEvent;
pub use feedback::{Feedback, FeedbackLog, Severity};
pub use game::{ArtdGame, ArtdSetup, HeadlessSession};
pub use modes::ArMode;
pub use navigation::{Navigation, SurfaceNavigation};
pub use placement::{PlacementOutcome, PlacementRejection};
pub use scene::Scene;
pub use session::Session;
pub use tracking::{ScriptedTracking, Tracking};
pub use waves::{WaveDirector, WavePhase};
pub use world::{EnemyId, MarkerId, ProjectileId, TowerId, World};
