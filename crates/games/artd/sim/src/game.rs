use crate::actions::ArtdAction;
use crate::config::ArtdConfig;
use crate::events::ArtdEvent;
use crate::feedback::FeedbackLog;
use crate::navigation::SurfaceNavigation;
use crate::scene::Scene;
use crate::session::Session;
use crate::tracking::ScriptedTracking;
use crate::waves::WavePhase;
use sim_core::{ActionEnvelope, Game, PlayerId, TerminalOutcome, Tick};

/// Everything needed to start a headless game.
#[derive(Clone, Debug, Default)]
pub struct ArtdSetup {
    pub config: ArtdConfig,
    pub scene: Scene,
}

/// A session driven by a scripted scene.
pub type HeadlessSession = Session<SurfaceNavigation, ScriptedTracking, FeedbackLog>;

pub struct ArtdGame {
    session: HeadlessSession,
}

impl ArtdGame {
    pub fn session(&self) -> &HeadlessSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut HeadlessSession {
        &mut self.session
    }
}

impl Game for ArtdGame {
    type Config = ArtdSetup;
    type Action = ArtdAction;
    type Observation = artd_types::ArtdObservation;
    type Event = ArtdEvent;

    fn new(setup: Self::Config, seed: u64) -> Self {
        let ArtdSetup { config, scene } = setup;
        let nav = SurfaceNavigation::new(scene.obstacles.clone());
        let tracking = ScriptedTracking::new(scene, config.max_surface_extent);
        let session = Session::new(config, nav, tracking, FeedbackLog::new(), seed);
        Self { session }
    }

    fn step(
        &mut self,
        tick: Tick,
        actions: &[ActionEnvelope<Self::Action>],
        out_events: &mut Vec<Self::Event>,
    ) {
        self.session
            .step(tick, actions.iter().map(|a| &a.payload), out_events);
    }

    fn observe(&self, tick: Tick, _player: PlayerId) -> Self::Observation {
        crate::observe::build_observation(&self.session, tick)
    }

    /// Over once waves were stopped and the last enemy is gone.
    fn is_terminal(&self) -> Option<TerminalOutcome> {
        let stopped = *self.session.director().phase() == WavePhase::Stopped;
        if stopped && self.session.world().enemy_count() == 0 {
            return Some(TerminalOutcome::Stopped);
        }
        None
    }
}
