use crate::envelope::ActionEnvelope;
use crate::types::{PlayerId, Tick};

/// Why a simulation stopped producing ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerminalOutcome {
    /// The wave loop was halted and the field has been cleared.
    Stopped,
}

/// A fixed-rate, single-threaded simulation driven one tick at a time.
///
/// Everything a game does happens inside `step`; waits are expressed as
/// deadline ticks rather than suspensions.
pub trait Game: Sized {
    type Config: Clone + Send + Sync + 'static;
    type Action: Clone + Send + Sync + 'static;
    type Observation: Clone + Send + Sync + 'static;
    type Event: Clone + Send + Sync + 'static;

    fn new(config: Self::Config, seed: u64) -> Self;

    fn step(
        &mut self,
        tick: Tick,
        actions: &[ActionEnvelope<Self::Action>],
        out_events: &mut Vec<Self::Event>,
    );

    fn observe(&self, tick: Tick, player: PlayerId) -> Self::Observation;

    fn is_terminal(&self) -> Option<TerminalOutcome>;
}
