use crate::types::{ActionId, PlayerId, Tick};

/// An input queued for a specific tick.
///
/// The host sorts envelopes by `(player_id, action_id)` before handing them
/// to the game so the same input stream always replays identically.
#[derive(Clone, Debug)]
pub struct ActionEnvelope<A> {
    pub player_id: PlayerId,
    pub action_id: ActionId,
    pub intended_tick: Tick,
    pub payload: A,
}

impl<A> ActionEnvelope<A> {
    /// Wraps a payload from the primary (and usually only) player.
    pub fn local(action_id: ActionId, intended_tick: Tick, payload: A) -> Self {
        Self {
            player_id: 0,
            action_id,
            intended_tick,
            payload,
        }
    }
}
