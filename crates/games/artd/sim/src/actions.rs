use crate::modes::ArMode;

#[derive(Clone, Debug, PartialEq)]
pub enum ArtdAction {
    /// Menu selection; switches which AR feature owns input.
    SelectMode { mode: ArMode },
    /// Touch began at a screen position, in pixels.
    Tap { x: f32, y: f32 },
    /// Halts the wave loop at its next check.
    StopWaves,
    /// Ends the session: every entity goes back to its pool.
    ResetSession,
}
