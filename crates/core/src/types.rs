/// Simulation step counter. Tick 0 is the state before the first step.
pub type Tick = u64;

/// Identifies the device/user submitting input. A session normally has one.
pub type PlayerId = u8;

/// Monotonic per-host action sequence number, used for deterministic ordering.
pub type ActionId = u64;
