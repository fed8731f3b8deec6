use thiserror::Error;

/// Problems with the game configuration.
///
/// Raised by the TOML loader and by the per-component checks each system runs
/// when a session is built; a component whose section fails disables itself.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(String),
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Misuse of an [`ObjectPool`](crate::pool::ObjectPool).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("no pool configured for tag `{0}`")]
    UnknownTag(String),
    #[error("instance is not active (released twice?)")]
    NotActive,
    #[error("instance belongs to pool `{0}`")]
    ForeignInstance(String),
    #[error("instance was never created by this pool")]
    UnknownInstance,
}
