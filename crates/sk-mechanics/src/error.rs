//! Error types for the dice mechanics.

/// Errors that can occur when building dice pools or dice sources.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MechError {
    /// A pool size outside the supported range was requested.
    #[error("pool size {0} is outside 1..=50")]
    PoolSize(u32),

    /// A scripted die face outside 1..=6 was supplied.
    #[error("invalid die face: {0}")]
    InvalidFace(u32),

    /// A scripted dice source was created without any faces.
    #[error("scripted dice need at least one face")]
    EmptyScript,
}

/// Convenience result type for mechanics operations.
pub type MechResult<T> = Result<T, MechError>;
