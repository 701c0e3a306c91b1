//! Error types for the encounter engine.

use std::fmt;

use serde::{Deserialize, Serialize};
use sk_mechanics::MechError;

use crate::encounter::EncounterStatus;
use crate::id::{EffectId, EncounterId, ParticipantId};

/// Alias for `Result<T, EncounterError>`.
pub type EncounterResult<T> = Result<T, EncounterError>;

/// Errors returned by encounter commands.
///
/// Every error leaves the encounter exactly as it was before the command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncounterError {
    /// The encounter does not exist.
    #[error("encounter not found: {0}")]
    EncounterNotFound(EncounterId),

    /// The participant does not exist in this encounter.
    #[error("participant not found: {0}")]
    ParticipantNotFound(ParticipantId),

    /// The status effect does not exist in this encounter.
    #[error("effect not found: {0}")]
    EffectNotFound(EffectId),

    /// The caller does not control this encounter.
    #[error("{user} does not control this encounter")]
    Forbidden {
        /// Identity of the rejected caller.
        user: String,
    },

    /// A parameter was out of range or missing.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The command is not legal in the encounter's current status.
    #[error("cannot {command} while encounter is {status}")]
    InvalidState {
        /// The rejected command.
        command: &'static str,
        /// The status the encounter was in.
        status: EncounterStatus,
    },

    /// There is nobody left in the initiative order.
    #[error("no active participants")]
    NoActiveParticipants,

    /// An encounter lock was poisoned by a panicking writer.
    #[error("encounter store lock was poisoned")]
    LockPoisoned,
}

impl EncounterError {
    /// The broad category of this error, for mapping onto a transport.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EncounterNotFound(_) | Self::ParticipantNotFound(_) | Self::EffectNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::InvalidState { .. } => ErrorKind::InvalidState,
            Self::NoActiveParticipants => ErrorKind::NoActiveParticipants,
            Self::LockPoisoned => ErrorKind::Internal,
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

impl From<MechError> for EncounterError {
    fn from(err: MechError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}

/// Error categories exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// An encounter, participant, or effect is absent.
    NotFound,
    /// The caller is not the encounter controller.
    Forbidden,
    /// Out-of-range or missing input.
    InvalidArgument,
    /// Command not legal for the current status.
    InvalidState,
    /// Turn advancement with an empty initiative order.
    NoActiveParticipants,
    /// The engine itself failed.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotFound => "not_found",
            Self::Forbidden => "forbidden",
            Self::InvalidArgument => "invalid_argument",
            Self::InvalidState => "invalid_state",
            Self::NoActiveParticipants => "no_active_participants",
            Self::Internal => "internal",
        };
        f.write_str(s)
    }
}
