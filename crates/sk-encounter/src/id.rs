//! Identifiers for encounters, participants, effects, and the external
//! records the engine refers to.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", &self.0.to_string()[..8])
            }
        }
    };
}

uuid_id!(
    /// Unique identifier of an encounter.
    EncounterId
);
uuid_id!(
    /// Unique identifier of a participant within an encounter.
    ParticipantId
);
uuid_id!(
    /// Unique identifier of a status effect.
    EffectId
);
uuid_id!(
    /// Identifier of the game session that owns an encounter.
    SessionId
);
uuid_id!(
    /// Identifier of a persistent character record outside the engine.
    CharacterId
);
