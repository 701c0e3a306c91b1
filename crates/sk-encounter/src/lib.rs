//! Turn-based combat encounters for Skirmish.
//!
//! An [`Encounter`] owns a roster of participants, their timed status
//! effects, and an append-only event log. It moves through
//! `setup -> active <-> paused -> completed`, sequences turns by initiative,
//! and resolves attacks as opposed dice-pool tests from [`sk_mechanics`].
//!
//! The [`Engine`] is the command surface: it keeps encounters in an
//! [`EncounterStore`], serializes commands per encounter, checks the
//! caller's controller flag, and makes every command atomic.

pub mod attack;
pub mod config;
pub mod effects;
pub mod encounter;
pub mod engine;
pub mod error;
pub mod id;
pub mod log;
pub mod participant;
pub mod provider;
pub mod roster;
pub mod session;
pub mod store;
pub mod turn;
pub mod view;

pub use attack::{AttackRequest, AttackResult, BaseDamage};
pub use config::EngineConfig;
pub use effects::{EffectType, NewEffect, StatusEffect};
pub use encounter::{DamageReport, Encounter, EncounterStatus, HealReport};
pub use engine::{Caller, Engine};
pub use error::{EncounterError, EncounterResult, ErrorKind};
pub use id::{CharacterId, EffectId, EncounterId, ParticipantId, SessionId};
pub use log::{EventLog, EventType, LogEntry};
pub use participant::{Condition, DamageKind, NewParticipant, Participant, Team};
pub use provider::{CharacterProvider, StaticCharacters};
pub use roster::Roster;
pub use session::{InMemorySessions, SessionLedger, SessionRecord};
pub use store::EncounterStore;
pub use turn::{EndSummary, TurnAdvance};
pub use view::{EffectView, EncounterView, ParticipantView};
