//! The command surface: one call per state transition.
//!
//! Every mutating command takes the caller's identity and controller flag,
//! runs atomically against a single encounter, and either applies fully
//! (state plus log entries) or fails leaving the encounter untouched.
//! Missing encounters are reported before authorization is checked.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use sk_mechanics::{DieSource, RngDice};
use tracing::{info, warn};

use crate::attack::{AttackRequest, AttackResult};
use crate::config::EngineConfig;
use crate::effects::NewEffect;
use crate::encounter::{DamageReport, Encounter, HealReport};
use crate::error::{EncounterError, EncounterResult};
use crate::id::{EffectId, EncounterId, ParticipantId, SessionId};
use crate::log::LogEntry;
use crate::participant::{DamageKind, NewParticipant, Participant};
use crate::provider::CharacterProvider;
use crate::session::{InMemorySessions, SessionLedger, SessionRecord};
use crate::store::EncounterStore;
use crate::turn::{EndSummary, TurnAdvance};
use crate::view::EncounterView;

/// Who is issuing a command. The controller flag comes from the
/// surrounding application and is trusted as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    /// Caller identity, used in diagnostics.
    pub user: String,
    /// Whether the caller controls the encounter.
    pub is_controller: bool,
}

impl Caller {
    /// A caller allowed to mutate the encounter.
    pub fn controller(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            is_controller: true,
        }
    }

    /// A caller who may only read.
    pub fn observer(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            is_controller: false,
        }
    }

    fn authorize(&self) -> EncounterResult<()> {
        if self.is_controller {
            Ok(())
        } else {
            Err(EncounterError::Forbidden {
                user: self.user.clone(),
            })
        }
    }
}

/// Runs encounter commands.
pub struct Engine {
    store: EncounterStore,
    sessions: Arc<dyn SessionLedger>,
    characters: Option<Arc<dyn CharacterProvider>>,
    // Always locked after an encounter, never before.
    dice: Mutex<Box<dyn DieSource + Send>>,
    config: EngineConfig,
}

impl Engine {
    /// An engine rolling with an OS-seeded RNG and an in-memory session ledger.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_dice(config, RngDice::new(StdRng::from_os_rng()))
    }

    /// An engine rolling with the given die source.
    pub fn with_dice(config: EngineConfig, dice: impl DieSource + Send + 'static) -> Self {
        Self {
            store: EncounterStore::new(),
            sessions: Arc::new(InMemorySessions::new()),
            characters: None,
            dice: Mutex::new(Box::new(dice)),
            config,
        }
    }

    /// Use a different session ledger.
    pub fn with_sessions(mut self, sessions: Arc<dyn SessionLedger>) -> Self {
        self.sessions = sessions;
        self
    }

    /// Resolve linked characters' names through a provider.
    pub fn with_characters(mut self, characters: Arc<dyn CharacterProvider>) -> Self {
        self.characters = Some(characters);
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Create an encounter in `setup` for a session.
    pub fn create_encounter(
        &self,
        caller: &Caller,
        session: SessionId,
        name: impl Into<String>,
    ) -> EncounterResult<EncounterId> {
        caller.authorize()?;
        let name = name.into();
        if name.trim().is_empty() {
            return Err(EncounterError::invalid("encounter name is required"));
        }
        let id = self.store.insert(Encounter::new(session, name))?;
        info!(encounter = %id, session = %session, "encounter created");
        Ok(id)
    }

    /// Delete an encounter with everything it owns.
    pub fn delete_encounter(&self, caller: &Caller, id: EncounterId) -> EncounterResult<()> {
        let result = self
            .store
            .read(id, |_| ())
            .and_then(|_| caller.authorize())
            .and_then(|_| self.store.remove(id));
        match result {
            Ok(_) => {
                info!(encounter = %id, "encounter deleted");
                Ok(())
            }
            Err(err) => Err(self.rejected("delete encounter", caller, id, err)),
        }
    }

    /// Add a participant. A blank name is filled from the linked character.
    pub fn add_participant(
        &self,
        caller: &Caller,
        id: EncounterId,
        new: NewParticipant,
    ) -> EncounterResult<ParticipantId> {
        let provided = match (&self.characters, new.character) {
            (Some(provider), Some(character)) => provider.character_name(character),
            _ => None,
        };
        self.command("add participant", caller, id, |enc| {
            enc.add_participant(new, provided)
        })
    }

    /// Remove a participant and its effects.
    pub fn remove_participant(
        &self,
        caller: &Caller,
        id: EncounterId,
        participant: ParticipantId,
    ) -> EncounterResult<Participant> {
        self.command("remove participant", caller, id, |enc| {
            enc.remove_participant(participant)
        })
    }

    /// Start combat.
    pub fn start(&self, caller: &Caller, id: EncounterId) -> EncounterResult<EncounterView> {
        let tail = self.config.log_tail;
        self.command("start", caller, id, |enc| {
            enc.start()?;
            Ok(EncounterView::of(enc, tail))
        })
    }

    /// Pause combat.
    pub fn pause(&self, caller: &Caller, id: EncounterId) -> EncounterResult<EncounterView> {
        let tail = self.config.log_tail;
        self.command("pause", caller, id, |enc| {
            enc.pause()?;
            Ok(EncounterView::of(enc, tail))
        })
    }

    /// Resume paused combat.
    pub fn resume(&self, caller: &Caller, id: EncounterId) -> EncounterResult<EncounterView> {
        let tail = self.config.log_tail;
        self.command("resume", caller, id, |enc| {
            enc.resume()?;
            Ok(EncounterView::of(enc, tail))
        })
    }

    /// Pass the turn on.
    pub fn advance_turn(&self, caller: &Caller, id: EncounterId) -> EncounterResult<TurnAdvance> {
        self.command("advance turn", caller, id, |enc| enc.advance_turn())
    }

    /// Apply damage directly.
    pub fn apply_damage(
        &self,
        caller: &Caller,
        id: EncounterId,
        target: ParticipantId,
        amount: i32,
        kind: DamageKind,
    ) -> EncounterResult<DamageReport> {
        self.command("apply damage", caller, id, |enc| {
            enc.apply_damage(target, amount, kind)
        })
    }

    /// Heal damage directly.
    pub fn heal(
        &self,
        caller: &Caller,
        id: EncounterId,
        target: ParticipantId,
        amount: i32,
        kind: DamageKind,
    ) -> EncounterResult<HealReport> {
        self.command("heal", caller, id, |enc| enc.heal(target, amount, kind))
    }

    /// Resolve an attack with the engine's dice.
    pub fn resolve_attack(
        &self,
        caller: &Caller,
        id: EncounterId,
        request: &AttackRequest,
    ) -> EncounterResult<AttackResult> {
        self.command("resolve attack", caller, id, |enc| {
            let mut dice = self.dice.lock().map_err(|_| EncounterError::LockPoisoned)?;
            enc.resolve_attack(request, &mut **dice, &self.config)
        })
    }

    /// Attach a status effect.
    pub fn add_effect(
        &self,
        caller: &Caller,
        id: EncounterId,
        participant: ParticipantId,
        effect: NewEffect,
    ) -> EncounterResult<EffectId> {
        self.command("add effect", caller, id, |enc| {
            enc.apply_effect(participant, effect)
        })
    }

    /// End a status effect early.
    pub fn remove_effect(
        &self,
        caller: &Caller,
        id: EncounterId,
        effect: EffectId,
    ) -> EncounterResult<()> {
        self.command("remove effect", caller, id, |enc| enc.remove_effect(effect))
    }

    /// End combat and credit the owning session.
    pub fn end(&self, caller: &Caller, id: EncounterId) -> EncounterResult<EndSummary> {
        self.command("end", caller, id, |enc| {
            let summary = enc.end()?;
            self.sessions
                .record_encounter(summary.session, summary.enemies_defeated)?;
            Ok(summary)
        })
    }

    /// Current state of an encounter. Readable by anyone.
    pub fn state(&self, id: EncounterId) -> EncounterResult<EncounterView> {
        self.store
            .read(id, |enc| EncounterView::of(enc, self.config.log_tail))
    }

    /// The full event log in write order.
    pub fn log(&self, id: EncounterId) -> EncounterResult<Vec<LogEntry>> {
        self.store.read(id, |enc| enc.log().entries().to_vec())
    }

    /// The event log grouped by round.
    pub fn log_by_round(&self, id: EncounterId) -> EncounterResult<BTreeMap<u32, Vec<LogEntry>>> {
        self.store.read(id, |enc| {
            enc.log()
                .by_round()
                .into_iter()
                .map(|(round, entries)| (round, entries.into_iter().cloned().collect()))
                .collect()
        })
    }

    /// The event log as markdown.
    pub fn export_markdown(&self, id: EncounterId) -> EncounterResult<String> {
        self.store
            .read(id, |enc| enc.log().export_markdown(&enc.name, enc.roster()))
    }

    /// The event log as plain text.
    pub fn export_text(&self, id: EncounterId) -> EncounterResult<String> {
        self.store
            .read(id, |enc| enc.log().export_text(&enc.name, enc.roster()))
    }

    /// Totals recorded for a session.
    pub fn session_totals(&self, session: SessionId) -> EncounterResult<SessionRecord> {
        self.sessions.totals(session)
    }

    /// Ids of all encounters.
    pub fn encounters(&self) -> EncounterResult<Vec<EncounterId>> {
        self.store.ids()
    }

    fn command<T>(
        &self,
        name: &'static str,
        caller: &Caller,
        id: EncounterId,
        f: impl FnOnce(&mut Encounter) -> EncounterResult<T>,
    ) -> EncounterResult<T> {
        self.store
            .transact(id, |enc| {
                caller.authorize()?;
                f(enc)
            })
            .map_err(|err| self.rejected(name, caller, id, err))
    }

    fn rejected(
        &self,
        command: &'static str,
        caller: &Caller,
        id: EncounterId,
        err: EncounterError,
    ) -> EncounterError {
        warn!(
            encounter = %id,
            command,
            user = %caller.user,
            kind = %err.kind(),
            error = %err,
            "command rejected"
        );
        err
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
