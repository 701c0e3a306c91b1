//! The encounter aggregate: lifecycle status, roster, and event log.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::error::{EncounterError, EncounterResult};
use crate::id::{EncounterId, ParticipantId, SessionId};
use crate::log::{EventLog, EventType, LogEntry, NewLogEntry};
use crate::participant::{Condition, DamageKind, NewParticipant, Participant};
use crate::roster::Roster;

/// Lifecycle of an encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncounterStatus {
    /// Participants are being gathered.
    Setup,
    /// Combat is running.
    Active,
    /// Combat is on hold; turns cannot advance.
    Paused,
    /// Combat is over. Terminal.
    Completed,
}

impl fmt::Display for EncounterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Setup => write!(f, "setup"),
            Self::Active => write!(f, "active"),
            Self::Paused => write!(f, "paused"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// Statuses in which participants and their damage may still change.
pub(crate) const OPEN: &[EncounterStatus] = &[
    EncounterStatus::Setup,
    EncounterStatus::Active,
    EncounterStatus::Paused,
];

/// What a damage command did to its target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageReport {
    /// Who was hit.
    pub target: ParticipantId,
    /// Damage added.
    pub applied: u32,
    /// Track the damage went to.
    pub kind: DamageKind,
    /// HP left afterwards.
    pub current_hp: u32,
    /// Health band afterwards.
    pub condition: Condition,
    /// This damage took the target down.
    pub defeated: bool,
}

/// What a heal command did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealReport {
    /// Who was healed.
    pub target: ParticipantId,
    /// Damage removed from the track.
    pub healed: u32,
    /// Track that was healed.
    pub kind: DamageKind,
    /// HP left afterwards.
    pub current_hp: u32,
    /// Health band afterwards.
    pub condition: Condition,
}

/// One combat encounter. Owns its participants (and through them their
/// status effects) and its event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Encounter {
    /// Unique id.
    pub id: EncounterId,
    /// Session the encounter belongs to.
    pub session: SessionId,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    status: EncounterStatus,
    current_round: u32,
    current_turn_index: usize,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    pub(crate) roster: Roster,
    pub(crate) log: EventLog,
}

/// Encounter state saved before a command so a failure can be undone.
///
/// The log is append-only, so only its length is kept.
pub(crate) struct Checkpoint {
    state: Encounter,
    log_len: usize,
}

impl Encounter {
    /// Create an encounter in `setup`.
    pub fn new(session: SessionId, name: impl Into<String>) -> Self {
        Self {
            id: EncounterId::new(),
            session,
            name: name.into(),
            description: String::new(),
            status: EncounterStatus::Setup,
            current_round: 1,
            current_turn_index: 0,
            started_at: None,
            ended_at: None,
            roster: Roster::new(),
            log: EventLog::new(),
        }
    }

    /// Lifecycle status.
    pub fn status(&self) -> EncounterStatus {
        self.status
    }

    /// Round in progress, starting at 1.
    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    /// Index into the live initiative order, always within bounds when
    /// anyone is active.
    pub fn current_turn_index(&self) -> usize {
        self.current_turn_index
    }

    /// When combat started.
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// When combat ended.
    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// The participants.
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// The event log.
    pub fn log(&self) -> &EventLog {
        &self.log
    }

    /// Whose turn it is, derived from the live initiative order.
    pub fn current_participant(&self) -> Option<&Participant> {
        let order = self.roster.active_order();
        let idx = self.current_turn_index.min(order.len().saturating_sub(1));
        order.get(idx).copied()
    }

    pub(crate) fn require_status(
        &self,
        command: &'static str,
        allowed: &[EncounterStatus],
    ) -> EncounterResult<()> {
        if allowed.contains(&self.status) {
            Ok(())
        } else {
            Err(EncounterError::InvalidState {
                command,
                status: self.status,
            })
        }
    }

    pub(crate) fn set_status(&mut self, status: EncounterStatus) {
        self.status = status;
    }

    pub(crate) fn begin(&mut self, at: DateTime<Utc>) {
        self.status = EncounterStatus::Active;
        self.current_round = 1;
        self.current_turn_index = 0;
        self.started_at.get_or_insert(at);
    }

    pub(crate) fn finish(&mut self, at: DateTime<Utc>) {
        self.status = EncounterStatus::Completed;
        self.ended_at.get_or_insert(at);
    }

    pub(crate) fn set_turn(&mut self, round: u32, index: usize) {
        self.current_round = round;
        self.current_turn_index = index;
    }

    /// Append a log entry stamped with the current round.
    pub(crate) fn checkpoint(&mut self) -> Checkpoint {
        let log = std::mem::take(&mut self.log);
        let state = self.clone();
        self.log = log;
        Checkpoint {
            state,
            log_len: self.log.len(),
        }
    }

    pub(crate) fn rollback(&mut self, checkpoint: Checkpoint) {
        let mut log = std::mem::take(&mut self.log);
        log.truncate(checkpoint.log_len);
        *self = checkpoint.state;
        self.log = log;
    }

    pub(crate) fn emit(&mut self, entry: NewLogEntry) -> &LogEntry {
        self.log.record(self.current_round, entry)
    }

    /// Add a participant. `provided_name` is the name of the linked
    /// character, used when the request leaves the name blank.
    pub fn add_participant(
        &mut self,
        new: NewParticipant,
        provided_name: Option<String>,
    ) -> EncounterResult<ParticipantId> {
        self.require_status("add a participant", OPEN)?;
        if new.max_hp < 1 {
            return Err(EncounterError::invalid("max_hp must be at least 1"));
        }
        let name = new
            .name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .or(provided_name)
            .ok_or_else(|| EncounterError::invalid("participant name is required"))?;

        let before = self.roster.active_ids();
        let id = self.roster.add(new, name.clone());
        let team = self.roster.require(id)?.team;
        self.emit(
            NewLogEntry::new(EventType::ParticipantAdded, format!("{name} joins the fight"))
                .target(id)
                .data(json!({ "team": team })),
        );
        self.retarget_turn(&before);
        info!(encounter = %self.id, participant = %name, "participant added");
        Ok(id)
    }

    /// Remove a participant and its effects.
    pub fn remove_participant(&mut self, id: ParticipantId) -> EncounterResult<Participant> {
        self.require_status("remove a participant", OPEN)?;
        let before = self.roster.active_ids();
        let removed = self
            .roster
            .remove(id)
            .ok_or(EncounterError::ParticipantNotFound(id))?;
        self.emit(
            NewLogEntry::new(
                EventType::ParticipantRemoved,
                format!("{} leaves the fight", removed.name),
            )
            .data(json!({ "participant_id": id, "name": removed.name })),
        );
        self.retarget_turn(&before);
        info!(encounter = %self.id, participant = %removed.name, "participant removed");
        Ok(removed)
    }

    /// Apply damage directly, outside an attack.
    pub fn apply_damage(
        &mut self,
        target: ParticipantId,
        amount: i32,
        kind: DamageKind,
    ) -> EncounterResult<DamageReport> {
        self.require_status("apply damage", OPEN)?;
        if amount < 0 {
            return Err(EncounterError::invalid("damage must not be negative"));
        }
        let name = self.roster.require(target)?.name.clone();
        let report = self.damage_participant(target, amount, kind)?;
        self.emit(
            NewLogEntry::new(
                EventType::Damage,
                format!("{name} takes {}{}", report.applied, kind.code()),
            )
            .target(target)
            .data(json!({
                "damage": report.applied,
                "damage_type": kind,
                "current_hp": report.current_hp,
            })),
        );
        if report.defeated {
            self.log_defeat(target, None);
        }
        Ok(report)
    }

    /// Heal a damage track directly. Defeated participants cannot be healed.
    pub fn heal(
        &mut self,
        target: ParticipantId,
        amount: i32,
        kind: DamageKind,
    ) -> EncounterResult<HealReport> {
        self.require_status("heal", OPEN)?;
        if amount < 0 {
            return Err(EncounterError::invalid("healing must not be negative"));
        }
        let p = self.roster.require_mut(target)?;
        if p.is_defeated {
            return Err(EncounterError::invalid(format!(
                "{} is defeated and cannot be healed",
                p.name
            )));
        }
        let healed = p.heal(amount.unsigned_abs(), kind);
        let report = HealReport {
            target,
            healed,
            kind,
            current_hp: p.current_hp(),
            condition: p.condition(),
        };
        let description = format!("{} recovers {healed}{}", p.name, kind.code());
        self.emit(
            NewLogEntry::new(EventType::Healing, description)
                .target(target)
                .data(json!({
                    "healed": healed,
                    "damage_type": kind,
                    "current_hp": report.current_hp,
                })),
        );
        Ok(report)
    }

    /// Add damage to a participant's track and keep the turn pointer on the
    /// right participant if this takes them out. Logs nothing.
    pub(crate) fn damage_participant(
        &mut self,
        target: ParticipantId,
        amount: i32,
        kind: DamageKind,
    ) -> EncounterResult<DamageReport> {
        let before = self.roster.active_ids();
        let p = self.roster.require_mut(target)?;
        let outcome = p.apply_damage(amount, kind);
        let report = DamageReport {
            target,
            applied: outcome.applied,
            kind,
            current_hp: p.current_hp(),
            condition: p.condition(),
            defeated: outcome.newly_defeated,
        };
        if outcome.newly_defeated {
            self.retarget_turn(&before);
        }
        Ok(report)
    }

    /// Log a `defeated` entry for a participant that just went down.
    pub(crate) fn log_defeat(&mut self, target: ParticipantId, by: Option<ParticipantId>) {
        let name = self.roster.name_of(Some(target)).to_string();
        let mut entry = NewLogEntry::new(EventType::Defeated, format!("{name} is defeated"))
            .target(target);
        if let Some(by) = by {
            entry = entry.actor(by);
        }
        self.emit(entry);
        info!(encounter = %self.id, participant = %name, "participant defeated");
    }

    /// Re-derive the turn index after the active order changed.
    ///
    /// `before` is the order prior to the change. While combat runs, the
    /// participant holding the turn keeps it; if they left, the turn passes
    /// to whoever followed them. The index is then clamped to the live order.
    ///
    /// When the last participant in order leaves on their own turn, the clamp
    /// points back at someone who already acted this round. No `turn_start`
    /// is logged for that; the next advance wraps into a new round.
    fn retarget_turn(&mut self, before: &[ParticipantId]) {
        let after = self.roster.active_ids();
        if matches!(
            self.status,
            EncounterStatus::Active | EncounterStatus::Paused
        ) {
            let idx = self.current_turn_index;
            self.current_turn_index = match before
                .get(idx)
                .and_then(|cur| after.iter().position(|p| p == cur))
            {
                Some(pos) => pos,
                None => before[..idx.min(before.len())]
                    .iter()
                    .filter(|p| after.contains(p))
                    .count(),
            };
        }
        self.current_turn_index = self.current_turn_index.min(after.len().saturating_sub(1));
    }
}
