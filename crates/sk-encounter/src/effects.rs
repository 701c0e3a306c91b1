//! Timed status effects and their round-based countdown.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::encounter::{Encounter, OPEN};
use crate::error::{EncounterError, EncounterResult};
use crate::id::{EffectId, ParticipantId};
use crate::log::{EventType, NewLogEntry};
use crate::participant::Participant;

/// Broad category of a status effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectType {
    /// Beneficial modifier.
    Buff,
    /// Harmful modifier.
    Debuff,
    /// Damage over time.
    Damage,
    /// Healing over time.
    Healing,
    /// A narrative condition such as prone or blinded.
    Condition,
}

impl fmt::Display for EffectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buff => write!(f, "buff"),
            Self::Debuff => write!(f, "debuff"),
            Self::Damage => write!(f, "damage"),
            Self::Healing => write!(f, "healing"),
            Self::Condition => write!(f, "condition"),
        }
    }
}

/// A timed modifier attached to one participant.
///
/// Once `rounds_remaining` reaches zero the effect is inactive for good.
/// Re-applying an effect with the same name creates a separate record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffect {
    /// Unique id.
    pub id: EffectId,
    /// Display name.
    pub name: String,
    /// Category.
    pub effect_type: EffectType,
    /// Free-form description.
    pub description: String,
    /// Original duration, at least 1.
    pub duration_rounds: u32,
    /// Rounds left before expiry.
    pub rounds_remaining: u32,
    /// Opaque modifiers for display layers, e.g. `{"agility": -2}`.
    pub modifiers: BTreeMap<String, i32>,
    /// Still in force.
    pub is_active: bool,
    /// Round in which the effect was applied.
    pub applied_round: u32,
}

impl StatusEffect {
    /// Count down one round. Returns true if the effect just expired.
    pub fn tick(&mut self) -> bool {
        if !self.is_active {
            return false;
        }
        self.rounds_remaining = self.rounds_remaining.saturating_sub(1);
        if self.rounds_remaining == 0 {
            self.is_active = false;
            true
        } else {
            false
        }
    }

    /// End the effect immediately.
    pub fn expire(&mut self) {
        self.rounds_remaining = 0;
        self.is_active = false;
    }
}

/// Parameters for applying a status effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEffect {
    /// Display name.
    pub name: String,
    /// Category.
    pub effect_type: EffectType,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Duration in rounds; must be at least 1.
    pub duration_rounds: u32,
    /// Opaque modifiers.
    #[serde(default)]
    pub modifiers: BTreeMap<String, i32>,
}

impl NewEffect {
    /// An effect with no description or modifiers.
    pub fn new(name: impl Into<String>, effect_type: EffectType, duration_rounds: u32) -> Self {
        Self {
            name: name.into(),
            effect_type,
            description: String::new(),
            duration_rounds,
            modifiers: BTreeMap::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add a modifier.
    pub fn with_modifier(mut self, key: impl Into<String>, delta: i32) -> Self {
        self.modifiers.insert(key.into(), delta);
        self
    }
}

impl Encounter {
    /// Attach a new effect to a participant and log `effect_applied`.
    pub fn apply_effect(
        &mut self,
        participant: ParticipantId,
        effect: NewEffect,
    ) -> EncounterResult<EffectId> {
        self.require_status("apply effect", OPEN)?;
        if effect.duration_rounds < 1 {
            return Err(EncounterError::invalid("effect duration must be at least 1 round"));
        }
        if effect.name.trim().is_empty() {
            return Err(EncounterError::invalid("effect name is required"));
        }
        let round = self.current_round();
        let target = self.roster.require_mut(participant)?;
        let record = StatusEffect {
            id: EffectId::new(),
            name: effect.name,
            effect_type: effect.effect_type,
            description: effect.description,
            duration_rounds: effect.duration_rounds,
            rounds_remaining: effect.duration_rounds,
            modifiers: effect.modifiers,
            is_active: true,
            applied_round: round,
        };
        let id = record.id;
        let description = format!(
            "{} is affected by {} for {} round{}",
            target.name,
            record.name,
            record.duration_rounds,
            if record.duration_rounds == 1 { "" } else { "s" }
        );
        let data = json!({
            "effect_id": id,
            "effect_name": record.name,
            "effect_type": record.effect_type,
            "duration_rounds": record.duration_rounds,
            "modifiers": record.modifiers,
        });
        debug!(effect = %record.name, participant = %participant, "effect applied");
        target.effects.push(record);
        self.emit(
            NewLogEntry::new(EventType::EffectApplied, description)
                .target(participant)
                .data(data),
        );
        Ok(id)
    }

    /// Manually end an effect and log `effect_expired` with a
    /// `manually_removed` marker.
    pub fn remove_effect(&mut self, effect: EffectId) -> EncounterResult<()> {
        self.require_status("remove effect", OPEN)?;
        let (owner, name) = {
            let (owner, record) = self
                .roster
                .iter_mut()
                .find_map(|p| {
                    let id = p.id;
                    let name = p.name.clone();
                    p.effects
                        .iter_mut()
                        .find(|e| e.id == effect)
                        .map(|e| ((id, name), e))
                })
                .ok_or(EncounterError::EffectNotFound(effect))?;
            if !record.is_active {
                return Err(EncounterError::invalid(format!(
                    "effect {} has already expired",
                    record.name
                )));
            }
            record.expire();
            (owner, record.name.clone())
        };
        debug!(effect = %name, participant = %owner.0, "effect removed");
        self.emit(
            NewLogEntry::new(
                EventType::EffectExpired,
                format!("{} was removed from {}", name, owner.1),
            )
            .target(owner.0)
            .data(json!({
                "effect_id": effect,
                "effect_name": name,
                "manually_removed": true,
            })),
        );
        Ok(())
    }

    /// Count down every active effect on one participant, logging an
    /// `effect_expired` entry for each one that runs out.
    ///
    /// Only the sequencer calls this, once per participant per round change.
    pub(crate) fn decrement_effects(&mut self, participant: ParticipantId) {
        let Some(p) = self.roster.get_mut(participant) else {
            return;
        };
        let owner = p.name.clone();
        let expired: Vec<(EffectId, String)> = p
            .effects
            .iter_mut()
            .filter_map(|e| e.tick().then(|| (e.id, e.name.clone())))
            .collect();
        for (id, name) in expired {
            debug!(effect = %name, participant = %participant, "effect expired");
            self.emit(
                NewLogEntry::new(
                    EventType::EffectExpired,
                    format!("{name} wore off {owner}"),
                )
                .target(participant)
                .data(json!({
                    "effect_id": id,
                    "effect_name": name,
                    "manually_removed": false,
                })),
            );
        }
    }

    /// Find an effect anywhere in the encounter.
    pub fn effect(&self, effect: EffectId) -> Option<(&Participant, &StatusEffect)> {
        self.roster
            .iter()
            .find_map(|p| p.effects.iter().find(|e| e.id == effect).map(|e| (p, e)))
    }
}
