//! Read-only snapshots of encounter state for callers.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::effects::{EffectType, StatusEffect};
use crate::encounter::{Encounter, EncounterStatus};
use crate::id::{EffectId, EncounterId, ParticipantId, SessionId};
use crate::log::LogEntry;
use crate::participant::{Condition, Participant, Team};

/// The observable state of an encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterView {
    /// Encounter id.
    pub id: EncounterId,
    /// Owning session.
    pub session: SessionId,
    /// Display name.
    pub name: String,
    /// Lifecycle status.
    pub status: EncounterStatus,
    /// Round in progress.
    pub round: u32,
    /// Index into `initiative_order`.
    pub turn: usize,
    /// Whose turn it is.
    pub current_participant: Option<ParticipantId>,
    /// Active participants, highest initiative first.
    pub initiative_order: Vec<ParticipantId>,
    /// Every participant in insertion order.
    pub participants: Vec<ParticipantView>,
    /// Active status effects.
    pub effects: Vec<EffectView>,
    /// The most recent log entries, oldest first.
    pub recent_log: Vec<LogEntry>,
    /// When combat started.
    pub started_at: Option<DateTime<Utc>>,
    /// When combat ended.
    pub ended_at: Option<DateTime<Utc>>,
}

/// A participant with its derived fields filled in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantView {
    /// Participant id.
    pub id: ParticipantId,
    /// Display name.
    pub name: String,
    /// Side.
    pub team: Team,
    /// Initiative score.
    pub initiative: i32,
    /// Maximum HP.
    pub max_hp: u32,
    /// Remaining HP.
    pub current_hp: u32,
    /// Remaining HP in percent.
    pub hp_percentage: f64,
    /// Physical damage taken.
    pub physical_damage: u32,
    /// Stun damage taken.
    pub stun_damage: u32,
    /// Armor rating.
    pub armor: u32,
    /// Defense dice.
    pub dodge_pool: u32,
    /// Edge left.
    pub edge_current: u32,
    /// Edge maximum.
    pub edge_max: u32,
    /// Health band.
    pub condition: Condition,
    /// Still takes turns.
    pub is_active: bool,
    /// Out of the fight.
    pub is_defeated: bool,
    /// Free-form notes.
    pub notes: String,
}

impl From<&Participant> for ParticipantView {
    fn from(p: &Participant) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            team: p.team,
            initiative: p.initiative,
            max_hp: p.max_hp,
            current_hp: p.current_hp(),
            hp_percentage: p.hp_percentage(),
            physical_damage: p.physical_damage,
            stun_damage: p.stun_damage,
            armor: p.armor,
            dodge_pool: p.dodge_pool,
            edge_current: p.edge_current,
            edge_max: p.edge_max,
            condition: p.condition(),
            is_active: p.is_active,
            is_defeated: p.is_defeated,
            notes: p.notes.clone(),
        }
    }
}

/// An active effect and who carries it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectView {
    /// Effect id.
    pub id: EffectId,
    /// Carrier.
    pub participant: ParticipantId,
    /// Display name.
    pub name: String,
    /// Category.
    pub effect_type: EffectType,
    /// Free-form description.
    pub description: String,
    /// Opaque modifiers for the display layer.
    pub modifiers: BTreeMap<String, i32>,
    /// Rounds left.
    pub rounds_remaining: u32,
    /// Original duration.
    pub duration_rounds: u32,
}

impl EffectView {
    fn new(participant: ParticipantId, effect: &StatusEffect) -> Self {
        Self {
            id: effect.id,
            participant,
            name: effect.name.clone(),
            effect_type: effect.effect_type,
            description: effect.description.clone(),
            modifiers: effect.modifiers.clone(),
            rounds_remaining: effect.rounds_remaining,
            duration_rounds: effect.duration_rounds,
        }
    }
}

impl EncounterView {
    /// Snapshot an encounter, carrying the last `log_tail` log entries.
    pub fn of(encounter: &Encounter, log_tail: usize) -> Self {
        let roster = encounter.roster();
        Self {
            id: encounter.id,
            session: encounter.session,
            name: encounter.name.clone(),
            status: encounter.status(),
            round: encounter.current_round(),
            turn: encounter.current_turn_index(),
            current_participant: encounter.current_participant().map(|p| p.id),
            initiative_order: roster.active_ids(),
            participants: roster.iter().map(ParticipantView::from).collect(),
            effects: roster
                .iter()
                .flat_map(|p| p.active_effects().map(move |e| EffectView::new(p.id, e)))
                .collect(),
            recent_log: encounter.log().tail(log_tail).to_vec(),
            started_at: encounter.started_at(),
            ended_at: encounter.ended_at(),
        }
    }

    /// Look up a participant by name.
    pub fn participant(&self, name: &str) -> Option<&ParticipantView> {
        self.participants.iter().find(|p| p.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::NewEffect;
    use crate::participant::{DamageKind, NewParticipant};

    #[test]
    fn snapshot_carries_derived_fields() {
        let mut enc = Encounter::new(SessionId::new(), "Vault");
        let a = enc
            .add_participant(NewParticipant::named("Ash", Team::Player).with_initiative(4), None)
            .unwrap();
        let b = enc
            .add_participant(
                NewParticipant::named("Bolt", Team::Enemy)
                    .with_initiative(9)
                    .with_dodge_pool(3)
                    .with_notes("Carries the keycard"),
                None,
            )
            .unwrap();
        enc.apply_damage(a, 5, DamageKind::Stun).unwrap();
        let expired = enc
            .apply_effect(b, NewEffect::new("Dazed", EffectType::Debuff, 1))
            .unwrap();
        enc.remove_effect(expired).unwrap();
        enc.apply_effect(
            b,
            NewEffect::new("Shielded", EffectType::Buff, 2)
                .with_description("Ballistic shield raised")
                .with_modifier("armor", 3),
        )
        .unwrap();
        enc.start().unwrap();

        let view = EncounterView::of(&enc, 3);
        assert_eq!(view.status, EncounterStatus::Active);
        assert_eq!(view.initiative_order, vec![b, a]);
        assert_eq!(view.current_participant, Some(b));
        let ash = view.participant("Ash").unwrap();
        assert_eq!(ash.current_hp, 5);
        assert_eq!(ash.condition, Condition::Wounded);
        assert_eq!(view.effects.len(), 1);
        assert_eq!(view.effects[0].name, "Shielded");
        assert_eq!(view.effects[0].description, "Ballistic shield raised");
        assert_eq!(view.effects[0].modifiers.get("armor"), Some(&3));
        let bolt = view.participant("Bolt").unwrap();
        assert_eq!(bolt.dodge_pool, 3);
        assert_eq!(bolt.notes, "Carries the keycard");

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["effects"][0]["modifiers"]["armor"], 3);
        assert_eq!(view.recent_log.len(), 3);
    }

    #[test]
    fn view_serializes() {
        let enc = Encounter::new(SessionId::new(), "Vault");
        let json = serde_json::to_value(EncounterView::of(&enc, 10)).unwrap();
        assert_eq!(json["status"], "setup");
        assert_eq!(json["round"], 1);
    }
}
