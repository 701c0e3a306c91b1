//! Lifecycle transitions and turn/round sequencing.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::encounter::{Encounter, EncounterStatus};
use crate::error::{EncounterError, EncounterResult};
use crate::id::{ParticipantId, SessionId};
use crate::log::{EventType, NewLogEntry};

/// Where the sequencer landed after a turn advance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnAdvance {
    /// Round in progress.
    pub current_round: u32,
    /// Index into the live initiative order.
    pub current_turn_index: usize,
    /// Whose turn it now is, if anyone's.
    pub current_participant: Option<ParticipantId>,
    /// The advance wrapped into a new round.
    pub new_round: bool,
}

/// Tally produced when an encounter ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndSummary {
    /// Owning session, to be credited with the tally.
    pub session: SessionId,
    /// Enemies defeated during the encounter.
    pub enemies_defeated: u32,
    /// Round the encounter ended in.
    pub rounds: u32,
}

impl Encounter {
    /// `setup -> active`. Starts round 1 at the top of the initiative order.
    pub fn start(&mut self) -> EncounterResult<()> {
        self.require_status("start", &[EncounterStatus::Setup])?;
        self.begin(Utc::now());
        let order: Vec<String> = self
            .roster
            .active_order()
            .iter()
            .map(|p| p.name.clone())
            .collect();
        self.emit(
            NewLogEntry::new(EventType::CombatStart, format!("{} begins", self.name))
                .data(json!({ "initiative_order": order })),
        );
        info!(encounter = %self.id, participants = order.len(), "combat started");
        if let Some(first) = self.current_participant() {
            let (id, name) = (first.id, first.name.clone());
            self.emit(
                NewLogEntry::new(EventType::TurnStart, format!("{name}'s turn")).actor(id),
            );
        }
        Ok(())
    }

    /// `active -> paused`.
    pub fn pause(&mut self) -> EncounterResult<()> {
        self.require_status("pause", &[EncounterStatus::Active])?;
        self.set_status(EncounterStatus::Paused);
        self.emit(NewLogEntry::new(EventType::CombatPaused, "Combat paused"));
        info!(encounter = %self.id, "combat paused");
        Ok(())
    }

    /// `paused -> active`.
    pub fn resume(&mut self) -> EncounterResult<()> {
        self.require_status("resume", &[EncounterStatus::Paused])?;
        self.set_status(EncounterStatus::Active);
        self.emit(NewLogEntry::new(EventType::CombatResumed, "Combat resumed"));
        info!(encounter = %self.id, "combat resumed");
        Ok(())
    }

    /// `active | paused -> completed`. Returns the tally for the session.
    pub fn end(&mut self) -> EncounterResult<EndSummary> {
        self.require_status("end", &[EncounterStatus::Active, EncounterStatus::Paused])?;
        self.finish(Utc::now());
        let enemies_defeated = self.roster.defeated_enemies();
        let rounds = self.current_round();
        self.emit(
            NewLogEntry::new(
                EventType::CombatEnd,
                format!(
                    "{} ends after {rounds} round{}",
                    self.name,
                    if rounds == 1 { "" } else { "s" }
                ),
            )
            .data(json!({ "enemies_defeated": enemies_defeated, "rounds": rounds })),
        );
        info!(encounter = %self.id, enemies_defeated, rounds, "combat ended");
        Ok(EndSummary {
            session: self.session,
            enemies_defeated,
            rounds,
        })
    }

    /// Pass the turn to the next participant in initiative order.
    ///
    /// Wrapping past the end starts a new round, and every still-active
    /// participant's effects count down exactly once.
    pub fn advance_turn(&mut self) -> EncounterResult<TurnAdvance> {
        self.require_status("advance turn", &[EncounterStatus::Active])?;
        let count = self.roster.active_order().len();
        if count == 0 {
            return Err(EncounterError::NoActiveParticipants);
        }

        let mut round = self.current_round();
        let mut index = self.current_turn_index() + 1;
        let new_round = index >= count;
        if new_round {
            index = 0;
            round += 1;
            self.set_turn(round, index);
            self.emit(NewLogEntry::new(
                EventType::RoundStart,
                format!("Round {round} begins"),
            ));
            info!(encounter = %self.id, round, "new round");
            for id in self.roster.active_ids() {
                self.decrement_effects(id);
            }
        } else {
            self.set_turn(round, index);
        }

        let order = self.roster.active_ids();
        let current = order.get(index).copied();
        if let Some(id) = current {
            let name = self.roster.name_of(Some(id)).to_string();
            self.emit(NewLogEntry::new(EventType::TurnStart, format!("{name}'s turn")).actor(id));
            debug!(encounter = %self.id, participant = %name, round, index, "turn started");
        }

        Ok(TurnAdvance {
            current_round: round,
            current_turn_index: index,
            current_participant: current,
            new_round,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{EffectType, NewEffect};
    use crate::participant::{DamageKind, NewParticipant, Team};

    fn duel() -> (Encounter, ParticipantId, ParticipantId) {
        let mut enc = Encounter::new(SessionId::new(), "Duel");
        let alice = enc
            .add_participant(NewParticipant::named("Alice", Team::Player).with_initiative(8), None)
            .unwrap();
        let bob = enc
            .add_participant(NewParticipant::named("Bob", Team::Enemy).with_initiative(3), None)
            .unwrap();
        (enc, alice, bob)
    }

    #[test]
    fn start_sets_active_and_logs() {
        let (mut enc, alice, _) = duel();
        enc.start().unwrap();
        assert_eq!(enc.status(), EncounterStatus::Active);
        assert!(enc.started_at().is_some());
        assert_eq!(enc.current_participant().unwrap().id, alice);
        let start = enc.log().of_type(EventType::CombatStart).next().unwrap();
        assert_eq!(start.data["initiative_order"][0], "Alice");
        assert!(matches!(
            enc.start(),
            Err(EncounterError::InvalidState { .. })
        ));
    }

    #[test]
    fn advance_wraps_rounds() {
        let (mut enc, alice, bob) = duel();
        enc.start().unwrap();

        let step = enc.advance_turn().unwrap();
        assert_eq!(step.current_turn_index, 1);
        assert_eq!(step.current_round, 1);
        assert_eq!(step.current_participant, Some(bob));
        assert!(!step.new_round);

        let step = enc.advance_turn().unwrap();
        assert_eq!(step.current_turn_index, 0);
        assert_eq!(step.current_round, 2);
        assert_eq!(step.current_participant, Some(alice));
        assert!(step.new_round);
        assert_eq!(enc.log().of_type(EventType::RoundStart).count(), 1);
    }

    #[test]
    fn effects_tick_once_per_lap() {
        let (mut enc, alice, _) = duel();
        enc.start().unwrap();
        let effect = enc
            .apply_effect(alice, NewEffect::new("Focus", EffectType::Buff, 3))
            .unwrap();
        for _ in 0..4 {
            enc.advance_turn().unwrap();
        }
        let (_, record) = enc.effect(effect).unwrap();
        assert_eq!(record.rounds_remaining, 1);
        assert!(record.is_active);
    }

    #[test]
    fn paused_blocks_advance() {
        let (mut enc, _, _) = duel();
        enc.start().unwrap();
        enc.pause().unwrap();
        assert!(matches!(
            enc.advance_turn(),
            Err(EncounterError::InvalidState { .. })
        ));
        enc.resume().unwrap();
        assert!(enc.advance_turn().is_ok());
    }

    #[test]
    fn no_active_participants() {
        let (mut enc, alice, bob) = duel();
        enc.start().unwrap();
        enc.apply_damage(alice, 10, DamageKind::Physical).unwrap();
        enc.apply_damage(bob, 10, DamageKind::Physical).unwrap();
        let before = enc.log().len();
        assert_eq!(
            enc.advance_turn().unwrap_err(),
            EncounterError::NoActiveParticipants
        );
        assert_eq!(enc.log().len(), before);
    }

    #[test]
    fn end_tallies_enemies() {
        let (mut enc, _, bob) = duel();
        enc.start().unwrap();
        enc.apply_damage(bob, 10, DamageKind::Stun).unwrap();
        let summary = enc.end().unwrap();
        assert_eq!(summary.enemies_defeated, 1);
        assert_eq!(summary.rounds, 1);
        assert_eq!(enc.status(), EncounterStatus::Completed);
        assert!(enc.ended_at().is_some());
        let end = enc.log().entries().last().unwrap();
        assert_eq!(end.event_type, EventType::CombatEnd);
        assert_eq!(end.data["enemies_defeated"], 1);

        assert!(matches!(
            enc.advance_turn(),
            Err(EncounterError::InvalidState { .. })
        ));
        assert!(matches!(enc.end(), Err(EncounterError::InvalidState { .. })));
    }

    #[test]
    fn end_requires_started() {
        let (mut enc, _, _) = duel();
        assert!(matches!(enc.end(), Err(EncounterError::InvalidState { .. })));
    }
}
