//! The participant roster and initiative ordering.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use crate::error::{EncounterError, EncounterResult};
use crate::id::ParticipantId;
use crate::participant::{NewParticipant, Participant, Team};

/// The participants of one encounter, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    participants: Vec<Participant>,
    next_order: u64,
}

impl Roster {
    /// Create an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a participant under the given display name.
    pub fn add(&mut self, new: NewParticipant, name: String) -> ParticipantId {
        let participant = new.into_participant(name, self.next_order);
        self.next_order += 1;
        let id = participant.id;
        self.participants.push(participant);
        id
    }

    /// Remove a participant along with its effects.
    pub fn remove(&mut self, id: ParticipantId) -> Option<Participant> {
        let idx = self.participants.iter().position(|p| p.id == id)?;
        Some(self.participants.remove(idx))
    }

    /// Look up a participant.
    pub fn get(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    /// Look up a participant mutably.
    pub fn get_mut(&mut self, id: ParticipantId) -> Option<&mut Participant> {
        self.participants.iter_mut().find(|p| p.id == id)
    }

    /// Look up a participant or fail with `ParticipantNotFound`.
    pub fn require(&self, id: ParticipantId) -> EncounterResult<&Participant> {
        self.get(id).ok_or(EncounterError::ParticipantNotFound(id))
    }

    /// Mutable [`require`](Self::require).
    pub fn require_mut(&mut self, id: ParticipantId) -> EncounterResult<&mut Participant> {
        self.get_mut(id).ok_or(EncounterError::ParticipantNotFound(id))
    }

    /// All participants in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter()
    }

    /// All participants in insertion order, mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Participant> {
        self.participants.iter_mut()
    }

    /// Number of participants, defeated ones included.
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    /// Whether the roster is empty.
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Active participants sorted by initiative, highest first.
    ///
    /// Equal initiative keeps insertion order, so the same inputs always
    /// produce the same order.
    pub fn active_order(&self) -> Vec<&Participant> {
        let mut order: Vec<&Participant> =
            self.participants.iter().filter(|p| p.is_active).collect();
        order.sort_by_key(|p| (Reverse(p.initiative), p.order));
        order
    }

    /// Ids of [`active_order`](Self::active_order).
    pub fn active_ids(&self) -> Vec<ParticipantId> {
        self.active_order().into_iter().map(|p| p.id).collect()
    }

    /// Display name for an optional reference; absent or deleted
    /// participants read as `unknown`.
    pub fn name_of(&self, id: Option<ParticipantId>) -> &str {
        id.and_then(|id| self.get(id))
            .map(|p| p.name.as_str())
            .unwrap_or("unknown")
    }

    /// Number of defeated enemies.
    pub fn defeated_enemies(&self) -> u32 {
        self.participants
            .iter()
            .filter(|p| p.team == Team::Enemy && p.is_defeated)
            .count() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::participant::DamageKind;

    fn add(roster: &mut Roster, name: &str, team: Team, init: i32) -> ParticipantId {
        roster.add(
            NewParticipant::named(name, team).with_initiative(init),
            name.to_string(),
        )
    }

    fn names(roster: &Roster) -> Vec<&str> {
        roster
            .active_order()
            .into_iter()
            .map(|p| p.name.as_str())
            .collect()
    }

    #[test]
    fn sorted_by_initiative_descending() {
        let mut roster = Roster::new();
        add(&mut roster, "Bob", Team::Player, 3);
        add(&mut roster, "Alice", Team::Player, 8);
        add(&mut roster, "Ghoul", Team::Enemy, 5);
        assert_eq!(names(&roster), vec!["Alice", "Ghoul", "Bob"]);
    }

    #[test]
    fn ties_keep_insertion_order() {
        let mut roster = Roster::new();
        add(&mut roster, "Zed", Team::Enemy, 4);
        add(&mut roster, "Amy", Team::Player, 4);
        add(&mut roster, "Mo", Team::Ally, 4);
        assert_eq!(names(&roster), vec!["Zed", "Amy", "Mo"]);
    }

    #[test]
    fn defeated_leave_the_order() {
        let mut roster = Roster::new();
        add(&mut roster, "Alice", Team::Player, 8);
        let ghoul = add(&mut roster, "Ghoul", Team::Enemy, 5);
        roster
            .get_mut(ghoul)
            .unwrap()
            .apply_damage(50, DamageKind::Physical);
        assert_eq!(names(&roster), vec!["Alice"]);
        assert_eq!(roster.defeated_enemies(), 1);
        assert_eq!(roster.len(), 2);
    }

    #[test]
    fn remove_and_unknown_names() {
        let mut roster = Roster::new();
        let alice = add(&mut roster, "Alice", Team::Player, 8);
        assert_eq!(roster.name_of(Some(alice)), "Alice");
        assert!(roster.remove(alice).is_some());
        assert!(roster.remove(alice).is_none());
        assert_eq!(roster.name_of(Some(alice)), "unknown");
        assert_eq!(roster.name_of(None), "unknown");
        assert!(roster.is_empty());
    }

    #[test]
    fn require_reports_missing() {
        let roster = Roster::new();
        let id = ParticipantId::new();
        assert_eq!(
            roster.require(id).unwrap_err(),
            EncounterError::ParticipantNotFound(id)
        );
    }
}
