//! Combatants and their damage tracks.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::effects::StatusEffect;
use crate::id::{CharacterId, ParticipantId};

/// Which side a participant fights on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    /// A player character.
    Player,
    /// Fights alongside the players.
    Ally,
    /// Opposes the players.
    Enemy,
    /// Takes no side.
    Neutral,
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => write!(f, "player"),
            Self::Ally => write!(f, "ally"),
            Self::Enemy => write!(f, "enemy"),
            Self::Neutral => write!(f, "neutral"),
        }
    }
}

/// Which damage track a hit lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageKind {
    /// Lethal damage.
    Physical,
    /// Non-lethal damage.
    Stun,
}

impl DamageKind {
    /// Single-letter suffix used when rendering damage codes such as `8P`.
    pub fn code(&self) -> char {
        match self {
            Self::Physical => 'P',
            Self::Stun => 'S',
        }
    }
}

impl fmt::Display for DamageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Physical => write!(f, "physical"),
            Self::Stun => write!(f, "stun"),
        }
    }
}

/// Health band derived from remaining HP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// At least 75% HP.
    Healthy,
    /// At least 50% HP.
    Wounded,
    /// At least 25% HP.
    BadlyWounded,
    /// Below 25% HP.
    Critical,
    /// Out of the fight.
    Defeated,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Healthy => write!(f, "Healthy"),
            Self::Wounded => write!(f, "Wounded"),
            Self::BadlyWounded => write!(f, "Badly Wounded"),
            Self::Critical => write!(f, "Critical"),
            Self::Defeated => write!(f, "Defeated"),
        }
    }
}

/// What happened when damage was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageOutcome {
    /// Damage actually added to the track.
    pub applied: u32,
    /// The participant went down with this hit.
    pub newly_defeated: bool,
}

/// A combatant in an encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    /// Unique id.
    pub id: ParticipantId,
    /// Insertion sequence within the encounter, used to break initiative ties.
    pub order: u64,
    /// Display name.
    pub name: String,
    /// Side in the fight.
    pub team: Team,
    /// Initiative score; higher acts first.
    pub initiative: i32,
    /// Maximum hit points, at least 1.
    pub max_hp: u32,
    /// Accumulated physical damage.
    pub physical_damage: u32,
    /// Accumulated stun damage.
    pub stun_damage: u32,
    /// Armor rating.
    pub armor: u32,
    /// Edge points left to spend.
    pub edge_current: u32,
    /// Edge maximum.
    pub edge_max: u32,
    /// Dice rolled to defend. Zero means "derive from initiative".
    pub dodge_pool: u32,
    /// Still takes turns.
    pub is_active: bool,
    /// Out of the fight for good.
    pub is_defeated: bool,
    /// Persistent character this participant was created from, if any.
    pub character: Option<CharacterId>,
    /// Free-form notes.
    pub notes: String,
    /// Status effects owned by this participant, active and expired.
    pub effects: Vec<StatusEffect>,
}

impl Participant {
    /// Total damage on both tracks.
    pub fn total_damage(&self) -> u32 {
        self.physical_damage.saturating_add(self.stun_damage)
    }

    /// Remaining HP, never below zero.
    pub fn current_hp(&self) -> u32 {
        self.max_hp.saturating_sub(self.total_damage())
    }

    /// Remaining HP as a percentage of max.
    pub fn hp_percentage(&self) -> f64 {
        if self.max_hp == 0 {
            return 0.0;
        }
        f64::from(self.current_hp()) / f64::from(self.max_hp) * 100.0
    }

    /// Health band. Defeated overrides the HP thresholds.
    pub fn condition(&self) -> Condition {
        if self.is_defeated {
            return Condition::Defeated;
        }
        let current = u64::from(self.current_hp()) * 100;
        let max = u64::from(self.max_hp);
        if current >= 75 * max {
            Condition::Healthy
        } else if current >= 50 * max {
            Condition::Wounded
        } else if current >= 25 * max {
            Condition::BadlyWounded
        } else {
            Condition::Critical
        }
    }

    /// Add damage to one track. Negative amounts are treated as zero.
    ///
    /// The first time HP reaches zero the participant becomes defeated and
    /// inactive. That flip happens once; later hits keep stacking damage but
    /// never report a new defeat.
    pub fn apply_damage(&mut self, amount: i32, kind: DamageKind) -> DamageOutcome {
        let applied = amount.max(0).unsigned_abs();
        let track = match kind {
            DamageKind::Physical => &mut self.physical_damage,
            DamageKind::Stun => &mut self.stun_damage,
        };
        *track = track.saturating_add(applied);

        let newly_defeated = !self.is_defeated && self.current_hp() == 0;
        if newly_defeated {
            self.is_defeated = true;
            self.is_active = false;
        }
        DamageOutcome {
            applied,
            newly_defeated,
        }
    }

    /// Reduce one damage track, clamped at zero. Returns the amount removed.
    ///
    /// Defeated participants cannot be healed.
    pub fn heal(&mut self, amount: u32, kind: DamageKind) -> u32 {
        if self.is_defeated {
            return 0;
        }
        let track = match kind {
            DamageKind::Physical => &mut self.physical_damage,
            DamageKind::Stun => &mut self.stun_damage,
        };
        let healed = amount.min(*track);
        *track -= healed;
        healed
    }

    /// Spend one point of Edge. Returns false when none is left.
    pub fn spend_edge(&mut self) -> bool {
        if self.edge_current == 0 {
            return false;
        }
        self.edge_current -= 1;
        true
    }

    /// Active effects only.
    pub fn active_effects(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter().filter(|e| e.is_active)
    }
}

/// Parameters for adding a participant to an encounter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewParticipant {
    /// Display name. May be left empty when `character` is set and a
    /// character provider can supply one.
    #[serde(default)]
    pub name: Option<String>,
    /// Side in the fight.
    pub team: Team,
    /// Initiative score.
    #[serde(default)]
    pub initiative: i32,
    /// Maximum HP.
    #[serde(default = "default_max_hp")]
    pub max_hp: u32,
    /// Armor rating.
    #[serde(default)]
    pub armor: u32,
    /// Edge points available.
    #[serde(default)]
    pub edge: u32,
    /// Defense dice.
    #[serde(default)]
    pub dodge_pool: u32,
    /// Linked persistent character.
    #[serde(default)]
    pub character: Option<CharacterId>,
    /// Free-form notes.
    #[serde(default)]
    pub notes: String,
}

fn default_max_hp() -> u32 {
    10
}

impl NewParticipant {
    /// A participant with the given name and team and default stats.
    pub fn named(name: impl Into<String>, team: Team) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::unnamed(team)
        }
    }

    /// A participant whose name will come from a linked character.
    pub fn linked_to(character: CharacterId, team: Team) -> Self {
        Self {
            character: Some(character),
            ..Self::unnamed(team)
        }
    }

    fn unnamed(team: Team) -> Self {
        Self {
            name: None,
            team,
            initiative: 0,
            max_hp: default_max_hp(),
            armor: 0,
            edge: 0,
            dodge_pool: 0,
            character: None,
            notes: String::new(),
        }
    }

    /// Set initiative.
    pub fn with_initiative(mut self, initiative: i32) -> Self {
        self.initiative = initiative;
        self
    }

    /// Set maximum HP.
    pub fn with_max_hp(mut self, max_hp: u32) -> Self {
        self.max_hp = max_hp;
        self
    }

    /// Set armor.
    pub fn with_armor(mut self, armor: u32) -> Self {
        self.armor = armor;
        self
    }

    /// Set current and maximum Edge.
    pub fn with_edge(mut self, edge: u32) -> Self {
        self.edge = edge;
        self
    }

    /// Set the defense pool.
    pub fn with_dodge_pool(mut self, dodge_pool: u32) -> Self {
        self.dodge_pool = dodge_pool;
        self
    }

    /// Attach notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub(crate) fn into_participant(self, name: String, order: u64) -> Participant {
        Participant {
            id: ParticipantId::new(),
            order,
            name,
            team: self.team,
            initiative: self.initiative,
            max_hp: self.max_hp,
            physical_damage: 0,
            stun_damage: 0,
            armor: self.armor,
            edge_current: self.edge,
            edge_max: self.edge,
            dodge_pool: self.dodge_pool,
            is_active: true,
            is_defeated: false,
            character: self.character,
            notes: self.notes,
            effects: Vec::new(),
        }
    }
}
