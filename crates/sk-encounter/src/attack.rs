//! Attack resolution: opposed pools, armor, and damage.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::json;
use sk_mechanics::{DicePool, DieSource, OpposedResult, PoolRoll, opposed_test};
use tracing::debug;

use crate::config::EngineConfig;
use crate::encounter::{Encounter, EncounterStatus};
use crate::error::{EncounterError, EncounterResult};
use crate::id::ParticipantId;
use crate::log::{EventType, NewLogEntry};
use crate::participant::{Condition, DamageKind, Participant};

/// Weapon damage before hits and armor, e.g. `8P`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseDamage {
    /// Damage value.
    pub value: u32,
    /// Track the damage lands on.
    pub kind: DamageKind,
}

impl BaseDamage {
    /// Physical damage.
    pub fn physical(value: u32) -> Self {
        Self {
            value,
            kind: DamageKind::Physical,
        }
    }

    /// Stun damage.
    pub fn stun(value: u32) -> Self {
        Self {
            value,
            kind: DamageKind::Stun,
        }
    }
}

impl fmt::Display for BaseDamage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.kind.code())
    }
}

impl FromStr for BaseDamage {
    type Err = EncounterError;

    /// Parse `8P`, `6S`, or a bare number (physical).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (digits, kind) = match s.chars().last() {
            Some('P' | 'p') => (&s[..s.len() - 1], DamageKind::Physical),
            Some('S' | 's') => (&s[..s.len() - 1], DamageKind::Stun),
            _ => (s, DamageKind::Physical),
        };
        let value = digits
            .parse()
            .map_err(|_| EncounterError::invalid(format!("bad damage code: {s:?}")))?;
        Ok(Self { value, kind })
    }
}

/// Everything needed to resolve one attack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackRequest {
    /// Who attacks.
    pub attacker: ParticipantId,
    /// Who defends.
    pub target: ParticipantId,
    /// Attack dice, `1..=50`.
    pub attack_pool: u32,
    /// Weapon damage.
    pub base_damage: BaseDamage,
    /// Armor penetration, normally zero or negative.
    #[serde(default)]
    pub weapon_ap: i32,
    /// Spend a point of Edge so sixes explode.
    #[serde(default)]
    pub use_edge: bool,
}

/// Full breakdown of a resolved attack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackResult {
    /// Who attacked.
    pub attacker: ParticipantId,
    /// Who defended.
    pub target: ParticipantId,
    /// The attacker's roll.
    pub attack_roll: PoolRoll,
    /// Dice the defender rolled.
    pub defense_pool: u32,
    /// The defender's roll.
    pub defense_roll: PoolRoll,
    /// Comparison of the two rolls.
    pub opposed: OpposedResult,
    /// Weapon damage.
    pub base_damage: BaseDamage,
    /// Armor penetration used.
    pub weapon_ap: i32,
    /// Target armor before penetration.
    pub base_armor: u32,
    /// Target armor after penetration.
    pub effective_armor: u32,
    /// Damage dealt.
    pub damage: u32,
    /// The attacker spent Edge.
    pub edge_used: bool,
    /// Target HP afterwards.
    pub target_hp: u32,
    /// Target health band afterwards.
    pub target_condition: Condition,
    /// This attack took the target down.
    pub target_defeated: bool,
}

impl AttackResult {
    /// The attacker beat the defense.
    pub fn hit(&self) -> bool {
        self.opposed.attacker_succeeds
    }
}

/// Defense dice for a target: its dodge pool, or half its initiative
/// (at least one die) when it has none.
pub fn defense_pool(target: &Participant, divisor: i32) -> u32 {
    if target.dodge_pool > 0 {
        target.dodge_pool
    } else {
        (target.initiative / divisor.max(1)).max(1).unsigned_abs()
    }
}

/// Armor left after penetration, never negative.
pub fn effective_armor(armor: u32, weapon_ap: i32) -> u32 {
    (i64::from(armor) + i64::from(weapon_ap)).max(0) as u32
}

/// Damage from a successful attack, never negative.
pub fn attack_damage(base: u32, net_hits: u32, effective_armor: u32) -> u32 {
    base.saturating_add(net_hits).saturating_sub(effective_armor)
}

impl Encounter {
    /// Resolve an attack between two participants.
    ///
    /// Both sides roll; the attacker needs strictly more hits. Net hits add
    /// to base damage, penetrated armor subtracts from it, and anything left
    /// goes onto the target's damage track.
    pub fn resolve_attack<D: DieSource + ?Sized>(
        &mut self,
        req: &AttackRequest,
        dice: &mut D,
        config: &EngineConfig,
    ) -> EncounterResult<AttackResult> {
        self.require_status(
            "resolve an attack",
            &[EncounterStatus::Active, EncounterStatus::Paused],
        )?;
        let attacker = self.roster.require(req.attacker)?;
        let target = self.roster.require(req.target)?;
        if req.attacker == req.target {
            return Err(EncounterError::invalid("a participant cannot attack itself"));
        }
        let attack_pool = DicePool::checked(req.attack_pool)?;
        if attacker.is_defeated {
            return Err(EncounterError::invalid(format!(
                "{} is defeated and cannot attack",
                attacker.name
            )));
        }
        if target.is_defeated {
            return Err(EncounterError::invalid(format!(
                "{} is already defeated",
                target.name
            )));
        }
        if req.use_edge && attacker.edge_current == 0 {
            return Err(EncounterError::invalid(format!(
                "{} has no Edge left",
                attacker.name
            )));
        }
        let attacker_name = attacker.name.clone();
        let target_name = target.name.clone();
        let base_armor = target.armor;
        let defense = defense_pool(target, config.defense_divisor);

        if req.use_edge {
            self.roster.require_mut(req.attacker)?.spend_edge();
        }

        let attack_roll = attack_pool
            .exploding(req.use_edge || config.explode_by_default)
            .roll(dice);
        let defense_roll = DicePool::new(defense)
            .exploding(config.explode_by_default)
            .roll(dice);
        let opposed = opposed_test(attack_roll.hits, defense_roll.hits);
        debug!(
            attacker = %attacker_name,
            target = %target_name,
            attack_hits = attack_roll.hits,
            defense_hits = defense_roll.hits,
            "attack rolled"
        );

        let armor = effective_armor(base_armor, req.weapon_ap);
        let damage = if opposed.attacker_succeeds {
            attack_damage(req.base_damage.value, opposed.net_hits, armor)
        } else {
            0
        };

        let breakdown = json!({
            "attack_pool": attack_pool.size(),
            "attack_dice": attack_roll.all_results,
            "attack_hits": attack_roll.hits,
            "attack_glitch": attack_roll.is_glitch,
            "defense_pool": defense,
            "defense_dice": defense_roll.all_results,
            "defense_hits": defense_roll.hits,
            "winner": opposed.prevailing(),
            "net_hits": opposed.net_hits,
            "base_damage": req.base_damage.value,
            "damage_type": req.base_damage.kind,
            "weapon_ap": req.weapon_ap,
            "base_armor": base_armor,
            "effective_armor": armor,
            "damage": damage,
            "edge_used": req.use_edge,
        });

        let defeated = if damage > 0 {
            let report = self.damage_participant(
                req.target,
                i32::try_from(damage).unwrap_or(i32::MAX),
                req.base_damage.kind,
            )?;
            self.emit(
                NewLogEntry::new(
                    EventType::Damage,
                    format!(
                        "{attacker_name} hits {target_name} for {damage}{}",
                        req.base_damage.kind.code()
                    ),
                )
                .actor(req.attacker)
                .target(req.target)
                .data(breakdown),
            );
            if report.defeated {
                self.log_defeat(req.target, Some(req.attacker));
            }
            report.defeated
        } else {
            let description = if opposed.attacker_succeeds {
                format!("{attacker_name} hits {target_name} but armor absorbs it")
            } else {
                format!("{attacker_name} misses {target_name}")
            };
            self.emit(
                NewLogEntry::new(EventType::Attack, description)
                    .actor(req.attacker)
                    .target(req.target)
                    .data(breakdown),
            );
            false
        };

        let target = self.roster.require(req.target)?;
        Ok(AttackResult {
            attacker: req.attacker,
            target: req.target,
            attack_roll,
            defense_pool: defense,
            defense_roll,
            opposed,
            base_damage: req.base_damage,
            weapon_ap: req.weapon_ap,
            base_armor,
            effective_armor: armor,
            damage,
            edge_used: req.use_edge,
            target_hp: target.current_hp(),
            target_condition: target.condition(),
            target_defeated: defeated,
        })
    }
}
