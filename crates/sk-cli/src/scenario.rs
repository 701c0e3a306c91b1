//! Scripted encounters loaded from JSON and played through an [`Engine`].
//!
//! A scenario names its participants up front and then lists actions that
//! refer to them by name:
//!
//! ```json
//! {
//!   "name": "Dockside",
//!   "participants": [{ "name": "Rook", "team": "player", "initiative": 9 }],
//!   "actions": [{ "op": "start" }, { "op": "advance", "times": 2 }]
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use sk_encounter::{
    AttackRequest, BaseDamage, Caller, DamageKind, EffectType, EncounterId, EndSummary, Engine,
    NewEffect, NewParticipant, ParticipantId, SessionId,
};

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub participants: Vec<NewParticipant>,
    #[serde(default)]
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Action {
    Start,
    Pause,
    Resume,
    Advance {
        #[serde(default = "one")]
        times: u32,
    },
    Attack {
        attacker: String,
        target: String,
        pool: u32,
        /// Damage code such as `8P` or `6S`.
        damage: String,
        #[serde(default)]
        ap: i32,
        #[serde(default)]
        edge: bool,
    },
    Damage {
        target: String,
        amount: i32,
        #[serde(default = "physical")]
        kind: DamageKind,
    },
    Heal {
        target: String,
        amount: i32,
        #[serde(default = "physical")]
        kind: DamageKind,
    },
    Effect {
        target: String,
        name: String,
        effect_type: EffectType,
        duration: u32,
        #[serde(default)]
        description: String,
        #[serde(default)]
        modifiers: BTreeMap<String, i32>,
    },
    RemoveEffect {
        target: String,
        name: String,
    },
    Remove {
        target: String,
    },
    End,
}

fn one() -> u32 {
    1
}

fn physical() -> DamageKind {
    DamageKind::Physical
}

impl Action {
    fn op(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Advance { .. } => "advance",
            Self::Attack { .. } => "attack",
            Self::Damage { .. } => "damage",
            Self::Heal { .. } => "heal",
            Self::Effect { .. } => "effect",
            Self::RemoveEffect { .. } => "remove_effect",
            Self::Remove { .. } => "remove",
            Self::End => "end",
        }
    }
}

/// A scenario after every action has been applied.
pub struct Playback {
    pub engine: Engine,
    pub encounter: EncounterId,
    pub summary: Option<EndSummary>,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
        serde_json::from_str(&text)
            .map_err(|e| format!("invalid scenario {}: {e}", path.display()))
    }

    /// Create the encounter, add the participants, and run every action.
    /// Stops at the first rejected action.
    pub fn play(&self, engine: Engine) -> Result<Playback, String> {
        let caller = Caller::controller("skirmish");
        let encounter = engine
            .create_encounter(&caller, SessionId::new(), self.name.clone())
            .map_err(|e| format!("cannot create encounter: {e}"))?;

        let mut names = HashMap::new();
        for p in &self.participants {
            let name = p.name.clone().unwrap_or_default();
            if names.contains_key(&name) {
                return Err(format!("duplicate participant name: {name:?}"));
            }
            let id = engine
                .add_participant(&caller, encounter, p.clone())
                .map_err(|e| format!("cannot add participant {name:?}: {e}"))?;
            names.insert(name, id);
        }

        let mut player = Player {
            engine: &engine,
            caller,
            encounter,
            names,
            summary: None,
        };
        for (i, action) in self.actions.iter().enumerate() {
            debug!(step = i + 1, op = action.op(), "scenario step");
            player
                .apply(action)
                .map_err(|e| format!("step {} ({}): {e}", i + 1, action.op()))?;
        }
        let summary = player.summary;

        Ok(Playback {
            engine,
            encounter,
            summary,
        })
    }
}

struct Player<'a> {
    engine: &'a Engine,
    caller: Caller,
    encounter: EncounterId,
    names: HashMap<String, ParticipantId>,
    summary: Option<EndSummary>,
}

impl Player<'_> {
    fn who(&self, name: &str) -> Result<ParticipantId, String> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| format!("no participant named {name:?}"))
    }

    fn apply(&mut self, action: &Action) -> Result<(), String> {
        let (engine, caller, id) = (self.engine, &self.caller, self.encounter);
        let result = match action {
            Action::Start => engine.start(caller, id).map(drop),
            Action::Pause => engine.pause(caller, id).map(drop),
            Action::Resume => engine.resume(caller, id).map(drop),
            Action::Advance { times } => {
                (0..*times).try_for_each(|_| engine.advance_turn(caller, id).map(drop))
            }
            Action::Attack {
                attacker,
                target,
                pool,
                damage,
                ap,
                edge,
            } => {
                let request = AttackRequest {
                    attacker: self.who(attacker)?,
                    target: self.who(target)?,
                    attack_pool: *pool,
                    base_damage: damage.parse::<BaseDamage>().map_err(|e| e.to_string())?,
                    weapon_ap: *ap,
                    use_edge: *edge,
                };
                engine.resolve_attack(caller, id, &request).map(drop)
            }
            Action::Damage {
                target,
                amount,
                kind,
            } => engine
                .apply_damage(caller, id, self.who(target)?, *amount, *kind)
                .map(drop),
            Action::Heal {
                target,
                amount,
                kind,
            } => engine
                .heal(caller, id, self.who(target)?, *amount, *kind)
                .map(drop),
            Action::Effect {
                target,
                name,
                effect_type,
                duration,
                description,
                modifiers,
            } => {
                let effect = NewEffect {
                    name: name.clone(),
                    effect_type: *effect_type,
                    description: description.clone(),
                    duration_rounds: *duration,
                    modifiers: modifiers.clone(),
                };
                engine
                    .add_effect(caller, id, self.who(target)?, effect)
                    .map(drop)
            }
            Action::RemoveEffect { target, name } => {
                let carrier = self.who(target)?;
                let state = engine.state(id).map_err(|e| e.to_string())?;
                let effect = state
                    .effects
                    .iter()
                    .find(|e| e.participant == carrier && &e.name == name)
                    .ok_or_else(|| format!("{target} has no active effect named {name:?}"))?;
                engine.remove_effect(caller, id, effect.id)
            }
            Action::Remove { target } => {
                let pid = self.who(target)?;
                engine.remove_participant(caller, id, pid).map(drop)
            }
            Action::End => engine.end(caller, id).map(|summary| {
                self.summary = Some(summary);
            }),
        };
        result.map_err(|e| e.to_string())
    }
}
