//! End-to-end encounter scenarios driven through the engine.

use sk_encounter::{
    AttackRequest, BaseDamage, Caller, DamageKind, EffectType, Engine, EngineConfig,
    EncounterError, EncounterId, EncounterStatus, EventType, NewEffect, NewParticipant,
    ParticipantId, SessionId, Team,
};
use sk_mechanics::ScriptedDice;

fn gm() -> Caller {
    Caller::controller("gm")
}

fn engine_with(faces: &[u32]) -> Engine {
    Engine::with_dice(EngineConfig::default(), ScriptedDice::new(faces).unwrap())
}

/// Alice (initiative 8) and Bob (initiative 3), not yet started.
fn alice_and_bob(engine: &Engine) -> (EncounterId, ParticipantId, ParticipantId) {
    let id = engine
        .create_encounter(&gm(), SessionId::new(), "Back alley")
        .unwrap();
    let bob = engine
        .add_participant(
            &gm(),
            id,
            NewParticipant::named("Bob", Team::Enemy).with_initiative(3),
        )
        .unwrap();
    let alice = engine
        .add_participant(
            &gm(),
            id,
            NewParticipant::named("Alice", Team::Player).with_initiative(8),
        )
        .unwrap();
    (id, alice, bob)
}

#[test]
fn two_participants_take_turns_and_wrap() {
    let engine = engine_with(&[3]);
    let (id, alice, bob) = alice_and_bob(&engine);
    engine
        .add_effect(
            &gm(),
            id,
            alice,
            NewEffect::new("Adrenaline", EffectType::Buff, 1),
        )
        .unwrap();
    let view = engine.start(&gm(), id).unwrap();
    assert_eq!(view.initiative_order, vec![alice, bob]);

    let step = engine.advance_turn(&gm(), id).unwrap();
    assert_eq!(step.current_turn_index, 1);
    assert_eq!(step.current_round, 1);
    assert_eq!(step.current_participant, Some(bob));

    let log_before = engine.log(id).unwrap().len();
    let step = engine.advance_turn(&gm(), id).unwrap();
    assert_eq!(step.current_turn_index, 0);
    assert_eq!(step.current_round, 2);
    assert_eq!(step.current_participant, Some(alice));

    let log = engine.log(id).unwrap();
    let appended: Vec<EventType> = log[log_before..].iter().map(|e| e.event_type).collect();
    assert_eq!(
        appended,
        vec![
            EventType::RoundStart,
            EventType::EffectExpired,
            EventType::TurnStart
        ]
    );
    assert!(log[log_before..].iter().all(|e| e.round_number == 2));
}

#[test]
fn attack_with_armor_penetration() {
    // Attack pool 4: 5 5 5 2 (3 hits). Dodge pool 2: 5 3 (1 hit).
    let engine = engine_with(&[5, 5, 5, 2, 5, 3]);
    let id = engine
        .create_encounter(&gm(), SessionId::new(), "Loading dock")
        .unwrap();
    let attacker = engine
        .add_participant(
            &gm(),
            id,
            NewParticipant::named("Kite", Team::Player).with_initiative(9),
        )
        .unwrap();
    let target = engine
        .add_participant(
            &gm(),
            id,
            NewParticipant::named("Enforcer", Team::Enemy)
                .with_initiative(5)
                .with_armor(4)
                .with_dodge_pool(2)
                .with_max_hp(12),
        )
        .unwrap();
    engine.start(&gm(), id).unwrap();

    let result = engine
        .resolve_attack(
            &gm(),
            id,
            &AttackRequest {
                attacker,
                target,
                attack_pool: 4,
                base_damage: BaseDamage::physical(8),
                weapon_ap: -2,
                use_edge: false,
            },
        )
        .unwrap();

    assert_eq!(result.attack_roll.hits, 3);
    assert_eq!(result.defense_roll.hits, 1);
    assert_eq!(result.opposed.net_hits, 2);
    assert_eq!(result.effective_armor, 2);
    assert_eq!(result.damage, 8);
    assert_eq!(result.target_hp, 4);

    let view = engine.state(id).unwrap();
    let enforcer = view.participant("Enforcer").unwrap();
    assert_eq!(enforcer.physical_damage, 8);
    assert_eq!(enforcer.stun_damage, 0);

    let damage = engine
        .log(id)
        .unwrap()
        .into_iter()
        .find(|e| e.event_type == EventType::Damage)
        .unwrap();
    assert_eq!(damage.data["attack_hits"], 3);
    assert_eq!(damage.data["defense_hits"], 1);
    assert_eq!(damage.data["base_armor"], 4);
    assert_eq!(damage.data["effective_armor"], 2);
    assert_eq!(damage.data["attack_dice"], serde_json::json!([5, 5, 5, 2]));
}

#[test]
fn effect_expires_after_two_round_wraps() {
    let engine = engine_with(&[3]);
    let (id, alice, _) = alice_and_bob(&engine);
    engine.start(&gm(), id).unwrap();
    let effect = engine
        .add_effect(
            &gm(),
            id,
            alice,
            NewEffect::new("Smoke", EffectType::Debuff, 2).with_modifier("perception", -2),
        )
        .unwrap();

    let find = |engine: &Engine| {
        engine
            .state(id)
            .unwrap()
            .effects
            .into_iter()
            .find(|e| e.id == effect)
    };

    engine.advance_turn(&gm(), id).unwrap();
    engine.advance_turn(&gm(), id).unwrap();
    let after_one = find(&engine).unwrap();
    assert_eq!(after_one.rounds_remaining, 1);

    engine.advance_turn(&gm(), id).unwrap();
    let step = engine.advance_turn(&gm(), id).unwrap();
    assert_eq!(step.current_round, 3);
    assert!(find(&engine).is_none(), "expired effects drop out of the view");

    let expired: Vec<_> = engine
        .log(id)
        .unwrap()
        .into_iter()
        .filter(|e| e.event_type == EventType::EffectExpired)
        .collect();
    assert_eq!(expired.len(), 1);
    assert_eq!(expired[0].round_number, 3);
    assert_eq!(expired[0].data["manually_removed"], false);
}

#[test]
fn effects_count_down_once_per_lap() {
    let engine = engine_with(&[3]);
    let (id, alice, bob) = alice_and_bob(&engine);
    let third = engine
        .add_participant(
            &gm(),
            id,
            NewParticipant::named("Cass", Team::Ally).with_initiative(5),
        )
        .unwrap();
    engine.start(&gm(), id).unwrap();
    for who in [alice, bob, third] {
        engine
            .add_effect(&gm(), id, who, NewEffect::new("Long", EffectType::Buff, 50))
            .unwrap();
    }

    for k in 1..=20u32 {
        engine.advance_turn(&gm(), id).unwrap();
        let laps = k / 3;
        let view = engine.state(id).unwrap();
        assert_eq!(view.round, 1 + laps);
        for effect in &view.effects {
            assert_eq!(effect.rounds_remaining, 50 - laps);
        }
    }
}

#[test]
fn defeat_happens_exactly_once() {
    let engine = engine_with(&[3]);
    let (id, _, bob) = alice_and_bob(&engine);
    engine.start(&gm(), id).unwrap();
    for _ in 0..6 {
        engine
            .apply_damage(&gm(), id, bob, 4, DamageKind::Physical)
            .unwrap();
    }
    let view = engine.state(id).unwrap();
    let bob_view = view.participant("Bob").unwrap();
    assert_eq!(bob_view.current_hp, 0);
    assert!(bob_view.is_defeated);
    assert!(!bob_view.is_active);
    assert_eq!(view.initiative_order.len(), 1);

    let defeats = engine
        .log(id)
        .unwrap()
        .iter()
        .filter(|e| e.event_type == EventType::Defeated)
        .count();
    assert_eq!(defeats, 1);
}

#[test]
fn defeat_mid_round_keeps_the_turn_in_place() {
    let engine = engine_with(&[3]);
    let (id, alice, bob) = alice_and_bob(&engine);
    engine.start(&gm(), id).unwrap();
    engine.advance_turn(&gm(), id).unwrap();
    assert_eq!(engine.state(id).unwrap().current_participant, Some(bob));

    engine
        .apply_damage(&gm(), id, alice, 10, DamageKind::Stun)
        .unwrap();
    let view = engine.state(id).unwrap();
    assert_eq!(view.turn, 0);
    assert_eq!(view.current_participant, Some(bob));

    let step = engine.advance_turn(&gm(), id).unwrap();
    assert!(step.new_round);
    assert_eq!(step.current_participant, Some(bob));
}

#[test]
fn completed_encounters_reject_commands() {
    let engine = engine_with(&[3]);
    let (id, alice, _) = alice_and_bob(&engine);
    engine.start(&gm(), id).unwrap();
    let cover = engine
        .add_effect(&gm(), id, alice, NewEffect::new("Cover", EffectType::Buff, 3))
        .unwrap();
    engine.end(&gm(), id).unwrap();
    assert_eq!(
        engine.state(id).unwrap().status,
        EncounterStatus::Completed
    );

    let before = engine.log(id).unwrap();
    assert!(matches!(
        engine.advance_turn(&gm(), id),
        Err(EncounterError::InvalidState { .. })
    ));
    assert!(matches!(
        engine.add_effect(&gm(), id, alice, NewEffect::new("Late", EffectType::Buff, 1)),
        Err(EncounterError::InvalidState { .. })
    ));
    assert!(matches!(
        engine.remove_effect(&gm(), id, cover),
        Err(EncounterError::InvalidState { .. })
    ));
    assert!(matches!(
        engine.apply_damage(&gm(), id, alice, 1, DamageKind::Physical),
        Err(EncounterError::InvalidState { .. })
    ));
    assert_eq!(engine.log(id).unwrap(), before);
    assert_eq!(before.last().unwrap().event_type, EventType::CombatEnd);
}

#[test]
fn log_groups_by_round_and_exports() {
    let engine = engine_with(&[3]);
    let (id, _, _) = alice_and_bob(&engine);
    engine.start(&gm(), id).unwrap();
    engine.advance_turn(&gm(), id).unwrap();
    engine.advance_turn(&gm(), id).unwrap();

    let rounds = engine.log_by_round(id).unwrap();
    assert_eq!(rounds.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(rounds[&2][0].event_type, EventType::RoundStart);

    let md = engine.export_markdown(id).unwrap();
    assert!(md.starts_with("# Back alley"));
    assert!(md.contains("## Round 2"));
    let text = engine.export_text(id).unwrap();
    assert!(text.contains("--- Round 1 ---"));
    assert!(text.contains("[turn_start] Bob's turn (Bob)"));
}
