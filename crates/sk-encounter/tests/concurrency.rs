//! Commands submitted from many threads are serialized per encounter.

use std::sync::Arc;
use std::thread;

use sk_encounter::{
    AttackRequest, BaseDamage, Caller, DamageKind, Engine, EngineConfig, EventType,
    NewParticipant, SessionId, Team,
};

const THREADS: usize = 8;
const PER_THREAD: usize = 25;

#[test]
fn concurrent_damage_is_serialized() {
    let engine = Arc::new(Engine::new(EngineConfig::default()));
    let gm = Caller::controller("gm");
    let id = engine
        .create_encounter(&gm, SessionId::new(), "Stampede")
        .unwrap();
    let tank = engine
        .add_participant(
            &gm,
            id,
            NewParticipant::named("Tank", Team::Ally).with_max_hp(10_000),
        )
        .unwrap();
    engine.start(&gm, id).unwrap();

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let gm = gm.clone();
            thread::spawn(move || {
                for _ in 0..PER_THREAD {
                    engine
                        .apply_damage(&gm, id, tank, 1, DamageKind::Stun)
                        .unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let view = engine.state(id).unwrap();
    assert_eq!(
        view.participant("Tank").unwrap().stun_damage as usize,
        THREADS * PER_THREAD
    );

    let log = engine.log(id).unwrap();
    assert_eq!(
        log.iter()
            .filter(|e| e.event_type == EventType::Damage)
            .count(),
        THREADS * PER_THREAD
    );
    for pair in log.windows(2) {
        assert_eq!(pair[1].sequence, pair[0].sequence + 1);
        assert!(pair[1].timestamp >= pair[0].timestamp);
    }
}

#[test]
fn mixed_commands_keep_turn_state_consistent() {
    let engine = Arc::new(Engine::new(EngineConfig::default()));
    let gm = Caller::controller("gm");
    let id = engine
        .create_encounter(&gm, SessionId::new(), "Crossfire")
        .unwrap();
    let a = engine
        .add_participant(
            &gm,
            id,
            NewParticipant::named("A", Team::Player)
                .with_initiative(7)
                .with_max_hp(1_000),
        )
        .unwrap();
    let b = engine
        .add_participant(
            &gm,
            id,
            NewParticipant::named("B", Team::Enemy)
                .with_initiative(4)
                .with_max_hp(1_000),
        )
        .unwrap();
    engine.start(&gm, id).unwrap();

    let advancer = {
        let engine = Arc::clone(&engine);
        let gm = gm.clone();
        thread::spawn(move || {
            for _ in 0..40 {
                engine.advance_turn(&gm, id).unwrap();
            }
        })
    };
    let attacker = {
        let engine = Arc::clone(&engine);
        let gm = gm.clone();
        thread::spawn(move || {
            for _ in 0..40 {
                engine
                    .resolve_attack(
                        &gm,
                        id,
                        &AttackRequest {
                            attacker: a,
                            target: b,
                            attack_pool: 3,
                            base_damage: BaseDamage::stun(1),
                            weapon_ap: 0,
                            use_edge: false,
                        },
                    )
                    .unwrap();
            }
        })
    };
    advancer.join().unwrap();
    attacker.join().unwrap();

    let view = engine.state(id).unwrap();
    assert_eq!(view.round, 21);
    assert_eq!(view.turn, 0);
    let log = engine.log(id).unwrap();
    let attacks = log
        .iter()
        .filter(|e| matches!(e.event_type, EventType::Attack | EventType::Damage))
        .count();
    assert_eq!(attacks, 40);
}

#[test]
fn encounters_are_independent() {
    let engine = Arc::new(Engine::new(EngineConfig::default()));
    let gm = Caller::controller("gm");
    let session = SessionId::new();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let engine = Arc::clone(&engine);
            let gm = gm.clone();
            thread::spawn(move || {
                let id = engine
                    .create_encounter(&gm, session, format!("Fight {i}"))
                    .unwrap();
                let foe = engine
                    .add_participant(&gm, id, NewParticipant::named("Foe", Team::Enemy))
                    .unwrap();
                engine.start(&gm, id).unwrap();
                for _ in 0..10 {
                    engine.advance_turn(&gm, id).unwrap();
                }
                engine
                    .apply_damage(&gm, id, foe, 10, DamageKind::Physical)
                    .unwrap();
                engine.end(&gm, id).unwrap();
                id
            })
        })
        .collect();
    let ids: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    for id in ids {
        let view = engine.state(id).unwrap();
        assert_eq!(view.round, 11);
    }
    let totals = engine.session_totals(session).unwrap();
    assert_eq!(totals.encounters_faced, 4);
    assert_eq!(totals.enemies_defeated, 4);
}
