// Timer and task lifecycle integration tests.
//
// A timer relation counts down one pass per tick, flips into a timeout
// marker on expiry, and never coexists with it. Task completion is
// driven by the injected clock and lands as a completed-relation the
// consumer picks up on the next tick.

use hamlet_engine::ecs::component::keys;
use hamlet_engine::{
    ComponentKey, ComponentKind, ComponentValue, Engine, EngineOptions, ManualClock, MapStructure,
    MemoryPlatform, MinDice, PlayerInit, ScriptApi, ScriptInitOptions,
};
use std::collections::BTreeMap;

const TIMER_MARK: ComponentKey =
    ComponentKey::relation_to_component(ComponentKind::Timer, ComponentKind::PlayerInited);
const TIMEOUT_MARK: ComponentKey =
    ComponentKey::relation_to_component(ComponentKind::Timeout, ComponentKind::PlayerInited);

fn engine_with_clock() -> (Engine, ManualClock) {
    let clock = ManualClock::new();
    let engine = Engine::create(ScriptInitOptions {
        saved_data: None,
        structure: MapStructure::open(4, 4),
        platform: Box::new(MemoryPlatform::new()),
        extra: EngineOptions {
            clock: Some(Box::new(clock.clone())),
            dice: Some(Box::new(MinDice)),
            ..EngineOptions::default()
        },
    })
    .expect("engine construction");
    (engine, clock)
}

#[test]
fn timer_counts_down_then_flips_to_timeout() {
    let (mut engine, _clock) = engine_with_clock();
    let e = engine.world_mut().create_entity();
    engine.world_mut().set(e, TIMER_MARK, ComponentValue::Ticks(2)).unwrap();
    engine.world_mut().sync();

    let remaining = |engine: &Engine| {
        engine.world().get(e, &TIMER_MARK).and_then(ComponentValue::as_ticks)
    };

    engine.tick().unwrap();
    assert_eq!(remaining(&engine), Some(1));
    engine.tick().unwrap();
    assert_eq!(remaining(&engine), Some(0));

    engine.tick().unwrap();
    assert_eq!(remaining(&engine), None);
    assert!(engine.world().has(e, &TIMEOUT_MARK));

    // the consumer clears the timeout; nothing re-raises it
    engine.world_mut().remove(e, &TIMEOUT_MARK);
    engine.world_mut().sync();
    engine.tick().unwrap();
    assert!(!engine.world().has(e, &TIMEOUT_MARK));
    assert_eq!(remaining(&engine), None);
}

#[test]
fn timer_and_timeout_never_coexist() {
    let (mut engine, _clock) = engine_with_clock();
    let e = engine.world_mut().create_entity();
    engine.world_mut().set(e, TIMER_MARK, ComponentValue::Ticks(3)).unwrap();
    engine.world_mut().sync();

    for _ in 0..6 {
        engine.tick().unwrap();
        let both = engine.world().has(e, &TIMER_MARK) && engine.world().has(e, &TIMEOUT_MARK);
        assert!(!both);
    }
}

#[test]
fn completion_waits_for_the_host_clock() {
    let (mut engine, clock) = engine_with_clock();
    let mut roster = BTreeMap::new();
    roster.insert("ada".to_string(), PlayerInit { x: Some(0), y: Some(0), direction: None });
    engine.setup_players(&roster).unwrap();
    let ada = engine.player_entity("ada").unwrap();

    // tick 1: idle kicks off the thinking task
    engine.tick().unwrap();
    assert!(engine.world().has(ada, &keys::TASK_THINKING));
    assert!(!engine.world().has(ada, &keys::TASK_COMPLETED_THINKING));

    // ticks pass, but the clock has not: no completion
    for _ in 0..5 {
        engine.tick().unwrap();
    }
    assert!(engine.world().has(ada, &keys::TASK_THINKING));

    // once the delay elapses, the next tick performs the hand-off; the
    // behaviour consumes the completion in the same tick and arms its
    // timer
    clock.advance(1_000);
    engine.tick().unwrap();
    assert!(!engine.world().has(ada, &keys::TASK_THINKING));
    assert!(engine.world().has(ada, &keys::TIMER_THINKING));
}

#[test]
fn deleting_a_player_cancels_its_task() {
    let (mut engine, clock) = engine_with_clock();
    let mut roster = BTreeMap::new();
    roster.insert("ada".to_string(), PlayerInit::default());
    engine.setup_players(&roster).unwrap();

    engine.tick().unwrap(); // thinking task started

    engine.setup_players(&BTreeMap::new()).unwrap(); // ada leaves
    clock.advance(10_000);
    // draining the stale completion must not resurrect anything
    engine.tick().unwrap();
    assert_eq!(engine.world().entity_count(), 0);
}

#[test]
fn restored_snapshot_strips_orphan_tasks() {
    let (mut engine, _clock) = engine_with_clock();
    let mut roster = BTreeMap::new();
    roster.insert("ada".to_string(), PlayerInit::default());
    engine.setup_players(&roster).unwrap();
    engine.tick().unwrap(); // ada is now mid-task
    let snapshot = engine.save().unwrap();

    let (mut restored_engine, _clock2) = {
        let clock = ManualClock::new();
        let engine = Engine::create(ScriptInitOptions {
            saved_data: Some(snapshot),
            structure: MapStructure::open(4, 4),
            platform: Box::new(MemoryPlatform::new()),
            extra: EngineOptions {
                clock: Some(Box::new(clock.clone())),
                dice: Some(Box::new(MinDice)),
                ..EngineOptions::default()
            },
        })
        .expect("restore");
        (engine, clock)
    };

    let ada = restored_engine.player_entity("ada").unwrap();
    // the relation came back with the snapshot, but no handle exists, so
    // the first sync strips it
    restored_engine.tick().unwrap();
    assert!(!restored_engine.world().has(ada, &keys::TASK_THINKING));
}
