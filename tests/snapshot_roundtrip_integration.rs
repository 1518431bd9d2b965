// Snapshot round-trip integration tests.
//
// After any fixed tick sequence, saving, restoring and saving again
// must produce identical bytes, and the restored engine must keep
// simulating.

use hamlet_engine::ecs::component::keys;
use hamlet_engine::{
    AiConfig, ComponentValue, Engine, EngineOptions, ManualClock, MapStructure, MemoryPlatform,
    MinDice, PlayerInit, PortalGate, PortalSpec, ScriptApi, ScriptInitOptions,
};
use std::collections::BTreeMap;

fn town() -> MapStructure {
    let mut structure = MapStructure::open(6, 6);
    structure.tiles[14] = 0;
    structure.tiles[15] = 2;
    structure.portals.push(PortalSpec { from: 3, to: 33, direction: PortalGate::Right });
    structure
}

fn engine_from(saved: Option<Vec<u8>>) -> (Engine, ManualClock) {
    let clock = ManualClock::new();
    let engine = Engine::create(ScriptInitOptions {
        saved_data: saved,
        structure: town(),
        platform: Box::new(MemoryPlatform::new()),
        extra: EngineOptions {
            ai: AiConfig { thinking_delay_ms: 100, ..AiConfig::default() },
            clock: Some(Box::new(clock.clone())),
            dice: Some(Box::new(MinDice)),
        },
    })
    .expect("engine construction");
    (engine, clock)
}

fn roster() -> BTreeMap<String, PlayerInit> {
    let mut players = BTreeMap::new();
    players.insert("ada".to_string(), PlayerInit { x: Some(0), y: Some(0), direction: None });
    players.insert("bob".to_string(), PlayerInit { x: Some(5), y: Some(5), direction: None });
    players
}

/// Run a fixed schedule: a few plain ticks, a clock jump that completes
/// thinking tasks, then enough ticks to get walks moving.
fn run_fixed_sequence(engine: &mut Engine, clock: &ManualClock) {
    engine.setup_players(&roster()).unwrap();
    for _ in 0..3 {
        engine.tick().unwrap();
    }
    clock.advance(150);
    for _ in 0..40 {
        engine.tick().unwrap();
    }
}

#[test]
fn save_restore_save_is_byte_identical() {
    let (mut engine, clock) = engine_from(None);
    run_fixed_sequence(&mut engine, &clock);

    let first = engine.save().unwrap();
    let (restored, _clock) = engine_from(Some(first.clone()));
    let second = restored.save().unwrap();
    assert_eq!(first, second);
}

#[test]
fn restored_world_preserves_player_state() {
    let (mut engine, clock) = engine_from(None);
    run_fixed_sequence(&mut engine, &clock);
    let ada_before = {
        let ada = engine.player_entity("ada").unwrap();
        engine.world().get(ada, &keys::POSITION).and_then(ComponentValue::as_position).unwrap()
    };

    let snapshot = engine.save().unwrap();
    let (restored, _clock) = engine_from(Some(snapshot));
    let ada = restored.player_entity("ada").unwrap();
    let ada_after =
        restored.world().get(ada, &keys::POSITION).and_then(ComponentValue::as_position).unwrap();
    assert_eq!(ada_before, ada_after);
    assert!(restored.player_entity("bob").is_some());
}

#[test]
fn restored_engine_keeps_ticking() {
    let (mut engine, clock) = engine_from(None);
    run_fixed_sequence(&mut engine, &clock);
    let snapshot = engine.save().unwrap();

    let (mut restored, clock) = engine_from(Some(snapshot));
    restored.setup_players(&roster()).unwrap();
    clock.advance(500);
    for _ in 0..30 {
        let output = restored.tick().unwrap();
        assert_eq!(output.players.len(), 2);
    }
}

#[test]
fn snapshots_are_utf8_json() {
    let (mut engine, clock) = engine_from(None);
    run_fixed_sequence(&mut engine, &clock);
    let snapshot = engine.save().unwrap();
    let text = std::str::from_utf8(&snapshot).expect("snapshot is UTF-8");
    let value: serde_json::Value = serde_json::from_str(text).expect("snapshot is JSON");
    assert_eq!(value["version"], 1);
    assert!(value["entities"].as_array().is_some());
    assert!(value["entityManager"]["versions"].as_array().is_some());
}
