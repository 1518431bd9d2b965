// Straight-walk and movement integration tests.
//
// Drives the full engine through the facade and checks the tick-by-tick
// movement contract: travel time per tile class, the decrementing move
// counter, and the one-tick "just finished" sentinel in player views.

use hamlet_engine::ecs::component::keys;
use hamlet_engine::{
    ComponentValue, Direction, Engine, EngineOptions, MapStructure, MemoryPlatform, PlayerInit,
    ScriptApi, ScriptInitOptions, StraightWalk,
};
use std::collections::BTreeMap;

fn engine_with_map(structure: MapStructure) -> Engine {
    Engine::create(ScriptInitOptions {
        saved_data: None,
        structure,
        platform: Box::new(MemoryPlatform::new()),
        extra: EngineOptions::default(),
    })
    .expect("engine construction")
}

fn one_player(x: i32, y: i32) -> BTreeMap<String, PlayerInit> {
    let mut roster = BTreeMap::new();
    roster.insert(
        "ada".to_string(),
        PlayerInit { x: Some(x), y: Some(y), direction: Some(Direction::Right) },
    );
    roster
}

fn start_walk(engine: &mut Engine, direction: Direction, distance: u32) {
    let ada = engine.player_entity("ada").unwrap();
    engine
        .world_mut()
        .set(
            ada,
            keys::STRAIGHT_WALK,
            ComponentValue::StraightWalk(StraightWalk {
                direction,
                remaining_distance: distance,
            }),
        )
        .unwrap();
    engine.world_mut().sync();
}

#[test]
fn single_step_walk_takes_ten_ticks() {
    let mut structure = MapStructure::open(3, 1);
    structure.tiles = vec![1, 1, 1];
    let mut engine = engine_with_map(structure);
    engine.setup_players(&one_player(0, 0)).unwrap();
    start_walk(&mut engine, Direction::Right, 1);
    let ada = engine.player_entity("ada").unwrap();

    // tick 1 starts the move; ticks 2..9 count it down from 10 to 2
    for tick in 1..=9u32 {
        engine.tick().unwrap();
        let mv = engine
            .world()
            .get(ada, &keys::MOVE)
            .and_then(ComponentValue::as_move)
            .copied()
            .expect("move in flight");
        assert_eq!(mv.total_ticks, 10);
        assert_eq!(mv.remaining_ticks, 11 - tick);
    }

    // tick 10 lands the step
    let output = engine.tick().unwrap();
    assert!(!engine.world().has(ada, &keys::MOVE));
    assert!(!engine.world().has(ada, &keys::STRAIGHT_WALK));
    let view = &output.players["ada"];
    assert_eq!((view.x, view.y), (1, 0));
}

#[test]
fn fast_tile_walk_takes_seven_ticks() {
    let mut structure = MapStructure::open(2, 1);
    structure.tiles = vec![1, 2];
    let mut engine = engine_with_map(structure);
    engine.setup_players(&one_player(0, 0)).unwrap();
    start_walk(&mut engine, Direction::Right, 1);
    let ada = engine.player_entity("ada").unwrap();

    engine.tick().unwrap();
    let mv = engine
        .world()
        .get(ada, &keys::MOVE)
        .and_then(ComponentValue::as_move)
        .copied()
        .expect("move started");
    assert_eq!(mv.total_ticks, 7);

    for _ in 2..=6u32 {
        engine.tick().unwrap();
        assert!(engine.world().has(ada, &keys::MOVE));
    }
    engine.tick().unwrap(); // tick 7
    assert!(!engine.world().has(ada, &keys::MOVE));
    let position = engine
        .world()
        .get(ada, &keys::POSITION)
        .and_then(ComponentValue::as_position)
        .unwrap();
    assert_eq!((position.x, position.y), (1, 0));
}

#[test]
fn views_report_progress_and_the_finish_sentinel() {
    let mut engine = engine_with_map(MapStructure::open(3, 1));
    engine.setup_players(&one_player(0, 0)).unwrap();
    start_walk(&mut engine, Direction::Right, 1);

    let first = engine.tick().unwrap();
    let view = &first.players["ada"];
    let mv = view.movement.expect("progress while moving");
    assert_eq!((mv.current, mv.total), (0, 10));

    let mut last = first;
    for _ in 2..=9u32 {
        last = engine.tick().unwrap();
    }
    let mv = last.players["ada"].movement.unwrap();
    assert_eq!((mv.current, mv.total), (8, 10));

    // arrival tick reports the sentinel exactly once
    let arrival = engine.tick().unwrap();
    let mv = arrival.players["ada"].movement.expect("finish sentinel");
    assert_eq!((mv.current, mv.total), (-1, 10));

    let after = engine.tick().unwrap();
    assert!(after.players["ada"].movement.is_none());
}

#[test]
fn walks_stop_at_the_grid_edge() {
    let mut engine = engine_with_map(MapStructure::open(2, 1));
    engine.setup_players(&one_player(1, 0)).unwrap();
    start_walk(&mut engine, Direction::Right, 3);
    let ada = engine.player_entity("ada").unwrap();

    engine.tick().unwrap();
    assert!(!engine.world().has(ada, &keys::MOVE));
    assert!(!engine.world().has(ada, &keys::STRAIGHT_WALK));
}

#[test]
fn multi_step_walk_advances_one_tile_per_leg() {
    let mut engine = engine_with_map(MapStructure::open(4, 1));
    engine.setup_players(&one_player(0, 0)).unwrap();
    start_walk(&mut engine, Direction::Right, 2);
    let ada = engine.player_entity("ada").unwrap();

    // leg one: started tick 1, lands tick 10
    for _ in 1..=10u32 {
        engine.tick().unwrap();
    }
    let position = engine
        .world()
        .get(ada, &keys::POSITION)
        .and_then(ComponentValue::as_position)
        .unwrap();
    assert_eq!(position.x, 1);
    // the walk still owes one tile
    assert!(engine.world().has(ada, &keys::STRAIGHT_WALK));

    // leg two starts on the next tick and lands nine ticks later
    for _ in 1..=10u32 {
        engine.tick().unwrap();
    }
    let position = engine
        .world()
        .get(ada, &keys::POSITION)
        .and_then(ComponentValue::as_position)
        .unwrap();
    assert_eq!(position.x, 2);
    assert!(!engine.world().has(ada, &keys::STRAIGHT_WALK));
    assert!(!engine.world().has(ada, &keys::MOVE));
}
