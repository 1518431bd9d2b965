/// Headless demo driver.
///
/// Builds a small map with a shortcut portal and two villagers, runs the
/// simulation for a while, prints the player views whenever something
/// moved, then proves the snapshot round-trip by saving, restoring and
/// continuing.
use anyhow::Result;
use hamlet_engine::{
    demo_entrypoint, AiConfig, Coord, EngineOptions, LogPlatform, MapStructure, PlayerInit,
    PortalGate, PortalSpec, ScriptApi, ScriptInitOptions,
};
use std::collections::BTreeMap;

fn demo_structure() -> MapStructure {
    let mut structure = MapStructure::open(12, 8);
    // a wall down the middle with a portal shortcut through it
    for y in 0..8 {
        let index = (y * 12 + 6) as usize;
        structure.tiles[index] = 0;
    }
    structure.tiles[3 * 12 + 6] = 1; // gap in the wall
    structure.portals.push(PortalSpec { from: 2, to: 9, direction: PortalGate::Right });
    structure.spawn_points = vec![Coord { x: 1, y: 1 }, Coord { x: 10, y: 6 }];
    structure
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let entrypoint = demo_entrypoint();
    log::info!("starting script `{}`", entrypoint.metadata.name);

    let mut engine = (entrypoint.create)(ScriptInitOptions {
        saved_data: None,
        structure: demo_structure(),
        platform: Box::new(LogPlatform),
        extra: EngineOptions {
            ai: AiConfig { thinking_delay_ms: 50, ..AiConfig::default() },
            ..EngineOptions::default()
        },
    })?;

    let roster: BTreeMap<String, PlayerInit> = ["ada", "bob"]
        .into_iter()
        .map(|id| (id.to_string(), PlayerInit::default()))
        .collect();
    engine.setup_players(&roster)?;

    for tick in 1..=200u32 {
        let output = engine.tick()?;
        if tick % 50 == 0 {
            for (player_id, view) in &output.players {
                log::info!(
                    "tick {tick}: {player_id} at ({}, {}) facing {} {}",
                    view.x,
                    view.y,
                    view.direction,
                    serde_json::to_string(&view.movement)?
                );
            }
        }
        std::thread::sleep(std::time::Duration::from_millis(5));
    }

    let snapshot = engine.save()?;
    log::info!("snapshot is {} bytes; restoring and continuing", snapshot.len());

    let mut restored = (demo_entrypoint().create)(ScriptInitOptions {
        saved_data: Some(snapshot),
        structure: demo_structure(),
        platform: Box::new(LogPlatform),
        extra: EngineOptions::default(),
    })?;
    restored.setup_players(&roster)?;
    for _ in 0..20 {
        restored.tick()?;
    }
    log::info!("restored run finished cleanly");
    Ok(())
}
