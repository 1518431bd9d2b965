//! Host-facing script façade.
//!
//! The host hands over a map structure and a platform sink, keeps the
//! player roster in sync, and calls `tick()` on its own timer. Each tick
//! returns one view per player; `save()` returns the opaque snapshot
//! blob that `create` accepts back.

pub mod banner;
pub mod platform;
pub mod structure;

pub use banner::{parse_banner, render_banner, ScriptMetadata};
pub use platform::{LogPlatform, MemoryPlatform, Platform, PlatformEvent};
pub use structure::{AreaSpec, Coord, MapStructure, PortalGate, PortalSpec};

use crate::ai::{AiConfig, Dice, RandomDice};
use crate::ecs::component::keys;
use crate::ecs::{ComponentKind, ComponentValue, EntityId, World};
use crate::error::EngineResult;
use crate::grid::{Direction, Position, TileBitSet};
use crate::map::GameMap;
use crate::passes::default_pipeline;
use crate::pipeline::{Pipeline, TickContext};
use crate::task::{Clock, MonotonicClock, TaskManager};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Initial placement of one player. Missing coordinates fall back to the
/// map's spawn points in round-robin order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerInit {
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub direction: Option<Direction>,
}

/// Progress of a move as shown to renderers. `current` is `-1` for
/// exactly one tick after a move finishes, so the renderer can settle
/// the final frame of the step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoveView {
    pub current: i64,
    pub total: u32,
}

/// Per-player view emitted every tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub x: i32,
    pub y: i32,
    /// 0 up, 1 down, 2 left, 3 right.
    pub direction: u8,
    #[serde(rename = "move", skip_serializing_if = "Option::is_none")]
    pub movement: Option<MoveView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,
}

/// Result of one tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickOutput {
    pub players: BTreeMap<String, PlayerView>,
}

/// What a host gives `create`.
pub struct ScriptInitOptions {
    pub saved_data: Option<Vec<u8>>,
    pub structure: MapStructure,
    pub platform: Box<dyn Platform>,
    pub extra: EngineOptions,
}

/// Engine knobs beyond the map: behaviour tuning plus injectable clock
/// and randomness for deterministic runs.
#[derive(Default)]
pub struct EngineOptions {
    pub ai: AiConfig,
    pub clock: Option<Box<dyn Clock>>,
    pub dice: Option<Box<dyn Dice>>,
}

/// The surface a host drives.
pub trait ScriptApi {
    fn setup_players(&mut self, desired: &BTreeMap<String, PlayerInit>) -> EngineResult<()>;
    fn tick(&mut self) -> EngineResult<TickOutput>;
    fn save(&self) -> EngineResult<Vec<u8>>;
}

/// A packaged script: its banner metadata and constructor.
pub struct ScriptEntrypoint {
    pub metadata: ScriptMetadata,
    pub create: fn(ScriptInitOptions) -> EngineResult<Engine>,
}

/// The built-in wandering-villagers script.
pub fn demo_entrypoint() -> ScriptEntrypoint {
    ScriptEntrypoint {
        metadata: ScriptMetadata {
            name: "hamlet".to_string(),
            description: "Villagers wander the map, pausing to think.".to_string(),
            plugins: Vec::new(),
            extra: None,
        },
        create: Engine::create,
    }
}

/// The simulation engine behind the script façade.
pub struct Engine {
    map: GameMap,
    world: World,
    pipeline: Pipeline,
    tasks: TaskManager,
    colliders: TileBitSet,
    clock: Box<dyn Clock>,
    dice: Box<dyn Dice>,
    platform: Box<dyn Platform>,
    ai: AiConfig,
    spawn_points: Vec<Position>,
    players: BTreeMap<String, EntityId>,
    last_moves: HashMap<u32, u32>,
    tick: u64,
    next_spawn: usize,
    next_conversation: u64,
}

impl Engine {
    pub fn create(options: ScriptInitOptions) -> EngineResult<Self> {
        let map = options.structure.build()?;
        let spawn_points: Vec<Position> =
            options.structure.spawn_points.iter().map(|&coord| coord.into()).collect();

        let mut world = World::new();
        let tasks = TaskManager::new(ComponentKind::Thinking);
        tasks.install_hooks(&mut world);

        let mut players = BTreeMap::new();
        if let Some(bytes) = &options.saved_data {
            world.load_bytes(bytes)?;
            for id in world.entities() {
                if let Some(player_id) =
                    world.get(id, &keys::PLAYER_ID).and_then(|v| v.as_text().map(str::to_string))
                {
                    players.insert(player_id, id);
                }
            }
            log::info!("restored world: {} entities, {} players", world.entity_count(), players.len());
        }

        let pipeline = default_pipeline(&mut world);
        let colliders = TileBitSet::new(map.dims().len());

        Ok(Self {
            map,
            world,
            pipeline,
            tasks,
            colliders,
            clock: options.extra.clock.unwrap_or_else(|| Box::new(MonotonicClock::new())),
            dice: options.extra.dice.unwrap_or_else(|| Box::new(RandomDice::new())),
            platform: options.platform,
            ai: options.extra.ai,
            spawn_points,
            players,
            last_moves: HashMap::new(),
            tick: 0,
            next_spawn: 0,
            next_conversation: 0,
        })
    }

    pub fn map(&self) -> &GameMap {
        &self.map
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Direct world access for scripted behaviour beyond the built-in
    /// loop (goals, timers, statuses).
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn player_entity(&self, player_id: &str) -> Option<EntityId> {
        self.players.get(player_id).copied()
    }

    /// Name of the area the player currently stands in.
    pub fn area_of_player(&self, player_id: &str) -> Option<&str> {
        let entity = self.player_entity(player_id)?;
        let position =
            self.world.get(entity, &keys::POSITION).and_then(ComponentValue::as_position)?;
        let index = self.map.index_of(position).ok()?;
        self.map.area_at(index).map(|area| area.name.as_str())
    }

    // --- conversations ----------------------------------------------------

    /// Open a conversation between players and announce it.
    pub fn start_conversation(&mut self, player_ids: Vec<String>) -> String {
        self.next_conversation += 1;
        let conversation_id = format!("conv-{}", self.next_conversation);
        self.platform.emit_event(PlatformEvent::ConversationStart {
            conversation_id: conversation_id.clone(),
            player_ids,
        });
        conversation_id
    }

    pub fn post_conversation(
        &mut self,
        conversation_id: &str,
        source: Option<String>,
        content: String,
    ) {
        self.platform.emit_event(PlatformEvent::ConversationUpdate {
            conversation_id: conversation_id.to_string(),
            source,
            content,
        });
    }

    pub fn end_conversation(&mut self, conversation_id: &str) {
        self.platform.emit_event(PlatformEvent::ConversationEnd {
            conversation_id: conversation_id.to_string(),
        });
    }

    // --- internals ---------------------------------------------------------

    fn spawn_position(&mut self, init: &PlayerInit) -> Position {
        if let (Some(x), Some(y)) = (init.x, init.y) {
            return Position::new(x, y);
        }
        if self.spawn_points.is_empty() {
            return Position::new(0, 0);
        }
        let position = self.spawn_points[self.next_spawn % self.spawn_points.len()];
        self.next_spawn += 1;
        position
    }

    fn create_player(&mut self, player_id: &str, init: &PlayerInit) -> EngineResult<EntityId> {
        let position = self.spawn_position(init);
        let facing = init.direction.unwrap_or(Direction::Down);
        let entity = self.world.create_entity();
        self.world.set(entity, keys::POSITION, ComponentValue::Position(position))?;
        self.world.set(entity, keys::FACE_DIRECTION, ComponentValue::Direction(facing))?;
        self.world.set_tag(entity, keys::DYNAMIC_COLLIDER)?;
        self.world.set(entity, keys::PLAYER_ID, ComponentValue::Text(player_id.to_string()))?;
        self.world.set_tag(entity, keys::PLAYER_INITED)?;
        log::info!("player {player_id} joined at ({}, {})", position.x, position.y);
        Ok(entity)
    }

    fn player_view(&mut self, entity: EntityId) -> Option<PlayerView> {
        let position =
            self.world.get(entity, &keys::POSITION).and_then(ComponentValue::as_position)?;
        let direction = self
            .world
            .get(entity, &keys::FACE_DIRECTION)
            .and_then(ComponentValue::as_direction)
            .unwrap_or(Direction::Down);

        let movement = match self.world.get(entity, &keys::MOVE).and_then(ComponentValue::as_move)
        {
            Some(mv) => {
                self.last_moves.insert(entity.index, mv.total_ticks);
                Some(MoveView {
                    current: i64::from(mv.total_ticks - mv.remaining_ticks),
                    total: mv.total_ticks,
                })
            }
            None => self
                .last_moves
                .remove(&entity.index)
                .map(|total| MoveView { current: -1, total }),
        };

        let status = match self.world.get(entity, &keys::PLAYER_STATUS) {
            Some(ComponentValue::Status(status)) => Some(status.to_json()),
            _ => None,
        };

        Some(PlayerView { x: position.x, y: position.y, direction: direction.code(), movement, status })
    }
}

impl ScriptApi for Engine {
    /// Bring the roster in line with `desired`: create the missing
    /// players, drop the delisted ones, queue reorientations for players
    /// whose facing changed.
    fn setup_players(&mut self, desired: &BTreeMap<String, PlayerInit>) -> EngineResult<()> {
        let stale: Vec<String> =
            self.players.keys().filter(|id| !desired.contains_key(*id)).cloned().collect();
        for player_id in stale {
            if let Some(entity) = self.players.remove(&player_id) {
                self.tasks.stop(&mut self.world, entity);
                self.world.destroy_entity(entity);
                self.last_moves.remove(&entity.index);
                log::info!("player {player_id} left");
            }
        }

        for (player_id, init) in desired {
            match self.players.get(player_id).copied() {
                Some(entity) => {
                    if let Some(direction) = init.direction {
                        let facing = self
                            .world
                            .get(entity, &keys::FACE_DIRECTION)
                            .and_then(ComponentValue::as_direction);
                        if facing != Some(direction) {
                            self.world.set(
                                entity,
                                keys::PENDING_FACING,
                                ComponentValue::Direction(direction),
                            )?;
                        }
                    }
                }
                None => {
                    let entity = self.create_player(player_id, init)?;
                    self.players.insert(player_id.clone(), entity);
                }
            }
        }
        self.world.sync();
        Ok(())
    }

    fn tick(&mut self) -> EngineResult<TickOutput> {
        self.tick += 1;
        let now_ms = self.clock.now_ms();
        self.tasks.drain_due(&mut self.world, now_ms)?;

        let mut ctx = TickContext {
            map: &self.map,
            colliders: &mut self.colliders,
            platform: self.platform.as_mut(),
            dice: self.dice.as_mut(),
            tasks: &mut self.tasks,
            ai: &self.ai,
            now_ms,
            tick: self.tick,
        };
        self.pipeline.run_tick(&mut self.world, &mut ctx)?;

        let roster: Vec<(String, EntityId)> =
            self.players.iter().map(|(id, entity)| (id.clone(), *entity)).collect();
        let mut players = BTreeMap::new();
        for (player_id, entity) in roster {
            if let Some(view) = self.player_view(entity) {
                players.insert(player_id, view);
            }
        }
        Ok(TickOutput { players })
    }

    /// Snapshot the world between ticks.
    fn save(&self) -> EngineResult<Vec<u8>> {
        self.world.save_bytes()
    }
}
