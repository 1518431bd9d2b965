//! Hamlet Engine
//!
//! A deterministic, tick-driven grid-world simulation. The host supplies
//! a tile map (portals, named areas) and a player roster; every tick the
//! engine advances physics, pathfinding, timers and the scripted
//! behaviour, then reports one view per player. Narrative events flow
//! out through the platform sink, and the whole world state round-trips
//! through an opaque JSON snapshot.

pub mod ai;
pub mod constants;
pub mod ecs;
pub mod error;
pub mod grid;
pub mod map;
pub mod passes;
pub mod pathfinding;
pub mod pipeline;
pub mod script;
pub mod task;

pub use ai::{AiConfig, Dice, MinDice, RandomDice};
pub use ecs::{
    ComponentKey, ComponentKind, ComponentValue, EntityId, Goal, Move, PathPlan, PlayerStatus,
    QueryDef, StraightWalk, World,
};
pub use error::{EngineError, EngineResult};
pub use grid::{Direction, GridDims, Position, TileBitSet};
pub use map::{Area, GameMap, Portal, Tile};
pub use script::{
    demo_entrypoint, AreaSpec, Coord, Engine, EngineOptions, LogPlatform, MapStructure,
    MemoryPlatform, Platform, PlatformEvent, PlayerInit, PlayerView, PortalGate, PortalSpec,
    ScriptApi, ScriptEntrypoint, ScriptInitOptions, TickOutput,
};
pub use task::{Clock, ManualClock, MonotonicClock};
