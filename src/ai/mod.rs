//! Demo behaviour: idle players think, wait, then wander off.
//!
//! A small state machine over three queries. Idle players start a
//! thinking task; once the task completes they show a tip and arm a
//! timer; when the timer fires they clear the thinking state, report it
//! to the platform and take a short straight walk. Randomness comes in
//! through [`Dice`] so tests can pin every roll.

use crate::constants::ai as defaults;
use crate::ecs::component::keys;
use crate::ecs::{ComponentValue, PlayerStatus, QueryDef, QueryId, StraightWalk, World};
use crate::error::EngineResult;
use crate::grid::{Direction, ALL_DIRECTIONS};
use crate::pipeline::{Pass, TickContext};
use crate::script::platform::PlatformEvent;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Tunables for the wander behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AiConfig {
    pub thinking_delay_ms: u64,
    pub min_wait_ticks: u32,
    pub max_wait_ticks: u32,
    pub min_walk_tiles: u32,
    pub max_walk_tiles: u32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            thinking_delay_ms: defaults::THINKING_DELAY_MS,
            min_wait_ticks: defaults::MIN_WAIT_TICKS,
            max_wait_ticks: defaults::MAX_WAIT_TICKS,
            min_walk_tiles: defaults::MIN_WALK_TILES,
            max_walk_tiles: defaults::MAX_WALK_TILES,
        }
    }
}

/// Injectable randomness.
pub trait Dice {
    /// Uniform roll over an inclusive range.
    fn roll_range(&mut self, min: u32, max: u32) -> u32;
    fn roll_direction(&mut self) -> Direction;
}

/// The real dice.
pub struct RandomDice {
    rng: StdRng,
}

impl RandomDice {
    pub fn new() -> Self {
        Self { rng: StdRng::from_entropy() }
    }

    pub fn seeded(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }
}

impl Default for RandomDice {
    fn default() -> Self {
        Self::new()
    }
}

impl Dice for RandomDice {
    fn roll_range(&mut self, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        self.rng.gen_range(min..=max)
    }

    fn roll_direction(&mut self) -> Direction {
        ALL_DIRECTIONS[self.rng.gen_range(0..ALL_DIRECTIONS.len())]
    }
}

/// Deterministic dice: minimum of every range, first direction. Used by
/// tests that walk the whole behaviour loop.
#[derive(Debug, Default)]
pub struct MinDice;

impl Dice for MinDice {
    fn roll_range(&mut self, min: u32, _max: u32) -> u32 {
        min
    }

    fn roll_direction(&mut self) -> Direction {
        ALL_DIRECTIONS[0]
    }
}

/// The behaviour pass.
pub struct WanderPass {
    idle: QueryId,
    task_done: QueryId,
    timer_fired: QueryId,
}

impl WanderPass {
    pub fn new(world: &mut World) -> Self {
        let idle = world.create_query(
            QueryDef::new(vec![keys::PLAYER_INITED, keys::PLAYER_ID]).without(vec![
                keys::MOVE,
                keys::STRAIGHT_WALK,
                keys::PATH_PLAN,
                keys::GOAL_PATHFINDING,
                keys::THINKING,
            ]),
        );
        let task_done = world.create_query(
            QueryDef::new(vec![keys::THINKING, keys::TASK_COMPLETED_THINKING])
                .without(vec![keys::TIMER_THINKING, keys::TIMEOUT_THINKING]),
        );
        let timer_fired = world.create_query(QueryDef::new(vec![
            keys::THINKING,
            keys::PLAYER_ID,
            keys::TIMEOUT_THINKING,
        ]));
        Self { idle, task_done, timer_fired }
    }

    fn player_id(world: &World, id: crate::ecs::EntityId) -> Option<String> {
        world.get(id, &keys::PLAYER_ID).and_then(|v| v.as_text().map(str::to_string))
    }
}

impl Pass for WanderPass {
    fn name(&self) -> &'static str {
        "wander"
    }

    fn run(&mut self, world: &mut World, ctx: &mut TickContext<'_>) -> EngineResult<()> {
        // Idle players start thinking.
        for id in world.members(self.idle) {
            world.set_tag(id, keys::THINKING)?;
            world.set(id, keys::PLAYER_STATUS, ComponentValue::Status(PlayerStatus::Thinking))?;
            ctx.tasks.start(world, id, ctx.now_ms + ctx.ai.thinking_delay_ms)?;
        }

        // A finished thought shows its tip and arms the wait timer.
        for id in world.members(self.task_done) {
            let wait = ctx.dice.roll_range(ctx.ai.min_wait_ticks, ctx.ai.max_wait_ticks);
            world.set(id, keys::PLAYER_STATUS, ComponentValue::Status(PlayerStatus::Tip))?;
            world.set(id, keys::TIMER_THINKING, ComponentValue::Ticks(wait))?;
            if let Some(player_id) = Self::player_id(world, id) {
                ctx.platform.emit_event(PlatformEvent::ThinkingStart {
                    player_id,
                    content: format!("resting for {wait} ticks"),
                });
            }
        }

        // The timer fired: clear the thinking state and wander off.
        for id in world.members(self.timer_fired) {
            world.remove(id, &keys::PLAYER_STATUS);
            world.remove(id, &keys::THINKING);
            world.remove(id, &keys::TASK_THINKING);
            world.remove(id, &keys::TASK_COMPLETED_THINKING);
            world.remove(id, &keys::TIMEOUT_THINKING);
            if let Some(player_id) = Self::player_id(world, id) {
                ctx.platform.emit_event(PlatformEvent::ThinkingEnd { player_id });
            }
            let walk = StraightWalk {
                direction: ctx.dice.roll_direction(),
                remaining_distance: ctx.dice.roll_range(ctx.ai.min_walk_tiles, ctx.ai.max_walk_tiles),
            };
            world.set(id, keys::STRAIGHT_WALK, ComponentValue::StraightWalk(walk))?;
        }
        Ok(())
    }
}
