//! Tick pipeline: an ordered, synchronous sequence of passes.
//!
//! Each tick runs every pass once, in a fixed and meaningful order, then
//! syncs the world so the next tick sees a consistent snapshot. Passes
//! share the per-tick resources through [`TickContext`].

use crate::ai::{AiConfig, Dice};
use crate::ecs::World;
use crate::error::EngineResult;
use crate::grid::TileBitSet;
use crate::map::GameMap;
use crate::script::platform::Platform;
use crate::task::TaskManager;

/// Per-tick shared resources handed to every pass.
pub struct TickContext<'a> {
    pub map: &'a GameMap,
    /// Tiles claimed by movers this tick. Rebuilt by the collider pass;
    /// later passes mark the targets of moves they start.
    pub colliders: &'a mut TileBitSet,
    pub platform: &'a mut dyn Platform,
    pub dice: &'a mut dyn Dice,
    pub tasks: &'a mut TaskManager,
    pub ai: &'a AiConfig,
    /// Host clock reading taken at the top of the tick.
    pub now_ms: u64,
    /// Monotonic tick counter.
    pub tick: u64,
}

/// One stage of the tick.
pub trait Pass {
    fn name(&self) -> &'static str;
    fn run(&mut self, world: &mut World, ctx: &mut TickContext<'_>) -> EngineResult<()>;
}

/// Ordered pass list. The order is part of the engine's semantics.
pub struct Pipeline {
    passes: Vec<Box<dyn Pass>>,
}

impl Pipeline {
    pub fn new(passes: Vec<Box<dyn Pass>>) -> Self {
        Self { passes }
    }

    /// Run every pass once, then sync the world.
    pub fn run_tick(&mut self, world: &mut World, ctx: &mut TickContext<'_>) -> EngineResult<()> {
        for pass in &mut self.passes {
            log::trace!("tick {}: pass {}", ctx.tick, pass.name());
            pass.run(world, ctx)?;
        }
        world.sync();
        Ok(())
    }
}
