//! Advance in-flight moves and finalise the ones on their last tick.

use crate::ecs::component::keys;
use crate::ecs::{ComponentValue, QueryDef, QueryId, World};
use crate::error::EngineResult;
use crate::pipeline::{Pass, TickContext};

pub struct MovementPass {
    query: QueryId,
}

impl MovementPass {
    pub fn new(world: &mut World) -> Self {
        let query = world.create_query(QueryDef::new(vec![keys::MOVE]));
        Self { query }
    }
}

impl Pass for MovementPass {
    fn name(&self) -> &'static str {
        "movement"
    }

    fn run(&mut self, world: &mut World, _ctx: &mut TickContext<'_>) -> EngineResult<()> {
        for id in world.members(self.query) {
            let Some(mut mv) = world.get(id, &keys::MOVE).and_then(ComponentValue::as_move).copied()
            else {
                continue;
            };
            mv.remaining_ticks = mv.remaining_ticks.saturating_sub(1);
            if mv.remaining_ticks <= 1 {
                world.set(id, keys::POSITION, ComponentValue::Position(mv.target_position))?;
                world.remove(id, &keys::MOVE);
            } else {
                world.set(id, keys::MOVE, ComponentValue::Move(mv))?;
            }
        }
        Ok(())
    }
}
