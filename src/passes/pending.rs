//! Apply queued reorientations to entities that are standing still.

use crate::ecs::component::keys;
use crate::ecs::{ComponentValue, QueryDef, QueryId, World};
use crate::error::EngineResult;
use crate::pipeline::{Pass, TickContext};

pub struct PendingPass {
    query: QueryId,
}

impl PendingPass {
    pub fn new(world: &mut World) -> Self {
        let query = world
            .create_query(QueryDef::new(vec![keys::PENDING_FACING]).without(vec![keys::MOVE]));
        Self { query }
    }
}

impl Pass for PendingPass {
    fn name(&self) -> &'static str {
        "pending"
    }

    fn run(&mut self, world: &mut World, _ctx: &mut TickContext<'_>) -> EngineResult<()> {
        for id in world.members(self.query) {
            if world.has(id, &keys::MOVE) {
                continue;
            }
            let Some(direction) =
                world.get(id, &keys::PENDING_FACING).and_then(ComponentValue::as_direction)
            else {
                continue;
            };
            world.set(id, keys::FACE_DIRECTION, ComponentValue::Direction(direction))?;
            world.remove(id, &keys::PENDING_FACING);
        }
        Ok(())
    }
}
