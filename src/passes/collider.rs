//! Rebuild the dynamic-collision bitset for this tick.
//!
//! Every collider entity claims the tile it stands on; one mid-move also
//! claims the tile it is heading to. Later passes only ever read the
//! bitset built here (plus the targets they mark for moves they start).

use crate::ecs::component::keys;
use crate::ecs::{ComponentValue, QueryDef, QueryId, World};
use crate::error::EngineResult;
use crate::pipeline::{Pass, TickContext};

pub struct DynamicColliderPass {
    query: QueryId,
}

impl DynamicColliderPass {
    pub fn new(world: &mut World) -> Self {
        let query =
            world.create_query(QueryDef::new(vec![keys::DYNAMIC_COLLIDER, keys::POSITION]));
        Self { query }
    }
}

impl Pass for DynamicColliderPass {
    fn name(&self) -> &'static str {
        "dynamic-collider"
    }

    fn run(&mut self, world: &mut World, ctx: &mut TickContext<'_>) -> EngineResult<()> {
        ctx.colliders.reset(ctx.map.dims().len());
        for id in world.members(self.query) {
            let Some(position) =
                world.get(id, &keys::POSITION).and_then(ComponentValue::as_position)
            else {
                continue;
            };
            if let Ok(index) = ctx.map.index_of(position) {
                ctx.colliders.set(index);
            }
            if let Some(mv) = world.get(id, &keys::MOVE).and_then(ComponentValue::as_move) {
                ctx.colliders.set(mv.target_index);
            }
        }
        Ok(())
    }
}
