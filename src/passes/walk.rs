//! Drive straight walks, one move per completed step.
//!
//! The walk component persists across its steps and is dropped the
//! moment its distance is spent or a step is blocked.

use crate::ecs::component::keys;
use crate::ecs::{ComponentValue, QueryDef, QueryId, World};
use crate::error::EngineResult;
use crate::pipeline::{Pass, TickContext};

pub struct StraightWalkPass {
    query: QueryId,
}

impl StraightWalkPass {
    pub fn new(world: &mut World) -> Self {
        let query = world.create_query(
            QueryDef::new(vec![keys::POSITION, keys::STRAIGHT_WALK]).without(vec![keys::MOVE]),
        );
        Self { query }
    }
}

impl Pass for StraightWalkPass {
    fn name(&self) -> &'static str {
        "straight-walk"
    }

    fn run(&mut self, world: &mut World, ctx: &mut TickContext<'_>) -> EngineResult<()> {
        for id in world.members(self.query) {
            if world.has(id, &keys::MOVE) {
                continue;
            }
            let Some(mut walk) = world
                .get(id, &keys::STRAIGHT_WALK)
                .and_then(ComponentValue::as_straight_walk)
                .copied()
            else {
                continue;
            };
            if walk.remaining_distance == 0 {
                world.remove(id, &keys::STRAIGHT_WALK);
                continue;
            }
            let Some(position) =
                world.get(id, &keys::POSITION).and_then(ComponentValue::as_position)
            else {
                continue;
            };
            let Ok(current) = ctx.map.index_of(position) else { continue };

            match ctx.map.generate_move(current, walk.direction, |tile| ctx.colliders.has(tile)) {
                Some(mv) => {
                    ctx.colliders.set(mv.target_index);
                    world.set(id, keys::FACE_DIRECTION, ComponentValue::Direction(walk.direction))?;
                    world.set(id, keys::MOVE, ComponentValue::Move(mv))?;
                    walk.remaining_distance -= 1;
                    if walk.remaining_distance == 0 {
                        world.remove(id, &keys::STRAIGHT_WALK);
                    } else {
                        world.set(id, keys::STRAIGHT_WALK, ComponentValue::StraightWalk(walk))?;
                    }
                }
                None => {
                    world.remove(id, &keys::STRAIGHT_WALK);
                }
            }
        }
        Ok(())
    }
}
