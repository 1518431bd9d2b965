//! Execute the next step of a path plan.
//!
//! A blocked step drops the whole plan; the goal component is still
//! there, so the planning pass rebuilds a route around the obstruction
//! on the next tick.

use crate::ecs::component::keys;
use crate::ecs::{ComponentValue, QueryDef, QueryId, World};
use crate::error::EngineResult;
use crate::pipeline::{Pass, TickContext};

pub struct PlanExecutionPass {
    query: QueryId,
}

impl PlanExecutionPass {
    pub fn new(world: &mut World) -> Self {
        let query = world.create_query(
            QueryDef::new(vec![keys::PATH_PLAN, keys::POSITION]).without(vec![keys::MOVE]),
        );
        Self { query }
    }
}

impl Pass for PlanExecutionPass {
    fn name(&self) -> &'static str {
        "plan-execution"
    }

    fn run(&mut self, world: &mut World, ctx: &mut TickContext<'_>) -> EngineResult<()> {
        for id in world.members(self.query) {
            if world.has(id, &keys::MOVE) {
                continue;
            }
            let Some(mut plan) =
                world.get(id, &keys::PATH_PLAN).and_then(ComponentValue::as_path_plan).cloned()
            else {
                continue;
            };
            if plan.next_action_index >= plan.path.len() {
                world.remove(id, &keys::PATH_PLAN);
                continue;
            }
            let Some(position) =
                world.get(id, &keys::POSITION).and_then(ComponentValue::as_position)
            else {
                continue;
            };
            let Ok(current) = ctx.map.index_of(position) else { continue };

            let direction = plan.path[plan.next_action_index];
            match ctx.map.generate_move(current, direction, |tile| ctx.colliders.has(tile)) {
                Some(mv) => {
                    ctx.colliders.set(mv.target_index);
                    world.set(id, keys::FACE_DIRECTION, ComponentValue::Direction(direction))?;
                    world.set(id, keys::MOVE, ComponentValue::Move(mv))?;
                    plan.next_action_index += 1;
                    world.set(id, keys::PATH_PLAN, ComponentValue::PathPlan(plan))?;
                }
                None => {
                    world.remove(id, &keys::PATH_PLAN);
                }
            }
        }
        Ok(())
    }
}
