//! Turn standing goals into concrete path plans.
//!
//! Runs for entities that want to be somewhere and have no plan yet.
//! A successful attempt attaches the plan and clears the retry count; a
//! failed one spends a retry, and exhausting the budget abandons the
//! goal.

use crate::ecs::component::keys;
use crate::ecs::{ComponentValue, QueryDef, QueryId, World};
use crate::error::EngineResult;
use crate::pathfinding::plan_route;
use crate::pipeline::{Pass, TickContext};

pub struct PathFindingPass {
    query: QueryId,
}

impl PathFindingPass {
    pub fn new(world: &mut World) -> Self {
        let query = world.create_query(
            QueryDef::new(vec![keys::POSITION, keys::GOAL_PATHFINDING])
                .without(vec![keys::PATH_PLAN]),
        );
        Self { query }
    }
}

impl Pass for PathFindingPass {
    fn name(&self) -> &'static str {
        "pathfinding"
    }

    fn run(&mut self, world: &mut World, ctx: &mut TickContext<'_>) -> EngineResult<()> {
        for id in world.members(self.query) {
            if world.has(id, &keys::PATH_PLAN) {
                continue;
            }
            let Some(position) =
                world.get(id, &keys::POSITION).and_then(ComponentValue::as_position)
            else {
                continue;
            };
            let Some(mut goal) =
                world.get(id, &keys::GOAL_PATHFINDING).and_then(ComponentValue::as_goal).copied()
            else {
                continue;
            };
            let Ok(current) = ctx.map.index_of(position) else { continue };
            if current == goal.target_index {
                world.remove(id, &keys::GOAL_PATHFINDING);
                continue;
            }

            match plan_route(ctx.map, current, goal.target_index, ctx.colliders) {
                Some(plan) => {
                    world.set(id, keys::PATH_PLAN, ComponentValue::PathPlan(plan))?;
                    if goal.retry_count != 0 {
                        goal.retry_count = 0;
                        world.set(id, keys::GOAL_PATHFINDING, ComponentValue::Goal(goal))?;
                    }
                }
                None => {
                    goal.retry_count += 1;
                    if goal.retry_count >= goal.max_retries {
                        log::debug!(
                            "entity {id}: no route to tile {} after {} attempts, abandoning goal",
                            goal.target_index,
                            goal.retry_count
                        );
                        world.remove(id, &keys::GOAL_PATHFINDING);
                    } else {
                        world.set(id, keys::GOAL_PATHFINDING, ComponentValue::Goal(goal))?;
                    }
                }
            }
        }
        Ok(())
    }
}
