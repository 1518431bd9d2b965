//! Core tick passes.
//!
//! Order matters and is fixed here: reorientation first, then timers,
//! the collider scan, movement progress, route planning, plan execution
//! and straight walks. Behaviour passes (the demo AI) run after these;
//! the pipeline syncs the world at the end of every tick.

pub mod collider;
pub mod movement;
pub mod pathfind;
pub mod pending;
pub mod plan;
pub mod timer;
pub mod walk;

pub use collider::DynamicColliderPass;
pub use movement::MovementPass;
pub use pathfind::PathFindingPass;
pub use pending::PendingPass;
pub use plan::PlanExecutionPass;
pub use timer::TimerPass;
pub use walk::StraightWalkPass;

use crate::ai::WanderPass;
use crate::ecs::World;
use crate::pipeline::{Pass, Pipeline};

/// The engine's pass order, with the demo behaviour pass at the end.
pub fn default_pipeline(world: &mut World) -> Pipeline {
    let passes: Vec<Box<dyn Pass>> = vec![
        Box::new(PendingPass::new(world)),
        Box::new(TimerPass::new()),
        Box::new(DynamicColliderPass::new(world)),
        Box::new(MovementPass::new(world)),
        Box::new(PathFindingPass::new(world)),
        Box::new(PlanExecutionPass::new(world)),
        Box::new(StraightWalkPass::new(world)),
        Box::new(WanderPass::new(world)),
    ];
    Pipeline::new(passes)
}
