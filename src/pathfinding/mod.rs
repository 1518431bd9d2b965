//! Two-level pathfinding: bounded A* inside an island, precomputed
//! portal routes between islands.

pub mod astar;
pub mod heap;
pub mod planner;

pub use astar::{search, SearchConfig, SearchOutcome};
pub use heap::IndexedMinHeap;
pub use planner::plan_route;
