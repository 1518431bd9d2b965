// Hamlet Engine Constants - SINGLE SOURCE OF TRUTH
//
// All tunable numbers of the simulation live in this file. Passes,
// pathfinding and the AI loop read from here so behaviour stays
// consistent across the whole engine.

/// Tile traversal costs, counted in ticks per step
pub mod tiles {
    /// Ticks needed to walk onto a normal tile
    pub const NORMAL_COST: u32 = 10;
    /// Ticks needed to walk onto a fast tile
    pub const FAST_COST: u32 = 7;
}

/// Pathfinding limits and crowd-avoidance weights
pub mod pathfinding {
    /// Hard cap on A* node expansions per search. Not a tunable; a
    /// safety valve against pathological maps.
    pub const MAX_EXPANSIONS: usize = 10_000;

    /// Extra step cost for tiles occupied by another mover, scaled by
    /// the inverse of the remaining distance to the goal.
    pub const CROWD_PENALTY: f64 = 20.0;

    /// Occupied tiles at most this close to the goal are not entered at
    /// all: never finish a route on top of (or next to) another mover.
    pub const CROWD_STANDOFF: u32 = 1;
}

/// Defaults for the demo wander/think behaviour
pub mod ai {
    /// Host-clock delay before a thinking task completes
    pub const THINKING_DELAY_MS: u64 = 1_000;
    /// Inclusive range of ticks spent waiting after a thought
    pub const MIN_WAIT_TICKS: u32 = 30;
    pub const MAX_WAIT_TICKS: u32 = 100;
    /// Inclusive range of tiles walked after the wait
    pub const MIN_WALK_TILES: u32 = 5;
    pub const MAX_WALK_TILES: u32 = 10;
}

/// Snapshot blob versioning
pub mod snapshot {
    /// Version written into every serialized world
    pub const FORMAT_VERSION: u32 = 1;
}
