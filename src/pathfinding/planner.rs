//! Route planning on top of the tile search.
//!
//! Same-island goals run one A*. Cross-island goals pick the cheapest
//! precomputed portal route and plan only the leg to the first portal;
//! once the mover lands on the next island the goal component is still
//! there and the next planning pass continues from the new tile.

use crate::ecs::PathPlan;
use crate::grid::{Position, TileBitSet};
use crate::map::GameMap;
use crate::pathfinding::astar::{search, SearchConfig};

/// Plan a route from `start` to `goal`, avoiding tiles claimed this
/// tick. `None` means the attempt failed and the caller should spend a
/// retry.
pub fn plan_route(
    map: &GameMap,
    start: usize,
    goal: usize,
    colliders: &TileBitSet,
) -> Option<PathPlan> {
    // A goal tile somebody already claimed cannot be planned toward at
    // all; the retry budget decides how long the mover keeps trying.
    if colliders.has(goal) {
        return None;
    }
    let start_island = map.island_of(start)?;
    let goal_island = map.island_of(goal)?;

    let directions = if start_island == goal_island {
        let config = SearchConfig { follow_portals: true, colliders: Some(colliders), ..Default::default() };
        search(map, start, goal, config).map(|outcome| outcome.directions)
    } else {
        plan_portal_leg(map, start, start_island, goal_island, colliders)
    };

    match directions {
        Some(path) if !path.is_empty() => {
            Some(PathPlan { target_index: goal, path, next_action_index: 0 })
        }
        _ => fallback_step(map, start, goal, colliders),
    }
}

/// Pick the cheapest `(entry portal, exit portal)` pair by precomputed
/// route cost, then plan the walk to the first portal's entry tile.
fn plan_portal_leg(
    map: &GameMap,
    start: usize,
    start_island: usize,
    goal_island: usize,
    colliders: &TileBitSet,
) -> Option<Vec<crate::grid::Direction>> {
    let mut best: Option<(u32, usize)> = None;
    for &entry in map.portal_entries(start_island) {
        for &exit in map.portal_exits(goal_island) {
            if let Some(route) = map.portal_route(entry, exit) {
                if best.map_or(true, |(cost, _)| route.cost < cost) {
                    best = Some((route.cost, entry));
                }
            }
        }
    }
    let (_, first_portal) = best?;
    let entry_tile = map.portals()[first_portal].from;
    let config = SearchConfig { avoid_portal_tiles: true, colliders: Some(colliders), ..Default::default() };
    let outcome = search(map, start, entry_tile, config)?;
    Some(outcome.directions)
}

/// Degraded mode: a single step that closes the gap, when one exists.
fn fallback_step(
    map: &GameMap,
    start: usize,
    goal: usize,
    colliders: &TileBitSet,
) -> Option<PathPlan> {
    let from = map.position_of(start).ok()?;
    let to = map.position_of(goal).ok()?;
    for direction in approach_order(from, to) {
        if map.generate_move(start, direction, |tile| colliders.has(tile)).is_some() {
            return Some(PathPlan { target_index: goal, path: vec![direction], next_action_index: 0 });
        }
    }
    None
}

/// Cardinal directions that strictly reduce the Manhattan distance,
/// longest axis first.
fn approach_order(from: Position, to: Position) -> Vec<crate::grid::Direction> {
    use crate::grid::Direction;
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let horizontal = match dx.signum() {
        1 => Some(Direction::Right),
        -1 => Some(Direction::Left),
        _ => None,
    };
    let vertical = match dy.signum() {
        1 => Some(Direction::Down),
        -1 => Some(Direction::Up),
        _ => None,
    };
    let ordered = if dx.abs() >= dy.abs() {
        [horizontal, vertical]
    } else {
        [vertical, horizontal]
    };
    ordered.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Direction, GridDims};
    use crate::map::{Portal, Tile};

    fn open_map(width: u32, height: u32) -> GameMap {
        GameMap::new(
            GridDims::new(width, height),
            vec![Tile::Normal; (width * height) as usize],
            Vec::new(),
            Vec::new(),
        )
        .unwrap()
    }

    #[test]
    fn same_island_plan_reaches_goal() {
        let map = open_map(4, 4);
        let colliders = TileBitSet::new(16);
        let plan = plan_route(&map, 0, 15, &colliders).unwrap();
        assert_eq!(plan.target_index, 15);
        assert_eq!(plan.path.len(), 6);
        assert_eq!(plan.next_action_index, 0);
    }

    #[test]
    fn claimed_goal_fails_the_attempt() {
        let map = open_map(3, 3);
        let mut colliders = TileBitSet::new(9);
        colliders.set(5);
        assert!(plan_route(&map, 3, 5, &colliders).is_none());
    }

    #[test]
    fn cross_island_plan_walks_to_the_portal() {
        // two 2x1 islands bridged by a portal from tile 1 to tile 3
        let tiles = vec![Tile::Normal, Tile::Normal, Tile::Obstacle, Tile::Normal, Tile::Normal];
        let map = GameMap::new(
            GridDims::new(5, 1),
            tiles,
            vec![Portal { from: 1, to: 3, direction: None }],
            Vec::new(),
        )
        .unwrap();
        let colliders = TileBitSet::new(5);
        let plan = plan_route(&map, 0, 4, &colliders).unwrap();
        assert_eq!(plan.target_index, 4);
        assert_eq!(plan.path, vec![Direction::Right]);
    }

    #[test]
    fn unreachable_island_without_portals_gives_up() {
        let tiles = vec![Tile::Normal, Tile::Obstacle, Tile::Normal];
        let map = GameMap::new(GridDims::new(3, 1), tiles, Vec::new(), Vec::new()).unwrap();
        let colliders = TileBitSet::new(3);
        assert!(plan_route(&map, 0, 2, &colliders).is_none());
    }
}
