//! Bounded A* over tiles.
//!
//! Two expansion modes share the implementation: the runtime mode follows
//! portal edges, while the surveying mode used for portal distances and
//! portal approach legs sticks to plain adjacency and refuses to stand on
//! portal entry tiles. Tiles claimed by other movers are penalised, and
//! never entered at all near the goal.

use crate::constants::pathfinding::{CROWD_PENALTY, CROWD_STANDOFF, MAX_EXPANSIONS};
use crate::grid::{Direction, TileBitSet};
use crate::map::GameMap;
use crate::pathfinding::heap::IndexedMinHeap;
use std::collections::{HashMap, HashSet};

/// How the search expands tiles.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchConfig<'a> {
    /// Resolve matching portal entries to their destinations.
    pub follow_portals: bool,
    /// Refuse to stand on any portal entry tile other than the goal.
    pub avoid_portal_tiles: bool,
    /// Tiles claimed by other movers this tick.
    pub colliders: Option<&'a TileBitSet>,
}

/// A found route. `reached_goal` is false for the best partial route
/// returned when the search ran out of nodes or hit the expansion cap.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub directions: Vec<Direction>,
    pub cost: f64,
    pub reached_goal: bool,
}

/// A* from `start` to `goal`. `None` when either endpoint is impassable
/// or no route (not even a partial one) was found.
pub fn search(map: &GameMap, start: usize, goal: usize, config: SearchConfig) -> Option<SearchOutcome> {
    map.estimate_distance(start, goal)?;
    if start == goal {
        return Some(SearchOutcome { directions: Vec::new(), cost: 0.0, reached_goal: true });
    }

    let heuristic = |tile: usize| -> f64 {
        map.dims().manhattan(tile, goal).map(f64::from).unwrap_or(f64::INFINITY)
    };

    let mut open = IndexedMinHeap::new();
    let mut g_score: HashMap<usize, f64> = HashMap::new();
    let mut came_from: HashMap<usize, (usize, Direction)> = HashMap::new();
    let mut closed: HashSet<usize> = HashSet::new();
    let mut best_partial: Option<(f64, usize)> = None;
    let mut expansions = 0usize;

    g_score.insert(start, 0.0);
    open.push(start, heuristic(start));

    while let Some((current, f)) = open.pop() {
        if current == goal {
            let cost = g_score[&current];
            return Some(SearchOutcome {
                directions: reconstruct(&came_from, start, current),
                cost,
                reached_goal: true,
            });
        }
        if current != start && best_partial.map_or(true, |(best_f, _)| f < best_f) {
            best_partial = Some((f, current));
        }
        expansions += 1;
        if expansions > MAX_EXPANSIONS {
            log::debug!(
                "pathfinding: expansion cap hit searching {start} -> {goal}, returning partial"
            );
            break;
        }
        closed.insert(current);

        for option in map.step_options(current, config.follow_portals) {
            if config.avoid_portal_tiles
                && option.enter != goal
                && !map.portals_at(option.enter).is_empty()
            {
                continue;
            }
            let dest = option.dest;
            if closed.contains(&dest) {
                continue;
            }
            let mut step_cost = f64::from(option.cost);
            if config.colliders.is_some_and(|bits| bits.has(dest)) {
                let crowd_distance = map.dims().manhattan(dest, goal).unwrap_or(u32::MAX);
                if crowd_distance <= CROWD_STANDOFF {
                    continue;
                }
                step_cost += CROWD_PENALTY / f64::from(crowd_distance);
            }
            let tentative = g_score[&current] + step_cost;
            if tentative < g_score.get(&dest).copied().unwrap_or(f64::INFINITY) {
                g_score.insert(dest, tentative);
                came_from.insert(dest, (current, option.direction));
                open.decrease_priority(dest, tentative + heuristic(dest));
            }
        }
    }

    let (_, node) = best_partial?;
    Some(SearchOutcome {
        directions: reconstruct(&came_from, start, node),
        cost: g_score[&node],
        reached_goal: false,
    })
}

fn reconstruct(
    came_from: &HashMap<usize, (usize, Direction)>,
    start: usize,
    end: usize,
) -> Vec<Direction> {
    let mut directions = Vec::new();
    let mut current = end;
    while current != start {
        let Some(&(previous, direction)) = came_from.get(&current) else {
            break;
        };
        directions.push(direction);
        current = previous;
    }
    directions.reverse();
    directions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridDims;
    use crate::map::{Portal, Tile};

    fn map_from(width: u32, height: u32, tiles: Vec<Tile>, portals: Vec<Portal>) -> GameMap {
        GameMap::new(GridDims::new(width, height), tiles, portals, Vec::new()).unwrap()
    }

    #[test]
    fn straight_line_route() {
        let map = map_from(4, 1, vec![Tile::Normal; 4], Vec::new());
        let outcome = search(&map, 0, 3, SearchConfig::default()).unwrap();
        assert!(outcome.reached_goal);
        assert_eq!(outcome.directions, vec![Direction::Right; 3]);
        assert_eq!(outcome.cost, 30.0);
    }

    #[test]
    fn prefers_fast_tiles_on_long_corridors() {
        // top row normal, bottom row fast; the detour only pays off once
        // the corridor is long enough to amortise entering and leaving it
        let mut tiles = vec![Tile::Normal; 7];
        tiles.extend(vec![Tile::Fast; 7]);
        let map = map_from(7, 2, tiles, Vec::new());
        let outcome = search(&map, 0, 6, SearchConfig::default()).unwrap();
        assert!(outcome.reached_goal);
        // down (7) + six fast steps (42) + up (10) beats six normal steps (60)
        assert_eq!(outcome.directions.len(), 8);
        assert_eq!(outcome.cost, 59.0);
    }

    #[test]
    fn routes_around_walls() {
        let tiles = vec![
            Tile::Normal, Tile::Obstacle, Tile::Normal,
            Tile::Normal, Tile::Obstacle, Tile::Normal,
            Tile::Normal, Tile::Normal, Tile::Normal,
        ];
        let map = map_from(3, 3, tiles, Vec::new());
        let outcome = search(&map, 0, 2, SearchConfig::default()).unwrap();
        assert!(outcome.reached_goal);
        assert_eq!(outcome.directions.len(), 6);
    }

    #[test]
    fn follows_portals_when_allowed() {
        let map = map_from(
            5,
            1,
            vec![Tile::Normal; 5],
            vec![Portal { from: 2, to: 4, direction: Some(Direction::Right) }],
        );
        let runtime = SearchConfig { follow_portals: true, ..Default::default() };
        let outcome = search(&map, 0, 4, runtime).unwrap();
        assert!(outcome.reached_goal);
        assert_eq!(outcome.directions, vec![Direction::Right, Direction::Right]);

        // surveying mode may not stand on the entry tile mid-route, so
        // the corridor is cut and only a partial route comes back
        let survey = SearchConfig { avoid_portal_tiles: true, ..Default::default() };
        let outcome = search(&map, 0, 4, survey).unwrap();
        assert!(!outcome.reached_goal);
        assert_eq!(outcome.directions, vec![Direction::Right]);
    }

    #[test]
    fn claimed_tiles_near_goal_are_never_entered() {
        let map = map_from(3, 3, vec![Tile::Normal; 9], Vec::new());
        let mut claimed = TileBitSet::new(9);
        claimed.set(5); // adjacent to goal 8... manhattan((2,1),(2,2)) == 1
        let config = SearchConfig { colliders: Some(&claimed), ..Default::default() };
        let outcome = search(&map, 3, 8, config).unwrap();
        assert!(outcome.reached_goal);
        // route avoids tile 5 entirely
        let mut tile = 3;
        for direction in &outcome.directions {
            tile = map.dims().step(tile, *direction).unwrap();
            assert_ne!(tile, 5);
        }
        assert_eq!(tile, 8);
    }

    #[test]
    fn unreachable_goal_yields_partial_route() {
        // goal walled off on its own island
        let tiles = vec![
            Tile::Normal, Tile::Obstacle, Tile::Normal,
            Tile::Normal, Tile::Obstacle, Tile::Obstacle,
            Tile::Normal, Tile::Normal, Tile::Obstacle,
        ];
        let map = map_from(3, 3, tiles, Vec::new());
        let outcome = search(&map, 0, 2, SearchConfig::default()).unwrap();
        assert!(!outcome.reached_goal);
        assert!(!outcome.directions.is_empty());
    }
}
