//! Portal graph: all-pairs shortest routes between portals.
//!
//! The one-hop edge `i -> j` is the in-island walking cost from portal
//! `i`'s exit to portal `j`'s entry, surveyed with A* that never stands
//! on another portal's entry tile (so a survey cannot teleport
//! mid-route). Floyd-Warshall closes the graph and every reachable pair
//! stores its concrete portal sequence.

use crate::map::GameMap;
use crate::pathfinding::astar::{search, SearchConfig};

/// Precomputed shortest route between two portals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalRoute {
    pub cost: u32,
    /// Portal indices along the route, endpoints included.
    pub portals: Vec<usize>,
}

/// Dense `n x n` route table.
#[derive(Debug, Default)]
pub struct PortalRoutes {
    n: usize,
    routes: Vec<Option<PortalRoute>>,
}

impl PortalRoutes {
    pub fn empty(n: usize) -> Self {
        Self { n, routes: vec![None; n * n] }
    }

    pub fn route(&self, from: usize, to: usize) -> Option<&PortalRoute> {
        if from >= self.n || to >= self.n {
            return None;
        }
        self.routes[from * self.n + to].as_ref()
    }
}

/// Survey one-hop distances and close them into a full route table.
pub fn build(map: &GameMap) -> PortalRoutes {
    let n = map.portals().len();
    let mut dist = vec![vec![None::<f64>; n]; n];
    let mut next = vec![vec![None::<usize>; n]; n];

    let survey = SearchConfig { avoid_portal_tiles: true, ..Default::default() };
    for i in 0..n {
        dist[i][i] = Some(0.0);
        next[i][i] = Some(i);
        let exit_tile = map.portals()[i].to;
        let Some(exit_island) = map.island_of(exit_tile) else { continue };
        for j in 0..n {
            if i == j {
                continue;
            }
            let entry_tile = map.portals()[j].from;
            if map.island_of(entry_tile) != Some(exit_island) {
                continue;
            }
            if let Some(outcome) = search(map, exit_tile, entry_tile, survey) {
                if outcome.reached_goal {
                    dist[i][j] = Some(outcome.cost);
                    next[i][j] = Some(j);
                }
            }
        }
    }

    for k in 0..n {
        for i in 0..n {
            let Some(a) = dist[i][k] else { continue };
            for j in 0..n {
                let Some(b) = dist[k][j] else { continue };
                if dist[i][j].map_or(true, |current| a + b < current) {
                    dist[i][j] = Some(a + b);
                    next[i][j] = next[i][k];
                }
            }
        }
    }

    let mut routes = PortalRoutes::empty(n);
    for i in 0..n {
        for j in 0..n {
            let Some(cost) = dist[i][j] else { continue };
            let Some(portals) = walk_route(&next, i, j) else { continue };
            routes.routes[i * n + j] = Some(PortalRoute { cost: cost.round() as u32, portals });
        }
    }
    routes
}

fn walk_route(next: &[Vec<Option<usize>>], from: usize, to: usize) -> Option<Vec<usize>> {
    let mut portals = vec![from];
    let mut current = from;
    while current != to {
        current = next[current][to]?;
        portals.push(current);
        if portals.len() > next.len() {
            // a cycle here would mean the closure above is corrupt
            return None;
        }
    }
    Some(portals)
}
