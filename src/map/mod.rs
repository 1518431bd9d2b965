//! The tile map: terrain, portals and named areas.
//!
//! Construction partitions the walkable tiles into islands, indexes the
//! portals by island, precomputes all-pairs shortest routes across the
//! portal graph and flattens the area definitions into per-tile lookups.
//! After construction the map is immutable; every tick reads it.

pub mod islands;
pub mod portal_graph;

pub use portal_graph::PortalRoute;

use crate::ecs::Move;
use crate::error::{EngineError, EngineResult};
use crate::grid::{Direction, GridDims, Position, ALL_DIRECTIONS};
use std::collections::HashMap;

/// Terrain class of one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Obstacle,
    Normal,
    Fast,
}

impl Tile {
    /// Ticks needed to step onto this tile; `None` for impassable tiles.
    pub const fn cost(self) -> Option<u32> {
        match self {
            Self::Obstacle => None,
            Self::Normal => Some(crate::constants::tiles::NORMAL_COST),
            Self::Fast => Some(crate::constants::tiles::FAST_COST),
        }
    }
}

/// One-way teleport edge. Stepping into `from` while moving in
/// `direction` (any direction when unrestricted) lands the mover on `to`
/// within the same move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Portal {
    pub from: usize,
    pub to: usize,
    pub direction: Option<Direction>,
}

/// Named region of tiles. Areas may overlap; later definitions win the
/// per-tile lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Area {
    pub name: String,
    pub description: Option<String>,
    pub cells: Vec<usize>,
}

/// One legal step out of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOption {
    pub direction: Direction,
    /// The adjacent tile being stepped onto (pays the travel cost).
    pub enter: usize,
    /// Where the mover ends up; differs from `enter` across a portal.
    pub dest: usize,
    pub cost: u32,
}

/// Immutable, preprocessed tile map.
pub struct GameMap {
    dims: GridDims,
    tiles: Vec<Tile>,
    portals: Vec<Portal>,
    areas: Vec<Area>,
    island_of: Vec<i32>,
    island_count: usize,
    entries_by_island: Vec<Vec<usize>>,
    exits_by_island: Vec<Vec<usize>>,
    portals_by_from: HashMap<usize, Vec<usize>>,
    routes: portal_graph::PortalRoutes,
    area_of: Vec<i32>,
    area_by_name: HashMap<String, usize>,
}

impl GameMap {
    pub fn new(
        dims: GridDims,
        tiles: Vec<Tile>,
        portals: Vec<Portal>,
        areas: Vec<Area>,
    ) -> EngineResult<Self> {
        if tiles.len() != dims.len() {
            return Err(EngineError::WrongTileCount { got: tiles.len(), expected: dims.len() });
        }
        for (i, portal) in portals.iter().enumerate() {
            for index in [portal.from, portal.to] {
                if index >= tiles.len() {
                    return Err(EngineError::InvalidMap { portal: i, index, len: tiles.len() });
                }
            }
        }

        let (island_of, island_count) = islands::partition(dims, &tiles);

        let mut entries_by_island = vec![Vec::new(); island_count];
        let mut exits_by_island = vec![Vec::new(); island_count];
        let mut portals_by_from: HashMap<usize, Vec<usize>> = HashMap::new();
        for (i, portal) in portals.iter().enumerate() {
            if let Ok(island) = usize::try_from(island_of[portal.from]) {
                entries_by_island[island].push(i);
            }
            if let Ok(island) = usize::try_from(island_of[portal.to]) {
                exits_by_island[island].push(i);
            }
            portals_by_from.entry(portal.from).or_default().push(i);
        }

        let mut area_of = vec![-1i32; tiles.len()];
        let mut area_by_name = HashMap::new();
        for (i, area) in areas.iter().enumerate() {
            for &cell in &area.cells {
                if let Some(slot) = area_of.get_mut(cell) {
                    *slot = i as i32;
                }
            }
            area_by_name.insert(area.name.clone(), i);
        }

        let mut map = Self {
            dims,
            tiles,
            portals,
            areas,
            island_of,
            island_count,
            entries_by_island,
            exits_by_island,
            portals_by_from,
            routes: portal_graph::PortalRoutes::empty(0),
            area_of,
            area_by_name,
        };
        let routes = portal_graph::build(&map);
        map.routes = routes;
        log::info!(
            "map ready: {}x{}, {} islands, {} portals, {} areas",
            dims.width,
            dims.height,
            map.island_count,
            map.portals.len(),
            map.areas.len()
        );
        Ok(map)
    }

    // --- basic queries ----------------------------------------------------

    pub fn dims(&self) -> GridDims {
        self.dims
    }

    pub fn tile(&self, index: usize) -> Option<Tile> {
        self.tiles.get(index).copied()
    }

    pub fn is_obstacle(&self, index: usize) -> bool {
        matches!(self.tiles.get(index), None | Some(Tile::Obstacle))
    }

    /// Ticks needed to step onto tile `index`.
    pub fn cost(&self, index: usize) -> Option<u32> {
        self.tiles.get(index).and_then(|tile| tile.cost())
    }

    /// Manhattan estimate between two tiles; `None` when either endpoint
    /// is impassable. Admissible for the tile costs in use.
    pub fn estimate_distance(&self, a: usize, b: usize) -> Option<u32> {
        if self.is_obstacle(a) || self.is_obstacle(b) {
            return None;
        }
        self.dims.manhattan(a, b).ok()
    }

    // --- islands ----------------------------------------------------------

    /// Island id of a tile, or `None` for obstacles.
    pub fn island_of(&self, index: usize) -> Option<usize> {
        usize::try_from(*self.island_of.get(index)?).ok()
    }

    pub fn island_count(&self) -> usize {
        self.island_count
    }

    // --- portals ----------------------------------------------------------

    pub fn portals(&self) -> &[Portal] {
        &self.portals
    }

    /// Portals entered from the given tile.
    pub fn portals_at(&self, from: usize) -> &[usize] {
        self.portals_by_from.get(&from).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The portal triggered by stepping onto `tile` in `direction`.
    pub fn portal_for_step(&self, tile: usize, direction: Direction) -> Option<&Portal> {
        self.portals_at(tile)
            .iter()
            .map(|&i| &self.portals[i])
            .find(|portal| portal.direction.is_none() || portal.direction == Some(direction))
    }

    /// Portals whose entry tile lies on the given island.
    pub fn portal_entries(&self, island: usize) -> &[usize] {
        self.entries_by_island.get(island).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Portals whose exit tile lies on the given island.
    pub fn portal_exits(&self, island: usize) -> &[usize] {
        self.exits_by_island.get(island).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Precomputed shortest route between two portals.
    pub fn portal_route(&self, from: usize, to: usize) -> Option<&PortalRoute> {
        self.routes.route(from, to)
    }

    // --- areas ------------------------------------------------------------

    pub fn areas(&self) -> &[Area] {
        &self.areas
    }

    /// The area covering a tile (last definition wins), if any.
    pub fn area_at(&self, index: usize) -> Option<&Area> {
        let area = usize::try_from(*self.area_of.get(index)?).ok()?;
        self.areas.get(area)
    }

    /// Look an area up by name (last definition wins).
    pub fn area_by_name(&self, name: &str) -> Option<&Area> {
        self.areas.get(*self.area_by_name.get(name)?)
    }

    // --- movement ---------------------------------------------------------

    /// Legal steps out of `index`, in fixed direction order. With
    /// `follow_portals`, a step onto a matching portal entry resolves to
    /// the portal's destination.
    pub fn step_options(&self, index: usize, follow_portals: bool) -> Vec<StepOption> {
        let mut options = Vec::with_capacity(4);
        for direction in ALL_DIRECTIONS {
            let Some(enter) = self.dims.step(index, direction) else { continue };
            let Some(cost) = self.cost(enter) else { continue };
            let mut dest = enter;
            if follow_portals {
                if let Some(portal) = self.portal_for_step(enter, direction) {
                    dest = portal.to;
                }
            }
            if self.is_obstacle(dest) {
                continue;
            }
            options.push(StepOption { direction, enter, dest, cost });
        }
        options
    }

    /// Build the Move produced by stepping from `from` in `direction`,
    /// honouring portals and the dynamic-obstacle predicate. `None` when
    /// the step is off-grid, into an obstacle, or onto a claimed tile.
    pub fn generate_move(
        &self,
        from: usize,
        direction: Direction,
        blocked: impl Fn(usize) -> bool,
    ) -> Option<Move> {
        let enter = self.dims.step(from, direction)?;
        let cost = self.cost(enter)?;
        let dest = match self.portal_for_step(enter, direction) {
            Some(portal) => portal.to,
            None => enter,
        };
        if self.is_obstacle(dest) || blocked(dest) {
            return None;
        }
        let target_position = self.dims.position_of(dest).ok()?;
        Some(Move {
            total_ticks: cost,
            remaining_ticks: cost,
            target_index: dest,
            target_position,
        })
    }

    /// Convenience for building maps in tests and demos.
    pub fn position_of(&self, index: usize) -> EngineResult<Position> {
        self.dims.position_of(index)
    }

    pub fn index_of(&self, position: Position) -> EngineResult<usize> {
        self.dims.index_of(position)
    }
}
