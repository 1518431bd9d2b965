//! Wire-format map description handed in by the host.

use crate::error::{EngineError, EngineResult};
use crate::grid::{Direction, GridDims, Position};
use crate::map::{Area, GameMap, Portal, Tile};
use serde::{Deserialize, Serialize};

/// A grid coordinate on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl From<Coord> for Position {
    fn from(coord: Coord) -> Self {
        Position::new(coord.x, coord.y)
    }
}

/// Portal direction gate; `none` means any approach triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortalGate {
    Up,
    Down,
    Left,
    Right,
    #[default]
    None,
}

impl PortalGate {
    fn direction(self) -> Option<Direction> {
        match self {
            Self::Up => Some(Direction::Up),
            Self::Down => Some(Direction::Down),
            Self::Left => Some(Direction::Left),
            Self::Right => Some(Direction::Right),
            Self::None => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalSpec {
    pub from: usize,
    pub to: usize,
    #[serde(default)]
    pub direction: PortalGate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub cells: Vec<Coord>,
}

/// Complete map description: terrain codes (0 obstacle, 1 normal,
/// 2 fast), spawn points, portals and named areas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapStructure {
    pub width: u32,
    pub height: u32,
    pub tiles: Vec<u8>,
    #[serde(default)]
    pub spawn_points: Vec<Coord>,
    #[serde(default)]
    pub portals: Vec<PortalSpec>,
    #[serde(default)]
    pub areas: Vec<AreaSpec>,
}

impl MapStructure {
    /// Decode into a preprocessed map.
    pub fn build(&self) -> EngineResult<GameMap> {
        let dims = GridDims::new(self.width, self.height);
        let tiles = self
            .tiles
            .iter()
            .enumerate()
            .map(|(index, code)| match code {
                0 => Ok(Tile::Obstacle),
                1 => Ok(Tile::Normal),
                2 => Ok(Tile::Fast),
                _ => Err(EngineError::UnknownTileCode { index, code: *code }),
            })
            .collect::<EngineResult<Vec<Tile>>>()?;
        let portals = self
            .portals
            .iter()
            .map(|spec| Portal { from: spec.from, to: spec.to, direction: spec.direction.direction() })
            .collect();
        let areas = self
            .areas
            .iter()
            .map(|spec| {
                let cells = spec
                    .cells
                    .iter()
                    .map(|&coord| dims.index_of(coord.into()))
                    .collect::<EngineResult<Vec<usize>>>()?;
                Ok(Area { name: spec.name.clone(), description: spec.description.clone(), cells })
            })
            .collect::<EngineResult<Vec<Area>>>()?;
        GameMap::new(dims, tiles, portals, areas)
    }

    /// An all-normal map with no features, for demos and tests.
    pub fn open(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            tiles: vec![1; (width * height) as usize],
            spawn_points: Vec::new(),
            portals: Vec::new(),
            areas: Vec::new(),
        }
    }
}
