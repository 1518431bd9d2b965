//! Grid geometry primitives.
//!
//! Pure coordinate math over a `width x height` tile grid: coordinate to
//! index conversion, bounds checks, 4-way adjacency and the direction of a
//! single step. Free of map content and entity concerns.

pub mod bitset;

pub use bitset::TileBitSet;

use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};

/// A 2-D tile position on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Cardinal direction of one grid step. `Up` decreases y, `Down`
/// increases y, `Left` decreases x, `Right` increases x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

pub const ALL_DIRECTIONS: [Direction; 4] =
    [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

impl Direction {
    /// Returns the `(dx, dy)` offset for one step in this direction.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// Stable numeric code used by player views.
    pub const fn code(self) -> u8 {
        match self {
            Self::Up => 0,
            Self::Down => 1,
            Self::Left => 2,
            Self::Right => 3,
        }
    }
}

/// Dimensions of a tile grid, with coordinate <-> index conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDims {
    pub width: u32,
    pub height: u32,
}

impl GridDims {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total number of tiles.
    pub const fn len(self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    /// Flatten a position into a tile index.
    pub fn index_of(self, pos: Position) -> EngineResult<usize> {
        if !self.contains(pos) {
            return Err(EngineError::OutOfBounds {
                x: pos.x,
                y: pos.y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(pos.y as usize * self.width as usize + pos.x as usize)
    }

    /// Expand a tile index back into a position.
    pub fn position_of(self, index: usize) -> EngineResult<Position> {
        if index >= self.len() {
            return Err(EngineError::IndexOutOfBounds { index, len: self.len() });
        }
        Ok(Position::new(
            (index % self.width as usize) as i32,
            (index / self.width as usize) as i32,
        ))
    }

    /// The tile one step from `index` in `direction`, if it stays on the
    /// grid.
    pub fn step(self, index: usize, direction: Direction) -> Option<usize> {
        let pos = self.position_of(index).ok()?;
        let (dx, dy) = direction.delta();
        let next = Position::new(pos.x + dx, pos.y + dy);
        self.index_of(next).ok()
    }

    /// Direction of the step from `from` to `to`, when the two indices
    /// differ by exactly one step on a cardinal axis.
    pub fn direction_between(self, from: usize, to: usize) -> Option<Direction> {
        let a = self.position_of(from).ok()?;
        let b = self.position_of(to).ok()?;
        match (b.x - a.x, b.y - a.y) {
            (0, -1) => Some(Direction::Up),
            (0, 1) => Some(Direction::Down),
            (-1, 0) => Some(Direction::Left),
            (1, 0) => Some(Direction::Right),
            _ => None,
        }
    }

    /// Manhattan distance between two tiles.
    pub fn manhattan(self, a: usize, b: usize) -> EngineResult<u32> {
        let pa = self.position_of(a)?;
        let pb = self.position_of(b)?;
        Ok(pa.x.abs_diff(pb.x) + pa.y.abs_diff(pb.y))
    }
}
