//! Island partition: maximal 4-connected regions of walkable tiles.
//!
//! Portals are deliberately ignored here; they connect islands without
//! merging them.

use crate::grid::{GridDims, ALL_DIRECTIONS};
use crate::map::Tile;

/// Label every tile with its island id (`-1` for obstacles). Returns the
/// labels and the number of islands. Flood fill with an explicit stack;
/// the stack never exceeds the tile count.
pub fn partition(dims: GridDims, tiles: &[Tile]) -> (Vec<i32>, usize) {
    let mut island_of = vec![-1i32; tiles.len()];
    let mut next_island = 0i32;
    let mut stack = Vec::new();

    for start in 0..tiles.len() {
        if tiles[start] == Tile::Obstacle || island_of[start] != -1 {
            continue;
        }
        island_of[start] = next_island;
        stack.push(start);
        while let Some(tile) = stack.pop() {
            for direction in ALL_DIRECTIONS {
                let Some(next) = dims.step(tile, direction) else { continue };
                if tiles[next] != Tile::Obstacle && island_of[next] == -1 {
                    island_of[next] = next_island;
                    stack.push(next);
                }
            }
        }
        next_island += 1;
    }

    (island_of, next_island as usize)
}
