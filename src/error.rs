//! Engine-wide error handling
//!
//! Every fallible public operation returns [`EngineResult`]. Pathfinding
//! failures are not errors; they surface as `None` and are retried by the
//! goal component's own retry budget.

use crate::ecs::EntityId;

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can cross the engine's public boundary
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("coordinate ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds { x: i32, y: i32, width: u32, height: u32 },

    #[error("tile index {index} is outside the grid of {len} tiles")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("portal {portal} references tile {index}, outside the grid of {len} tiles")]
    InvalidMap { portal: usize, index: usize, len: usize },

    #[error("map has {got} tiles, expected {expected}")]
    WrongTileCount { got: usize, expected: usize },

    #[error("tile {index} carries unknown terrain code {code}")]
    UnknownTileCode { index: usize, code: u8 },

    #[error("entity {id} no longer exists")]
    EntityGone { id: EntityId },

    #[error("unknown component `{name}` in snapshot")]
    UnknownComponent { name: String },

    #[error("malformed snapshot: {reason}")]
    BadSnapshot { reason: String },

    #[error("malformed script banner: {reason}")]
    BadBanner { reason: String },
}

impl EngineError {
    /// Wrap a serde failure encountered while decoding a snapshot.
    pub(crate) fn bad_snapshot(err: impl std::fmt::Display) -> Self {
        EngineError::BadSnapshot { reason: err.to_string() }
    }
}
