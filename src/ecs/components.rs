//! Core component data types.
//!
//! Plain data carried by the component store. Field names follow the
//! snapshot format (camelCase on the wire).

use crate::grid::{Direction, Position};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// In-flight motion between two tiles. Present only while travelling;
/// the movement pass finalises it on the last tick of travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Move {
    pub total_ticks: u32,
    pub remaining_ticks: u32,
    pub target_index: usize,
    pub target_position: Position,
}

/// Walk a fixed number of tiles in one direction, one move at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StraightWalk {
    pub direction: Direction,
    pub remaining_distance: u32,
}

/// A concrete route: the direction sequence toward `target_index`, with a
/// cursor into the next step to execute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathPlan {
    pub target_index: usize,
    pub path: Vec<Direction>,
    pub next_action_index: usize,
}

/// Standing intent to reach a tile, with a retry budget for failed
/// planning attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub target_index: usize,
    pub retry_count: u32,
    pub max_retries: u32,
}

impl Goal {
    pub fn new(target_index: usize, max_retries: u32) -> Self {
        Self { target_index, retry_count: 0, max_retries }
    }
}

/// Display status shown next to a player. The well-known statuses encode
/// as bare strings; anything else passes through as host-defined data.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerStatus {
    Thinking,
    Wondering,
    Speaking,
    Tip,
    Custom(Value),
}

impl PlayerStatus {
    pub fn to_json(&self) -> Value {
        match self {
            Self::Thinking => json!("thinking"),
            Self::Wondering => json!("wondering"),
            Self::Speaking => json!("speaking"),
            Self::Tip => json!("tip"),
            Self::Custom(value) => value.clone(),
        }
    }

    pub fn from_json(value: &Value) -> Self {
        match value.as_str() {
            Some("thinking") => Self::Thinking,
            Some("wondering") => Self::Wondering,
            Some("speaking") => Self::Speaking,
            Some("tip") => Self::Tip,
            _ => Self::Custom(value.clone()),
        }
    }
}
