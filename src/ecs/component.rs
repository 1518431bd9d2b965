//! Component identity: kinds, relation keys and dynamic values.
//!
//! The component set is a closed registry. Every kind has a stable string
//! name used by the snapshot format; relations are the same kinds
//! parameterised by a target (another entity, or another component kind).

use crate::ecs::components::{Goal, Move, PathPlan, PlayerStatus, StraightWalk};
use crate::ecs::EntityId;
use crate::error::{EngineError, EngineResult};
use crate::grid::{Direction, Position};
use serde_json::{json, Value};

/// Every component kind the engine knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentKind {
    Position,
    FaceDirection,
    Pending,
    DynamicCollider,
    Move,
    StraightWalk,
    PathPlan,
    GoalPathfinding,
    Timer,
    Timeout,
    Task,
    TaskCompleted,
    PlayerId,
    PlayerStatus,
    PlayerInited,
    Thinking,
}

pub const ALL_COMPONENT_KINDS: [ComponentKind; 16] = [
    ComponentKind::Position,
    ComponentKind::FaceDirection,
    ComponentKind::Pending,
    ComponentKind::DynamicCollider,
    ComponentKind::Move,
    ComponentKind::StraightWalk,
    ComponentKind::PathPlan,
    ComponentKind::GoalPathfinding,
    ComponentKind::Timer,
    ComponentKind::Timeout,
    ComponentKind::Task,
    ComponentKind::TaskCompleted,
    ComponentKind::PlayerId,
    ComponentKind::PlayerStatus,
    ComponentKind::PlayerInited,
    ComponentKind::Thinking,
];

impl ComponentKind {
    /// Stable registry name used by the snapshot format.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Position => "position",
            Self::FaceDirection => "faceDirection",
            Self::Pending => "pending",
            Self::DynamicCollider => "dynamicCollider",
            Self::Move => "move",
            Self::StraightWalk => "straightWalk",
            Self::PathPlan => "pathPlan",
            Self::GoalPathfinding => "goalPathfinding",
            Self::Timer => "timer",
            Self::Timeout => "timeout",
            Self::Task => "task",
            Self::TaskCompleted => "taskCompleted",
            Self::PlayerId => "playerId",
            Self::PlayerStatus => "playerStatus",
            Self::PlayerInited => "playerInited",
            Self::Thinking => "thinking",
        }
    }

    pub fn from_name(name: &str) -> EngineResult<Self> {
        ALL_COMPONENT_KINDS
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| EngineError::UnknownComponent { name: name.to_string() })
    }
}

/// The second key of a relation: another entity, or another component
/// kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RelationTarget {
    Entity(EntityId),
    Component(ComponentKind),
}

/// Storage key for one component slot on an entity: either a plain
/// component, or a relation `kind -> target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentKey {
    Plain(ComponentKind),
    Relation { kind: ComponentKind, target: RelationTarget },
}

impl ComponentKey {
    pub const fn relation_to_component(kind: ComponentKind, target: ComponentKind) -> Self {
        Self::Relation { kind, target: RelationTarget::Component(target) }
    }

    pub const fn relation_to_entity(kind: ComponentKind, target: EntityId) -> Self {
        Self::Relation { kind, target: RelationTarget::Entity(target) }
    }

    /// The component kind this key stores (the relation kind for
    /// relation keys).
    pub const fn kind(&self) -> ComponentKind {
        match self {
            Self::Plain(kind) => *kind,
            Self::Relation { kind, .. } => *kind,
        }
    }

    pub const fn is_relation(&self) -> bool {
        matches!(self, Self::Relation { .. })
    }

    /// Whether this key is a relation pointing at the given entity.
    pub fn targets_entity(&self, id: EntityId) -> bool {
        matches!(self, Self::Relation { target: RelationTarget::Entity(t), .. } if *t == id)
    }
}

/// Dynamically typed component value. Which variant a key stores is fixed
/// per component kind; mismatches are rejected when decoding snapshots.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentValue {
    /// Marker components carry no data.
    Tag,
    Position(Position),
    Direction(Direction),
    Move(Move),
    StraightWalk(StraightWalk),
    PathPlan(PathPlan),
    Goal(Goal),
    Ticks(u32),
    Text(String),
    Status(PlayerStatus),
}

impl ComponentValue {
    /// Encode for the snapshot format. Tags encode to `None` so the
    /// `value` field can be omitted.
    pub fn to_json(&self) -> EngineResult<Option<Value>> {
        Ok(match self {
            Self::Tag => None,
            Self::Position(v) => Some(serde_json::to_value(v).map_err(EngineError::bad_snapshot)?),
            Self::Direction(v) => Some(serde_json::to_value(v).map_err(EngineError::bad_snapshot)?),
            Self::Move(v) => Some(serde_json::to_value(v).map_err(EngineError::bad_snapshot)?),
            Self::StraightWalk(v) => {
                Some(serde_json::to_value(v).map_err(EngineError::bad_snapshot)?)
            }
            Self::PathPlan(v) => Some(serde_json::to_value(v).map_err(EngineError::bad_snapshot)?),
            Self::Goal(v) => Some(serde_json::to_value(v).map_err(EngineError::bad_snapshot)?),
            Self::Ticks(v) => Some(json!(v)),
            Self::Text(v) => Some(json!(v)),
            Self::Status(v) => Some(v.to_json()),
        })
    }

    /// Decode a snapshot value for the given kind.
    pub fn from_json(kind: ComponentKind, value: Option<&Value>) -> EngineResult<Self> {
        fn decode<T: serde::de::DeserializeOwned>(
            kind: ComponentKind,
            value: Option<&Value>,
        ) -> EngineResult<T> {
            let value = value.ok_or_else(|| EngineError::BadSnapshot {
                reason: format!("component `{}` is missing its value", kind.name()),
            })?;
            serde_json::from_value(value.clone()).map_err(EngineError::bad_snapshot)
        }

        Ok(match kind {
            ComponentKind::Position => Self::Position(decode(kind, value)?),
            ComponentKind::FaceDirection | ComponentKind::Pending => {
                Self::Direction(decode(kind, value)?)
            }
            ComponentKind::Move => Self::Move(decode(kind, value)?),
            ComponentKind::StraightWalk => Self::StraightWalk(decode(kind, value)?),
            ComponentKind::PathPlan => Self::PathPlan(decode(kind, value)?),
            ComponentKind::GoalPathfinding => Self::Goal(decode(kind, value)?),
            ComponentKind::Timer => Self::Ticks(decode(kind, value)?),
            ComponentKind::PlayerId => Self::Text(decode(kind, value)?),
            ComponentKind::PlayerStatus => {
                let value = value.ok_or_else(|| EngineError::BadSnapshot {
                    reason: "playerStatus is missing its value".to_string(),
                })?;
                Self::Status(PlayerStatus::from_json(value))
            }
            ComponentKind::DynamicCollider
            | ComponentKind::Timeout
            | ComponentKind::Task
            | ComponentKind::TaskCompleted
            | ComponentKind::PlayerInited
            | ComponentKind::Thinking => Self::Tag,
        })
    }

    pub fn as_position(&self) -> Option<Position> {
        match self {
            Self::Position(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_direction(&self) -> Option<Direction> {
        match self {
            Self::Direction(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_move(&self) -> Option<&Move> {
        match self {
            Self::Move(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_straight_walk(&self) -> Option<&StraightWalk> {
        match self {
            Self::StraightWalk(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_path_plan(&self) -> Option<&PathPlan> {
        match self {
            Self::PathPlan(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_goal(&self) -> Option<&Goal> {
        match self {
            Self::Goal(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_ticks(&self) -> Option<u32> {
        match self {
            Self::Ticks(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }
}

/// Well-known component keys used across passes.
pub mod keys {
    use super::{ComponentKey, ComponentKind};

    pub const POSITION: ComponentKey = ComponentKey::Plain(ComponentKind::Position);
    pub const FACE_DIRECTION: ComponentKey = ComponentKey::Plain(ComponentKind::FaceDirection);
    pub const DYNAMIC_COLLIDER: ComponentKey = ComponentKey::Plain(ComponentKind::DynamicCollider);
    pub const MOVE: ComponentKey = ComponentKey::Plain(ComponentKind::Move);
    pub const STRAIGHT_WALK: ComponentKey = ComponentKey::Plain(ComponentKind::StraightWalk);
    pub const PATH_PLAN: ComponentKey = ComponentKey::Plain(ComponentKind::PathPlan);
    pub const GOAL_PATHFINDING: ComponentKey = ComponentKey::Plain(ComponentKind::GoalPathfinding);
    pub const PLAYER_ID: ComponentKey = ComponentKey::Plain(ComponentKind::PlayerId);
    pub const PLAYER_STATUS: ComponentKey = ComponentKey::Plain(ComponentKind::PlayerStatus);
    pub const PLAYER_INITED: ComponentKey = ComponentKey::Plain(ComponentKind::PlayerInited);
    pub const THINKING: ComponentKey = ComponentKey::Plain(ComponentKind::Thinking);

    /// Reorientation to apply once the entity stands still.
    pub const PENDING_FACING: ComponentKey =
        ComponentKey::relation_to_component(ComponentKind::Pending, ComponentKind::FaceDirection);
    pub const TIMER_THINKING: ComponentKey =
        ComponentKey::relation_to_component(ComponentKind::Timer, ComponentKind::Thinking);
    pub const TIMEOUT_THINKING: ComponentKey =
        ComponentKey::relation_to_component(ComponentKind::Timeout, ComponentKind::Thinking);
    pub const TASK_THINKING: ComponentKey =
        ComponentKey::relation_to_component(ComponentKind::Task, ComponentKind::Thinking);
    pub const TASK_COMPLETED_THINKING: ComponentKey = ComponentKey::relation_to_component(
        ComponentKind::TaskCompleted,
        ComponentKind::Thinking,
    );
}
