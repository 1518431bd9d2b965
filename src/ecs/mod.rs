//! Entity-component store with relations, cached queries, hooks,
//! deferred mutation and whole-world snapshots.

pub mod component;
pub mod components;
pub mod entity;
pub mod query;
pub mod snapshot;
pub mod world;

pub use component::{
    ComponentKey, ComponentKind, ComponentValue, RelationTarget, ALL_COMPONENT_KINDS,
};
pub use components::{Goal, Move, PathPlan, PlayerStatus, StraightWalk};
pub use entity::{EntityId, EntityManager};
pub use query::{QueryDef, QueryId};
pub use snapshot::SavedWorld;
pub use world::{ComponentHooks, DeferredOp, HookFn, World};
