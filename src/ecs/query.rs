//! Cached entity queries.
//!
//! A query names the component keys an entity must have and the keys it
//! must not have. Membership is evaluated against the world at creation
//! and again at every `sync()`; passes iterate the cached membership so a
//! whole tick sees one consistent snapshot.

use crate::ecs::{ComponentKey, EntityId};

/// Identifier of a cached query inside a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryId(pub(crate) usize);

/// The shape of a query: required keys and negative filters.
#[derive(Debug, Clone, Default)]
pub struct QueryDef {
    pub required: Vec<ComponentKey>,
    pub negative: Vec<ComponentKey>,
}

impl QueryDef {
    pub fn new(required: impl Into<Vec<ComponentKey>>) -> Self {
        Self { required: required.into(), negative: Vec::new() }
    }

    pub fn without(mut self, negative: impl Into<Vec<ComponentKey>>) -> Self {
        self.negative = negative.into();
        self
    }
}

/// A query definition plus its cached membership.
#[derive(Debug)]
pub(crate) struct QueryState {
    pub def: QueryDef,
    pub members: Vec<EntityId>,
}
