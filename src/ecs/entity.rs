//! Entity identity and slot management.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Opaque entity handle: a storage slot plus a version counter. A handle
/// is only valid while its version matches the slot's current version,
/// so handles to destroyed entities go stale instead of aliasing the
/// slot's next occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId {
    pub index: u32,
    pub version: u32,
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "e{}v{}", self.index, self.version)
    }
}

/// Manages entity creation and destruction, recycling slots.
#[derive(Debug, Default)]
pub struct EntityManager {
    versions: Vec<u32>,
    alive: Vec<bool>,
    free: VecDeque<u32>,
}

impl EntityManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new entity, reusing a free slot when one exists.
    pub fn create(&mut self) -> EntityId {
        let index = if let Some(index) = self.free.pop_front() {
            index
        } else {
            self.versions.push(0);
            self.alive.push(false);
            (self.versions.len() - 1) as u32
        };
        self.alive[index as usize] = true;
        EntityId { index, version: self.versions[index as usize] }
    }

    /// Destroy an entity. Bumps the slot version so outstanding handles
    /// go stale. Returns false when the handle was already stale.
    pub fn destroy(&mut self, id: EntityId) -> bool {
        if !self.exists(id) {
            return false;
        }
        self.alive[id.index as usize] = false;
        self.versions[id.index as usize] += 1;
        self.free.push_back(id.index);
        true
    }

    pub fn exists(&self, id: EntityId) -> bool {
        self.alive
            .get(id.index as usize)
            .copied()
            .unwrap_or(false)
            && self.versions[id.index as usize] == id.version
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.alive.iter().filter(|a| **a).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of slots ever allocated, live or not.
    pub fn slot_count(&self) -> usize {
        self.versions.len()
    }

    /// Live entities in ascending slot order.
    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.alive.iter().enumerate().filter_map(|(i, alive)| {
            alive.then(|| EntityId { index: i as u32, version: self.versions[i] })
        })
    }

    /// The current handle for a slot, if it is live.
    pub fn handle_of(&self, index: u32) -> Option<EntityId> {
        let id = EntityId { index, version: *self.versions.get(index as usize)? };
        self.exists(id).then_some(id)
    }

    /// Raw state for snapshots.
    pub fn export(&self) -> (Vec<u32>, Vec<u32>) {
        (self.versions.clone(), self.free.iter().copied().collect())
    }

    /// Rebuild from snapshot state. Every slot not on the free list is
    /// considered live.
    pub fn restore(versions: Vec<u32>, free: Vec<u32>) -> Self {
        let mut alive = vec![true; versions.len()];
        for &index in &free {
            if let Some(slot) = alive.get_mut(index as usize) {
                *slot = false;
            }
        }
        Self { versions, alive, free: free.into_iter().collect() }
    }
}
