//! The component store.
//!
//! Owns all entities and component slots, the relation rows between them,
//! the registered mutation hooks and the deferred-operation queue applied
//! at `sync()`.

use crate::ecs::component::{ComponentKey, ComponentKind, ComponentValue, RelationTarget};
use crate::ecs::entity::{EntityId, EntityManager};
use crate::ecs::query::{QueryDef, QueryId, QueryState};
use crate::error::{EngineError, EngineResult};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

/// Mutation observed by a hook. Hooks run synchronously at mutation time;
/// anything they want changed goes through the deferred queue and lands
/// at the next `sync()`.
pub type HookFn = Rc<dyn Fn(EntityId, &ComponentKey, Option<&ComponentValue>, &mut Vec<DeferredOp>)>;

/// Observers for one component kind.
#[derive(Default, Clone)]
pub struct ComponentHooks {
    /// Fired when the key appears on an entity that did not have it.
    pub on_init: Option<HookFn>,
    /// Fired on every set, including the first.
    pub on_set: Option<HookFn>,
    /// Fired when the key is removed (including entity destruction).
    pub on_remove: Option<HookFn>,
}

/// A mutation buffered for the next sync point.
#[derive(Debug, Clone)]
pub enum DeferredOp {
    Set(EntityId, ComponentKey, ComponentValue),
    Remove(EntityId, ComponentKey),
    Destroy(EntityId),
}

/// The world: entities, component slots, relations, queries and hooks.
#[derive(Default)]
pub struct World {
    entities: EntityManager,
    slots: Vec<BTreeMap<ComponentKey, ComponentValue>>,
    queries: Vec<QueryState>,
    hooks: HashMap<ComponentKind, ComponentHooks>,
    deferred: Vec<DeferredOp>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    // --- entities ---------------------------------------------------------

    /// Create a new entity.
    pub fn create_entity(&mut self) -> EntityId {
        let id = self.entities.create();
        let slot = id.index as usize;
        if slot >= self.slots.len() {
            self.slots.resize_with(slot + 1, BTreeMap::new);
        }
        self.slots[slot].clear();
        id
    }

    /// Destroy an entity: removes all of its components and every
    /// relation row on other entities that targets it. A stale handle is
    /// a no-op.
    pub fn destroy_entity(&mut self, id: EntityId) {
        if !self.entities.exists(id) {
            return;
        }
        let keys: Vec<ComponentKey> = self.slots[id.index as usize].keys().copied().collect();
        for key in keys {
            self.remove(id, &key);
        }
        let others: Vec<EntityId> = self.entities.iter().filter(|e| *e != id).collect();
        for other in others {
            let rows: Vec<ComponentKey> = self.slots[other.index as usize]
                .keys()
                .filter(|key| key.targets_entity(id))
                .copied()
                .collect();
            for key in rows {
                self.remove(other, &key);
            }
        }
        self.entities.destroy(id);
    }

    pub fn exists(&self, id: EntityId) -> bool {
        self.entities.exists(id)
    }

    /// Live entities, ascending slot order.
    pub fn entities(&self) -> Vec<EntityId> {
        self.entities.iter().collect()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub(crate) fn entity_manager(&self) -> &EntityManager {
        &self.entities
    }

    /// Re-point a snapshot entity id at its live handle.
    pub fn handle_of(&self, index: u32) -> Option<EntityId> {
        self.entities.handle_of(index)
    }

    pub(crate) fn restore_entities(&mut self, manager: EntityManager) {
        self.slots = vec![BTreeMap::new(); manager.slot_count()];
        self.entities = manager;
    }

    // --- components -------------------------------------------------------

    /// Set a component slot. Setting on a destroyed entity is a logic
    /// error and is reported as such.
    pub fn set(&mut self, id: EntityId, key: ComponentKey, value: ComponentValue) -> EngineResult<()> {
        if !self.entities.exists(id) {
            return Err(EngineError::EntityGone { id });
        }
        let slot = &mut self.slots[id.index as usize];
        let is_new = !slot.contains_key(&key);
        slot.insert(key, value);

        let hooks = self.hooks.get(&key.kind()).cloned().unwrap_or_default();
        let current = self.slots[id.index as usize].get(&key).cloned();
        if is_new {
            if let Some(hook) = hooks.on_init {
                hook(id, &key, current.as_ref(), &mut self.deferred);
            }
        }
        if let Some(hook) = hooks.on_set {
            hook(id, &key, current.as_ref(), &mut self.deferred);
        }
        Ok(())
    }

    /// Convenience for marker components.
    pub fn set_tag(&mut self, id: EntityId, key: ComponentKey) -> EngineResult<()> {
        self.set(id, key, ComponentValue::Tag)
    }

    /// Read a component slot. Stale handles read as absent.
    pub fn get(&self, id: EntityId, key: &ComponentKey) -> Option<&ComponentValue> {
        if !self.entities.exists(id) {
            return None;
        }
        self.slots[id.index as usize].get(key)
    }

    pub fn has(&self, id: EntityId, key: &ComponentKey) -> bool {
        self.get(id, key).is_some()
    }

    /// Remove a component slot. A no-op on stale handles or absent keys.
    pub fn remove(&mut self, id: EntityId, key: &ComponentKey) {
        if !self.entities.exists(id) {
            return;
        }
        let removed = self.slots[id.index as usize].remove(key);
        if let Some(old) = removed {
            if let Some(hook) =
                self.hooks.get(&key.kind()).and_then(|hooks| hooks.on_remove.clone())
            {
                hook(id, key, Some(&old), &mut self.deferred);
            }
        }
    }

    /// All relation rows of one kind on an entity, as `(target, value)`
    /// pairs in stable key order.
    pub fn relations_of(&self, id: EntityId, kind: ComponentKind) -> Vec<(RelationTarget, ComponentValue)> {
        if !self.entities.exists(id) {
            return Vec::new();
        }
        self.slots[id.index as usize]
            .iter()
            .filter_map(|(key, value)| match key {
                ComponentKey::Relation { kind: k, target } if *k == kind => {
                    Some((*target, value.clone()))
                }
                _ => None,
            })
            .collect()
    }

    /// Iterate the full component map of one entity, in stable key order.
    pub(crate) fn components_of(&self, id: EntityId) -> Vec<(ComponentKey, ComponentValue)> {
        if !self.entities.exists(id) {
            return Vec::new();
        }
        self.slots[id.index as usize]
            .iter()
            .map(|(key, value)| (*key, value.clone()))
            .collect()
    }

    // --- hooks ------------------------------------------------------------

    /// Register observers for a component kind (plain or relation).
    pub fn hook(&mut self, kind: ComponentKind, hooks: ComponentHooks) {
        self.hooks.insert(kind, hooks);
    }

    // --- deferred ops & sync ----------------------------------------------

    /// Buffer a mutation for the next sync point.
    pub fn defer(&mut self, op: DeferredOp) {
        self.deferred.push(op);
    }

    /// Apply deferred mutations and refresh query membership. Called once
    /// per tick as the final pass; passes in between see the membership
    /// computed by the previous sync.
    pub fn sync(&mut self) {
        let mut rounds = 0;
        while !self.deferred.is_empty() {
            let ops = std::mem::take(&mut self.deferred);
            for op in ops {
                match op {
                    DeferredOp::Set(id, key, value) => {
                        if self.entities.exists(id) {
                            // The entity may have died since the op was
                            // queued; dropping the write is the correct
                            // outcome then.
                            let _ = self.set(id, key, value);
                        }
                    }
                    DeferredOp::Remove(id, key) => self.remove(id, &key),
                    DeferredOp::Destroy(id) => self.destroy_entity(id),
                }
            }
            rounds += 1;
            if rounds > 64 {
                log::warn!("sync: deferred queue did not drain after {rounds} rounds, dropping remainder");
                self.deferred.clear();
                break;
            }
        }
        self.refresh_queries();
    }

    // --- queries ----------------------------------------------------------

    /// Create a cached query. Membership is evaluated immediately and on
    /// every subsequent `sync()`.
    pub fn create_query(&mut self, def: QueryDef) -> QueryId {
        let members = self.evaluate(&def);
        self.queries.push(QueryState { def, members });
        QueryId(self.queries.len() - 1)
    }

    /// Snapshot of a query's membership. Entities that died since the
    /// last sync are filtered out so passes never touch stale handles.
    pub fn members(&self, query: QueryId) -> Vec<EntityId> {
        self.queries[query.0]
            .members
            .iter()
            .copied()
            .filter(|id| self.entities.exists(*id))
            .collect()
    }

    fn evaluate(&self, def: &QueryDef) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|id| {
                let slot = &self.slots[id.index as usize];
                def.required.iter().all(|key| slot.contains_key(key))
                    && def.negative.iter().all(|key| !slot.contains_key(key))
            })
            .collect()
    }

    fn refresh_queries(&mut self) {
        for i in 0..self.queries.len() {
            let def = self.queries[i].def.clone();
            self.queries[i].members = self.evaluate(&def);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::component::{ComponentKey, ComponentKind, ComponentValue};
    use crate::grid::Position;
    use std::cell::RefCell;

    const POSITION: ComponentKey = ComponentKey::Plain(ComponentKind::Position);
    const THINKING: ComponentKey = ComponentKey::Plain(ComponentKind::Thinking);
    const TIMER_THINKING: ComponentKey =
        ComponentKey::relation_to_component(ComponentKind::Timer, ComponentKind::Thinking);

    #[test]
    fn set_get_remove() {
        let mut world = World::new();
        let e = world.create_entity();
        world.set(e, POSITION, ComponentValue::Position(Position::new(1, 2))).unwrap();
        assert_eq!(
            world.get(e, &POSITION).and_then(|v| v.as_position()),
            Some(Position::new(1, 2))
        );
        world.remove(e, &POSITION);
        assert!(!world.has(e, &POSITION));
    }

    #[test]
    fn operations_on_destroyed_entities() {
        let mut world = World::new();
        let e = world.create_entity();
        world.set_tag(e, THINKING).unwrap();
        world.destroy_entity(e);

        assert!(world.get(e, &THINKING).is_none());
        assert!(!world.has(e, &THINKING));
        world.remove(e, &THINKING); // silently ignored
        assert!(matches!(
            world.set_tag(e, THINKING),
            Err(EngineError::EntityGone { .. })
        ));
    }

    #[test]
    fn relations_and_wildcard_lookup() {
        let mut world = World::new();
        let e = world.create_entity();
        world.set(e, TIMER_THINKING, ComponentValue::Ticks(5)).unwrap();
        world
            .set(
                e,
                ComponentKey::relation_to_component(ComponentKind::Timer, ComponentKind::Pending),
                ComponentValue::Ticks(9),
            )
            .unwrap();

        let rows = world.relations_of(e, ComponentKind::Timer);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().any(|(_, v)| v.as_ticks() == Some(5)));
        assert!(rows.iter().any(|(_, v)| v.as_ticks() == Some(9)));
    }

    #[test]
    fn destroy_cascades_entity_targeted_relations() {
        let mut world = World::new();
        let a = world.create_entity();
        let b = world.create_entity();
        let follows = ComponentKey::relation_to_entity(ComponentKind::Task, b);
        world.set_tag(a, follows).unwrap();
        assert!(world.has(a, &follows));

        world.destroy_entity(b);
        assert!(!world.has(a, &follows));
        assert!(world.exists(a));
    }

    #[test]
    fn query_membership_updates_at_sync() {
        let mut world = World::new();
        let e = world.create_entity();
        let q = world.create_query(QueryDef::new(vec![THINKING]).without(vec![POSITION]));
        assert!(world.members(q).is_empty());

        world.set_tag(e, THINKING).unwrap();
        assert!(world.members(q).is_empty()); // not visible until sync
        world.sync();
        assert_eq!(world.members(q), vec![e]);

        world.set(e, POSITION, ComponentValue::Position(Position::new(0, 0))).unwrap();
        world.sync();
        assert!(world.members(q).is_empty()); // negative filter
    }

    #[test]
    fn hooks_fire_and_deferred_ops_apply_at_sync() {
        let fired = Rc::new(RefCell::new(Vec::new()));
        let mut world = World::new();

        let log = fired.clone();
        world.hook(
            ComponentKind::Task,
            ComponentHooks {
                on_init: Some(Rc::new(move |id, _, _, deferred| {
                    log.borrow_mut().push(format!("init {id}"));
                    deferred.push(DeferredOp::Set(
                        id,
                        ComponentKey::Plain(ComponentKind::Thinking),
                        ComponentValue::Tag,
                    ));
                })),
                on_set: None,
                on_remove: {
                    let log = fired.clone();
                    Some(Rc::new(move |id, _, _, _| {
                        log.borrow_mut().push(format!("remove {id}"));
                    }))
                },
            },
        );

        let e = world.create_entity();
        let task = ComponentKey::relation_to_component(ComponentKind::Task, ComponentKind::Thinking);
        world.set_tag(e, task).unwrap();
        assert_eq!(fired.borrow().len(), 1);
        assert!(!world.has(e, &THINKING));

        world.sync();
        assert!(world.has(e, &THINKING)); // deferred op landed

        world.remove(e, &task);
        assert_eq!(fired.borrow().len(), 2);
    }
}
