//! Per-entity cancellable tasks.
//!
//! A task is a marker relation plus a cancellation handle held outside
//! the world. Completion is cooperative: the behaviour that starts a
//! task schedules its completion at a host-clock instant, and the engine
//! drains due completions at the top of each tick. Removing the task
//! relation by any means (explicitly, or through entity destruction)
//! cancels the outstanding completion.

use crate::ecs::component::{ComponentKey, ComponentKind, RelationTarget};
use crate::ecs::{ComponentHooks, ComponentValue, DeferredOp, EntityId, World};
use crate::error::EngineResult;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Instant;

/// Host clock abstraction, milliseconds since an arbitrary origin.
/// Injectable so tests drive time by hand.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Wall clock measured from engine start.
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Test clock advanced explicitly.
#[derive(Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

type HandleMap = Rc<RefCell<HashMap<u32, Rc<Cell<bool>>>>>;

struct Scheduled {
    entity: EntityId,
    due_ms: u64,
    cancelled: Rc<Cell<bool>>,
}

/// Tasks tagged with one target component (the thinking marker for the
/// demo behaviour).
pub struct TaskManager {
    target: ComponentKind,
    handles: HandleMap,
    scheduled: Vec<Scheduled>,
}

impl TaskManager {
    pub fn new(target: ComponentKind) -> Self {
        Self { target, handles: Rc::new(RefCell::new(HashMap::new())), scheduled: Vec::new() }
    }

    fn task_key(&self) -> ComponentKey {
        ComponentKey::relation_to_component(ComponentKind::Task, self.target)
    }

    fn completed_key(&self) -> ComponentKey {
        ComponentKey::relation_to_component(ComponentKind::TaskCompleted, self.target)
    }

    /// Register the world hooks that tie relation rows to handles: a
    /// task relation appearing without a registered handle (a restored
    /// snapshot) is stripped, and a disappearing one cancels its handle.
    pub fn install_hooks(&self, world: &mut World) {
        let target = RelationTarget::Component(self.target);

        let handles = self.handles.clone();
        let on_init = move |id: EntityId,
                            key: &ComponentKey,
                            _value: Option<&ComponentValue>,
                            deferred: &mut Vec<DeferredOp>| {
            let ComponentKey::Relation { target: t, .. } = key else { return };
            if *t != target {
                return;
            }
            if !handles.borrow().contains_key(&id.index) {
                log::warn!("entity {id}: task relation with no live handle, removing");
                deferred.push(DeferredOp::Remove(id, *key));
            }
        };

        let handles = self.handles.clone();
        let on_remove = move |id: EntityId,
                              key: &ComponentKey,
                              _value: Option<&ComponentValue>,
                              _deferred: &mut Vec<DeferredOp>| {
            let ComponentKey::Relation { target: t, .. } = key else { return };
            if *t != target {
                return;
            }
            if let Some(cancelled) = handles.borrow_mut().remove(&id.index) {
                cancelled.set(true);
            }
        };

        world.hook(
            ComponentKind::Task,
            ComponentHooks {
                on_init: Some(Rc::new(on_init)),
                on_set: None,
                on_remove: Some(Rc::new(on_remove)),
            },
        );
    }

    /// Start a task on an entity and schedule its completion at
    /// `due_ms` on the host clock.
    pub fn start(&mut self, world: &mut World, entity: EntityId, due_ms: u64) -> EngineResult<()> {
        let cancelled = Rc::new(Cell::new(false));
        self.handles.borrow_mut().insert(entity.index, cancelled.clone());
        world.set_tag(entity, self.task_key())?;
        self.scheduled.push(Scheduled { entity, due_ms, cancelled });
        Ok(())
    }

    /// Complete a task now: swap the task relation for the completed
    /// relation and flush so behaviour queries see it next tick.
    pub fn complete(&mut self, world: &mut World, entity: EntityId) -> EngineResult<()> {
        world.remove(entity, &self.task_key());
        world.set_tag(entity, self.completed_key())?;
        world.sync();
        Ok(())
    }

    /// Tear a task down: target component and both lifecycle relations.
    pub fn stop(&mut self, world: &mut World, entity: EntityId) {
        world.remove(entity, &ComponentKey::Plain(self.target));
        world.remove(entity, &self.task_key());
        world.remove(entity, &self.completed_key());
    }

    /// Fire every due, still-live completion. Cancelled entries are
    /// dropped silently.
    pub fn drain_due(&mut self, world: &mut World, now_ms: u64) -> EngineResult<()> {
        let (due, waiting): (Vec<Scheduled>, Vec<Scheduled>) =
            std::mem::take(&mut self.scheduled).into_iter().partition(|s| s.due_ms <= now_ms);
        self.scheduled = waiting;
        for item in due {
            if item.cancelled.get() || !world.exists(item.entity) {
                continue;
            }
            self.complete(world, item.entity)?;
        }
        Ok(())
    }

    /// Outstanding scheduled completions (for tests and diagnostics).
    pub fn pending_completions(&self) -> usize {
        self.scheduled.len()
    }
}
