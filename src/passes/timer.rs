//! Count down timer relations; expiry flips them into timeout markers.
//!
//! A timer and its timeout are mutually exclusive for a given tag: the
//! tick that zeroes the timer removes it and raises the timeout, which
//! stays until a consumer clears it.

use crate::ecs::{ComponentKey, ComponentKind, ComponentValue, World};
use crate::error::EngineResult;
use crate::pipeline::{Pass, TickContext};

pub struct TimerPass;

impl TimerPass {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TimerPass {
    fn default() -> Self {
        Self::new()
    }
}

impl Pass for TimerPass {
    fn name(&self) -> &'static str {
        "timer"
    }

    fn run(&mut self, world: &mut World, _ctx: &mut TickContext<'_>) -> EngineResult<()> {
        for id in world.entities() {
            for (target, value) in world.relations_of(id, ComponentKind::Timer) {
                let Some(remaining) = value.as_ticks() else { continue };
                let timer = ComponentKey::Relation { kind: ComponentKind::Timer, target };
                if remaining > 0 {
                    world.set(id, timer, ComponentValue::Ticks(remaining - 1))?;
                } else {
                    world.remove(id, &timer);
                    world.set_tag(
                        id,
                        ComponentKey::Relation { kind: ComponentKind::Timeout, target },
                    )?;
                }
            }
        }
        Ok(())
    }
}
