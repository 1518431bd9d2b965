//! The narrative event sink.
//!
//! The engine talks to its host through this one-way interface: the
//! behaviour passes report thinking and conversation lifecycle events,
//! the host renders them however it likes.

use serde_json::{json, Value};
use std::cell::RefCell;
use std::rc::Rc;

/// High-level narrative events, with their wire names and payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformEvent {
    ThinkingStart { player_id: String, content: String },
    ThinkingEnd { player_id: String },
    ConversationStart { conversation_id: String, player_ids: Vec<String> },
    ConversationUpdate { conversation_id: String, source: Option<String>, content: String },
    ConversationEnd { conversation_id: String },
}

impl PlatformEvent {
    /// Event name on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ThinkingStart { .. } => "thinking:start",
            Self::ThinkingEnd { .. } => "thinking:end",
            Self::ConversationStart { .. } => "conversation:start",
            Self::ConversationUpdate { .. } => "conversation:update",
            Self::ConversationEnd { .. } => "conversation:end",
        }
    }

    /// Event payload on the wire.
    pub fn payload(&self) -> Value {
        match self {
            Self::ThinkingStart { player_id, content } => {
                json!({ "playerId": player_id, "content": content })
            }
            Self::ThinkingEnd { player_id } => json!({ "playerId": player_id }),
            Self::ConversationStart { conversation_id, player_ids } => {
                json!({ "conversationId": conversation_id, "playerIds": player_ids })
            }
            Self::ConversationUpdate { conversation_id, source, content } => match source {
                Some(source) => json!({
                    "conversationId": conversation_id,
                    "source": source,
                    "content": content,
                }),
                None => json!({ "conversationId": conversation_id, "content": content }),
            },
            Self::ConversationEnd { conversation_id } => {
                json!({ "conversationId": conversation_id })
            }
        }
    }
}

/// Host-provided sink for narrative events.
pub trait Platform {
    fn emit_event(&mut self, event: PlatformEvent);
}

/// Sink that forwards events to the logger. Handy for headless runs.
#[derive(Debug, Default)]
pub struct LogPlatform;

impl Platform for LogPlatform {
    fn emit_event(&mut self, event: PlatformEvent) {
        log::info!("platform event {}: {}", event.name(), event.payload());
    }
}

/// Sink that records events in memory; tests read them back through the
/// shared handle.
#[derive(Debug, Default)]
pub struct MemoryPlatform {
    events: Rc<RefCell<Vec<PlatformEvent>>>,
}

impl MemoryPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle onto the recorded events.
    pub fn events(&self) -> Rc<RefCell<Vec<PlatformEvent>>> {
        self.events.clone()
    }
}

impl Platform for MemoryPlatform {
    fn emit_event(&mut self, event: PlatformEvent) {
        self.events.borrow_mut().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_and_payloads() {
        let event = PlatformEvent::ThinkingStart { player_id: "ada".into(), content: "hm".into() };
        assert_eq!(event.name(), "thinking:start");
        assert_eq!(event.payload(), json!({ "playerId": "ada", "content": "hm" }));

        let update = PlatformEvent::ConversationUpdate {
            conversation_id: "c1".into(),
            source: None,
            content: "hello".into(),
        };
        assert_eq!(update.payload(), json!({ "conversationId": "c1", "content": "hello" }));
    }
}
