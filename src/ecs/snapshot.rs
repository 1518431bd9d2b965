//! World snapshot encode / restore.
//!
//! The snapshot is a plain data tree: format version, entity-manager
//! state, and per-entity component lists. Component types are written as
//! registry names; relation keys as `{component, target}` where the
//! target is an entity id or another registry name. Restoring replays
//! entity creation and every `set` in order, so hooks observe restored
//! state exactly as they observe live mutations and entity ids are
//! preserved.

use crate::ecs::component::{ComponentKey, ComponentKind, ComponentValue, RelationTarget};
use crate::ecs::entity::EntityManager;
use crate::ecs::world::World;
use crate::ecs::EntityId;
use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Serialized world, shaped exactly like the wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedWorld {
    pub version: u32,
    pub entity_manager: SavedEntityManager,
    pub entities: Vec<SavedEntity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedEntityManager {
    pub versions: Vec<u32>,
    pub free: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedEntity {
    pub id: u32,
    pub components: Vec<SavedComponent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedComponent {
    #[serde(rename = "type")]
    pub kind: SavedType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// A component type on the wire: a registry name, or a relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SavedType {
    Name(String),
    Relation { component: String, target: SavedTarget },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SavedTarget {
    Entity(u32),
    Component(String),
}

fn encode_key(key: &ComponentKey) -> SavedType {
    match key {
        ComponentKey::Plain(kind) => SavedType::Name(kind.name().to_string()),
        ComponentKey::Relation { kind, target } => SavedType::Relation {
            component: kind.name().to_string(),
            target: match target {
                RelationTarget::Entity(id) => SavedTarget::Entity(id.index),
                RelationTarget::Component(kind) => SavedTarget::Component(kind.name().to_string()),
            },
        },
    }
}

fn decode_key(saved: &SavedType, entities: &EntityManager) -> EngineResult<ComponentKey> {
    Ok(match saved {
        SavedType::Name(name) => ComponentKey::Plain(ComponentKind::from_name(name)?),
        SavedType::Relation { component, target } => ComponentKey::Relation {
            kind: ComponentKind::from_name(component)?,
            target: match target {
                SavedTarget::Component(name) => {
                    RelationTarget::Component(ComponentKind::from_name(name)?)
                }
                SavedTarget::Entity(index) => {
                    let id = entities
                        .handle_of(*index)
                        .ok_or_else(|| EngineError::BadSnapshot {
                            reason: format!("relation targets missing entity {index}"),
                        })?;
                    RelationTarget::Entity(id)
                }
            },
        },
    })
}

impl World {
    /// Encode the whole world. Entities are listed in ascending id order
    /// and components in stable key order, so the output is byte-for-byte
    /// reproducible for a given world state.
    pub fn serialize(&self) -> EngineResult<SavedWorld> {
        let (versions, free) = self.entity_manager().export();
        let mut entities = Vec::with_capacity(self.entity_count());
        for id in self.entities() {
            let mut components = Vec::new();
            for (key, value) in self.components_of(id) {
                components.push(SavedComponent {
                    kind: encode_key(&key),
                    value: value.to_json()?,
                });
            }
            entities.push(SavedEntity { id: id.index, components });
        }
        Ok(SavedWorld {
            version: crate::constants::snapshot::FORMAT_VERSION,
            entity_manager: SavedEntityManager { versions, free },
            entities,
        })
    }

    /// Encode to the UTF-8 JSON blob handed to hosts.
    pub fn save_bytes(&self) -> EngineResult<Vec<u8>> {
        serde_json::to_vec(&self.serialize()?).map_err(EngineError::bad_snapshot)
    }

    /// Replay a snapshot into this (empty) world. Hooks already
    /// registered on the world fire during the replay; anything they
    /// defer stays queued until the next sync, so a freshly restored
    /// world serializes back to the exact bytes it was built from.
    /// Unknown component names are a hard error.
    pub fn load(&mut self, saved: &SavedWorld) -> EngineResult<()> {
        if saved.version != crate::constants::snapshot::FORMAT_VERSION {
            return Err(EngineError::BadSnapshot {
                reason: format!(
                    "unsupported snapshot version {} (engine writes {})",
                    saved.version,
                    crate::constants::snapshot::FORMAT_VERSION
                ),
            });
        }
        let manager = EntityManager::restore(
            saved.entity_manager.versions.clone(),
            saved.entity_manager.free.clone(),
        );
        self.restore_entities(manager);

        for entity in &saved.entities {
            let id: EntityId =
                self.handle_of(entity.id).ok_or_else(|| EngineError::BadSnapshot {
                    reason: format!("entity {} is on the free list but has components", entity.id),
                })?;
            for component in &entity.components {
                let key = decode_key(&component.kind, self.entity_manager())?;
                let value = ComponentValue::from_json(key.kind(), component.value.as_ref())?;
                self.set(id, key, value)?;
            }
        }
        Ok(())
    }

    /// Decode a JSON blob and replay it.
    pub fn load_bytes(&mut self, bytes: &[u8]) -> EngineResult<()> {
        let saved: SavedWorld =
            serde_json::from_slice(bytes).map_err(EngineError::bad_snapshot)?;
        self.load(&saved)
    }
}
