use std::collections::{BTreeMap, HashMap};

use crate::api::behavior::Behavior;
use crate::api::error::{EngineError, Result};
use crate::api::types::EntityId;
use crate::components::entity::GameObject;
use crate::components::layer::Layer;

/// An object together with its behavior.
pub(crate) struct Slot {
    pub object: GameObject,
    pub behavior: Box<dyn Behavior>,
}

/// Registry of every object the engine holds.
///
/// Objects are registered by name as soon as they are added, but only
/// join their layer's list (and so the update, collision and render passes)
/// when [`Scene::admit_pending`] runs. Removals are likewise queued until
/// [`Scene::evict_pending`].
pub struct Scene {
    slots: HashMap<EntityId, Slot>,
    names: HashMap<String, EntityId>,
    layers: BTreeMap<Layer, Vec<EntityId>>,
    to_add: Vec<EntityId>,
    to_del: Vec<EntityId>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
            names: HashMap::new(),
            layers: BTreeMap::new(),
            to_add: Vec::new(),
            to_del: Vec::new(),
        }
    }

    /// Register `object` on `layer` and queue it for admission.
    pub(crate) fn register(&mut self, mut object: GameObject, behavior: Box<dyn Behavior>, layer: Layer) -> Result<EntityId> {
        if self.names.contains_key(object.name()) {
            return Err(EngineError::DuplicateName(object.name().to_string()));
        }
        let id = object.id();
        object.attach(layer);
        self.names.insert(object.name().to_string(), id);
        self.slots.insert(id, Slot { object, behavior });
        self.to_add.push(id);
        Ok(id)
    }

    /// Queue `id` for eviction. Repeated requests are collapsed.
    pub(crate) fn request_removal(&mut self, id: EntityId) {
        if !self.to_del.contains(&id) {
            self.to_del.push(id);
        }
    }

    /// Apply queued removals. Returns the evicted slots, detached, in
    /// request order.
    pub(crate) fn evict_pending(&mut self) -> Vec<Slot> {
        let mut evicted = Vec::with_capacity(self.to_del.len());
        for id in std::mem::take(&mut self.to_del) {
            let Some(mut slot) = self.slots.remove(&id) else {
                log::debug!("scene: removal of unknown entity {:?} ignored", id);
                continue;
            };
            self.names.remove(slot.object.name());
            if let Some(layer) = slot.object.layer() {
                if let Some(ids) = self.layers.get_mut(&layer) {
                    ids.retain(|&other| other != id);
                }
            }
            self.to_add.retain(|&other| other != id);
            slot.object.detach();
            evicted.push(slot);
        }
        evicted
    }

    /// Move queued additions into their layer lists. Returns the ids that
    /// joined a layer, in first-seen order.
    pub(crate) fn admit_pending(&mut self) -> Vec<EntityId> {
        let mut admitted = Vec::with_capacity(self.to_add.len());
        for id in std::mem::take(&mut self.to_add) {
            let Some(layer) = self.slots.get(&id).and_then(|s| s.object.layer()) else {
                continue;
            };
            let ids = self.layers.entry(layer).or_default();
            if !ids.contains(&id) {
                ids.push(id);
                admitted.push(id);
            }
        }
        admitted
    }

    /// Lend a slot out so its behavior can run with the rest of the engine
    /// borrowed mutably.
    pub(crate) fn take(&mut self, id: EntityId) -> Option<Slot> {
        self.slots.remove(&id)
    }

    pub(crate) fn restore(&mut self, slot: Slot) {
        self.slots.insert(slot.object.id(), slot);
    }

    /// Admitted ids, layers ascending, insertion order within a layer.
    pub fn live_ids(&self) -> Vec<EntityId> {
        self.layers.values().flatten().copied().collect()
    }

    /// Admitted ids grouped by layer.
    pub fn layers(&self) -> impl Iterator<Item = (Layer, &[EntityId])> {
        self.layers.iter().map(|(&layer, ids)| (layer, ids.as_slice()))
    }

    pub fn layer(&self, layer: Layer) -> &[EntityId] {
        self.layers.get(&layer).map_or(&[], Vec::as_slice)
    }

    pub fn get(&self, id: EntityId) -> Option<&GameObject> {
        self.slots.get(&id).map(|s| &s.object)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut GameObject> {
        self.slots.get_mut(&id).map(|s| &mut s.object)
    }

    pub fn id_of(&self, name: &str) -> Option<EntityId> {
        self.names.get(name).copied()
    }

    /// Admitted objects on `layer` whose tag starts with `prefix`.
    pub fn find_by_tag(&self, layer: Layer, prefix: &str) -> Vec<EntityId> {
        self.layer(layer)
            .iter()
            .copied()
            .filter(|id| self.get(*id).is_some_and(|o| o.tag().starts_with(prefix)))
            .collect()
    }

    /// Objects on the same layer as `object`, with colliders enabled, that
    /// overlap it. Empty when `object` has colliders disabled.
    pub fn collisions_of(&self, object: &GameObject) -> Vec<EntityId> {
        let Some(layer) = object.layer() else {
            return Vec::new();
        };
        if !object.colliders_enabled() {
            return Vec::new();
        }
        self.layer(layer)
            .iter()
            .copied()
            .filter(|&id| id != object.id())
            .filter(|id| {
                self.get(*id)
                    .is_some_and(|o| o.colliders_enabled() && object.collides_with(o))
            })
            .collect()
    }

    /// Registered objects, including those still waiting for admission.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
