//! In-memory host entity store.
//!
//! # Responsibility
//! - Provide a working `EntityStore` for the CLI and for tests.
//! - Hand out detached entity copies so unsaved changes never leak into the
//!   store.
//!
//! # Invariants
//! - Only `save()` writes an entity back into its store.
//! - The store is single-threaded (`Rc<RefCell<_>>`).

use crate::import::entity::{EntityStore, HostEntity};
use crate::interchange::external_id::ExternalIds;
use crate::model::value::AttrValue;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

type SharedEntities = Rc<RefCell<BTreeMap<i64, MemoryEntity>>>;

/// Detached copy of one entity's state.
#[derive(Debug, Clone, Default)]
pub struct MemoryEntity {
    guid: i64,
    pub attributes: BTreeMap<String, AttrValue>,
    pub annotations: Vec<(String, AttrValue)>,
    pub metadata: Vec<(String, AttrValue)>,
    save_count: u32,
    reject_saves: bool,
    store: Option<SharedEntities>,
}

impl MemoryEntity {
    pub fn new(guid: i64) -> Self {
        Self {
            guid,
            ..Self::default()
        }
    }

    /// Makes every `save()` on this entity fail.
    pub fn rejecting_saves(mut self) -> Self {
        self.reject_saves = true;
        self
    }

    pub fn save_count(&self) -> u32 {
        self.save_count
    }

    /// Returns all metadata values for `name` in insertion order.
    pub fn metadata_values(&self, name: &str) -> Vec<&AttrValue> {
        self.metadata
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value)
            .collect()
    }

    pub fn annotation_values(&self, name: &str) -> Vec<&AttrValue> {
        self.annotations
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value)
            .collect()
    }

    /// Compares entity state, ignoring save bookkeeping.
    pub fn same_state(&self, other: &MemoryEntity) -> bool {
        self.guid == other.guid
            && self.attributes == other.attributes
            && self.annotations == other.annotations
            && self.metadata == other.metadata
    }
}

impl HostEntity for MemoryEntity {
    fn guid(&self) -> i64 {
        self.guid
    }

    fn annotate(&mut self, name: &str, value: AttrValue) {
        self.annotations.push((name.to_string(), value));
    }

    fn set_metadata(&mut self, name: &str, value: AttrValue, _namespace: &str, multi_valued: bool) {
        if !multi_valued {
            self.metadata.retain(|(key, _)| key != name);
        }
        self.metadata.push((name.to_string(), value));
    }

    fn set(&mut self, name: &str, value: AttrValue) {
        self.attributes.insert(name.to_string(), value);
    }

    fn save(&mut self) -> bool {
        if self.reject_saves {
            return false;
        }
        self.save_count += 1;
        if let Some(store) = &self.store {
            let mut committed = self.clone();
            committed.store = None;
            store.borrow_mut().insert(self.guid, committed);
        }
        true
    }
}

/// Entity store keyed by guid, resolving external ids for one site.
#[derive(Debug, Clone)]
pub struct MemoryEntityStore {
    ids: ExternalIds,
    entities: SharedEntities,
}

impl MemoryEntityStore {
    pub fn new(ids: ExternalIds) -> Self {
        Self {
            ids,
            entities: Rc::new(RefCell::new(BTreeMap::new())),
        }
    }

    pub fn insert(&self, mut entity: MemoryEntity) {
        entity.store = None;
        self.entities.borrow_mut().insert(entity.guid, entity);
    }

    /// Returns the committed state of one entity.
    pub fn committed(&self, guid: i64) -> Option<MemoryEntity> {
        self.entities.borrow().get(&guid).cloned()
    }

    pub fn ids(&self) -> &ExternalIds {
        &self.ids
    }
}

impl EntityStore for MemoryEntityStore {
    type Entity = MemoryEntity;

    fn resolve_entity(&self, guid: i64) -> Option<MemoryEntity> {
        let mut entity = self.entities.borrow().get(&guid).cloned()?;
        entity.store = Some(Rc::clone(&self.entities));
        Some(entity)
    }

    fn resolve_entity_by_uuid(&self, uuid: &str) -> Option<MemoryEntity> {
        let guid = self.ids.uuid_to_guid(uuid)?;
        self.resolve_entity(guid)
    }
}
