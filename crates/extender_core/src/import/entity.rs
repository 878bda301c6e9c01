//! Host entity collaborator contracts.
//!
//! The host entity owns its own storage and schema. The import path only
//! needs these mutation and lookup entry points.

use crate::model::value::AttrValue;

/// Mutable view of one host entity.
pub trait HostEntity {
    fn guid(&self) -> i64;

    /// Appends an annotation.
    fn annotate(&mut self, name: &str, value: AttrValue);

    /// Sets metadata. With `multi_valued`, existing values for `name` are
    /// kept and `value` is added alongside them.
    fn set_metadata(&mut self, name: &str, value: AttrValue, namespace: &str, multi_valued: bool);

    /// Sets a plain entity attribute.
    fn set(&mut self, name: &str, value: AttrValue);

    /// Persists pending changes. Returns `false` on failure.
    fn save(&mut self) -> bool;
}

/// Entity lookup used by import and by extender accessors.
pub trait EntityStore {
    type Entity: HostEntity;

    fn resolve_entity(&self, guid: i64) -> Option<Self::Entity>;

    fn resolve_entity_by_uuid(&self, uuid: &str) -> Option<Self::Entity>;
}
