//! Extender domain model.
//!
//! # Responsibility
//! - Define the annotation/metadata record attached to one host entity.
//! - Expose typed accessors over the reserved attributes.
//! - Route `save`/`delete` to the variant's storage through a repository.
//!
//! # Invariants
//! - The reserved attribute shape is fixed at construction.
//! - `id` and `time_created` are assigned by persistence only.
//! - `kind` never changes after construction.

use crate::import::entity::EntityStore;
use crate::model::bag::{AttributeBag, ATTR_VALUE, ATTR_VALUE_TYPE};
use crate::model::value::{AttrValue, ValueError, ValueType};
use crate::permission::evaluator::PermissionEvaluator;
use crate::permission::identity::{Identity, IdentityStore, Session};
use crate::permission::{EntityPermissions, ExtenderLookup};
use crate::repo::extender_repo::{ExtenderRepository, RepoError, RepoResult};
use std::fmt::{Display, Formatter};

pub const ATTR_ID: &str = "id";
pub const ATTR_ENTITY_GUID: &str = "entity_guid";
pub const ATTR_OWNER_GUID: &str = "owner_guid";
pub const ATTR_NAME: &str = "name";
pub const ATTR_TIME_CREATED: &str = "time_created";
pub const ATTR_TYPE: &str = "type";

static NULL_VALUE: AttrValue = AttrValue::Null;

/// Reserved attribute names, in bag order.
pub const RESERVED_ATTRIBUTES: &[&str] = &[
    ATTR_ID,
    ATTR_ENTITY_GUID,
    ATTR_OWNER_GUID,
    ATTR_NAME,
    ATTR_VALUE,
    ATTR_VALUE_TYPE,
    ATTR_TIME_CREATED,
    ATTR_TYPE,
];

/// Closed set of extender variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExtenderKind {
    Annotation,
    Metadata,
}

impl ExtenderKind {
    /// Stable tag used in records, policy keys and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Annotation => "annotation",
            Self::Metadata => "metadata",
        }
    }

    /// Storage table for this variant.
    pub fn table_name(self) -> &'static str {
        match self {
            Self::Annotation => "annotations",
            Self::Metadata => "metadata",
        }
    }

    /// Parses a variant tag. Tags are matched exactly.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "annotation" => Some(Self::Annotation),
            "metadata" => Some(Self::Metadata),
            _ => None,
        }
    }
}

impl Display for ExtenderKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One named, typed value attached to a host entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Extender {
    kind: ExtenderKind,
    attributes: AttributeBag,
}

impl Extender {
    /// Creates an unsaved extender. `value_type` is derived from `value`.
    pub fn new(
        kind: ExtenderKind,
        entity_guid: i64,
        owner_guid: i64,
        name: impl Into<String>,
        value: impl Into<AttrValue>,
    ) -> Self {
        Self::with_value_type(kind, entity_guid, owner_guid, name, value, "")
    }

    /// Creates an unsaved extender with an explicit value-type override.
    pub fn with_value_type(
        kind: ExtenderKind,
        entity_guid: i64,
        owner_guid: i64,
        name: impl Into<String>,
        value: impl Into<AttrValue>,
        explicit_type: &str,
    ) -> Self {
        let mut attributes = AttributeBag::with_keys(RESERVED_ATTRIBUTES);
        attributes.write(ATTR_ENTITY_GUID, entity_guid);
        attributes.write(ATTR_OWNER_GUID, owner_guid);
        attributes.write(ATTR_NAME, AttrValue::Text(name.into()));
        attributes.write(ATTR_TYPE, kind.as_str());
        attributes.set(ATTR_VALUE, value, explicit_type);
        Self { kind, attributes }
    }

    /// Rebuilds a persisted extender without re-deriving its stored type.
    pub(crate) fn from_stored(kind: ExtenderKind, stored: StoredExtender) -> Self {
        let mut attributes = AttributeBag::with_keys(RESERVED_ATTRIBUTES);
        attributes.write(ATTR_ID, stored.id);
        attributes.write(ATTR_ENTITY_GUID, stored.entity_guid);
        attributes.write(ATTR_OWNER_GUID, stored.owner_guid);
        attributes.write(ATTR_NAME, stored.name);
        attributes.write(ATTR_VALUE, stored.value);
        attributes.write(ATTR_VALUE_TYPE, stored.value_type);
        attributes.write(ATTR_TIME_CREATED, stored.time_created);
        attributes.write(ATTR_TYPE, kind.as_str());
        Self { kind, attributes }
    }

    pub fn kind(&self) -> ExtenderKind {
        self.kind
    }

    /// Persistence id, `None` until saved.
    pub fn id(&self) -> Option<i64> {
        self.int_attribute(ATTR_ID)
    }

    pub fn entity_guid(&self) -> i64 {
        self.int_attribute(ATTR_ENTITY_GUID).unwrap_or(0)
    }

    pub fn owner_guid(&self) -> i64 {
        self.int_attribute(ATTR_OWNER_GUID).unwrap_or(0)
    }

    pub fn name(&self) -> &str {
        self.attributes
            .read(ATTR_NAME)
            .and_then(AttrValue::as_text)
            .unwrap_or_default()
    }

    /// Unix seconds, `None` until saved.
    pub fn time_created(&self) -> Option<i64> {
        self.int_attribute(ATTR_TIME_CREATED)
    }

    /// Typed read of the payload.
    ///
    /// # Errors
    /// - `ValueError::UnsupportedValueType` when the stored type is not
    ///   `integer|text`.
    pub fn value(&self) -> Result<Option<AttrValue>, ValueError> {
        self.attributes.get(ATTR_VALUE)
    }

    /// Payload exactly as stored.
    pub fn raw_value(&self) -> &AttrValue {
        self.attributes.read(ATTR_VALUE).unwrap_or(&NULL_VALUE)
    }

    pub fn value_type(&self) -> ValueType {
        self.attributes.value_type()
    }

    /// Replaces the payload and re-derives its type.
    pub fn set_value(&mut self, value: impl Into<AttrValue>, explicit_type: &str) {
        self.attributes.set(ATTR_VALUE, value, explicit_type);
    }

    /// Generic attribute read, see [`AttributeBag::get`].
    pub fn get(&self, name: &str) -> Result<Option<AttrValue>, ValueError> {
        self.attributes.get(name)
    }

    /// Generic attribute write, see [`AttributeBag::set`].
    ///
    /// `type` mirrors `kind` and is never overwritten; writing it returns
    /// `false`.
    pub fn set(&mut self, name: &str, value: impl Into<AttrValue>, explicit_type: &str) -> bool {
        if name == ATTR_TYPE {
            return false;
        }
        self.attributes.set(name, value, explicit_type)
    }

    /// Keyed write, see [`AttributeBag::write`]. Refuses `type`.
    pub fn write(&mut self, key: &str, value: impl Into<AttrValue>) -> bool {
        key != ATTR_TYPE && self.attributes.write(key, value)
    }

    /// Keyed unset, see [`AttributeBag::clear`]. Refuses `type`.
    pub fn clear(&mut self, key: &str) -> bool {
        key != ATTR_TYPE && self.attributes.clear(key)
    }

    /// Read-only cursor and keyed views over the attributes.
    pub fn attributes(&self) -> &AttributeBag {
        &self.attributes
    }

    /// Moves the attribute cursor to the first entry.
    pub fn rewind(&mut self) {
        self.attributes.rewind();
    }

    /// Advances the attribute cursor.
    pub fn next(&mut self) {
        self.attributes.next();
    }

    /// Resolves the identity that created this extender.
    pub fn owner(&self, identities: &impl IdentityStore) -> Option<Identity> {
        identities.resolve_identity(self.owner_guid())
    }

    /// Resolves the host entity this extender is attached to.
    pub fn entity<S: EntityStore>(&self, store: &S) -> Option<S::Entity> {
        store.resolve_entity(self.entity_guid())
    }

    /// Persists this extender in its variant's storage.
    ///
    /// Assigns `id` and `time_created` on first save.
    pub fn save(&mut self, repo: &impl ExtenderRepository) -> RepoResult<i64> {
        repo.save(self)
    }

    /// Removes this extender from its variant's storage.
    ///
    /// # Errors
    /// - `RepoError::MissingId` when the extender was never saved.
    pub fn delete(&self, repo: &impl ExtenderRepository) -> RepoResult<()> {
        let id = self.id().ok_or(RepoError::MissingId)?;
        repo.delete(self.kind, id)
    }

    /// Returns whether `acting` (or the session identity) may edit this
    /// extender. Unsaved extenders are never editable through this path.
    pub fn can_edit<L, I, D, S>(
        &self,
        evaluator: &PermissionEvaluator<'_, L, I, D, S>,
        session: &Session,
        acting: Option<i64>,
    ) -> bool
    where
        L: ExtenderLookup,
        I: IdentityStore,
        D: EntityPermissions,
        S: EntityStore,
    {
        match self.id() {
            Some(id) => evaluator.can_edit(id, self.kind.as_str(), acting, session),
            None => false,
        }
    }

    /// Identifier recorded in the system log.
    pub fn system_log_id(&self) -> Option<i64> {
        self.id()
    }

    /// Class name recorded in the system log.
    pub fn class_name(&self) -> &'static str {
        self.kind.as_str()
    }

    /// Owner recorded in the system log.
    pub fn object_owner_guid(&self) -> i64 {
        self.owner_guid()
    }

    pub(crate) fn assign_persisted(&mut self, id: i64, time_created: i64) {
        self.attributes.write(ATTR_ID, id);
        self.attributes.write(ATTR_TIME_CREATED, time_created);
    }

    fn int_attribute(&self, name: &str) -> Option<i64> {
        self.attributes.read(name).and_then(AttrValue::as_int)
    }
}

/// Column set shared by both variant tables.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StoredExtender {
    pub id: i64,
    pub entity_guid: i64,
    pub owner_guid: i64,
    pub name: String,
    pub value: String,
    pub value_type: String,
    pub time_created: i64,
}
