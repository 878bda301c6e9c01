//! Import reconciliation of external records onto host entities.
//!
//! # Responsibility
//! - Classify a record by its declared kind and apply it in memory.
//! - Drive the import unit: resolve entity, reconcile, save.
//!
//! # Invariants
//! - `reconcile` never calls `save()`.
//! - An import unit either saves once or leaves the store untouched.
//! - Logs carry record kind and ids only, never names or values.

use crate::import::entity::{EntityStore, HostEntity};
use crate::interchange::published::parse_published;
use crate::interchange::record::ExternalRecord;
use crate::model::value::AttrValue;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Record kind that is always discarded.
pub const RECORD_TYPE_VOLATILE: &str = "volatile";
/// Record kind applied as an annotation.
pub const RECORD_TYPE_ANNOTATION: &str = "annotation";
/// Record kind applied as multi-valued metadata.
pub const RECORD_TYPE_METADATA: &str = "metadata";
/// Entity attribute stamped from the record's `published` value.
pub const ATTR_TIME_UPDATED: &str = "time_updated";

/// What `reconcile` did to the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileAction {
    Discarded,
    Annotated,
    MetadataSet,
    AttributeSet,
}

impl ReconcileAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Discarded => "discarded",
            Self::Annotated => "annotation",
            Self::MetadataSet => "metadata",
            Self::AttributeSet => "attribute",
        }
    }
}

/// Import unit errors. Each one aborts the unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// The record's `entity_uuid` is missing or does not resolve.
    EntityNotFound(String),
    /// The entity refused to save after reconciliation.
    PersistError { name: String, entity_uuid: String },
    /// A non-volatile record has no `name` attribute.
    MissingName,
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EntityNotFound(uuid) => write!(f, "import target entity not found: `{uuid}`"),
            Self::PersistError { name, entity_uuid } => write!(
                f,
                "failed to save `{name}` onto entity `{entity_uuid}` during import"
            ),
            Self::MissingName => write!(f, "import record has no name attribute"),
        }
    }
}

impl Error for ImportError {}

/// Batch import failure: records before the failing one were committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchImportError {
    pub applied: usize,
    pub source: ImportError,
}

impl Display for BatchImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "import stopped after {} record(s): {}",
            self.applied, self.source
        )
    }
}

impl Error for BatchImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

/// Applies one record to `entity` in memory.
///
/// | record type   | effect                                  |
/// |---------------|-----------------------------------------|
/// | `volatile`    | nothing                                 |
/// | `annotation`  | `annotate(name, body)`                  |
/// | `metadata`    | `set_metadata(name, body, "", true)`    |
/// | other/absent  | `set(name, body)`                       |
///
/// Non-volatile records with a `published` attribute also stamp
/// `time_updated` (unix seconds when parseable, raw text otherwise).
/// A volatile record returns before that stamp, so its `published` value is
/// dropped along with the rest of the record and no save follows.
///
/// # Errors
/// - `ImportError::MissingName` for a non-volatile record without a name.
pub fn reconcile<E: HostEntity + ?Sized>(
    entity: &mut E,
    record: &ExternalRecord,
) -> Result<ReconcileAction, ImportError> {
    let record_type = record.record_type();
    if record_type == Some(RECORD_TYPE_VOLATILE) {
        return Ok(ReconcileAction::Discarded);
    }

    let name = record.name().ok_or(ImportError::MissingName)?;
    let value = AttrValue::from(record.body());

    let action = match record_type {
        Some(RECORD_TYPE_ANNOTATION) => {
            entity.annotate(name, value);
            ReconcileAction::Annotated
        }
        Some(RECORD_TYPE_METADATA) => {
            entity.set_metadata(name, value, "", true);
            ReconcileAction::MetadataSet
        }
        _ => {
            entity.set(name, value);
            ReconcileAction::AttributeSet
        }
    };

    if let Some(published) = record.published() {
        let stamp = match parse_published(published) {
            Some(seconds) => AttrValue::Int(seconds),
            None => {
                warn!(
                    "event=import_published module=import status=skip entity_guid={} reason=unparseable_timestamp",
                    entity.guid()
                );
                AttrValue::from(published)
            }
        };
        entity.set(ATTR_TIME_UPDATED, stamp);
    }

    Ok(action)
}

/// Import hook entry point: resolve, reconcile, save.
///
/// Volatile records still require a resolvable entity but skip the save.
///
/// # Errors
/// - `ImportError::EntityNotFound` when `entity_uuid` is absent or unknown.
/// - `ImportError::MissingName` from reconciliation.
/// - `ImportError::PersistError` when the entity fails to save.
pub fn import_record<S: EntityStore>(
    store: &S,
    record: &ExternalRecord,
) -> Result<ReconcileAction, ImportError> {
    let entity_uuid = record.entity_uuid().unwrap_or_default();
    let Some(mut entity) = store.resolve_entity_by_uuid(entity_uuid) else {
        error!(
            "event=import_record module=import status=error error_code=entity_not_found record_type={}",
            record.record_type().unwrap_or("attribute")
        );
        return Err(ImportError::EntityNotFound(entity_uuid.to_string()));
    };

    let action = reconcile(&mut entity, record)?;
    if action == ReconcileAction::Discarded {
        info!(
            "event=import_record module=import status=skip entity_guid={} action={}",
            entity.guid(),
            action.as_str()
        );
        return Ok(action);
    }

    if !entity.save() {
        error!(
            "event=import_record module=import status=error error_code=persist_failed entity_guid={} action={}",
            entity.guid(),
            action.as_str()
        );
        return Err(ImportError::PersistError {
            name: record.name().unwrap_or_default().to_string(),
            entity_uuid: entity_uuid.to_string(),
        });
    }

    info!(
        "event=import_record module=import status=ok entity_guid={} action={}",
        entity.guid(),
        action.as_str()
    );
    Ok(action)
}

/// Imports records in order, one unit each, stopping at the first failure.
///
/// Returns the number of records applied (discarded volatile records count).
pub fn import_batch<S: EntityStore>(
    store: &S,
    records: &[ExternalRecord],
) -> Result<usize, BatchImportError> {
    for (applied, record) in records.iter().enumerate() {
        if let Err(source) = import_record(store, record) {
            return Err(BatchImportError { applied, source });
        }
    }
    info!(
        "event=import_batch module=import status=ok count={}",
        records.len()
    );
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::{reconcile, ImportError, ReconcileAction};
    use crate::import::memory::MemoryEntity;
    use crate::interchange::record::ExternalRecord;
    use crate::model::value::AttrValue;

    fn record(record_type: &str, name: &str, body: &str) -> ExternalRecord {
        let mut record = ExternalRecord::default();
        if !record_type.is_empty() {
            record.set_attribute("type", record_type);
        }
        if !name.is_empty() {
            record.set_attribute("name", name);
        }
        record.body = body.to_string();
        record
    }

    #[test]
    fn annotation_record_appends_annotation() {
        let mut entity = MemoryEntity::new(1);
        let action = reconcile(&mut entity, &record("annotation", "comment", "nice"))
            .expect("annotation applies");
        assert_eq!(action, ReconcileAction::Annotated);
        assert_eq!(
            entity.annotation_values("comment"),
            vec![&AttrValue::from("nice")]
        );
        assert_eq!(entity.save_count(), 0);
    }

    #[test]
    fn untyped_record_sets_plain_attribute() {
        let mut entity = MemoryEntity::new(1);
        let action =
            reconcile(&mut entity, &record("", "title", "Hello")).expect("attribute applies");
        assert_eq!(action, ReconcileAction::AttributeSet);
        assert_eq!(entity.attributes.get("title"), Some(&AttrValue::from("Hello")));
    }

    #[test]
    fn unknown_type_is_treated_as_attribute() {
        let mut entity = MemoryEntity::new(1);
        let action = reconcile(&mut entity, &record("relationship", "friend", "2"))
            .expect("attribute applies");
        assert_eq!(action, ReconcileAction::AttributeSet);
        assert!(entity.attributes.contains_key("friend"));
    }

    #[test]
    fn unparseable_published_is_kept_raw() {
        let mut entity = MemoryEntity::new(1);
        let mut input = record("metadata", "color", "blue");
        input.set_attribute("published", "yesterday-ish");
        reconcile(&mut entity, &input).expect("metadata applies");
        assert_eq!(
            entity.attributes.get("time_updated"),
            Some(&AttrValue::from("yesterday-ish"))
        );
    }

    #[test]
    fn missing_name_is_rejected_before_mutation() {
        let mut entity = MemoryEntity::new(1);
        let err = reconcile(&mut entity, &record("metadata", "", "blue"))
            .expect_err("nameless record fails");
        assert_eq!(err, ImportError::MissingName);
        assert!(entity.same_state(&MemoryEntity::new(1)));
    }

    #[test]
    fn volatile_record_ignores_published() {
        let mut entity = MemoryEntity::new(1);
        let mut input = record("volatile", "cache_hint", "x");
        input.set_attribute("published", "2009-01-01");
        let action = reconcile(&mut entity, &input).expect("volatile is accepted");
        assert_eq!(action, ReconcileAction::Discarded);
        assert!(entity.same_state(&MemoryEntity::new(1)));
    }
}
