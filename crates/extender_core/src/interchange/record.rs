//! External metadata record exchanged at the import/export boundary.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const RECORD_ATTR_UUID: &str = "uuid";
pub const RECORD_ATTR_ENTITY_UUID: &str = "entity_uuid";
pub const RECORD_ATTR_NAME: &str = "name";
pub const RECORD_ATTR_TYPE: &str = "type";
pub const RECORD_ATTR_OWNER_UUID: &str = "owner_uuid";
pub const RECORD_ATTR_PUBLISHED: &str = "published";

/// One serialized extender: string-keyed attributes plus a literal body.
///
/// Attribute keys are kept sorted so serialized output is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalRecord {
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub body: String,
}

impl ExternalRecord {
    /// Builds a metadata record. Empty `record_type` / `owner_uuid` are
    /// omitted from the attributes.
    pub fn new_metadata(
        uuid: impl Into<String>,
        entity_uuid: impl Into<String>,
        name: impl Into<String>,
        body: impl Into<String>,
        record_type: &str,
        owner_uuid: &str,
    ) -> Self {
        let mut record = Self {
            attributes: BTreeMap::new(),
            body: body.into(),
        };
        record.set_attribute(RECORD_ATTR_UUID, uuid);
        record.set_attribute(RECORD_ATTR_ENTITY_UUID, entity_uuid);
        record.set_attribute(RECORD_ATTR_NAME, name);
        if !record_type.is_empty() {
            record.set_attribute(RECORD_ATTR_TYPE, record_type);
        }
        if !owner_uuid.is_empty() {
            record.set_attribute(RECORD_ATTR_OWNER_UUID, owner_uuid);
        }
        record
    }

    /// Returns one attribute. Blank values read as absent.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    pub fn set_attribute(&mut self, key: &str, value: impl Into<String>) {
        self.attributes.insert(key.to_string(), value.into());
    }

    pub fn record_type(&self) -> Option<&str> {
        self.attribute(RECORD_ATTR_TYPE)
    }

    pub fn name(&self) -> Option<&str> {
        self.attribute(RECORD_ATTR_NAME)
    }

    pub fn entity_uuid(&self) -> Option<&str> {
        self.attribute(RECORD_ATTR_ENTITY_UUID)
    }

    pub fn published(&self) -> Option<&str> {
        self.attribute(RECORD_ATTR_PUBLISHED)
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}
