//! Extender serializer.
//!
//! # Invariants
//! - Export is pure: no lookups, no logging, no mutation.
//! - The body carries the raw stored payload, not the typed read.

use crate::interchange::external_id::ExternalIds;
use crate::interchange::published::format_published;
use crate::interchange::record::{ExternalRecord, RECORD_ATTR_PUBLISHED};
use crate::model::extender::Extender;

/// Serializes one extender into an external record.
///
/// The record identifier is `<entity-uuid><type>/<id>/`. Unsaved extenders
/// get an empty id segment and no `published` attribute.
pub fn export_extender(extender: &Extender, ids: &ExternalIds) -> ExternalRecord {
    let kind = extender.kind().as_str();
    let entity_uuid = ids.guid_to_uuid(extender.entity_guid());
    let id_segment = extender.id().map(|id| id.to_string()).unwrap_or_default();
    let uuid = format!("{entity_uuid}{kind}/{id_segment}/");

    let mut record = ExternalRecord::new_metadata(
        uuid,
        entity_uuid,
        extender.name(),
        extender.raw_value().to_string(),
        kind,
        &ids.guid_to_uuid(extender.owner_guid()),
    );
    if let Some(published) = extender.time_created().and_then(format_published) {
        record.set_attribute(RECORD_ATTR_PUBLISHED, published);
    }
    record
}

#[cfg(test)]
mod tests {
    use super::export_extender;
    use crate::interchange::external_id::ExternalIds;
    use crate::model::extender::{Extender, ExtenderKind};

    #[test]
    fn exports_saved_metadata() {
        let ids = ExternalIds::new("https://example.org/");
        let mut extender = Extender::new(ExtenderKind::Metadata, 42, 7, "color", "blue");
        extender.assign_persisted(5, 1_230_768_000);

        let record = export_extender(&extender, &ids);
        assert_eq!(
            record.attribute("uuid"),
            Some("https://example.org/export/opendd/42/metadata/5/")
        );
        assert_eq!(
            record.entity_uuid(),
            Some("https://example.org/export/opendd/42/")
        );
        assert_eq!(
            record.attribute("owner_uuid"),
            Some("https://example.org/export/opendd/7/")
        );
        assert_eq!(record.name(), Some("color"));
        assert_eq!(record.record_type(), Some("metadata"));
        assert_eq!(record.body(), "blue");
        assert_eq!(
            record.published(),
            Some("Thu, 01 Jan 2009 00:00:00 +0000")
        );
    }

    #[test]
    fn exports_raw_payload_for_integer_values() {
        let ids = ExternalIds::new("https://example.org/");
        let extender = Extender::new(ExtenderKind::Annotation, 1, 2, "score", " 42");
        let record = export_extender(&extender, &ids);
        assert_eq!(record.body(), " 42");
        assert_eq!(
            record.attribute("uuid"),
            Some("https://example.org/export/opendd/1/annotation//")
        );
        assert_eq!(record.published(), None);
    }

    #[test]
    fn exported_type_matches_type_attribute() {
        let ids = ExternalIds::new("https://example.org/");
        let mut extender = Extender::new(ExtenderKind::Metadata, 1, 2, "color", "blue");
        extender.set("type", "annotation", "");

        let record = export_extender(&extender, &ids);
        let stored_type = extender.get("type").expect("type read");
        assert_eq!(stored_type.as_ref().and_then(|value| value.as_text()), record.record_type());
        assert_eq!(record.record_type(), Some("metadata"));
    }
}
