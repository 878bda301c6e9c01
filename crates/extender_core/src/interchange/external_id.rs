//! External identifiers for entities and identities.
//!
//! # Invariants
//! - Identifiers have the shape `<site_url>export/opendd/<guid>/`.
//! - `site_url` always ends with `/`.

const EXPORT_PATH: &str = "export/opendd/";

/// Maps local guids to site-qualified external identifiers and back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalIds {
    site_url: String,
}

impl ExternalIds {
    pub fn new(site_url: &str) -> Self {
        let trimmed = site_url.trim();
        let site_url = if trimmed.ends_with('/') {
            trimmed.to_string()
        } else {
            format!("{trimmed}/")
        };
        Self { site_url }
    }

    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    pub fn guid_to_uuid(&self, guid: i64) -> String {
        format!("{}{EXPORT_PATH}{guid}/", self.site_url)
    }

    /// Recovers the guid from an identifier minted by this site.
    ///
    /// Returns `None` for foreign sites or malformed identifiers. Trailing
    /// path segments after the guid (as in extender identifiers) are ignored.
    pub fn uuid_to_guid(&self, uuid: &str) -> Option<i64> {
        let rest = uuid.strip_prefix(self.site_url.as_str())?;
        let rest = rest.strip_prefix(EXPORT_PATH)?;
        let (guid, _) = rest.split_once('/')?;
        guid.parse::<i64>().ok().filter(|value| *value > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::ExternalIds;

    #[test]
    fn normalizes_trailing_slash() {
        let ids = ExternalIds::new("https://example.org");
        assert_eq!(ids.site_url(), "https://example.org/");
        assert_eq!(ids.guid_to_uuid(42), "https://example.org/export/opendd/42/");
    }

    #[test]
    fn round_trips_guid() {
        let ids = ExternalIds::new("https://example.org/");
        let uuid = ids.guid_to_uuid(7);
        assert_eq!(ids.uuid_to_guid(&uuid), Some(7));
        assert_eq!(
            ids.uuid_to_guid("https://example.org/export/opendd/7/metadata/3/"),
            Some(7)
        );
    }

    #[test]
    fn rejects_foreign_or_malformed_identifiers() {
        let ids = ExternalIds::new("https://example.org/");
        assert_eq!(ids.uuid_to_guid("https://other.org/export/opendd/7/"), None);
        assert_eq!(ids.uuid_to_guid("https://example.org/export/opendd/abc/"), None);
        assert_eq!(ids.uuid_to_guid("https://example.org/export/opendd/7"), None);
        assert_eq!(ids.uuid_to_guid("https://example.org/export/opendd/0/"), None);
    }
}
