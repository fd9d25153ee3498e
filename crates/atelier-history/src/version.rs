//! Persisted version records.

use crate::snapshot::Snapshot;
use atelier_util::Identifier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionId(String);

impl VersionId {
    /// Create a new ascending version ID.
    pub fn new() -> Self {
        Self(Identifier::version())
    }

    /// Create a version ID from a string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the ID as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for VersionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for VersionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An immutable, timestamped snapshot of a design.
///
/// Serializes as `{id, designId, timestamp, data, size}` with an RFC 3339
/// timestamp and the byte length of the JSON-encoded snapshot as `size`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    id: VersionId,
    design_id: String,
    timestamp: DateTime<Utc>,
    data: Snapshot,
    size: u64,
}

impl Version {
    /// Wrap `snapshot` in a new version stamped with the current time.
    pub fn new(design_id: impl Into<String>, snapshot: Snapshot) -> serde_json::Result<Self> {
        Self::new_at(design_id, snapshot, Utc::now())
    }

    /// Wrap `snapshot` in a new version with an explicit timestamp.
    pub fn new_at(
        design_id: impl Into<String>,
        snapshot: Snapshot,
        timestamp: DateTime<Utc>,
    ) -> serde_json::Result<Self> {
        if let Some(field) = snapshot.non_finite_field() {
            return Err(<serde_json::Error as serde::ser::Error>::custom(format!(
                "non-finite number in {field}"
            )));
        }
        let size = snapshot.serialized_size()?;
        Ok(Self {
            id: VersionId::new(),
            design_id: design_id.into(),
            timestamp,
            data: snapshot,
            size,
        })
    }

    pub fn id(&self) -> &VersionId {
        &self.id
    }

    pub fn design_id(&self) -> &str {
        &self.design_id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// The snapshot payload.
    pub fn data(&self) -> &Snapshot {
        &self.data
    }

    /// Consume the version, returning its snapshot.
    pub fn into_data(self) -> Snapshot {
        self.data
    }

    /// Serialized byte size of the payload.
    pub fn size(&self) -> u64 {
        self.size
    }
}

/// Cheap summary of a design's version list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    pub count: usize,
    pub oldest: Option<DateTime<Utc>>,
    pub newest: Option<DateTime<Utc>>,
    pub total_size: u64,
}

impl VersionInfo {
    /// Summarize a newest-first version list.
    pub fn from_versions(versions: &[Version]) -> Self {
        Self {
            count: versions.len(),
            newest: versions.first().map(Version::timestamp),
            oldest: versions.last().map(Version::timestamp),
            total_size: versions.iter().map(Version::size).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Layer;
    use chrono::TimeZone;

    fn snapshot() -> Snapshot {
        Snapshot::blank(Layer::new("lyr_1", "Base"))
    }

    #[test]
    fn test_new_version_records_size() {
        let version = Version::new("dsn_1", snapshot()).unwrap();
        assert_eq!(version.design_id(), "dsn_1");
        assert_eq!(version.size(), snapshot().serialized_size().unwrap());
        assert!(version.id().as_str().starts_with("ver_"));
    }

    #[test]
    fn test_rejects_non_finite_numbers() {
        use crate::snapshot::{DesignElement, ElementKind, Geometry};

        let element = DesignElement::new(
            "elm_1",
            ElementKind::Panel,
            "lyr_1",
            Geometry::new(f64::NAN, 0.0, 10.0, 10.0),
        );
        let err = Version::new("dsn_1", snapshot().with_element(element)).unwrap_err();
        assert!(err.to_string().contains("element elm_1 x"));

        let element = DesignElement::new(
            "elm_2",
            ElementKind::Panel,
            "lyr_1",
            Geometry::new(0.0, 0.0, f64::INFINITY, 10.0),
        );
        assert!(Version::new("dsn_1", snapshot().with_element(element)).is_err());
    }

    #[test]
    fn test_wire_layout() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap();
        let version = Version::new_at("dsn_1", snapshot(), ts).unwrap();
        let json = serde_json::to_value(&version).unwrap();

        let obj = json.as_object().unwrap();
        let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["data", "designId", "id", "size", "timestamp"]);
        assert_eq!(json["timestamp"], "2026-03-14T09:30:00Z");
        assert_eq!(json["id"], version.id().as_str());
        assert_eq!(json["data"]["activeLayerId"], "lyr_1");
    }

    #[test]
    fn test_roundtrip_preserves_fields() {
        let version = Version::new("dsn_1", snapshot()).unwrap();
        let json = serde_json::to_string(&version).unwrap();
        let back: Version = serde_json::from_str(&json).unwrap();
        assert_eq!(back, version);
    }

    #[test]
    fn test_info_from_versions() {
        let older = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let newer = Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap();
        let versions = vec![
            Version::new_at("dsn_1", snapshot(), newer).unwrap(),
            Version::new_at("dsn_1", snapshot(), older).unwrap(),
        ];

        let info = VersionInfo::from_versions(&versions);
        assert_eq!(info.count, 2);
        assert_eq!(info.newest, Some(newer));
        assert_eq!(info.oldest, Some(older));
        assert_eq!(info.total_size, versions[0].size() * 2);
    }

    #[test]
    fn test_info_empty() {
        let info = VersionInfo::from_versions(&[]);
        assert_eq!(info, VersionInfo::default());
    }
}
