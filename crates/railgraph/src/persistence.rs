//! Graph snapshot persistence.
//!
//! The bundled [`MemoryGraphStore`](crate::store::MemoryGraphStore) is seeded
//! from a JSON document listing operation points and the sections between
//! them. Section weights live in a free-form numeric property map so the
//! projection can be pointed at any weight property.

use crate::projection::{DEFAULT_NODE_LABEL, DEFAULT_RELATIONSHIP_TYPE, DEFAULT_WEIGHT_PROPERTY};
use crate::types::{OperationPoint, UNKNOWN_COUNTRY};
use railgraph_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// ============================================================================
// Serializable types
// ============================================================================

/// On-disk representation of a rail network.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// All operation points.
    #[serde(default)]
    pub points: Vec<PointRecord>,
    /// All sections between points.
    #[serde(default)]
    pub sections: Vec<SectionRecord>,
    /// Optional metadata about the snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<SnapshotMetadata>,
}

/// A stored operation point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    /// Stable external identifier.
    pub id: String,
    /// Display name, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Country, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Latitude.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    /// Longitude.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    /// Node label used to select points for a projection.
    #[serde(default = "default_node_label")]
    pub kind: String,
}

/// A stored section between two points.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SectionRecord {
    /// One endpoint.
    pub from: String,
    /// The other endpoint.
    pub to: String,
    /// Relationship type used to select sections for a projection.
    #[serde(default = "default_relationship_type")]
    pub relationship: String,
    /// Numeric properties; the weight is read from here.
    #[serde(default)]
    pub properties: BTreeMap<String, f64>,
}

/// Metadata about a persisted snapshot.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    /// When the snapshot was written (unix timestamp).
    pub built_at: String,
    /// Version of the writer.
    pub builder_version: String,
    /// Where the data came from, if recorded.
    #[serde(default)]
    pub source: Option<String>,
}

impl Default for SnapshotMetadata {
    fn default() -> Self {
        Self {
            built_at: timestamp_now(),
            builder_version: env!("CARGO_PKG_VERSION").to_string(),
            source: None,
        }
    }
}

fn default_node_label() -> String {
    DEFAULT_NODE_LABEL.to_string()
}

fn default_relationship_type() -> String {
    DEFAULT_RELATIONSHIP_TYPE.to_string()
}

/// Simple unix timestamp.
fn timestamp_now() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}", duration.as_secs())
}

// ============================================================================
// Builders and conversions
// ============================================================================

impl PointRecord {
    /// Create a record with only an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            country: None,
            lat: None,
            lon: None,
            kind: default_node_label(),
        }
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the country.
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Set coordinates.
    pub fn with_coordinates(mut self, lat: f64, lon: f64) -> Self {
        self.lat = Some(lat);
        self.lon = Some(lon);
        self
    }

    /// Set the node label.
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Convert into the query-facing point, applying label and country defaults.
    pub fn to_point(&self) -> OperationPoint {
        let label = match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self.id.clone(),
        };
        let country = match self.country.as_deref().map(str::trim) {
            Some(country) if !country.is_empty() => country.to_string(),
            _ => UNKNOWN_COUNTRY.to_string(),
        };
        OperationPoint {
            id: self.id.clone(),
            label,
            country,
            lat: self.lat,
            lon: self.lon,
        }
    }
}

impl SectionRecord {
    /// Create a section whose default weight property is `distance`.
    pub fn new(from: impl Into<String>, to: impl Into<String>, distance: f64) -> Self {
        let mut properties = BTreeMap::new();
        properties.insert(DEFAULT_WEIGHT_PROPERTY.to_string(), distance);
        Self {
            from: from.into(),
            to: to.into(),
            relationship: default_relationship_type(),
            properties,
        }
    }

    /// Set the relationship type.
    pub fn with_relationship(mut self, relationship: impl Into<String>) -> Self {
        self.relationship = relationship.into();
        self
    }

    /// Set a numeric property.
    pub fn with_property(mut self, key: impl Into<String>, value: f64) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    /// Read the weight stored under `property`.
    pub fn weight(&self, property: &str) -> Option<f64> {
        self.properties.get(property).copied()
    }

    /// Whether this section touches `id`.
    pub fn touches(&self, id: &str) -> bool {
        self.from == id || self.to == id
    }

    /// The endpoint opposite `id`, if this section touches it.
    pub fn opposite(&self, id: &str) -> Option<&str> {
        if self.from == id {
            Some(&self.to)
        } else if self.to == id {
            Some(&self.from)
        } else {
            None
        }
    }
}

impl GraphSnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a point.
    pub fn with_point(mut self, point: PointRecord) -> Self {
        self.points.push(point);
        self
    }

    /// Add a section.
    pub fn with_section(mut self, section: SectionRecord) -> Self {
        self.sections.push(section);
        self
    }

    /// Attach metadata.
    pub fn with_metadata(mut self, metadata: SnapshotMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

// ============================================================================
// Save / Load
// ============================================================================

/// Save a snapshot to a JSON file, replacing its metadata when given.
pub fn save_snapshot(
    snapshot: &GraphSnapshot,
    path: impl AsRef<Path>,
    metadata: Option<SnapshotMetadata>,
) -> Result<()> {
    let json = match metadata {
        Some(metadata) => {
            let stamped = GraphSnapshot {
                metadata: Some(metadata),
                ..snapshot.clone()
            };
            serde_json::to_string_pretty(&stamped)
        }
        None => serde_json::to_string_pretty(snapshot),
    }
    .map_err(|e| Error::serialization(format!("Failed to serialize snapshot: {e}")))?;

    std::fs::write(path.as_ref(), json).map_err(|e| Error::io_with_path(e, path.as_ref()))?;

    Ok(())
}

/// Load a snapshot from a JSON file.
pub fn load_snapshot(path: impl AsRef<Path>) -> Result<GraphSnapshot> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::file_not_found(path));
    }
    let json = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;

    load_snapshot_from_str(&json)
}

/// Load a snapshot from a JSON string.
pub fn load_snapshot_from_str(json: &str) -> Result<GraphSnapshot> {
    serde_json::from_str(json).map_err(|e| Error::parse(format!("Failed to parse snapshot JSON: {e}")))
}

// ============================================================================
// Tests
// ============================================================================
