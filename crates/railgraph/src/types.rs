//! Core data model for path queries.
//!
//! - [`OperationPoint`]: a node of the rail network
//! - [`PathEdge`]: one traversed section of a path
//! - [`Path`]: an ordered, loopless walk between two points
//! - [`PathSet`]: paths for one (source, destination) pair, ranked by distance
//! - [`PathRecord`]: flat row used for tabular export

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Country assigned to points that do not carry one.
pub const UNKNOWN_COUNTRY: &str = "Unknown";

// ============================================================================
// OperationPoint
// ============================================================================

/// A stop in the network: station, junction, or other operation point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OperationPoint {
    /// Stable external identifier.
    pub id: String,
    /// Display name. Falls back to the id for unnamed points.
    pub label: String,
    /// Country name, or [`UNKNOWN_COUNTRY`].
    pub country: String,
    /// Latitude in decimal degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    /// Longitude in decimal degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
}

impl OperationPoint {
    /// Create a point whose label is its id and whose country is unknown.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            country: UNKNOWN_COUNTRY.to_string(),
            lat: None,
            lon: None,
        }
    }

    /// Set the display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the country.
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    /// Set coordinates.
    pub fn with_coordinates(mut self, lat: f64, lon: f64) -> Self {
        self.lat = Some(lat);
        self.lon = Some(lon);
        self
    }

    /// Whether both latitude and longitude are known.
    pub fn has_coordinates(&self) -> bool {
        self.lat.is_some() && self.lon.is_some()
    }
}

// ============================================================================
// PathEdge
// ============================================================================

/// A traversed section, oriented in the direction of travel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathEdge {
    /// Point the section is entered from.
    pub source: String,
    /// Point the section leads to.
    pub target: String,
    /// Section length in kilometres.
    pub distance: f64,
}

impl PathEdge {
    /// Create a new path edge.
    pub fn new(source: impl Into<String>, target: impl Into<String>, distance: f64) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            distance,
        }
    }
}

// ============================================================================
// Path
// ============================================================================

/// An ordered walk through the network.
///
/// `edges[i]` connects `cities[i]` and `cities[i + 1]`, and `total_distance`
/// is the sum of the edge distances.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Path {
    /// Visited points in order, source first.
    pub cities: Vec<OperationPoint>,
    /// Traversed sections in order.
    pub edges: Vec<PathEdge>,
    /// Sum of section distances.
    pub total_distance: f64,
}

impl Path {
    /// Build a path from its points and sections, summing the distance.
    pub fn from_parts(cities: Vec<OperationPoint>, edges: Vec<PathEdge>) -> Self {
        let total_distance = edges.iter().map(|e| e.distance).sum();
        Self {
            cities,
            edges,
            total_distance,
        }
    }

    /// A zero-length path that stays at `point`.
    pub fn trivial(point: OperationPoint) -> Self {
        Self {
            cities: vec![point],
            edges: Vec::new(),
            total_distance: 0.0,
        }
    }

    /// Number of traversed sections.
    pub fn hops(&self) -> usize {
        self.edges.len()
    }

    /// Number of visited points.
    pub fn stops(&self) -> usize {
        self.cities.len()
    }

    /// First point, if any.
    pub fn source(&self) -> Option<&OperationPoint> {
        self.cities.first()
    }

    /// Last point, if any.
    pub fn destination(&self) -> Option<&OperationPoint> {
        self.cities.last()
    }

    /// Point ids in visiting order.
    pub fn node_ids(&self) -> Vec<&str> {
        self.cities.iter().map(|c| c.id.as_str()).collect()
    }

    /// Point labels in visiting order.
    pub fn route_labels(&self) -> Vec<&str> {
        self.cities.iter().map(|c| c.label.as_str()).collect()
    }

    /// Whether no point is visited twice.
    pub fn is_loopless(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.cities.len());
        self.cities.iter().all(|c| seen.insert(c.id.as_str()))
    }

    /// Whether both paths visit the same points in the same order.
    pub fn same_route(&self, other: &Path) -> bool {
        self.cities.len() == other.cities.len()
            && self
                .cities
                .iter()
                .zip(&other.cities)
                .all(|(a, b)| a.id == b.id)
    }

    /// The first `len` points of this path and the sections between them.
    ///
    /// `len` is clamped to the number of points.
    pub fn prefix(&self, len: usize) -> Path {
        let len = len.min(self.cities.len());
        let cities = self.cities[..len].to_vec();
        let edges = self.edges[..len.saturating_sub(1)].to_vec();
        Path::from_parts(cities, edges)
    }

    /// Append `tail`, whose first point must be this path's last point.
    ///
    /// Returns `None` when the two paths do not meet.
    pub fn concat(&self, tail: &Path) -> Option<Path> {
        match (self.destination(), tail.source()) {
            (Some(end), Some(start)) if end.id == start.id => {
                let mut cities = self.cities.clone();
                cities.extend(tail.cities.iter().skip(1).cloned());
                let mut edges = self.edges.clone();
                edges.extend(tail.edges.iter().cloned());
                Some(Path::from_parts(cities, edges))
            }
            (None, _) => Some(tail.clone()),
            _ => None,
        }
    }

    /// Flatten into an export row.
    pub fn to_record(&self) -> PathRecord {
        PathRecord {
            stops: self.stops(),
            route: self.cities.iter().map(|c| c.label.clone()).collect(),
            total_distance: self.total_distance,
        }
    }
}

// ============================================================================
// PathRecord
// ============================================================================

/// Flat, export-friendly view of a path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathRecord {
    /// Number of visited points.
    pub stops: usize,
    /// Point labels in order.
    pub route: Vec<String>,
    /// Sum of section distances.
    pub total_distance: f64,
}

impl PathRecord {
    /// Join the route labels with `separator`.
    pub fn route_string(&self, separator: &str) -> String {
        self.route.join(separator)
    }
}

// ============================================================================
// PathSet
// ============================================================================

/// Paths for one (source, destination) pair, ascending by distance.
///
/// Equal distances keep the order in which the paths were discovered.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathSet {
    paths: Vec<Path>,
}

impl PathSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rank paths by distance with a stable sort.
    pub fn ranked(mut paths: Vec<Path>) -> Self {
        paths.sort_by(|a, b| a.total_distance.total_cmp(&b.total_distance));
        Self { paths }
    }

    /// A set holding exactly one path.
    pub fn single(path: Path) -> Self {
        Self { paths: vec![path] }
    }

    /// Keep at most `limit` paths.
    pub fn truncated(mut self, limit: usize) -> Self {
        self.paths.truncate(limit);
        self
    }

    /// Number of paths.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether the set holds no paths.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// The shortest path, if any.
    pub fn first(&self) -> Option<&Path> {
        self.paths.first()
    }

    /// Iterate over the paths in rank order.
    pub fn iter(&self) -> std::slice::Iter<'_, Path> {
        self.paths.iter()
    }

    /// Borrow the paths as a slice.
    pub fn as_slice(&self) -> &[Path] {
        &self.paths
    }

    /// Consume the set, returning the ranked paths.
    pub fn into_vec(self) -> Vec<Path> {
        self.paths
    }

    /// Flatten every path into an export row.
    pub fn records(&self) -> Vec<PathRecord> {
        self.paths.iter().map(Path::to_record).collect()
    }
}

impl IntoIterator for PathSet {
    type Item = Path;
    type IntoIter = std::vec::IntoIter<Path>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.into_iter()
    }
}

impl<'a> IntoIterator for &'a PathSet {
    type Item = &'a Path;
    type IntoIter = std::slice::Iter<'a, Path>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}

// ============================================================================
// Tests
// ============================================================================
