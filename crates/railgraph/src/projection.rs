//! In-memory weighted projections of the rail network.
//!
//! A [`Projection`] is a named, read-only snapshot of the points and sections
//! selected by a [`GraphSchema`], materialised as an undirected petgraph
//! multigraph so parallel sections survive as alternatives. Shortest-path
//! searches run against a projection and never modify it.

use crate::algo::{self, SearchMask, ShortestPathRequest};
use crate::persistence::GraphSnapshot;
use crate::types::{OperationPoint, Path, PathEdge};
use petgraph::graph::{NodeIndex, UnGraph};
use railgraph_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default projection name.
pub const DEFAULT_PROJECTION_NAME: &str = "OperationPointGraph";
/// Default node label selected into projections.
pub const DEFAULT_NODE_LABEL: &str = "OperationPoint";
/// Default relationship type selected into projections.
pub const DEFAULT_RELATIONSHIP_TYPE: &str = "SECTION";
/// Default section property holding the distance.
pub const DEFAULT_WEIGHT_PROPERTY: &str = "sectionlength";

// ============================================================================
// Schema and spec
// ============================================================================

/// Which points and sections make up the routable network.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSchema {
    /// Node label of routable points.
    pub node_label: String,
    /// Relationship type of routable sections.
    pub relationship_type: String,
    /// Section property holding the distance.
    pub weight_property: String,
}

impl Default for GraphSchema {
    fn default() -> Self {
        Self {
            node_label: DEFAULT_NODE_LABEL.to_string(),
            relationship_type: DEFAULT_RELATIONSHIP_TYPE.to_string(),
            weight_property: DEFAULT_WEIGHT_PROPERTY.to_string(),
        }
    }
}

/// A named projection request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionSpec {
    /// Projection name.
    pub name: String,
    /// Selection and weight settings.
    pub schema: GraphSchema,
}

impl ProjectionSpec {
    /// Create a spec with the default schema.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: GraphSchema::default(),
        }
    }

    /// Replace the schema.
    pub fn with_schema(mut self, schema: GraphSchema) -> Self {
        self.schema = schema;
        self
    }
}

impl Default for ProjectionSpec {
    fn default() -> Self {
        Self::new(DEFAULT_PROJECTION_NAME)
    }
}

/// Summary of a materialised projection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionInfo {
    /// Projection name.
    pub name: String,
    /// Number of projected points.
    pub node_count: usize,
    /// Number of projected sections.
    pub relationship_count: usize,
}

/// Edge payload of a projection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SectionWeight {
    /// Section length in kilometres.
    pub distance: f64,
}

// ============================================================================
// Projection
// ============================================================================

/// A named, weighted, undirected view of the network.
#[derive(Debug)]
pub struct Projection {
    name: String,
    graph: UnGraph<OperationPoint, SectionWeight>,
    index: HashMap<String, NodeIndex>,
}

impl Projection {
    /// Materialise the points and sections `spec` selects from `snapshot`.
    ///
    /// Sections whose endpoints are not projected, or that lack the weight
    /// property, are skipped. Negative or non-finite weights fail the build.
    pub fn build(spec: &ProjectionSpec, snapshot: &GraphSnapshot) -> Result<Self> {
        let schema = &spec.schema;
        let mut graph = UnGraph::default();
        let mut index = HashMap::new();

        for record in snapshot.points.iter().filter(|p| p.kind == schema.node_label) {
            if index.contains_key(&record.id) {
                log::warn!(
                    "Projection '{}': duplicate point '{}' ignored",
                    spec.name,
                    record.id
                );
                continue;
            }
            let idx = graph.add_node(record.to_point());
            index.insert(record.id.clone(), idx);
        }

        let mut skipped = 0usize;
        for section in snapshot
            .sections
            .iter()
            .filter(|s| s.relationship == schema.relationship_type)
        {
            let (Some(&from), Some(&to)) = (index.get(&section.from), index.get(&section.to)) else {
                skipped += 1;
                continue;
            };
            let Some(distance) = section.weight(&schema.weight_property) else {
                skipped += 1;
                continue;
            };
            if !distance.is_finite() || distance < 0.0 {
                return Err(Error::projection(format!(
                    "Section {} - {} has invalid {} {distance}",
                    section.from, section.to, schema.weight_property
                )));
            }
            graph.add_edge(from, to, SectionWeight { distance });
        }

        if skipped > 0 {
            log::warn!(
                "Projection '{}': skipped {skipped} section(s) with unknown endpoints or no '{}'",
                spec.name,
                schema.weight_property
            );
        }
        log::debug!(
            "Projection '{}' built: {} points, {} sections",
            spec.name,
            graph.node_count(),
            graph.edge_count()
        );

        Ok(Self {
            name: spec.name.clone(),
            graph,
            index,
        })
    }

    /// Projection name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of projected points.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of projected sections.
    pub fn relationship_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Summary of this projection.
    pub fn info(&self) -> ProjectionInfo {
        ProjectionInfo {
            name: self.name.clone(),
            node_count: self.node_count(),
            relationship_count: self.relationship_count(),
        }
    }

    /// Whether `id` is projected.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Graph index of `id`.
    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    /// The underlying graph.
    pub fn graph(&self) -> &UnGraph<OperationPoint, SectionWeight> {
        &self.graph
    }

    /// Minimal-distance path for `request`, honouring its exclusions.
    ///
    /// Returns `None` when either endpoint is not projected, is excluded, or
    /// no route exists.
    pub fn shortest_path(&self, request: &ShortestPathRequest) -> Option<Path> {
        let source = self.node_index(&request.source)?;
        let target = self.node_index(&request.target)?;

        let mut mask = SearchMask::new();
        for id in &request.excluded_nodes {
            if let Some(idx) = self.node_index(id) {
                mask.block_node(idx);
            }
        }
        for (a, b) in &request.excluded_links {
            if let (Some(a), Some(b)) = (self.node_index(a), self.node_index(b)) {
                mask.block_link(a, b);
            }
        }

        let route = algo::dijkstra(&self.graph, source, target, &mask)?;

        let cities = route
            .nodes
            .iter()
            .map(|&idx| self.graph[idx].clone())
            .collect::<Vec<_>>();
        let edges = route
            .edges
            .iter()
            .zip(cities.windows(2))
            .map(|(&edge, pair)| PathEdge::new(&pair[0].id, &pair[1].id, self.graph[edge].distance))
            .collect();

        Some(Path::from_parts(cities, edges))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::persistence::{PointRecord, SectionRecord};

    fn diamond() -> GraphSnapshot {
        GraphSnapshot::new()
            .with_point(PointRecord::new("A").with_name("Alpha"))
            .with_point(PointRecord::new("B"))
            .with_point(PointRecord::new("C"))
            .with_point(PointRecord::new("D"))
            .with_section(SectionRecord::new("A", "B", 10.0))
            .with_section(SectionRecord::new("B", "C", 5.0))
            .with_section(SectionRecord::new("C", "D", 8.0))
            .with_section(SectionRecord::new("A", "D", 30.0))
    }

    #[test]
    fn test_build_counts() {
        let projection = Projection::build(&ProjectionSpec::default(), &diamond()).unwrap();
        assert_eq!(projection.name(), DEFAULT_PROJECTION_NAME);
        assert_eq!(projection.node_count(), 4);
        assert_eq!(projection.relationship_count(), 4);
        assert!(projection.contains("A"));
        assert!(!projection.contains("Z"));
    }

    #[test]
    fn test_build_filters_by_schema() {
        let snapshot = diamond()
            .with_point(PointRecord::new("Depot").with_kind("Yard"))
            .with_section(SectionRecord::new("A", "C", 1.0).with_relationship("TUNNEL"))
            .with_section(SectionRecord::new("A", "Depot", 1.0));
        let projection = Projection::build(&ProjectionSpec::default(), &snapshot).unwrap();
        assert_eq!(projection.node_count(), 4);
        assert_eq!(projection.relationship_count(), 4);
    }

    #[test]
    fn test_build_skips_missing_weight() {
        let mut unweighted = SectionRecord::new("A", "C", 1.0);
        unweighted.properties.clear();
        let snapshot = diamond().with_section(unweighted);
        let projection = Projection::build(&ProjectionSpec::default(), &snapshot).unwrap();
        assert_eq!(projection.relationship_count(), 4);
    }

    #[test]
    fn test_build_rejects_negative_weight() {
        let snapshot = diamond().with_section(SectionRecord::new("A", "C", -1.0));
        let err = Projection::build(&ProjectionSpec::default(), &snapshot).unwrap_err();
        assert!(matches!(err, Error::Projection(_)));
    }

    #[test]
    fn test_build_with_custom_weight_property() {
        let schema = GraphSchema {
            weight_property: "minutes".into(),
            ..GraphSchema::default()
        };
        let snapshot = GraphSnapshot::new()
            .with_point(PointRecord::new("A"))
            .with_point(PointRecord::new("B"))
            .with_section(SectionRecord::new("A", "B", 100.0).with_property("minutes", 7.0));
        let spec = ProjectionSpec::new("timed").with_schema(schema);
        let projection = Projection::build(&spec, &snapshot).unwrap();
        let path = projection
            .shortest_path(&ShortestPathRequest::new("A", "B"))
            .unwrap();
        assert_eq!(path.total_distance, 7.0);
    }

    #[test]
    fn test_shortest_path_materialises_points() {
        let projection = Projection::build(&ProjectionSpec::default(), &diamond()).unwrap();
        let path = projection
            .shortest_path(&ShortestPathRequest::new("A", "D"))
            .unwrap();
        assert_eq!(path.node_ids(), vec!["A", "B", "C", "D"]);
        assert_eq!(path.total_distance, 23.0);
        assert_eq!(path.cities[0].label, "Alpha");
        assert_eq!(path.edges[0], PathEdge::new("A", "B", 10.0));
        assert_eq!(path.edges[2], PathEdge::new("C", "D", 8.0));
    }

    #[test]
    fn test_shortest_path_with_exclusions() {
        let projection = Projection::build(&ProjectionSpec::default(), &diamond()).unwrap();
        let request = ShortestPathRequest::new("A", "D").excluding_link("B", "C");
        let path = projection.shortest_path(&request).unwrap();
        assert_eq!(path.node_ids(), vec!["A", "D"]);

        let request = ShortestPathRequest::new("A", "D")
            .excluding_link("A", "D")
            .excluding_node("C");
        assert!(projection.shortest_path(&request).is_none());
    }

    #[test]
    fn test_shortest_path_unknown_endpoint() {
        let projection = Projection::build(&ProjectionSpec::default(), &diamond()).unwrap();
        assert!(
            projection
                .shortest_path(&ShortestPathRequest::new("A", "Nowhere"))
                .is_none()
        );
    }
}
