//! Network statistics.
//!
//! Summarises a snapshot the way a projection would see it: only points of
//! the schema's node label and sections of its relationship type count as
//! routable. Connectivity is measured with petgraph's union-find so that
//! malformed sections never abort the report.

use crate::persistence::GraphSnapshot;
use crate::projection::GraphSchema;
use petgraph::unionfind::UnionFind;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// ============================================================================
// Types
// ============================================================================

/// Statistics about a network snapshot.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GraphStats {
    /// Total number of points.
    pub point_count: usize,
    /// Total number of sections, of any relationship type.
    pub section_count: usize,
    /// Sections a projection would keep.
    pub routable_section_count: usize,
    /// Points per country.
    pub country_distribution: BTreeMap<String, usize>,
    /// Sections per relationship type.
    pub relationship_distribution: BTreeMap<String, usize>,
    /// Points without any routable section.
    pub orphan_count: usize,
    /// Number of connected components, orphans included.
    pub component_count: usize,
    /// Points in the largest connected component.
    pub largest_component: usize,
    /// Average routable sections per point.
    pub avg_degree: f32,
    /// Highest number of routable sections at one point.
    pub max_degree: usize,
    /// Point with the highest degree.
    pub busiest_point: Option<String>,
    /// Sum of routable section weights.
    pub total_length: f64,
    /// Shortest routable section.
    pub min_section_length: Option<f64>,
    /// Longest routable section.
    pub max_section_length: Option<f64>,
}

// ============================================================================
// Functions
// ============================================================================

/// Compute statistics for `snapshot` under `schema`.
pub fn compute_stats(snapshot: &GraphSnapshot, schema: &GraphSchema) -> GraphStats {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut country_distribution: BTreeMap<String, usize> = BTreeMap::new();
    for point in snapshot.points.iter().filter(|p| p.kind == schema.node_label) {
        if index.contains_key(point.id.as_str()) {
            continue;
        }
        index.insert(point.id.as_str(), index.len());
        *country_distribution
            .entry(point.to_point().country)
            .or_insert(0) += 1;
    }
    let point_count = index.len();

    let mut relationship_distribution: BTreeMap<String, usize> = BTreeMap::new();
    for section in &snapshot.sections {
        *relationship_distribution
            .entry(section.relationship.clone())
            .or_insert(0) += 1;
    }

    let mut degrees = vec![0usize; point_count];
    let mut components: UnionFind<usize> = UnionFind::new(point_count);
    let mut routable_section_count = 0;
    let mut total_length = 0.0;
    let mut min_section_length: Option<f64> = None;
    let mut max_section_length: Option<f64> = None;

    for section in snapshot
        .sections
        .iter()
        .filter(|s| s.relationship == schema.relationship_type && s.from != s.to)
    {
        let (Some(&a), Some(&b)) = (index.get(section.from.as_str()), index.get(section.to.as_str()))
        else {
            continue;
        };
        let Some(length) = section
            .weight(&schema.weight_property)
            .filter(|w| w.is_finite() && *w >= 0.0)
        else {
            continue;
        };

        routable_section_count += 1;
        degrees[a] += 1;
        degrees[b] += 1;
        components.union(a, b);
        total_length += length;
        min_section_length = Some(min_section_length.map_or(length, |m| m.min(length)));
        max_section_length = Some(max_section_length.map_or(length, |m| m.max(length)));
    }

    let mut sizes: HashMap<usize, usize> = HashMap::new();
    for i in 0..point_count {
        *sizes.entry(components.find(i)).or_insert(0) += 1;
    }

    let orphan_count = degrees.iter().filter(|&&d| d == 0).count();
    let avg_degree = if point_count > 0 {
        degrees.iter().sum::<usize>() as f32 / point_count as f32
    } else {
        0.0
    };

    let mut ids: Vec<&str> = vec![""; point_count];
    for (id, &i) in &index {
        ids[i] = id;
    }
    // First point wins ties so the report is stable.
    let (busiest_point, max_degree) = degrees
        .iter()
        .enumerate()
        .fold((None, 0), |(best, max), (i, &d)| {
            if d > max { (Some(ids[i].to_string()), d) } else { (best, max) }
        });

    GraphStats {
        point_count,
        section_count: snapshot.sections.len(),
        routable_section_count,
        country_distribution,
        relationship_distribution,
        orphan_count,
        component_count: sizes.len(),
        largest_component: sizes.values().copied().max().unwrap_or(0),
        avg_degree,
        max_degree,
        busiest_point,
        total_length,
        min_section_length,
        max_section_length,
    }
}

/// Get a quick summary of network size.
pub fn quick_summary(snapshot: &GraphSnapshot) -> String {
    format!(
        "{} points, {} sections",
        snapshot.points.len(),
        snapshot.sections.len()
    )
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{PointRecord, SectionRecord};
    use crate::testing::{diamond_snapshot, disconnected_snapshot};

    #[test]
    fn test_diamond_stats() {
        let stats = compute_stats(&diamond_snapshot(), &GraphSchema::default());
        assert_eq!(stats.point_count, 4);
        assert_eq!(stats.section_count, 4);
        assert_eq!(stats.routable_section_count, 4);
        assert_eq!(stats.component_count, 1);
        assert_eq!(stats.largest_component, 4);
        assert_eq!(stats.orphan_count, 0);
        assert_eq!(stats.avg_degree, 2.0);
        assert_eq!(stats.max_degree, 2);
        assert_eq!(stats.busiest_point.as_deref(), Some("A"));
        assert_eq!(stats.total_length, 53.0);
        assert_eq!(stats.min_section_length, Some(5.0));
        assert_eq!(stats.max_section_length, Some(30.0));
        assert_eq!(stats.country_distribution.get("Unknown"), Some(&4));
    }

    #[test]
    fn test_components_and_orphans() {
        let snapshot = disconnected_snapshot().with_point(PointRecord::new("Z"));
        let stats = compute_stats(&snapshot, &GraphSchema::default());
        assert_eq!(stats.point_count, 7);
        assert_eq!(stats.component_count, 3);
        assert_eq!(stats.largest_component, 4);
        assert_eq!(stats.orphan_count, 1);
    }

    #[test]
    fn test_unroutable_sections_are_counted_but_not_used() {
        let snapshot = diamond_snapshot()
            .with_section(SectionRecord::new("A", "C", 1.0).with_relationship("TUNNEL"))
            .with_section(SectionRecord::new("A", "Z", 1.0))
            .with_section(SectionRecord::new("B", "D", -2.0));
        let stats = compute_stats(&snapshot, &GraphSchema::default());
        assert_eq!(stats.section_count, 7);
        assert_eq!(stats.routable_section_count, 4);
        assert_eq!(stats.relationship_distribution.get("SECTION"), Some(&6));
        assert_eq!(stats.relationship_distribution.get("TUNNEL"), Some(&1));
    }

    #[test]
    fn test_empty_snapshot() {
        let stats = compute_stats(&GraphSnapshot::new(), &GraphSchema::default());
        assert_eq!(stats.point_count, 0);
        assert_eq!(stats.component_count, 0);
        assert_eq!(stats.avg_degree, 0.0);
        assert!(stats.busiest_point.is_none());
        assert!(stats.min_section_length.is_none());
    }

    #[test]
    fn test_quick_summary() {
        assert_eq!(quick_summary(&diamond_snapshot()), "4 points, 4 sections");
    }
}
