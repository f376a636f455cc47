//! Bounded-depth path enumeration.
//!
//! Used when no projection or shortest-path primitive is available. It walks
//! the store's plain adjacency depth-first, collecting every simple path of
//! at most `max_hops` sections, then ranks by distance. The cost grows
//! exponentially with the hop bound; the bound is what keeps it tractable.

use crate::projection::GraphSchema;
use crate::store::{GraphStore, Section};
use crate::types::{OperationPoint, Path, PathEdge, PathSet};
use railgraph_core::Result;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Default maximum number of sections in an enumerated path.
pub const DEFAULT_MAX_HOPS: usize = 5;

/// Enumerates simple paths by bounded depth-first traversal.
#[derive(Clone)]
pub struct FallbackPathFinder {
    store: Arc<dyn GraphStore>,
    schema: GraphSchema,
    max_hops: usize,
}

struct Frame {
    node: String,
    next: usize,
}

impl FallbackPathFinder {
    /// Create a finder with the default schema and hop bound.
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self {
            store,
            schema: GraphSchema::default(),
            max_hops: DEFAULT_MAX_HOPS,
        }
    }

    /// Select sections and weights with `schema`.
    pub fn with_schema(mut self, schema: GraphSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Set the hop bound. Values below one are raised to one.
    pub fn with_max_hops(mut self, max_hops: usize) -> Self {
        self.max_hops = max_hops.max(1);
        self
    }

    /// The hop bound.
    pub fn max_hops(&self) -> usize {
        self.max_hops
    }

    /// Up to `limit` simple paths from `source` to `target`, cheapest first.
    ///
    /// Paths have between one and `max_hops` sections and never revisit a
    /// point, so `source` never appears past the first position. Routes that
    /// differ only in which parallel section they use are reported once, at
    /// their cheapest. Equal distances keep traversal order.
    pub async fn find_paths(&self, source: &str, target: &str, limit: usize) -> Result<PathSet> {
        if limit == 0 || source == target {
            return Ok(PathSet::new());
        }

        let mut adjacency: HashMap<String, Vec<Section>> = HashMap::new();
        self.load_sections(&mut adjacency, source).await?;

        let mut found: Vec<(Vec<String>, Vec<Section>)> = Vec::new();
        let mut stack = vec![Frame {
            node: source.to_string(),
            next: 0,
        }];
        let mut on_path: HashSet<String> = HashSet::from([source.to_string()]);
        let mut taken: Vec<Section> = Vec::new();

        while let Some(top) = stack.last_mut() {
            let section = adjacency
                .get(&top.node)
                .and_then(|sections| sections.get(top.next))
                .cloned();
            top.next += 1;

            let Some(section) = section else {
                if let Some(frame) = stack.pop() {
                    on_path.remove(&frame.node);
                }
                taken.pop();
                continue;
            };

            if on_path.contains(&section.to) {
                continue;
            }

            if section.to == target {
                let mut ids: Vec<String> = stack.iter().map(|f| f.node.clone()).collect();
                ids.push(section.to.clone());
                let mut edges = taken.clone();
                edges.push(section);
                found.push((ids, edges));
                continue;
            }

            if stack.len() >= self.max_hops {
                continue;
            }

            self.load_sections(&mut adjacency, &section.to).await?;
            on_path.insert(section.to.clone());
            stack.push(Frame {
                node: section.to.clone(),
                next: 0,
            });
            taken.push(section);
        }

        log::debug!(
            "Bounded traversal {source} -> {target} (max {} hops): {} raw path(s)",
            self.max_hops,
            found.len()
        );

        let mut points: HashMap<String, OperationPoint> = HashMap::new();
        let mut paths = Vec::with_capacity(found.len());
        for (ids, sections) in found {
            let mut cities = Vec::with_capacity(ids.len());
            for id in &ids {
                cities.push(self.load_point(&mut points, id).await?);
            }
            let edges = sections
                .into_iter()
                .map(|s| PathEdge::new(s.from, s.to, s.distance))
                .collect();
            paths.push(Path::from_parts(cities, edges));
        }

        let ranked = PathSet::ranked(paths);
        let mut seen: HashSet<Vec<String>> = HashSet::new();
        let distinct: Vec<Path> = ranked
            .into_iter()
            .filter(|p| seen.insert(p.cities.iter().map(|c| c.id.clone()).collect()))
            .take(limit)
            .collect();

        Ok(PathSet::ranked(distinct))
    }

    async fn load_sections(
        &self,
        adjacency: &mut HashMap<String, Vec<Section>>,
        id: &str,
    ) -> Result<()> {
        if !adjacency.contains_key(id) {
            let sections = self.store.sections(id, &self.schema).await?;
            adjacency.insert(id.to_string(), sections);
        }
        Ok(())
    }

    async fn load_point(
        &self,
        points: &mut HashMap<String, OperationPoint>,
        id: &str,
    ) -> Result<OperationPoint> {
        if let Some(point) = points.get(id) {
            return Ok(point.clone());
        }
        let point = self
            .store
            .point(id, &self.schema)
            .await?
            .unwrap_or_else(|| OperationPoint::new(id));
        points.insert(id.to_string(), point.clone());
        Ok(point)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::persistence::GraphSnapshot;
    use crate::store::MemoryGraphStore;
    use crate::testing::{
        Fault, ScriptedStore, assert_well_formed, diamond_snapshot, disconnected_snapshot,
        long_chain_snapshot, mesh_snapshot, snapshot_from_sections, yard_snapshot,
    };

    fn finder_over(snapshot: GraphSnapshot) -> FallbackPathFinder {
        FallbackPathFinder::new(Arc::new(MemoryGraphStore::new(snapshot)))
    }

    #[tokio::test]
    async fn test_diamond_routes_ranked() {
        let set = finder_over(diamond_snapshot())
            .find_paths("A", "D", 5)
            .await
            .unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.as_slice()[0].node_ids(), vec!["A", "B", "C", "D"]);
        assert_eq!(set.as_slice()[0].total_distance, 23.0);
        assert_eq!(set.as_slice()[1].node_ids(), vec!["A", "D"]);
        for path in &set {
            assert_well_formed(path);
        }
    }

    #[tokio::test]
    async fn test_limit_truncates() {
        let set = finder_over(diamond_snapshot())
            .find_paths("A", "D", 1)
            .await
            .unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.first().unwrap().total_distance, 23.0);

        let none = finder_over(diamond_snapshot())
            .find_paths("A", "D", 0)
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_hop_bound_excludes_long_routes() {
        let set = finder_over(long_chain_snapshot())
            .find_paths("P0", "P6", 10)
            .await
            .unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.first().unwrap().node_ids(), vec!["P0", "P6"]);
        assert_eq!(set.first().unwrap().total_distance, 100.0);
    }

    #[tokio::test]
    async fn test_hop_bound_is_configurable() {
        let set = finder_over(long_chain_snapshot())
            .with_max_hops(6)
            .find_paths("P0", "P6", 10)
            .await
            .unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.first().unwrap().hops(), 6);
        assert_eq!(set.first().unwrap().total_distance, 6.0);
    }

    #[tokio::test]
    async fn test_never_exceeds_hop_bound() {
        let finder = finder_over(mesh_snapshot()).with_max_hops(3);
        let set = finder.find_paths("C", "H", 100).await.unwrap();
        assert!(!set.is_empty());
        for path in &set {
            assert!(path.hops() >= 1 && path.hops() <= 3);
            assert_well_formed(path);
        }
        for pair in set.as_slice().windows(2) {
            assert!(pair[0].total_distance <= pair[1].total_distance);
        }
    }

    #[tokio::test]
    async fn test_source_never_reappears() {
        let set = finder_over(mesh_snapshot())
            .find_paths("E", "H", 100)
            .await
            .unwrap();
        for path in &set {
            assert!(path.cities.iter().skip(1).all(|c| c.id != "E"));
        }
    }

    #[tokio::test]
    async fn test_disconnected_and_unknown_are_empty() {
        let finder = finder_over(disconnected_snapshot());
        assert!(finder.find_paths("A", "F", 3).await.unwrap().is_empty());
        assert!(finder.find_paths("A", "Atlantis", 3).await.unwrap().is_empty());
        assert!(finder.find_paths("Atlantis", "A", 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_same_endpoint_is_empty() {
        let finder = finder_over(diamond_snapshot());
        assert!(finder.find_paths("A", "A", 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_parallel_sections_reported_once_at_cheapest() {
        let finder = finder_over(snapshot_from_sections(&[
            ("A", "B", 4.0),
            ("A", "B", 2.0),
            ("B", "C", 1.0),
        ]));
        let set = finder.find_paths("A", "C", 5).await.unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.first().unwrap().total_distance, 3.0);
    }

    #[tokio::test]
    async fn test_labels_are_resolved() {
        let mut snapshot = diamond_snapshot();
        snapshot.points[0].name = Some("Alpha".into());
        let set = finder_over(snapshot).find_paths("A", "B", 1).await.unwrap();
        assert_eq!(set.records()[0].route, vec!["Alpha", "B"]);
    }

    #[tokio::test]
    async fn test_routes_stay_on_node_label() {
        let finder = finder_over(yard_snapshot());
        let set = finder.find_paths("A", "D", 5).await.unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.iter().all(|p| !p.node_ids().contains(&"Y")));
        assert!(finder.find_paths("A", "Y", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_adjacency_is_fetched_once_per_point() {
        let store = Arc::new(ScriptedStore::new(mesh_snapshot()));
        let finder = FallbackPathFinder::new(store.clone());
        finder.find_paths("C", "H", 100).await.unwrap();
        // Six points, target never expanded.
        assert!(store.counters().sections() <= 5);
    }

    #[tokio::test]
    async fn test_store_errors_propagate() {
        let store = Arc::new(ScriptedStore::new(diamond_snapshot()).failing_sections(Fault::Connectivity));
        let err = FallbackPathFinder::new(store)
            .find_paths("A", "D", 3)
            .await
            .unwrap_err();
        assert!(err.is_connectivity());
    }
}
