//! Single-pair shortest path through the store's specialised primitive.

use crate::algo::ShortestPathRequest;
use crate::store::GraphStore;
use crate::types::Path;
use railgraph_core::Result;
use std::sync::Arc;

/// Runs Dijkstra searches against a named projection.
///
/// The projection must already exist; see
/// [`ProjectionManager`](crate::manager::ProjectionManager).
#[derive(Clone)]
pub struct ShortestPathEngine {
    store: Arc<dyn GraphStore>,
    projection: String,
}

impl ShortestPathEngine {
    /// Create an engine searching `projection` on `store`.
    pub fn new(store: Arc<dyn GraphStore>, projection: impl Into<String>) -> Self {
        Self {
            store,
            projection: projection.into(),
        }
    }

    /// Name of the projection searched.
    pub fn projection(&self) -> &str {
        &self.projection
    }

    /// Minimal-distance path from `source` to `target`.
    ///
    /// `Ok(None)` means no route; unknown ids also yield `None`.
    pub async fn shortest_path(&self, source: &str, target: &str) -> Result<Option<Path>> {
        self.search(&ShortestPathRequest::new(source, target)).await
    }

    /// Minimal-distance path honouring the request's exclusions.
    pub async fn search(&self, request: &ShortestPathRequest) -> Result<Option<Path>> {
        self.store.shortest_path(&self.projection, request).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::projection::ProjectionSpec;
    use crate::store::MemoryGraphStore;
    use crate::testing::{assert_well_formed, diamond_snapshot, disconnected_snapshot};
    use railgraph_core::Error;

    async fn engine_over(snapshot: crate::persistence::GraphSnapshot) -> ShortestPathEngine {
        let store = Arc::new(MemoryGraphStore::new(snapshot));
        let spec = ProjectionSpec::default();
        store.create_projection(&spec).await.unwrap();
        ShortestPathEngine::new(store, spec.name)
    }

    #[tokio::test]
    async fn test_diamond_shortest_path() {
        let engine = engine_over(diamond_snapshot()).await;
        let path = engine.shortest_path("A", "D").await.unwrap().unwrap();
        assert_eq!(path.node_ids(), vec!["A", "B", "C", "D"]);
        assert_eq!(path.total_distance, 23.0);
        assert_well_formed(&path);
    }

    #[tokio::test]
    async fn test_disconnected_is_none() {
        let engine = engine_over(disconnected_snapshot()).await;
        assert!(engine.shortest_path("A", "F").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_id_is_none() {
        let engine = engine_over(diamond_snapshot()).await;
        assert!(engine.shortest_path("A", "Atlantis").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_masked_search() {
        let engine = engine_over(diamond_snapshot()).await;
        let request = ShortestPathRequest::new("A", "D").excluding_node("B");
        let path = engine.search(&request).await.unwrap().unwrap();
        assert_eq!(path.node_ids(), vec!["A", "D"]);
    }

    #[tokio::test]
    async fn test_missing_projection_errors() {
        let store = Arc::new(MemoryGraphStore::new(diamond_snapshot()));
        let engine = ShortestPathEngine::new(store, "absent");
        assert_eq!(engine.projection(), "absent");
        let err = engine.shortest_path("A", "D").await.unwrap_err();
        assert!(matches!(err, Error::Projection(_)));
    }
}
