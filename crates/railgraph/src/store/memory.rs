//! In-process graph store seeded from a snapshot.

use super::pool::{PoolConfig, SessionPool};
use super::{GraphStore, Section};
use crate::algo::ShortestPathRequest;
use crate::persistence::{GraphSnapshot, load_snapshot};
use crate::projection::{GraphSchema, Projection, ProjectionInfo, ProjectionSpec};
use crate::types::{OperationPoint, Path};
use async_trait::async_trait;
use railgraph_core::{Error, Result};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Graph store holding the whole network in memory.
///
/// Projections are kept in a named catalogue. Shortest-path searches run on
/// the blocking thread pool so concurrent callers proceed in parallel.
pub struct MemoryGraphStore {
    snapshot: Arc<GraphSnapshot>,
    points: HashMap<String, usize>,
    adjacency: HashMap<String, Vec<usize>>,
    projections: RwLock<HashMap<String, Arc<Projection>>>,
    pool: SessionPool,
    algorithms: bool,
}

impl MemoryGraphStore {
    /// Create a store over `snapshot` with a default session pool.
    pub fn new(snapshot: GraphSnapshot) -> Self {
        let mut points = HashMap::new();
        for (i, point) in snapshot.points.iter().enumerate() {
            points.entry(point.id.clone()).or_insert(i);
        }

        let mut adjacency: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, section) in snapshot.sections.iter().enumerate() {
            adjacency.entry(section.from.clone()).or_default().push(i);
            if section.to != section.from {
                adjacency.entry(section.to.clone()).or_default().push(i);
            }
        }

        Self {
            snapshot: Arc::new(snapshot),
            points,
            adjacency,
            projections: RwLock::new(HashMap::new()),
            pool: SessionPool::new(PoolConfig::default()),
            algorithms: true,
        }
    }

    /// Load a snapshot file and create a store over it.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        Ok(Self::new(load_snapshot(path)?))
    }

    /// Replace the session pool.
    pub fn with_pool_config(mut self, config: PoolConfig) -> Self {
        self.pool = SessionPool::new(config);
        self
    }

    /// Enable or disable projections and the shortest-path primitive.
    pub fn with_algorithms(mut self, enabled: bool) -> Self {
        self.algorithms = enabled;
        self
    }

    /// The snapshot this store serves.
    pub fn snapshot(&self) -> &GraphSnapshot {
        &self.snapshot
    }

    /// The session pool.
    pub fn pool(&self) -> &SessionPool {
        &self.pool
    }

    /// Index of the first record for `id`, if that record has the schema's kind.
    fn projected(&self, id: &str, schema: &GraphSchema) -> Option<usize> {
        self.points
            .get(id)
            .copied()
            .filter(|&i| self.snapshot.points[i].kind == schema.node_label)
    }

    fn listed(&self, schema: &GraphSchema) -> impl Iterator<Item = OperationPoint> {
        self.snapshot
            .points
            .iter()
            .enumerate()
            .filter(|(i, p)| self.projected(&p.id, schema) == Some(*i))
            .map(|(_, p)| p.to_point())
    }

    fn require_algorithms(&self) -> Result<()> {
        if self.algorithms {
            Ok(())
        } else {
            Err(Error::capability(
                "graph projections and path algorithms are not enabled on this store",
            ))
        }
    }
}

#[async_trait]
impl GraphStore for MemoryGraphStore {
    async fn point(&self, id: &str, schema: &GraphSchema) -> Result<Option<OperationPoint>> {
        let _session = self.pool.acquire().await?;
        Ok(self
            .projected(id, schema)
            .map(|i| self.snapshot.points[i].to_point()))
    }

    async fn points(&self, schema: &GraphSchema) -> Result<Vec<OperationPoint>> {
        let _session = self.pool.acquire().await?;
        let mut points: Vec<OperationPoint> = self.listed(schema).collect();
        points.sort_by(|a, b| a.label.cmp(&b.label).then_with(|| a.id.cmp(&b.id)));
        Ok(points)
    }

    async fn countries(&self, schema: &GraphSchema) -> Result<Vec<String>> {
        let _session = self.pool.acquire().await?;
        let countries: BTreeSet<String> = self.listed(schema).map(|p| p.country).collect();
        Ok(countries.into_iter().collect())
    }

    async fn sections(&self, id: &str, schema: &GraphSchema) -> Result<Vec<Section>> {
        let _session = self.pool.acquire().await?;
        if self.projected(id, schema).is_none() {
            return Ok(Vec::new());
        }
        let Some(incident) = self.adjacency.get(id) else {
            return Ok(Vec::new());
        };

        let mut sections = Vec::with_capacity(incident.len());
        for &i in incident {
            let record = &self.snapshot.sections[i];
            if record.relationship != schema.relationship_type {
                continue;
            }
            let Some(distance) = record.weight(&schema.weight_property) else {
                continue;
            };
            if !distance.is_finite() || distance < 0.0 {
                log::warn!(
                    "Skipping section {} - {} with invalid {} {distance}",
                    record.from,
                    record.to,
                    schema.weight_property
                );
                continue;
            }
            if let Some(to) = record.opposite(id) {
                if self.projected(to, schema).is_none() {
                    continue;
                }
                sections.push(Section {
                    from: id.to_string(),
                    to: to.to_string(),
                    distance,
                });
            }
        }
        Ok(sections)
    }

    async fn projection_exists(&self, name: &str) -> Result<bool> {
        let _session = self.pool.acquire().await?;
        Ok(self.projections.read().await.contains_key(name))
    }

    async fn projection_info(&self, name: &str) -> Result<Option<ProjectionInfo>> {
        let _session = self.pool.acquire().await?;
        Ok(self.projections.read().await.get(name).map(|p| p.info()))
    }

    async fn create_projection(&self, spec: &ProjectionSpec) -> Result<ProjectionInfo> {
        let _session = self.pool.acquire().await?;
        self.require_algorithms()?;

        if self.projections.read().await.contains_key(&spec.name) {
            return Err(Error::projection_exists(&spec.name));
        }

        let snapshot = Arc::clone(&self.snapshot);
        let build_spec = spec.clone();
        let projection =
            tokio::task::spawn_blocking(move || Projection::build(&build_spec, &snapshot))
                .await
                .map_err(|e| Error::operation(format!("projection build failed: {e}")))??;
        let info = projection.info();

        // Another caller may have finished first while this one was building.
        let mut projections = self.projections.write().await;
        if projections.contains_key(&spec.name) {
            return Err(Error::projection_exists(&spec.name));
        }
        projections.insert(spec.name.clone(), Arc::new(projection));
        log::info!(
            "Created projection '{}' ({} points, {} sections)",
            info.name,
            info.node_count,
            info.relationship_count
        );
        Ok(info)
    }

    async fn drop_projection(&self, name: &str) -> Result<bool> {
        let _session = self.pool.acquire().await?;
        Ok(self.projections.write().await.remove(name).is_some())
    }

    async fn shortest_path(
        &self,
        projection: &str,
        request: &ShortestPathRequest,
    ) -> Result<Option<Path>> {
        let _session = self.pool.acquire().await?;
        self.require_algorithms()?;

        let graph = self
            .projections
            .read()
            .await
            .get(projection)
            .cloned()
            .ok_or_else(|| Error::projection(format!("projection '{projection}' does not exist")))?;

        let request = request.clone();
        tokio::task::spawn_blocking(move || graph.shortest_path(&request))
            .await
            .map_err(|e| Error::operation(format!("shortest-path search failed: {e}")))
    }

    async fn close(&self) {
        self.pool.close();
        self.projections.write().await.clear();
    }

    fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}

// ============================================================================
// Tests
// ============================================================================
