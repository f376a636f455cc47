//! Single entry point for path queries.
//!
//! Every query runs as a two-stage pipeline:
//!
//! 1. **Specialised**: ensure the projection, then run Dijkstra or Yen's
//!    through the store. The stage reports an [`EngineOutcome`] instead of
//!    failing.
//! 2. **Fallback**: if the first stage is [`EngineOutcome::Unavailable`],
//!    enumerate bounded-depth simple paths instead.
//!
//! Callers see the same [`PathQueryResult`] either way. Endpoints and the
//! fallback adjacency use the projection's node label, so both stages see
//! the same network. Of all store failures, only connectivity errors surface
//! as `Err`.
//!
//! [`PathQueryFacade::minimal_path`] has no second stage: a hop-capped
//! enumeration cannot promise the minimal route, so an unavailable engine
//! is reported as no route.

use crate::fallback::{DEFAULT_MAX_HOPS, FallbackPathFinder};
use crate::manager::ProjectionManager;
use crate::projection::{GraphSchema, ProjectionSpec};
use crate::shortest::ShortestPathEngine;
use crate::store::GraphStore;
use crate::types::{OperationPoint, Path, PathRecord, PathSet};
use crate::yen::KShortestPathsEngine;
use railgraph_core::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ============================================================================
// Types
// ============================================================================

/// Default number of paths for top-paths queries.
pub const DEFAULT_K: usize = 3;

/// Default upper bound on requested path counts.
pub const DEFAULT_MAX_K: usize = 10;

/// Query tuning.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathQueryConfig {
    /// Path count used when a caller does not specify one.
    pub default_k: usize,
    /// Requested counts above this are clamped.
    pub max_k: usize,
    /// Hop bound for the fallback traversal.
    pub max_hops: usize,
}

impl Default for PathQueryConfig {
    fn default() -> Self {
        Self {
            default_k: DEFAULT_K,
            max_k: DEFAULT_MAX_K,
            max_hops: DEFAULT_MAX_HOPS,
        }
    }
}

impl PathQueryConfig {
    /// Clamp a requested count into `1..=max_k`.
    pub fn clamp_k(&self, k: usize) -> usize {
        k.clamp(1, self.max_k.max(1))
    }
}

/// How a query ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathQueryStatus {
    /// At least one path was found.
    Found,
    /// Both endpoints exist but no route joins them.
    NoRoute,
    /// The source or destination id is unknown.
    UnknownEndpoint,
}

/// Uniform result of every path query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathQueryResult {
    /// Outcome classification.
    pub status: PathQueryStatus,
    /// Paths, cheapest first. Empty unless `status` is `Found`.
    pub paths: PathSet,
}

impl PathQueryResult {
    fn from_paths(paths: PathSet) -> Self {
        let status = if paths.is_empty() {
            PathQueryStatus::NoRoute
        } else {
            PathQueryStatus::Found
        };
        Self { status, paths }
    }

    fn unknown_endpoint() -> Self {
        Self {
            status: PathQueryStatus::UnknownEndpoint,
            paths: PathSet::new(),
        }
    }

    /// Whether any path was found.
    pub fn is_found(&self) -> bool {
        self.status == PathQueryStatus::Found
    }

    /// The cheapest path, if any.
    pub fn best(&self) -> Option<&Path> {
        self.paths.first()
    }

    /// Export rows for every path.
    pub fn records(&self) -> Vec<PathRecord> {
        self.paths.records()
    }
}

/// Result of the specialised stage.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineOutcome {
    /// The specialised engines answered; the set may be empty.
    Specialized(PathSet),
    /// The specialised engines could not answer, with the reason.
    Unavailable(String),
}

// ============================================================================
// Facade
// ============================================================================

/// Two-stage path query service.
pub struct PathQueryFacade {
    store: Arc<dyn GraphStore>,
    projections: ProjectionManager,
    shortest: ShortestPathEngine,
    k_shortest: KShortestPathsEngine,
    fallback: FallbackPathFinder,
    schema: GraphSchema,
    config: PathQueryConfig,
}

impl PathQueryFacade {
    /// Assemble the query pipeline over `store`.
    pub fn new(store: Arc<dyn GraphStore>, spec: ProjectionSpec, config: PathQueryConfig) -> Self {
        let shortest = ShortestPathEngine::new(Arc::clone(&store), spec.name.clone());
        let k_shortest = KShortestPathsEngine::new(shortest.clone());
        let fallback = FallbackPathFinder::new(Arc::clone(&store))
            .with_schema(spec.schema.clone())
            .with_max_hops(config.max_hops);
        Self {
            schema: spec.schema.clone(),
            projections: ProjectionManager::new(Arc::clone(&store), spec),
            store,
            shortest,
            k_shortest,
            fallback,
            config,
        }
    }

    /// Query tuning in effect.
    pub fn config(&self) -> &PathQueryConfig {
        &self.config
    }

    /// The projection manager.
    pub fn projections(&self) -> &ProjectionManager {
        &self.projections
    }

    /// The backing store.
    pub fn store(&self) -> &Arc<dyn GraphStore> {
        &self.store
    }

    /// Up to `k` cheapest loopless paths. `k` is clamped to `1..=max_k`.
    ///
    /// # Errors
    ///
    /// Only [`railgraph_core::Error::Connectivity`].
    pub async fn top_paths(&self, source: &str, target: &str, k: usize) -> Result<PathQueryResult> {
        let k = self.config.clamp_k(k);
        if let Some(result) = self.settle_endpoints(source, target).await? {
            return Ok(result);
        }

        let paths = match self.specialized(source, target, k).await {
            EngineOutcome::Specialized(paths) => {
                log::debug!("{source} -> {target}: {} path(s) from projection", paths.len());
                paths
            }
            EngineOutcome::Unavailable(reason) => {
                log::warn!(
                    "Specialised search unavailable ({reason}); falling back to traversal of up to {} hops",
                    self.fallback.max_hops()
                );
                self.projections.forget().await;
                match self.fallback.find_paths(source, target, k).await {
                    Ok(paths) => paths,
                    Err(e) if e.is_connectivity() => return Err(e),
                    Err(e) => {
                        log::error!("Fallback traversal failed for {source} -> {target}: {e}");
                        PathSet::new()
                    }
                }
            }
        };

        Ok(PathQueryResult::from_paths(paths))
    }

    /// The single cheapest path, from the shortest-path engine only.
    ///
    /// When the engine cannot answer the result is `NoRoute`.
    ///
    /// # Errors
    ///
    /// Only [`railgraph_core::Error::Connectivity`].
    pub async fn minimal_path(&self, source: &str, target: &str) -> Result<PathQueryResult> {
        if let Some(result) = self.settle_endpoints(source, target).await? {
            return Ok(result);
        }

        match self.search(source, target, 1).await {
            Ok(paths) => Ok(PathQueryResult::from_paths(paths)),
            Err(e) if e.is_connectivity() => Err(e),
            Err(e) => {
                log::warn!("Shortest-path search unavailable for {source} -> {target}: {e}");
                self.projections.forget().await;
                Ok(PathQueryResult::from_paths(PathSet::new()))
            }
        }
    }

    /// Run only the specialised stage.
    ///
    /// Every failure, connectivity included, becomes
    /// [`EngineOutcome::Unavailable`].
    pub async fn specialized(&self, source: &str, target: &str, k: usize) -> EngineOutcome {
        match self.search(source, target, k).await {
            Ok(paths) => EngineOutcome::Specialized(paths),
            Err(e) => EngineOutcome::Unavailable(e.to_string()),
        }
    }

    /// Close the backing store. Later queries fail with a connectivity error.
    pub async fn close(&self) {
        self.store.close().await;
    }

    /// Ensure the projection, then run Dijkstra (`k <= 1`) or Yen's.
    async fn search(&self, source: &str, target: &str, k: usize) -> Result<PathSet> {
        let status = self.projections.ensure().await?;
        log::trace!("Projection '{}': {status:?}", self.projections.name());

        if k <= 1 {
            Ok(self
                .shortest
                .shortest_path(source, target)
                .await?
                .map(PathSet::single)
                .unwrap_or_default())
        } else {
            self.k_shortest.k_shortest_paths(source, target, k).await
        }
    }

    /// Answer queries decided by their endpoints alone: an unknown or
    /// non-routable id, or a source equal to the target.
    async fn settle_endpoints(&self, source: &str, target: &str) -> Result<Option<PathQueryResult>> {
        let Some(from) = self.resolve(source).await? else {
            log::debug!("Unknown source '{source}'");
            return Ok(Some(PathQueryResult::unknown_endpoint()));
        };
        let Some(to) = self.resolve(target).await? else {
            log::debug!("Unknown destination '{target}'");
            return Ok(Some(PathQueryResult::unknown_endpoint()));
        };

        if from.id == to.id {
            return Ok(Some(PathQueryResult::from_paths(PathSet::single(
                Path::trivial(from),
            ))));
        }
        Ok(None)
    }

    /// Look up an endpoint of the projected kind; only connectivity
    /// failures propagate.
    async fn resolve(&self, id: &str) -> Result<Option<OperationPoint>> {
        match self.store.point(id, &self.schema).await {
            Ok(point) => Ok(point),
            Err(e) if e.is_connectivity() => Err(e),
            Err(e) => {
                log::warn!("Lookup of '{id}' failed: {e}");
                Ok(None)
            }
        }
    }
}

impl std::fmt::Debug for PathQueryFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathQueryFacade")
            .field("projection", &self.projections.name())
            .field("config", &self.config)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
