//! Backing graph store abstraction.
//!
//! [`GraphStore`] is the seam between path queries and wherever the network
//! lives. It offers three kinds of access:
//!
//! - point lookup and catalogue listing,
//! - weighted adjacency for on-the-fly traversal,
//! - projection management and a masked shortest-path primitive that only
//!   works once a projection exists.
//!
//! Implementations lease a session from a bounded pool for every call.

mod memory;
mod pool;

pub use memory::MemoryGraphStore;
pub use pool::{
    DEFAULT_ACQUIRE_TIMEOUT, DEFAULT_MAX_SESSIONS, PoolConfig, SessionLease, SessionPool,
};

use crate::algo::ShortestPathRequest;
use crate::projection::{GraphSchema, ProjectionInfo, ProjectionSpec};
use crate::types::{OperationPoint, Path};
use async_trait::async_trait;
use railgraph_core::Result;
use serde::{Deserialize, Serialize};

/// A section seen from one of its endpoints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// The endpoint the section was looked up from.
    pub from: String,
    /// The opposite endpoint.
    pub to: String,
    /// Section length in kilometres.
    pub distance: f64,
}

/// Access to the backing rail network.
///
/// All methods fail with [`railgraph_core::Error::Connectivity`] once the
/// store is closed or when no session can be leased.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Look up a point by id. Points whose kind is not `schema.node_label`
    /// are reported as absent.
    async fn point(&self, id: &str, schema: &GraphSchema) -> Result<Option<OperationPoint>>;

    /// All points of kind `schema.node_label`, ordered by label then id.
    async fn points(&self, schema: &GraphSchema) -> Result<Vec<OperationPoint>>;

    /// Distinct country names of the points [`points`](Self::points) lists,
    /// sorted.
    async fn countries(&self, schema: &GraphSchema) -> Result<Vec<String>>;

    /// Weighted sections incident to `id`, as selected by `schema`.
    ///
    /// Both endpoints must be points of kind `schema.node_label`, so the
    /// adjacency matches what a projection with the same schema contains.
    /// Parallel sections are returned individually.
    async fn sections(&self, id: &str, schema: &GraphSchema) -> Result<Vec<Section>>;

    /// Whether a projection named `name` exists.
    async fn projection_exists(&self, name: &str) -> Result<bool>;

    /// Size of the projection named `name`, if it exists.
    async fn projection_info(&self, name: &str) -> Result<Option<ProjectionInfo>>;

    /// Create a projection.
    ///
    /// # Errors
    ///
    /// [`railgraph_core::Error::ProjectionExists`] if the name is taken,
    /// [`railgraph_core::Error::Capability`] if projections are unsupported.
    async fn create_projection(&self, spec: &ProjectionSpec) -> Result<ProjectionInfo>;

    /// Drop a projection. Returns whether one was removed.
    async fn drop_projection(&self, name: &str) -> Result<bool>;

    /// Minimal-distance path on a projection, honouring the request's
    /// exclusions. `Ok(None)` means no route.
    ///
    /// # Errors
    ///
    /// [`railgraph_core::Error::Capability`] if the algorithm is unsupported,
    /// [`railgraph_core::Error::Projection`] if the projection is missing.
    async fn shortest_path(
        &self,
        projection: &str,
        request: &ShortestPathRequest,
    ) -> Result<Option<Path>>;

    /// Refuse further calls. Idempotent.
    async fn close(&self);

    /// Whether [`close`](Self::close) has been called.
    fn is_closed(&self) -> bool;
}
