//! Railgraph: shortest and k-shortest route queries over a rail network.
//!
//! Operation points are nodes; track sections are undirected, weighted
//! edges. Queries go through [`PathQueryFacade`], which prefers the store's
//! specialised path primitives on a named projection and falls back to a
//! bounded-depth enumeration when those are unavailable.
//!
//! # Modules
//!
//! - [`types`]: Points, paths, ranked path sets and output records
//! - [`persistence`]: JSON network snapshots
//! - [`projection`]: In-memory weighted graph built from a snapshot
//! - [`algo`]: Dijkstra over a masked projection
//! - [`store`]: Backing store trait, session pool and in-memory store
//! - [`manager`]: Idempotent projection creation
//! - [`shortest`]: Single-pair shortest path engine
//! - [`yen`]: K loopless shortest paths
//! - [`fallback`]: Hop-bounded simple path enumeration
//! - [`facade`]: Query entry point with fallback and status reporting
//! - [`catalog`]: Point and country listings
//! - [`validation`]: Snapshot integrity checks
//! - [`stats`]: Network statistics
//!
//! # Features
//!
//! - `test-utils`: Exposes [`testing`] fixtures to dependent crates

pub mod algo;
pub mod catalog;
pub mod facade;
pub mod fallback;
pub mod manager;
pub mod persistence;
pub mod projection;
pub mod shortest;
pub mod stats;
pub mod store;
pub mod types;
pub mod validation;
pub mod yen;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export key types at crate root for convenience
pub use catalog::PointCatalog;
pub use facade::{
    EngineOutcome, PathQueryConfig, PathQueryFacade, PathQueryResult, PathQueryStatus,
};
pub use fallback::FallbackPathFinder;
pub use manager::{ProjectionManager, ProjectionStatus};
pub use persistence::{
    GraphSnapshot, PointRecord, SectionRecord, SnapshotMetadata, load_snapshot,
    load_snapshot_from_str, save_snapshot,
};
pub use projection::{GraphSchema, Projection, ProjectionInfo, ProjectionSpec};
pub use shortest::ShortestPathEngine;
pub use stats::{GraphStats, compute_stats};
pub use store::{GraphStore, MemoryGraphStore, PoolConfig, Section, SessionPool};
pub use types::{OperationPoint, Path, PathEdge, PathRecord, PathSet};
pub use validation::{ValidationIssue, ValidationResult, validate_snapshot};
pub use yen::KShortestPathsEngine;

pub use railgraph_core::{Error, Result};
