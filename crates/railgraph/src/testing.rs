//! Test fixtures: scenario networks and an instrumented store.
//!
//! Available to this crate's tests and, via the `test-utils` feature, to
//! dependent crates.

use crate::algo::ShortestPathRequest;
use crate::persistence::{GraphSnapshot, PointRecord, SectionRecord};
use crate::projection::{GraphSchema, ProjectionInfo, ProjectionSpec};
use crate::store::{GraphStore, MemoryGraphStore, Section};
use crate::types::{OperationPoint, Path};
use async_trait::async_trait;
use railgraph_core::{Error, Result};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};

// ============================================================================
// Scenario networks
// ============================================================================

/// Build a snapshot from `(from, to, distance)` triples.
///
/// Points are created for every endpoint, in order of first appearance.
pub fn snapshot_from_sections(sections: &[(&str, &str, f64)]) -> GraphSnapshot {
    let mut seen = BTreeSet::new();
    let mut snapshot = GraphSnapshot::new();
    for (from, to, _) in sections {
        for id in [from, to] {
            if seen.insert(*id) {
                snapshot = snapshot.with_point(PointRecord::new(*id));
            }
        }
    }
    for (from, to, distance) in sections {
        snapshot = snapshot.with_section(SectionRecord::new(*from, *to, *distance));
    }
    snapshot
}

/// A-B 10, B-C 5, C-D 8 and a direct A-D 30.
///
/// Exactly two simple routes join A and D.
pub fn diamond_snapshot() -> GraphSnapshot {
    snapshot_from_sections(&[("A", "B", 10.0), ("B", "C", 5.0), ("C", "D", 8.0), ("A", "D", 30.0)])
}

/// The diamond plus an unreachable E-F island.
pub fn disconnected_snapshot() -> GraphSnapshot {
    diamond_snapshot()
        .with_point(PointRecord::new("E"))
        .with_point(PointRecord::new("F"))
        .with_section(SectionRecord::new("E", "F", 2.0))
}

/// The diamond plus a `Yard` point `Y` with A-Y 1 and Y-D 1.
///
/// The yard is not an operation point, so routes through it and queries
/// ending at it must not be answered.
pub fn yard_snapshot() -> GraphSnapshot {
    diamond_snapshot()
        .with_point(PointRecord::new("Y").with_kind("Yard").with_country("Belgium"))
        .with_section(SectionRecord::new("A", "Y", 1.0))
        .with_section(SectionRecord::new("Y", "D", 1.0))
}

/// A six-hop chain `P0..P6` of unit sections plus a direct `P0-P6` of 100.
pub fn long_chain_snapshot() -> GraphSnapshot {
    let ids: Vec<String> = (0..=6).map(|i| format!("P{i}")).collect();
    let mut sections: Vec<(&str, &str, f64)> = ids
        .windows(2)
        .map(|w| (w[0].as_str(), w[1].as_str(), 1.0))
        .collect();
    sections.push((ids[0].as_str(), ids[6].as_str(), 100.0));
    snapshot_from_sections(&sections)
}

/// A small mesh with many alternative routes between `C` and `H`.
pub fn mesh_snapshot() -> GraphSnapshot {
    snapshot_from_sections(&[
        ("C", "D", 3.0),
        ("C", "E", 2.0),
        ("D", "F", 4.0),
        ("E", "D", 1.0),
        ("E", "F", 2.0),
        ("E", "G", 3.0),
        ("F", "G", 2.0),
        ("F", "H", 1.0),
        ("G", "H", 2.0),
    ])
}

// ============================================================================
// Instrumented store
// ============================================================================

/// Failure injected into a [`ScriptedStore`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fault {
    /// Fail with a connectivity error.
    Connectivity,
    /// Fail with a capability error.
    Capability,
    /// Fail with a data error, as if the store answered garbage.
    Malformed,
}

impl Fault {
    fn to_error(self, operation: &str) -> Error {
        match self {
            Fault::Connectivity => Error::connectivity(format!("{operation}: connection reset")),
            Fault::Capability => Error::capability(format!("{operation}: procedure not found")),
            Fault::Malformed => Error::invalid_data(format!("{operation}: unexpected response")),
        }
    }
}

/// Per-method call counts.
#[derive(Debug, Default)]
pub struct CallCounters {
    point: AtomicUsize,
    sections: AtomicUsize,
    projection_exists: AtomicUsize,
    create_projection: AtomicUsize,
    shortest_path: AtomicUsize,
    in_flight_shortest_path: AtomicUsize,
    peak_shortest_path: AtomicUsize,
}

impl CallCounters {
    /// Calls to `point`.
    pub fn point(&self) -> usize {
        self.point.load(Ordering::SeqCst)
    }

    /// Calls to `sections`.
    pub fn sections(&self) -> usize {
        self.sections.load(Ordering::SeqCst)
    }

    /// Calls to `projection_exists`.
    pub fn projection_exists(&self) -> usize {
        self.projection_exists.load(Ordering::SeqCst)
    }

    /// Calls to `create_projection`.
    pub fn create_projection(&self) -> usize {
        self.create_projection.load(Ordering::SeqCst)
    }

    /// Calls to `shortest_path`.
    pub fn shortest_path(&self) -> usize {
        self.shortest_path.load(Ordering::SeqCst)
    }

    /// Most `shortest_path` calls observed running at once.
    pub fn peak_shortest_path(&self) -> usize {
        self.peak_shortest_path.load(Ordering::SeqCst)
    }
}

/// A [`MemoryGraphStore`] wrapper that counts calls and injects faults.
pub struct ScriptedStore {
    inner: MemoryGraphStore,
    counters: CallCounters,
    hide_projections: bool,
    shortest_path_fault: Option<Fault>,
    sections_fault: Option<Fault>,
}

impl ScriptedStore {
    /// Wrap a fresh memory store over `snapshot`.
    pub fn new(snapshot: GraphSnapshot) -> Self {
        Self::wrap(MemoryGraphStore::new(snapshot))
    }

    /// Wrap an existing memory store.
    pub fn wrap(inner: MemoryGraphStore) -> Self {
        Self {
            inner,
            counters: CallCounters::default(),
            hide_projections: false,
            shortest_path_fault: None,
            sections_fault: None,
        }
    }

    /// Report every projection as missing, as a racing creator would.
    pub fn hiding_projections(mut self) -> Self {
        self.hide_projections = true;
        self
    }

    /// Make `shortest_path` fail.
    pub fn failing_shortest_path(mut self, fault: Fault) -> Self {
        self.shortest_path_fault = Some(fault);
        self
    }

    /// Make `sections` fail.
    pub fn failing_sections(mut self, fault: Fault) -> Self {
        self.sections_fault = Some(fault);
        self
    }

    /// The wrapped store.
    pub fn inner(&self) -> &MemoryGraphStore {
        &self.inner
    }

    /// Call counts so far.
    pub fn counters(&self) -> &CallCounters {
        &self.counters
    }
}

#[async_trait]
impl GraphStore for ScriptedStore {
    async fn point(&self, id: &str, schema: &GraphSchema) -> Result<Option<OperationPoint>> {
        self.counters.point.fetch_add(1, Ordering::SeqCst);
        self.inner.point(id, schema).await
    }

    async fn points(&self, schema: &GraphSchema) -> Result<Vec<OperationPoint>> {
        self.inner.points(schema).await
    }

    async fn countries(&self, schema: &GraphSchema) -> Result<Vec<String>> {
        self.inner.countries(schema).await
    }

    async fn sections(&self, id: &str, schema: &GraphSchema) -> Result<Vec<Section>> {
        self.counters.sections.fetch_add(1, Ordering::SeqCst);
        if let Some(fault) = self.sections_fault {
            return Err(fault.to_error("sections"));
        }
        self.inner.sections(id, schema).await
    }

    async fn projection_exists(&self, name: &str) -> Result<bool> {
        self.counters.projection_exists.fetch_add(1, Ordering::SeqCst);
        if self.hide_projections {
            return Ok(false);
        }
        self.inner.projection_exists(name).await
    }

    async fn projection_info(&self, name: &str) -> Result<Option<ProjectionInfo>> {
        if self.hide_projections {
            return Ok(None);
        }
        self.inner.projection_info(name).await
    }

    async fn create_projection(&self, spec: &ProjectionSpec) -> Result<ProjectionInfo> {
        self.counters.create_projection.fetch_add(1, Ordering::SeqCst);
        self.inner.create_projection(spec).await
    }

    async fn drop_projection(&self, name: &str) -> Result<bool> {
        self.inner.drop_projection(name).await
    }

    async fn shortest_path(
        &self,
        projection: &str,
        request: &ShortestPathRequest,
    ) -> Result<Option<Path>> {
        self.counters.shortest_path.fetch_add(1, Ordering::SeqCst);
        if let Some(fault) = self.shortest_path_fault {
            return Err(fault.to_error("shortest_path"));
        }

        let now = self.counters.in_flight_shortest_path.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters
            .peak_shortest_path
            .fetch_max(now, Ordering::SeqCst);
        let result = self.inner.shortest_path(projection, request).await;
        self.counters
            .in_flight_shortest_path
            .fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn close(&self) {
        self.inner.close().await;
    }

    fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

/// Assert the structural guarantees every returned path must meet.
#[allow(clippy::panic)]
pub fn assert_well_formed(path: &Path) {
    assert!(path.is_loopless(), "path revisits a point: {:?}", path.node_ids());
    assert_eq!(path.edges.len() + 1, path.cities.len());
    for (edge, pair) in path.edges.iter().zip(path.cities.windows(2)) {
        assert_eq!(edge.source, pair[0].id);
        assert_eq!(edge.target, pair[1].id);
    }
    let sum: f64 = path.edges.iter().map(|e| e.distance).sum();
    assert!(
        (sum - path.total_distance).abs() < 1e-9,
        "total {} != sum {}",
        path.total_distance,
        sum
    );
}
