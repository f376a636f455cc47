//! K loopless shortest paths (Yen's algorithm).
//!
//! Each round derives spur searches from the most recently accepted path.
//! A spur search runs on a masked view of the projection: the root prefix
//! (minus the spur point) is hidden, and so is every link that an accepted
//! path sharing that prefix takes out of the spur point. The masks travel
//! with the request, so the projection itself is never touched.
//!
//! Spur searches of one round run concurrently. Their results are merged
//! into the candidate pool in spur order by this task alone, which keeps the
//! output independent of completion order.

use crate::algo::ShortestPathRequest;
use crate::shortest::ShortestPathEngine;
use crate::types::{Path, PathSet};
use futures::future::join_all;
use railgraph_core::Result;

/// Yen's k-shortest-paths on top of [`ShortestPathEngine`].
#[derive(Clone)]
pub struct KShortestPathsEngine {
    shortest: ShortestPathEngine,
}

impl KShortestPathsEngine {
    /// Create an engine driving `shortest`.
    pub fn new(shortest: ShortestPathEngine) -> Self {
        Self { shortest }
    }

    /// The underlying single-pair engine.
    pub fn shortest(&self) -> &ShortestPathEngine {
        &self.shortest
    }

    /// Up to `k` loopless paths from `source` to `target`, cheapest first.
    ///
    /// Fewer than `k` paths are returned when the network has fewer distinct
    /// simple routes. `k == 0` yields an empty set.
    pub async fn k_shortest_paths(&self, source: &str, target: &str, k: usize) -> Result<PathSet> {
        if k == 0 {
            return Ok(PathSet::new());
        }
        let Some(first) = self.shortest.shortest_path(source, target).await? else {
            return Ok(PathSet::new());
        };

        let mut accepted = vec![first];
        let mut pool = CandidatePool::default();

        while accepted.len() < k {
            let spurs = match accepted.last() {
                Some(previous) => spur_searches(&accepted, previous, target),
                None => break,
            };
            log::trace!(
                "Yen round {}: {} spur search(es)",
                accepted.len(),
                spurs.len()
            );

            let results = join_all(spurs.iter().map(|spur| self.shortest.search(&spur.request))).await;

            for (spur, result) in spurs.into_iter().zip(results) {
                let Some(tail) = result? else {
                    continue;
                };
                let Some(candidate) = spur.root.concat(&tail) else {
                    continue;
                };
                if accepted.iter().any(|p| p.same_route(&candidate)) {
                    continue;
                }
                pool.offer(candidate);
            }

            match pool.take_cheapest() {
                Some(next) => accepted.push(next),
                None => break,
            }
        }

        log::debug!(
            "k-shortest {source} -> {target}: {} of {k} path(s)",
            accepted.len()
        );
        Ok(PathSet::ranked(accepted))
    }
}

/// One spur search: the shared root and the masked request from its end.
struct SpurSearch {
    root: Path,
    request: ShortestPathRequest,
}

fn spur_searches(accepted: &[Path], previous: &Path, target: &str) -> Vec<SpurSearch> {
    let spur_count = previous.cities.len().saturating_sub(1);
    let mut spurs = Vec::with_capacity(spur_count);

    for i in 0..spur_count {
        let root = previous.prefix(i + 1);
        let spur_id = &previous.cities[i].id;
        let mut request = ShortestPathRequest::new(spur_id.as_str(), target);

        for path in accepted {
            if path.cities.len() > i + 1 && path.prefix(i + 1).same_route(&root) {
                request = request.excluding_link(path.cities[i].id.as_str(), path.cities[i + 1].id.as_str());
            }
        }
        for point in &root.cities[..i] {
            request = request.excluding_node(point.id.as_str());
        }

        spurs.push(SpurSearch { root, request });
    }
    spurs
}

/// Candidates awaiting acceptance, in insertion order.
#[derive(Default)]
struct CandidatePool {
    candidates: Vec<Path>,
}

impl CandidatePool {
    /// Add a candidate unless an equal route is already pooled.
    fn offer(&mut self, candidate: Path) {
        if !self.candidates.iter().any(|c| c.same_route(&candidate)) {
            self.candidates.push(candidate);
        }
    }

    /// Remove the cheapest candidate; the earliest inserted wins ties.
    fn take_cheapest(&mut self) -> Option<Path> {
        let mut best: Option<usize> = None;
        for (i, candidate) in self.candidates.iter().enumerate() {
            match best {
                Some(b) if self.candidates[b].total_distance <= candidate.total_distance => {}
                _ => best = Some(i),
            }
        }
        best.map(|i| self.candidates.remove(i))
    }
}

// ============================================================================
// Tests
// ============================================================================
