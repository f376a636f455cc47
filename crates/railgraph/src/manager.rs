//! Projection lifecycle.
//!
//! [`ProjectionManager::ensure`] makes sure the configured projection exists
//! before any specialised search runs. It is safe to call before every
//! query: after the first success it answers from a process-local flag
//! without touching the store.

use crate::projection::ProjectionSpec;
use crate::store::GraphStore;
use railgraph_core::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

/// What [`ProjectionManager::ensure`] found or did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionStatus {
    /// Already ensured by this manager; the store was not consulted.
    Cached,
    /// The store already had the projection.
    AlreadyExists,
    /// The projection was created by this call.
    Created,
}

/// Ensures a named projection exists, creating it at most once.
pub struct ProjectionManager {
    store: Arc<dyn GraphStore>,
    spec: ProjectionSpec,
    ensured: Mutex<bool>,
}

impl ProjectionManager {
    /// Create a manager for `spec` on `store`.
    pub fn new(store: Arc<dyn GraphStore>, spec: ProjectionSpec) -> Self {
        Self {
            store,
            spec,
            ensured: Mutex::new(false),
        }
    }

    /// The managed projection's name.
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// The managed projection's spec.
    pub fn spec(&self) -> &ProjectionSpec {
        &self.spec
    }

    /// Make sure the projection exists.
    ///
    /// Check-then-create is serialised within the process. A concurrent
    /// creator elsewhere winning the race is reported as
    /// [`ProjectionStatus::AlreadyExists`].
    ///
    /// # Errors
    ///
    /// Propagates store errors; callers treat anything but a connectivity
    /// failure as "specialised search unavailable".
    pub async fn ensure(&self) -> Result<ProjectionStatus> {
        let mut ensured = self.ensured.lock().await;
        if *ensured {
            return Ok(ProjectionStatus::Cached);
        }

        let status = if self.store.projection_exists(&self.spec.name).await? {
            log::debug!("Projection '{}' already exists", self.spec.name);
            ProjectionStatus::AlreadyExists
        } else {
            match self.store.create_projection(&self.spec).await {
                Ok(info) => {
                    log::debug!(
                        "Projection '{}' created with {} points",
                        info.name,
                        info.node_count
                    );
                    ProjectionStatus::Created
                }
                Err(e) if e.is_projection_exists() => {
                    log::debug!(
                        "Projection '{}' was created concurrently",
                        self.spec.name
                    );
                    ProjectionStatus::AlreadyExists
                }
                Err(e) => return Err(e),
            }
        };

        *ensured = true;
        Ok(status)
    }

    /// Whether a previous [`ensure`](Self::ensure) succeeded.
    pub async fn is_ensured(&self) -> bool {
        *self.ensured.lock().await
    }

    /// Forget the cached result so the next `ensure` re-checks the store.
    pub async fn forget(&self) {
        *self.ensured.lock().await = false;
    }

    /// Drop the projection from the store and forget it.
    ///
    /// Returns whether the store held the projection.
    pub async fn invalidate(&self) -> Result<bool> {
        let mut ensured = self.ensured.lock().await;
        let dropped = self.store.drop_projection(&self.spec.name).await?;
        *ensured = false;
        if dropped {
            log::info!("Projection '{}' dropped", self.spec.name);
        }
        Ok(dropped)
    }
}

// ============================================================================
// Tests
// ============================================================================
