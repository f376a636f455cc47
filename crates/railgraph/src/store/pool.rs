//! Bounded session pool.
//!
//! Every store call leases a [`SessionLease`] for its duration. The lease
//! returns its slot when dropped, so sessions are released on every exit
//! path including errors and early returns.

use railgraph_core::{Error, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Default number of concurrent sessions.
pub const DEFAULT_MAX_SESSIONS: usize = 50;

/// Default time to wait for a free session.
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// Pool sizing and wait policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    /// Maximum concurrent sessions.
    pub max_sessions: usize,
    /// How long `acquire` waits before failing.
    pub acquire_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_sessions: DEFAULT_MAX_SESSIONS,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
        }
    }
}

impl PoolConfig {
    /// Set the maximum number of sessions.
    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions;
        self
    }

    /// Set the acquire timeout.
    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }
}

/// Fixed-size pool of store sessions.
#[derive(Debug)]
pub struct SessionPool {
    semaphore: Arc<Semaphore>,
    config: PoolConfig,
    closed: AtomicBool,
    next_id: AtomicU64,
}

impl SessionPool {
    /// Create a pool. A size of zero is raised to one.
    pub fn new(config: PoolConfig) -> Self {
        let config = PoolConfig {
            max_sessions: config.max_sessions.max(1),
            ..config
        };
        Self {
            semaphore: Arc::new(Semaphore::new(config.max_sessions)),
            config,
            closed: AtomicBool::new(false),
            next_id: AtomicU64::new(1),
        }
    }

    /// Lease a session, waiting up to the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connectivity`] when the pool is closed or no session
    /// frees up in time.
    pub async fn acquire(&self) -> Result<SessionLease> {
        if self.is_closed() {
            return Err(Error::connectivity("store is closed"));
        }

        let wait = self.semaphore.clone().acquire_owned();
        let permit = match tokio::time::timeout(self.config.acquire_timeout, wait).await {
            Ok(Ok(permit)) => permit,
            Ok(Err(_)) => return Err(Error::connectivity("store is closed")),
            Err(_) => {
                return Err(Error::connectivity(format!(
                    "no session available within {:?} ({} in use)",
                    self.config.acquire_timeout,
                    self.in_use()
                )));
            }
        };

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        log::trace!("session {id} leased");
        Ok(SessionLease {
            id,
            _permit: permit,
        })
    }

    /// Refuse new leases and wake pending waiters with an error.
    ///
    /// Leases already handed out stay valid until dropped.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.semaphore.close();
            log::debug!("session pool closed");
        }
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Pool capacity.
    pub fn max_sessions(&self) -> usize {
        self.config.max_sessions
    }

    /// Sessions currently leased.
    pub fn in_use(&self) -> usize {
        self.config
            .max_sessions
            .saturating_sub(self.semaphore.available_permits())
    }
}

/// A leased session. Dropping it returns the slot to the pool.
#[derive(Debug)]
pub struct SessionLease {
    id: u64,
    _permit: OwnedSemaphorePermit,
}

impl SessionLease {
    /// Identifier of this lease, unique per pool.
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for SessionLease {
    fn drop(&mut self) {
        log::trace!("session {} released", self.id);
    }
}

// ============================================================================
// Tests
// ============================================================================
