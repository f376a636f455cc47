//! Error types for Railgraph operations.
//!
//! This module provides a common `Error` type and `Result<T>` alias used across
//! all Railgraph crates. Uses `thiserror` for derive macros.
//!
//! Errors fall into four groups that callers treat differently:
//!
//! - **Connectivity**: the backing store cannot be reached or no session could
//!   be leased. The only kind that escapes a path query; retryable.
//! - **Capability**: a specialised algorithm or projection is unavailable.
//!   Path queries recover from these by switching to traversal.
//! - **NotFound**: an identifier does not resolve.
//! - Everything else: configuration, I/O and data problems.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur in Railgraph operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error with the path that caused it.
    #[error("I/O error at {path}: {source}")]
    IoWithPath {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// A file that was expected to exist does not.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Entity not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid data or format.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Parse error.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Backing store unreachable, closed, or out of sessions.
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    /// A specialised store capability is missing or failed.
    #[error("Capability unavailable: {0}")]
    Capability(String),

    /// Projection could not be created or resolved.
    #[error("Projection error: {0}")]
    Projection(String),

    /// A projection with this name already exists.
    #[error("Projection already exists: {0}")]
    ProjectionExists(String),

    /// Generic operation failure.
    #[error("Operation failed: {0}")]
    Operation(String),
}

impl Error {
    /// Create an I/O error annotated with a path.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Self::IoWithPath {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a file-not-found error.
    pub fn file_not_found(path: impl AsRef<Path>) -> Self {
        Self::FileNotFound(path.as_ref().to_path_buf())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a not found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an invalid data error.
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        Self::InvalidData(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Create a connectivity error.
    pub fn connectivity(msg: impl Into<String>) -> Self {
        Self::Connectivity(msg.into())
    }

    /// Create a capability error.
    pub fn capability(msg: impl Into<String>) -> Self {
        Self::Capability(msg.into())
    }

    /// Create a projection error.
    pub fn projection(msg: impl Into<String>) -> Self {
        Self::Projection(msg.into())
    }

    /// Create a projection-exists error.
    pub fn projection_exists(name: impl Into<String>) -> Self {
        Self::ProjectionExists(name.into())
    }

    /// Create an operation error.
    pub fn operation(msg: impl Into<String>) -> Self {
        Self::Operation(msg.into())
    }

    // ------------------------------------------------------------------------
    // Inspectors
    // ------------------------------------------------------------------------

    /// Whether retrying the same call later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connectivity(_))
    }

    /// Whether this is a connectivity failure.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connectivity(_))
    }

    /// Whether this reports a missing entity or file.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::FileNotFound(_))
    }

    /// Whether this reports a duplicate projection.
    pub fn is_projection_exists(&self) -> bool {
        matches!(self, Self::ProjectionExists(_))
    }
}

/// Result type alias using Railgraph's Error type.
pub type Result<T> = std::result::Result<T, Error>;
