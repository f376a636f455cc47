//! Railgraph Core: shared error type and configuration traits.
//!
//! This crate provides the foundational types used across all Railgraph
//! crates. It has no internal Railgraph dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`traits`]: Configuration abstraction shared by the library and CLI

pub mod error;
pub mod traits;

// Re-export key types at crate root for convenience
pub use error::{Error, Result};
pub use traits::ConfigProvider;
