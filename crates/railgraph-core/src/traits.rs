//! Core traits for Railgraph configuration.
//!
//! [`ConfigProvider`] abstracts where the command-line front end and the
//! bundled store find their data, so handlers can be exercised against a
//! throwaway configuration in tests.

use std::path::PathBuf;

use crate::Result;

/// Trait for application configuration.
///
/// # Bounds
///
/// - `Send + Sync`: Configuration must be shareable across threads
/// - `Clone`: Configuration can be duplicated for passing to subsystems
/// - `'static`: Configuration lifetime is not borrowed
///
/// # Example
///
/// ```
/// use std::path::PathBuf;
/// use railgraph_core::traits::ConfigProvider;
/// use railgraph_core::Result;
///
/// #[derive(Clone)]
/// struct NetworkConfig {
///     data_dir: PathBuf,
/// }
///
/// impl ConfigProvider for NetworkConfig {
///     fn project_name(&self) -> &str {
///         "rail-network"
///     }
///
///     fn base_path(&self) -> Result<PathBuf> {
///         Ok(self.data_dir.clone())
///     }
/// }
///
/// let config = NetworkConfig { data_dir: PathBuf::from("/srv/rail") };
/// assert_eq!(
///     config.snapshot_path().unwrap(),
///     PathBuf::from("/srv/rail/data/graph/snapshot.json")
/// );
/// ```
pub trait ConfigProvider: Send + Sync + Clone + 'static {
    /// The project name, used for display and default paths.
    fn project_name(&self) -> &str;

    /// Base path for all project data.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be determined.
    fn base_path(&self) -> Result<PathBuf>;

    /// Path of the graph snapshot the bundled store loads.
    ///
    /// Defaults to `<base_path>/data/graph/snapshot.json`.
    fn snapshot_path(&self) -> Result<PathBuf> {
        Ok(self.base_path()?.join("data").join("graph").join("snapshot.json"))
    }
}
