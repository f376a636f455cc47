//! Configuration for the Railgraph CLI.
//!
//! Provides the [`RailgraphConfig`] struct that loads from TOML files,
//! environment variables, and defaults using the `confyg` crate.
//!
//! # Loading Priority
//!
//! 1. Explicit `--config <path>` flag
//! 2. `RAILGRAPH_CONFIG` environment variable
//! 3. XDG default: `~/.config/railgraph/config.toml`
//! 4. Built-in defaults

use confyg::{Confygery, env};
use railgraph::facade::{DEFAULT_K, DEFAULT_MAX_K, PathQueryConfig};
use railgraph::fallback::DEFAULT_MAX_HOPS;
use railgraph::projection::{
    DEFAULT_NODE_LABEL, DEFAULT_PROJECTION_NAME, DEFAULT_RELATIONSHIP_TYPE,
    DEFAULT_WEIGHT_PROPERTY, GraphSchema, ProjectionSpec,
};
use railgraph::store::{DEFAULT_ACQUIRE_TIMEOUT, DEFAULT_MAX_SESSIONS, PoolConfig};
use railgraph_core::traits::ConfigProvider;
use railgraph_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// Configuration structs
// ============================================================================

/// Main configuration for the Railgraph CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RailgraphConfig {
    /// Project name, used for env var prefixes and default paths.
    pub project_name: String,

    /// Base path for all project data.
    pub base_path: Option<String>,

    /// Backing store configuration.
    pub store: StoreConfig,

    /// Projection naming and schema.
    pub projection: ProjectionConfig,

    /// Query tuning.
    pub query: QueryConfig,
}

/// Backing store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path of the network snapshot.
    pub snapshot_path: Option<String>,

    /// Maximum concurrent store sessions.
    pub max_sessions: usize,

    /// Seconds to wait for a free session.
    pub acquire_timeout_secs: u64,

    /// Whether the specialised path algorithms are available.
    pub algorithms: bool,
}

/// Projection naming and schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Projection name.
    pub name: String,

    /// Node label of projected points.
    pub node_label: String,

    /// Relationship type of projected sections.
    pub relationship_type: String,

    /// Section property holding the distance.
    pub weight_property: String,
}

/// Query tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Paths returned by `route` when `--k` is omitted.
    pub default_k: usize,

    /// Upper bound on requested path counts.
    pub max_k: usize,

    /// Hop bound for the fallback traversal.
    pub max_hops: usize,
}

// ============================================================================
// Default implementations
// ============================================================================

impl Default for RailgraphConfig {
    fn default() -> Self {
        Self {
            project_name: "railgraph".to_string(),
            base_path: None,
            store: StoreConfig::default(),
            projection: ProjectionConfig::default(),
            query: QueryConfig::default(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            snapshot_path: None,
            max_sessions: DEFAULT_MAX_SESSIONS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT.as_secs(),
            algorithms: true,
        }
    }
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_PROJECTION_NAME.to_string(),
            node_label: DEFAULT_NODE_LABEL.to_string(),
            relationship_type: DEFAULT_RELATIONSHIP_TYPE.to_string(),
            weight_property: DEFAULT_WEIGHT_PROPERTY.to_string(),
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_k: DEFAULT_K,
            max_k: DEFAULT_MAX_K,
            max_hops: DEFAULT_MAX_HOPS,
        }
    }
}

// ============================================================================
// Config loading
// ============================================================================

impl RailgraphConfig {
    /// Load configuration from file, environment, and defaults.
    ///
    /// Loading priority:
    /// 1. Explicit `config_path` (from `--config` flag)
    /// 2. `RAILGRAPH_CONFIG` env var
    /// 3. XDG default: `~/.config/railgraph/config.toml`
    /// 4. Built-in defaults
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder =
            Confygery::new().map_err(|e| Error::config(format!("config init: {e}")))?;

        if let Some(path) = Self::resolve_config_path(config_path)
            && path.exists()
        {
            builder
                .add_file(&path.to_string_lossy())
                .map_err(|e| Error::config(format!("config file: {e}")))?;
        }

        let mut env_opts = env::Options::with_top_level("RAILGRAPH");
        env_opts.add_section("store");
        env_opts.add_section("projection");
        env_opts.add_section("query");
        builder
            .add_env(env_opts)
            .map_err(|e| Error::config(format!("config env: {e}")))?;

        let config: Self = builder
            .build()
            .map_err(|e| Error::config(format!("config build: {e}")))?;

        Ok(config)
    }

    /// Resolve the config file path from explicit flag, env var, or XDG default.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(PathBuf::from(path));
        }

        if let Ok(path) = std::env::var("RAILGRAPH_CONFIG") {
            return Some(PathBuf::from(path));
        }

        Self::default_config_path()
    }

    /// Return the XDG default config path.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("railgraph").join("config.toml"))
    }

    /// Serialize this config to a pretty-printed TOML string.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Flatten this config into environment variable pairs with `RAILGRAPH_` prefix.
    pub fn to_env_vars(&self) -> Result<Vec<(String, String)>> {
        let value: toml::Value =
            toml::Value::try_from(self).map_err(|e| Error::config(e.to_string()))?;
        let mut vars = Vec::new();
        flatten_toml_value(&value, "RAILGRAPH", &mut vars);
        Ok(vars)
    }

    /// Check settings the type system cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first offending key.
    pub fn validate(&self) -> Result<()> {
        if self.store.max_sessions == 0 {
            return Err(Error::config("store.max_sessions must be at least 1"));
        }
        if self.query.max_k == 0 {
            return Err(Error::config("query.max_k must be at least 1"));
        }
        if self.query.default_k == 0 || self.query.default_k > self.query.max_k {
            return Err(Error::config(format!(
                "query.default_k must be between 1 and query.max_k ({})",
                self.query.max_k
            )));
        }
        if self.query.max_hops == 0 {
            return Err(Error::config("query.max_hops must be at least 1"));
        }
        for (key, value) in [
            ("projection.name", &self.projection.name),
            ("projection.node_label", &self.projection.node_label),
            ("projection.relationship_type", &self.projection.relationship_type),
            ("projection.weight_property", &self.projection.weight_property),
        ] {
            if value.trim().is_empty() {
                return Err(Error::config(format!("{key} must not be empty")));
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Library settings
    // ------------------------------------------------------------------------

    /// Session pool settings for the store.
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig::default()
            .with_max_sessions(self.store.max_sessions)
            .with_acquire_timeout(Duration::from_secs(self.store.acquire_timeout_secs))
    }

    /// The projection to create and search.
    pub fn projection_spec(&self) -> ProjectionSpec {
        ProjectionSpec::new(self.projection.name.clone()).with_schema(GraphSchema {
            node_label: self.projection.node_label.clone(),
            relationship_type: self.projection.relationship_type.clone(),
            weight_property: self.projection.weight_property.clone(),
        })
    }

    /// Facade tuning.
    pub fn query_config(&self) -> PathQueryConfig {
        PathQueryConfig {
            default_k: self.query.default_k,
            max_k: self.query.max_k,
            max_hops: self.query.max_hops,
        }
    }
}

// ============================================================================
// ConfigProvider implementation
// ============================================================================

impl ConfigProvider for RailgraphConfig {
    fn project_name(&self) -> &str {
        &self.project_name
    }

    fn base_path(&self) -> Result<PathBuf> {
        match &self.base_path {
            Some(p) => Ok(PathBuf::from(p)),
            None => std::env::current_dir()
                .map_err(|e| Error::config(format!("Could not determine base path: {e}"))),
        }
    }

    fn snapshot_path(&self) -> Result<PathBuf> {
        match &self.store.snapshot_path {
            Some(p) => Ok(PathBuf::from(p)),
            None => Ok(self
                .base_path()?
                .join("data")
                .join("graph")
                .join("snapshot.json")),
        }
    }
}

// ============================================================================
// Helper: flatten TOML to env vars
// ============================================================================

/// Recursively flatten a TOML value into `KEY=value` pairs.
fn flatten_toml_value(value: &toml::Value, prefix: &str, out: &mut Vec<(String, String)>) {
    match value {
        toml::Value::Table(table) => {
            for (key, val) in table {
                let env_key = format!("{}_{}", prefix, key.to_uppercase());
                flatten_toml_value(val, &env_key, out);
            }
        }
        toml::Value::Array(arr) => {
            if let Ok(json) = serde_json::to_string(arr) {
                out.push((prefix.to_string(), json));
            }
        }
        toml::Value::String(s) => out.push((prefix.to_string(), s.clone())),
        toml::Value::Integer(i) => out.push((prefix.to_string(), i.to_string())),
        toml::Value::Float(f) => out.push((prefix.to_string(), f.to_string())),
        toml::Value::Boolean(b) => out.push((prefix.to_string(), b.to_string())),
        toml::Value::Datetime(dt) => out.push((prefix.to_string(), dt.to_string())),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    // ------------------------------------------------------------------------
    // Default tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_railgraph_config_default() {
        let config = RailgraphConfig::default();
        assert_eq!(config.project_name, "railgraph");
        assert!(config.base_path.is_none());
        assert!(config.store.snapshot_path.is_none());
        assert_eq!(config.store.max_sessions, 50);
        assert!(config.store.algorithms);
        assert_eq!(config.projection.name, "OperationPointGraph");
        assert_eq!(config.projection.weight_property, "sectionlength");
        assert_eq!(config.query.default_k, 3);
        assert_eq!(config.query.max_k, 10);
        assert_eq!(config.query.max_hops, 5);
    }

    // ------------------------------------------------------------------------
    // Serialization tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_railgraph_config_from_toml() {
        let toml_str = r#"
            project_name = "eu-rail"
            base_path = "/data"

            [store]
            snapshot_path = "/data/network.json"
            max_sessions = 8
            algorithms = false

            [projection]
            name = "Lines"
            weight_property = "km"

            [query]
            default_k = 5
            max_hops = 4
        "#;

        let config: RailgraphConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.project_name, "eu-rail");
        assert_eq!(config.store.snapshot_path.as_deref(), Some("/data/network.json"));
        assert_eq!(config.store.max_sessions, 8);
        assert_eq!(config.store.acquire_timeout_secs, 30);
        assert!(!config.store.algorithms);
        assert_eq!(config.projection.name, "Lines");
        assert_eq!(config.projection.node_label, "OperationPoint");
        assert_eq!(config.query.default_k, 5);
        assert_eq!(config.query.max_k, 10);
        assert_eq!(config.query.max_hops, 4);
    }

    #[test]
    fn test_railgraph_config_to_toml() {
        let config = RailgraphConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        assert!(toml_str.contains("project_name = \"railgraph\""));
        assert!(toml_str.contains("[query]"));
        assert!(toml_str.contains("max_hops = 5"));

        let parsed: RailgraphConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.project_name, config.project_name);
        assert_eq!(parsed.query.max_k, config.query.max_k);
    }

    // ------------------------------------------------------------------------
    // Loading tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_railgraph_config_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
                project_name = "loaded-network"
                [query]
                max_k = 4
            "#,
        )
        .unwrap();

        let config = RailgraphConfig::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.project_name, "loaded-network");
        assert_eq!(config.query.max_k, 4);
        assert_eq!(config.query.default_k, 3);
    }

    #[test]
    fn test_railgraph_config_load_defaults() {
        let config = RailgraphConfig::load(Some("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.project_name, "railgraph");
        assert_eq!(config.store.max_sessions, 50);
    }

    #[test]
    fn test_railgraph_config_resolve_config_path_explicit() {
        let path = RailgraphConfig::resolve_config_path(Some("/explicit/config.toml"));
        assert_eq!(path, Some(PathBuf::from("/explicit/config.toml")));
    }

    #[test]
    fn test_railgraph_config_default_config_path() {
        if let Some(p) = RailgraphConfig::default_config_path() {
            assert!(p.to_str().unwrap().contains("railgraph"));
            assert!(p.to_str().unwrap().ends_with("config.toml"));
        }
    }

    // ------------------------------------------------------------------------
    // Library settings
    // ------------------------------------------------------------------------

    #[test]
    fn test_railgraph_config_library_settings() {
        let mut config = RailgraphConfig::default();
        config.store.max_sessions = 4;
        config.store.acquire_timeout_secs = 2;
        config.projection.relationship_type = "TRACK".into();
        config.query.max_hops = 3;

        let pool = config.pool_config();
        assert_eq!(pool.max_sessions, 4);
        assert_eq!(pool.acquire_timeout, Duration::from_secs(2));

        let spec = config.projection_spec();
        assert_eq!(spec.name, "OperationPointGraph");
        assert_eq!(spec.schema.relationship_type, "TRACK");

        let query = config.query_config();
        assert_eq!(query.max_hops, 3);
        assert_eq!(query.default_k, 3);
    }

    // ------------------------------------------------------------------------
    // ConfigProvider tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_railgraph_config_provider_base_path() {
        let config = RailgraphConfig {
            base_path: Some("/my/data".into()),
            ..Default::default()
        };
        assert_eq!(config.project_name(), "railgraph");
        assert_eq!(config.base_path().unwrap(), PathBuf::from("/my/data"));
    }

    #[test]
    fn test_railgraph_config_provider_base_path_default() {
        let config = RailgraphConfig::default();
        assert_eq!(config.base_path().unwrap(), std::env::current_dir().unwrap());
    }

    #[test]
    fn test_railgraph_config_provider_snapshot_path() {
        let mut config = RailgraphConfig {
            base_path: Some("/project".into()),
            ..Default::default()
        };
        assert_eq!(
            config.snapshot_path().unwrap(),
            PathBuf::from("/project/data/graph/snapshot.json")
        );

        config.store.snapshot_path = Some("/elsewhere/net.json".into());
        assert_eq!(
            config.snapshot_path().unwrap(),
            PathBuf::from("/elsewhere/net.json")
        );
    }

    // ------------------------------------------------------------------------
    // to_env_vars tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_railgraph_config_to_env_vars() {
        let config = RailgraphConfig::default();
        let vars = config.to_env_vars().unwrap();
        let map: HashMap<_, _> = vars.into_iter().collect();
        assert_eq!(map.get("RAILGRAPH_PROJECT_NAME").unwrap(), "railgraph");
        assert_eq!(map.get("RAILGRAPH_STORE_MAX_SESSIONS").unwrap(), "50");
        assert_eq!(map.get("RAILGRAPH_STORE_ALGORITHMS").unwrap(), "true");
        assert_eq!(
            map.get("RAILGRAPH_PROJECTION_NAME").unwrap(),
            "OperationPointGraph"
        );
        assert_eq!(map.get("RAILGRAPH_QUERY_MAX_HOPS").unwrap(), "5");
        assert!(!map.contains_key("RAILGRAPH_BASE_PATH"));
    }

    #[test]
    fn test_railgraph_config_validate() {
        assert!(RailgraphConfig::default().validate().is_ok());

        let mut config = RailgraphConfig::default();
        config.query.default_k = 11;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("query.default_k"));

        let mut config = RailgraphConfig::default();
        config.query.max_hops = 0;
        assert!(config.validate().is_err());

        let mut config = RailgraphConfig::default();
        config.projection.weight_property = " ".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("projection.weight_property"));
    }

    #[test]
    fn test_railgraph_config_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RailgraphConfig>();
    }
}
