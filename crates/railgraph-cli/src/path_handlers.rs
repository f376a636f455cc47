//! Handler functions for route queries and point listings.
//!
//! These functions implement `route`, `shortest`, `points` and `countries`
//! on top of a [`QueryContext`] opened from the configured snapshot.

use crate::cli::OutputFormat;
use crate::config::RailgraphConfig;
use crate::graph_handlers::load_snapshot_or_error;
use crate::output::{render_countries, render_points, render_routes};
use railgraph::catalog::PointCatalog;
use railgraph::facade::{PathQueryFacade, PathQueryStatus};
use railgraph::store::{GraphStore, MemoryGraphStore};
use railgraph_core::Result;
use railgraph_core::traits::ConfigProvider;
use std::sync::Arc;

// ============================================================================
// Query context
// ============================================================================

/// Store, facade and catalogue for one CLI invocation.
pub struct QueryContext {
    store: Arc<MemoryGraphStore>,
    facade: PathQueryFacade,
    catalog: PointCatalog,
    default_k: usize,
}

impl QueryContext {
    /// Load the configured snapshot into an in-memory store.
    pub fn open(config: &RailgraphConfig) -> Result<Self> {
        let path = config.snapshot_path()?;
        log::debug!("Loading snapshot from {}", path.display());
        let snapshot = load_snapshot_or_error(&path)?;
        Ok(Self::new(MemoryGraphStore::new(snapshot), config))
    }

    /// Build a context over `store`, applying the store settings from `config`.
    pub fn new(store: MemoryGraphStore, config: &RailgraphConfig) -> Self {
        let store = Arc::new(
            store
                .with_pool_config(config.pool_config())
                .with_algorithms(config.store.algorithms),
        );
        let dyn_store: Arc<dyn GraphStore> = store.clone();
        let spec = config.projection_spec();
        Self {
            catalog: PointCatalog::new(Arc::clone(&dyn_store)).with_schema(spec.schema.clone()),
            facade: PathQueryFacade::new(dyn_store, spec, config.query_config()),
            default_k: config.query.default_k,
            store,
        }
    }

    /// The backing store.
    pub fn store(&self) -> &Arc<MemoryGraphStore> {
        &self.store
    }

    /// The backing store as a trait object.
    pub fn dyn_store(&self) -> Arc<dyn GraphStore> {
        self.store.clone()
    }

    /// The query facade.
    pub fn facade(&self) -> &PathQueryFacade {
        &self.facade
    }

    /// The point catalogue.
    pub fn catalog(&self) -> &PointCatalog {
        &self.catalog
    }

    /// Release the store.
    pub async fn close(&self) {
        self.facade.close().await;
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Print up to `k` cheapest routes (default `query.default_k`).
pub async fn handle_route(
    ctx: &QueryContext,
    from: &str,
    to: &str,
    k: Option<usize>,
    format: OutputFormat,
) -> Result<PathQueryStatus> {
    let k = k.unwrap_or(ctx.default_k);
    let result = ctx.facade.top_paths(from, to, k).await?;
    print!("{}", render_routes(&result, from, to, format)?);
    Ok(result.status)
}

/// Print the single shortest route.
pub async fn handle_shortest(
    ctx: &QueryContext,
    from: &str,
    to: &str,
    format: OutputFormat,
) -> Result<PathQueryStatus> {
    let result = ctx.facade.minimal_path(from, to).await?;
    print!("{}", render_routes(&result, from, to, format)?);
    Ok(result.status)
}

/// Print points, optionally restricted to a country or to mappable points.
///
/// Returns the number of points printed.
pub async fn handle_points(
    ctx: &QueryContext,
    country: Option<&str>,
    mappable: bool,
    format: OutputFormat,
) -> Result<usize> {
    let points = if mappable {
        ctx.catalog.mappable_points(country).await?
    } else {
        ctx.catalog.points(country).await?
    };
    print!("{}", render_points(&points, format)?);
    Ok(points.len())
}

/// Print the distinct countries. Returns how many were printed.
pub async fn handle_countries(ctx: &QueryContext, format: OutputFormat) -> Result<usize> {
    let countries = ctx.catalog.countries().await?;
    print!("{}", render_countries(&countries, format)?);
    Ok(countries.len())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::graph_handlers::tests::setup_snapshot;
    use railgraph::persistence::{GraphSnapshot, PointRecord, SectionRecord};
    use railgraph::testing::{diamond_snapshot, disconnected_snapshot};
    use tempfile::tempdir;

    fn context(snapshot: GraphSnapshot) -> QueryContext {
        QueryContext::new(MemoryGraphStore::new(snapshot), &RailgraphConfig::default())
    }

    #[tokio::test]
    async fn test_open_from_config() {
        let dir = tempdir().unwrap();
        setup_snapshot(dir.path(), &diamond_snapshot());
        let config = RailgraphConfig {
            base_path: Some(dir.path().to_string_lossy().into_owned()),
            ..Default::default()
        };

        let ctx = QueryContext::open(&config).unwrap();
        assert_eq!(ctx.store().snapshot().points.len(), 4);
        assert_eq!(ctx.facade().config().default_k, 3);
    }

    #[tokio::test]
    async fn test_open_missing_snapshot() {
        let dir = tempdir().unwrap();
        let config = RailgraphConfig {
            base_path: Some(dir.path().to_string_lossy().into_owned()),
            ..Default::default()
        };
        let err = QueryContext::open(&config).err().unwrap();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_store_settings_applied() {
        let mut config = RailgraphConfig::default();
        config.store.max_sessions = 3;
        config.store.algorithms = false;
        let ctx = QueryContext::new(MemoryGraphStore::new(diamond_snapshot()), &config);
        assert_eq!(ctx.store().pool().max_sessions(), 3);

        // Without algorithms the traversal still answers.
        let status = handle_route(&ctx, "A", "D", Some(2), OutputFormat::Csv)
            .await
            .unwrap();
        assert_eq!(status, PathQueryStatus::Found);
    }

    #[tokio::test]
    async fn test_handle_route_statuses() {
        let ctx = context(disconnected_snapshot());
        for format in [OutputFormat::Table, OutputFormat::Json, OutputFormat::Csv] {
            assert_eq!(
                handle_route(&ctx, "A", "D", None, format).await.unwrap(),
                PathQueryStatus::Found
            );
        }
        assert_eq!(
            handle_route(&ctx, "A", "F", None, OutputFormat::Table)
                .await
                .unwrap(),
            PathQueryStatus::NoRoute
        );
        assert_eq!(
            handle_route(&ctx, "A", "Atlantis", None, OutputFormat::Table)
                .await
                .unwrap(),
            PathQueryStatus::UnknownEndpoint
        );
    }

    #[tokio::test]
    async fn test_handle_shortest() {
        let ctx = context(diamond_snapshot());
        let status = handle_shortest(&ctx, "A", "D", OutputFormat::Table)
            .await
            .unwrap();
        assert_eq!(status, PathQueryStatus::Found);
        assert!(ctx.facade().projections().is_ensured().await);
    }

    #[tokio::test]
    async fn test_handle_closed_store_is_error() {
        let ctx = context(diamond_snapshot());
        ctx.close().await;
        let err = handle_shortest(&ctx, "A", "D", OutputFormat::Table)
            .await
            .unwrap_err();
        assert!(err.is_connectivity());
    }

    #[tokio::test]
    async fn test_handle_points_and_countries() {
        let snapshot = GraphSnapshot::new()
            .with_point(
                PointRecord::new("BE1")
                    .with_name("Gent")
                    .with_country("Belgium")
                    .with_coordinates(51.05, 3.72),
            )
            .with_point(PointRecord::new("BE2").with_name("Aalst").with_country("Belgium"))
            .with_point(PointRecord::new("NL1").with_name("Breda").with_country("Netherlands"))
            .with_point(
                PointRecord::new("DE7")
                    .with_name("Aachen West Yard")
                    .with_kind("Yard")
                    .with_country("Germany"),
            )
            .with_section(SectionRecord::new("BE1", "BE2", 30.0))
            .with_section(SectionRecord::new("BE2", "DE7", 80.0));
        let ctx = context(snapshot);

        assert_eq!(
            handle_points(&ctx, None, false, OutputFormat::Table)
                .await
                .unwrap(),
            3
        );
        assert_eq!(
            handle_points(&ctx, Some("Belgium"), false, OutputFormat::Csv)
                .await
                .unwrap(),
            2
        );
        assert_eq!(
            handle_points(&ctx, Some("Belgium"), true, OutputFormat::Json)
                .await
                .unwrap(),
            1
        );
        assert_eq!(
            handle_countries(&ctx, OutputFormat::Table).await.unwrap(),
            2
        );

        // The yard is neither listed nor accepted as a destination.
        assert_eq!(
            handle_points(&ctx, Some("Germany"), false, OutputFormat::Table)
                .await
                .unwrap(),
            0
        );
        assert_eq!(
            handle_shortest(&ctx, "BE1", "DE7", OutputFormat::Table)
                .await
                .unwrap(),
            PathQueryStatus::UnknownEndpoint
        );
    }

    #[tokio::test]
    async fn test_listings_use_configured_node_label() {
        let snapshot = GraphSnapshot::new()
            .with_point(PointRecord::new("S1").with_kind("Station").with_country("Austria"))
            .with_point(PointRecord::new("OP1").with_country("Italy"));
        let mut config = RailgraphConfig::default();
        config.projection.node_label = "Station".into();
        let ctx = QueryContext::new(MemoryGraphStore::new(snapshot), &config);

        assert_eq!(
            handle_points(&ctx, None, false, OutputFormat::Csv)
                .await
                .unwrap(),
            1
        );
        assert_eq!(ctx.catalog().countries().await.unwrap(), vec!["Austria"]);
    }
}
