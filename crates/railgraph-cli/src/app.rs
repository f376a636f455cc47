//! RailgraphCli application.
//!
//! Owns the loaded configuration and dispatches parsed commands to the
//! handler modules.

use crate::cli::{BaseCommand, CliArgs, GraphSubcommand};
use crate::config::RailgraphConfig;
use crate::path_handlers::{self, QueryContext};
use crate::{config_handlers, graph_handlers};
use railgraph_core::Result;
use railgraph_core::traits::ConfigProvider;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// ============================================================================
// RailgraphCli
// ============================================================================

/// The command-line application.
pub struct RailgraphCli {
    name: String,
    config: RailgraphConfig,
    version: String,
}

impl RailgraphCli {
    /// Create a new CLI application.
    pub fn new(name: impl Into<String>, config: RailgraphConfig) -> Self {
        Self {
            name: name.into(),
            config,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Create from CLI args, loading config from file/env.
    pub fn from_args(name: impl Into<String>, args: &CliArgs) -> Result<Self> {
        let config = RailgraphConfig::load(args.config.as_deref())?;
        Ok(Self::new(name, config))
    }

    /// Override the version string.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// The loaded configuration.
    pub fn config(&self) -> &RailgraphConfig {
        &self.config
    }

    /// Initialise tracing-based logging.
    ///
    /// Uses `RUST_LOG` env var if set, otherwise defaults based on verbosity flags.
    pub fn init_logging(&self, verbose: bool, quiet: bool) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if quiet {
            EnvFilter::new("warn")
        } else if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        };

        // A subscriber may already be installed (e.g. in tests).
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }

    /// Run the CLI with the given arguments.
    pub async fn run(&self, args: CliArgs) -> Result<()> {
        self.init_logging(args.verbose, args.quiet);
        let format = args.format;
        tracing::debug!(config = ?args.config, ?format, "Dispatching command");

        match args.command {
            Some(BaseCommand::Version) => {
                println!("{} {}", self.name, self.version);
                Ok(())
            }
            Some(BaseCommand::Health) => self.handle_health().await,
            Some(BaseCommand::Route { from, to, k }) => {
                self.with_context(|ctx| async move {
                    path_handlers::handle_route(&ctx, &from, &to, k, format).await?;
                    Ok(())
                })
                .await
            }
            Some(BaseCommand::Shortest { from, to }) => {
                self.with_context(|ctx| async move {
                    path_handlers::handle_shortest(&ctx, &from, &to, format).await?;
                    Ok(())
                })
                .await
            }
            Some(BaseCommand::Points { country, mappable }) => {
                self.with_context(|ctx| async move {
                    path_handlers::handle_points(&ctx, country.as_deref(), mappable, format)
                        .await?;
                    Ok(())
                })
                .await
            }
            Some(BaseCommand::Countries) => {
                self.with_context(|ctx| async move {
                    path_handlers::handle_countries(&ctx, format).await?;
                    Ok(())
                })
                .await
            }
            Some(BaseCommand::Graph(graph_cmd)) => self.handle_graph(graph_cmd.command).await,
            Some(BaseCommand::Config(config_cmd)) => {
                config_handlers::handle_config_command(args.config.as_deref(), config_cmd.command)
            }
            None => {
                println!("{} {}: use --help for usage", self.name, self.version);
                Ok(())
            }
        }
    }

    /// Open a query context, run `f`, and close the store whether or not
    /// `f` succeeded.
    async fn with_context<F, Fut>(&self, f: F) -> Result<()>
    where
        F: FnOnce(Arc<QueryContext>) -> Fut,
        Fut: std::future::Future<Output = Result<()>>,
    {
        let ctx = Arc::new(QueryContext::open(&self.config)?);
        let result = f(Arc::clone(&ctx)).await;
        ctx.close().await;
        result
    }

    /// Dispatch graph subcommands to handlers.
    async fn handle_graph(&self, command: GraphSubcommand) -> Result<()> {
        let spec = self.config.projection_spec();
        match command {
            GraphSubcommand::Validate => {
                graph_handlers::handle_validate(&self.config, &spec.schema).await
            }
            GraphSubcommand::Stats => graph_handlers::handle_stats(&self.config, &spec.schema).await,
            GraphSubcommand::Projection { drop } => {
                let ctx = QueryContext::open(&self.config)?;
                let result = graph_handlers::handle_projection(ctx.dyn_store(), spec, drop).await;
                ctx.close().await;
                result
            }
        }
    }

    /// Check that the snapshot loads and the store answers.
    async fn handle_health(&self) -> Result<()> {
        let ctx = QueryContext::open(&self.config)?;
        let points = ctx.store().snapshot().points.len();
        let sections = ctx.store().snapshot().sections.len();
        let countries = ctx.catalog().countries().await;
        ctx.close().await;
        let countries = countries?.len();

        println!(
            "{}: healthy ({} points, {} sections, {} countries from {})",
            self.name,
            points,
            sections,
            countries,
            self.config.snapshot_path()?.display()
        );
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::graph_handlers::tests::setup_snapshot;
    use clap::Parser;
    use railgraph::store::GraphStore;
    use railgraph::testing::diamond_snapshot;
    use railgraph_core::Error;
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> RailgraphConfig {
        RailgraphConfig {
            base_path: Some(dir.path().to_string_lossy().into_owned()),
            ..Default::default()
        }
    }

    fn cli_with_snapshot() -> (TempDir, RailgraphCli) {
        let dir = TempDir::new().unwrap();
        setup_snapshot(dir.path(), &diamond_snapshot());
        let cli = RailgraphCli::new("railgraph", config_in(&dir));
        (dir, cli)
    }

    #[test]
    fn test_railgraph_cli_new() {
        let cli = RailgraphCli::new("my-app", RailgraphConfig::default()).with_version("1.2.3");
        assert_eq!(cli.name, "my-app");
        assert_eq!(cli.version, "1.2.3");
        assert_eq!(cli.config().project_name(), "railgraph");
    }

    #[tokio::test]
    async fn test_run_version_and_no_command() {
        let cli = RailgraphCli::new("railgraph", RailgraphConfig::default());
        assert!(cli.run(CliArgs::parse_from(["test", "version"])).await.is_ok());
        assert!(cli.run(CliArgs::parse_from(["test"])).await.is_ok());
    }

    #[tokio::test]
    async fn test_run_route_commands() {
        let (_dir, cli) = cli_with_snapshot();
        for argv in [
            vec!["test", "route", "A", "D"],
            vec!["test", "route", "A", "D", "-k", "1", "--format", "json"],
            vec!["test", "shortest", "A", "D", "--format", "csv"],
            vec!["test", "route", "A", "Atlantis"],
        ] {
            assert!(cli.run(CliArgs::parse_from(argv)).await.is_ok());
        }
    }

    #[tokio::test]
    async fn test_run_listings() {
        let (_dir, cli) = cli_with_snapshot();
        assert!(cli.run(CliArgs::parse_from(["test", "points"])).await.is_ok());
        assert!(cli
            .run(CliArgs::parse_from(["test", "points", "--country", "Unknown"]))
            .await
            .is_ok());
        assert!(cli.run(CliArgs::parse_from(["test", "countries"])).await.is_ok());
    }

    #[tokio::test]
    async fn test_run_graph_commands() {
        let (_dir, cli) = cli_with_snapshot();
        assert!(cli.run(CliArgs::parse_from(["test", "graph", "validate"])).await.is_ok());
        assert!(cli.run(CliArgs::parse_from(["test", "graph", "stats"])).await.is_ok());
        assert!(cli
            .run(CliArgs::parse_from(["test", "graph", "projection", "--drop"]))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_run_health() {
        let (_dir, cli) = cli_with_snapshot();
        assert!(cli.run(CliArgs::parse_from(["test", "health"])).await.is_ok());

        let empty = TempDir::new().unwrap();
        let unhealthy = RailgraphCli::new("railgraph", config_in(&empty));
        let err = unhealthy
            .run(CliArgs::parse_from(["test", "health"]))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_run_route_without_snapshot() {
        let dir = TempDir::new().unwrap();
        let cli = RailgraphCli::new("railgraph", config_in(&dir));
        let err = cli
            .run(CliArgs::parse_from(["test", "route", "A", "D"]))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_init_logging_levels() {
        let cli = RailgraphCli::new("test", RailgraphConfig::default());
        cli.init_logging(false, false);
        cli.init_logging(true, false);
        cli.init_logging(false, true);
    }

    #[test]
    fn test_from_args_with_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "project_name = \"from-file\"\n").unwrap();

        let args = CliArgs::parse_from(["test", "--config", path.to_str().unwrap()]);
        let cli = RailgraphCli::from_args("railgraph", &args).unwrap();
        assert_eq!(cli.config().project_name(), "from-file");
    }

    #[tokio::test]
    async fn test_with_context_closes_store_on_error() {
        let (_dir, cli) = cli_with_snapshot();
        let opened: Mutex<Option<Arc<QueryContext>>> = Mutex::new(None);

        let err = cli
            .with_context(|ctx| {
                *opened.lock().unwrap() = Some(Arc::clone(&ctx));
                async move {
                    assert!(!ctx.store().is_closed());
                    Err(Error::operation("handler failed"))
                }
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("handler failed"));

        let ctx = opened.lock().unwrap().take().unwrap();
        assert!(ctx.store().is_closed());
    }

    #[tokio::test]
    async fn test_with_context_closes_store_on_success() {
        let (_dir, cli) = cli_with_snapshot();
        let opened: Mutex<Option<Arc<QueryContext>>> = Mutex::new(None);
        cli.with_context(|ctx| {
            *opened.lock().unwrap() = Some(Arc::clone(&ctx));
            async move { Ok(()) }
        })
        .await
        .unwrap();
        assert!(opened.lock().unwrap().as_ref().unwrap().store().is_closed());
    }

    #[tokio::test]
    async fn test_config_command_dispatch() {
        let cli = RailgraphCli::new("railgraph", RailgraphConfig::default());
        let args = CliArgs::parse_from(["test", "config", "path"]);
        assert!(cli.run(args).await.is_ok());
    }
}
