//! CLI argument parsing and command definitions.
//!
//! Route queries, point listings, snapshot maintenance and configuration
//! management all hang off [`CliArgs`].

use clap::{Parser, Subcommand, ValueEnum};

// ============================================================================
// CLI argument types
// ============================================================================

/// Top-level CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "railgraph", author, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file.
    #[arg(short, long, env = "RAILGRAPH_CONFIG")]
    pub config: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-essential output.
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format for listings and routes.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<BaseCommand>,
}

/// How results are printed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned plain-text table.
    #[default]
    Table,
    /// Pretty-printed JSON.
    Json,
    /// Comma-separated values with a header row.
    Csv,
}

/// Built-in commands.
#[derive(Subcommand, Debug)]
pub enum BaseCommand {
    /// Find the cheapest routes between two operation points.
    Route {
        /// Source operation point id.
        from: String,

        /// Destination operation point id.
        to: String,

        /// Number of routes (defaults to `query.default_k`).
        #[arg(short, long)]
        k: Option<usize>,
    },

    /// Find the single shortest route between two operation points.
    Shortest {
        /// Source operation point id.
        from: String,

        /// Destination operation point id.
        to: String,
    },

    /// List operation points.
    Points {
        /// Only points in this country.
        #[arg(long)]
        country: Option<String>,

        /// Only points with coordinates.
        #[arg(long)]
        mappable: bool,
    },

    /// List countries.
    Countries,

    /// Print version information.
    Version,

    /// Check system health.
    Health,

    /// Snapshot and projection operations.
    Graph(GraphCommand),

    /// Configuration operations.
    Config(ConfigCommand),
}

/// Config-specific subcommands.
#[derive(Parser, Debug)]
pub struct ConfigCommand {
    /// Config subcommand to execute.
    #[command(subcommand)]
    pub command: ConfigAction,
}

/// Available config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path.
    Path,

    /// Get a configuration value by dotted key.
    Get {
        /// Dotted key (e.g., "query.max_k").
        key: String,
    },

    /// Set a configuration value by dotted key.
    Set {
        /// Dotted key (e.g., "query.max_k").
        key: String,

        /// Value to set.
        value: String,
    },

    /// Create a default configuration file.
    Init {
        /// Output file path (defaults to XDG config path).
        #[arg(short, long)]
        file: Option<String>,

        /// Overwrite existing file.
        #[arg(long)]
        force: bool,
    },

    /// Export configuration as environment variables.
    Export {
        /// Format as Docker --env flags.
        #[arg(long)]
        docker_env: bool,
    },
}

/// Graph-specific subcommands.
#[derive(Parser, Debug)]
pub struct GraphCommand {
    /// Graph subcommand to execute.
    #[command(subcommand)]
    pub command: GraphSubcommand,
}

/// Available graph subcommands.
#[derive(Subcommand, Debug)]
pub enum GraphSubcommand {
    /// Validate snapshot integrity.
    Validate,

    /// Show network statistics.
    Stats,

    /// Ensure the projection exists and report its size.
    Projection {
        /// Drop the projection after reporting.
        #[arg(long)]
        drop: bool,
    },
}

// ============================================================================
// Tests
// ============================================================================
