//! Command-line front end for Railgraph.
//!
//! Loads the network snapshot named by the configuration into an in-memory
//! store and answers route queries against it.
//!
//! # Key Abstractions
//!
//! - [`RailgraphCli`]: owns the configuration and dispatches commands
//! - [`RailgraphConfig`]: layered file/env configuration
//! - [`QueryContext`]: store, facade and catalogue for one invocation

pub mod app;
pub mod cli;
pub mod config;
pub mod config_handlers;
pub mod graph_handlers;
pub mod output;
pub mod path_handlers;

pub use app::RailgraphCli;
pub use cli::{BaseCommand, CliArgs, ConfigAction, GraphSubcommand, OutputFormat};
pub use config::RailgraphConfig;
pub use path_handlers::QueryContext;
