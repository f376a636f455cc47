//! `railgraph` binary.

use clap::Parser;
use railgraph_cli::{CliArgs, RailgraphCli};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    let result = match RailgraphCli::from_args("railgraph", &args) {
        Ok(cli) => cli.run(args).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
