#![deny(missing_docs)]

//! # GQLScan CLI
//!
//! Command line front-end for the gqlscan generator.
//!
//! Supported Commands:
//! - `generate`: Scans Go packages for `@gql` directives and writes GraphQL SDL.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::error::CliResult;

mod error;
mod generate;
mod loader;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Go structs -> GraphQL schema")]
struct Cli {
    /// Log debug output. `RUST_LOG` takes precedence when set.
    #[clap(long, short, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate GraphQL schema files from annotated Go structs.
    Generate(generate::GenerateArgs),
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Generate(args) => generate::execute(args)?,
    }

    Ok(())
}
