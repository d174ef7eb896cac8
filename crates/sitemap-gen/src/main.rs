//! Portal sitemap generator CLI.
//!
//! Provides commands for:
//! - `generate`: Build the sitemap from the portal database and write it
//! - `check-config`: Validate `sitemap.toml` and show the resolved settings

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CheckConfigArgs, GenerateArgs};
use output::Output;

/// Sitemap generator for portal page trees.
#[derive(Parser)]
#[command(name = "sitemap-gen", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the sitemap once and write it to the output file.
    Generate(GenerateArgs),
    /// Load and validate the configuration.
    CheckConfig(CheckConfigArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let verbose = matches!(&cli.command, Commands::Generate(args) if args.verbose);
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Generate(args) => args.execute(),
        Commands::CheckConfig(args) => args.execute(),
    };

    if let Err(err) = result {
        output.failure(&err.report());
        std::process::exit(1);
    }
}
