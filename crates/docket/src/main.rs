//! Docket CLI - documentation page compiler.
//!
//! Provides commands for:
//! - `compile`: Compile one source file and print the page as JSON
//! - `build`: Compile every page of a documentation version

mod commands;
mod error;
mod output;
mod sidecar;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BuildArgs, CompileArgs};
use output::Output;

/// Docket - documentation page compiler.
#[derive(Parser)]
#[command(name = "docket", version, about)]
struct Cli {
    /// Enable verbose output (progress and timing logs).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile one source file and print the page as JSON.
    Compile(CompileArgs),
    /// Compile every page of a documentation version.
    Build(BuildArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Compile(args) => args.execute(),
        Commands::Build(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        for cause in error::causes(&err) {
            output.error(&format!("  caused by: {cause}"));
        }
        std::process::exit(1);
    }
}
