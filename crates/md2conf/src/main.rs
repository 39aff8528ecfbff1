//! md2conf CLI - publish a tree of Markdown documents to Confluence.
//!
//! Provides commands for:
//! - `publish`: Create or update one Confluence page per Markdown document
//! - `list`: Show the documents and titles a publish would use

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ListArgs, PublishArgs};
use output::Output;

/// md2conf - Markdown to Confluence publisher.
#[derive(Parser)]
#[command(name = "md2conf", version, about)]
struct Cli {
    /// Enable info-level logging (overrides `RUST_LOG`).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish every Markdown document under the root.
    Publish(PublishArgs),
    /// List discovered documents and their page titles.
    List(ListArgs),
}

fn main() {
    // Variables already present in the environment take precedence
    dotenvy::dotenv().ok();

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
        Commands::Publish(args) => args.execute(),
        Commands::List(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
