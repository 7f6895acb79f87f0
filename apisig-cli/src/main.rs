//! apisig CLI - signature files and API compatibility checks
//!
//! Reads the signature files describing a library's public API, rewrites
//! them in normal form, and fails a build when the current API breaks
//! compatibility with the previously released one.

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::*;
use config::ApisigConfig;
use output::{OutputConfig, OutputFormat};

/// Signature files and API compatibility checks.
#[derive(Parser)]
#[command(name = "apisig")]
#[command(author, version)]
#[command(about = "Signature files and API compatibility checks")]
#[command(propagate_version = true)]
#[command(after_help = "Examples:
  apisig check --previous api/released.txt --current api/current.txt
  apisig format api/current.txt --format-version 3.0
  apisig diff api/released.txt api/current.txt --summary
  apisig issues --preset released")]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format (overrides config default)
    #[arg(long, global = true, value_enum)]
    format: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the current API for incompatible changes against the previous one
    Check(check::CheckArgs),

    /// Rewrite a signature file in normal form
    #[command(visible_alias = "fmt")]
    Format(format::FormatArgs),

    /// Diff two signature files
    Diff(diff::DiffArgs),

    /// List known issues and their severities
    Issues(issues::IssuesArgs),
}

fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    // Load configuration from .apisigrc.toml
    let config = ApisigConfig::load(std::path::Path::new("."));

    // Resolve output format: CLI flag > config default > Text
    let output_format = cli.format.unwrap_or_else(|| {
        config
            .default_format()
            .and_then(|f| f.parse().ok())
            .unwrap_or(OutputFormat::Text)
    });
    let color = if cli.no_color { Some(false) } else { config.use_color() };
    let output = OutputConfig::auto_detect_with_color_override(output_format, color);
    colored::control::set_override(output.use_colors());

    let command = match cli.command {
        Some(cmd) => cmd,
        None => {
            let _ = Cli::command().print_help();
            println!();
            return Ok(());
        }
    };

    match command {
        Commands::Check(args) => check::run(&args, &config, &output),
        Commands::Format(args) => format::run(&args, &config, &output),
        Commands::Diff(args) => diff::run(&args, &output),
        Commands::Issues(args) => issues::run(&args, &config, &output),
    }
}
