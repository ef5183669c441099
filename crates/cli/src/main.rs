//! specbridge CLI - Main Entry Point
//!
//! Smoke-checks the application under test and runs its in-browser suite.
//! Exits 0 when everything passed, 1 when a check or spec failed and 2 when
//! the run could not complete.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use specbridge_harness::config::DEFAULT_CONFIG_FILE;
use specbridge_harness::HarnessConfig;
use tracing::debug;

mod commands;
mod output;

use commands::suite::SuiteArgs;

#[derive(Parser)]
#[command(name = "specbridge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Base URL of the application under test
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the application's routes answer 200
    Smoke,

    /// Run the in-browser suite and report its results
    Suite(SuiteArgs),

    /// Smoke checks, then the browser suite
    All(SuiteArgs),

    /// Print the effective configuration
    Config,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let code = match run(cli) {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            2
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> anyhow::Result<bool> {
    let mut config = HarnessConfig::load(&cli.config)?;
    if let Some(base_url) = cli.base_url {
        config.app.base_url = base_url;
    }
    debug!("Effective configuration: {:?}", config);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        match cli.command {
            Commands::Smoke => commands::smoke::execute(&config).await,
            Commands::Suite(args) => {
                args.apply(&mut config);
                commands::suite::execute(&config).await
            }
            Commands::All(args) => {
                args.apply(&mut config);
                if !commands::smoke::execute(&config).await? {
                    return Ok(false);
                }
                commands::suite::execute(&config).await
            }
            Commands::Config => {
                print!("{}", toml::to_string_pretty(&config)?);
                Ok(true)
            }
        }
    })
}
