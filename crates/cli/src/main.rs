//! Pricebook CLI
//!
//! Billing catalog management for Stripe.
//!
//! # Usage
//!
//! ```bash
//! pricebook validate billing.yaml
//! pricebook diff billing.yaml --env sandbox
//! pricebook apply billing.yaml --env sandbox
//! pricebook apply billing.yaml --env production --dry-run --json
//! pricebook import --env sandbox --output billing.yaml
//! pricebook truncate --confirm
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use pricebook_engine::Environment;

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "pricebook")]
#[command(version)]
#[command(about = "Billing catalog management for Stripe", long_about = None)]
struct Cli {
    /// Suppress non-essential output (errors still shown)
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a billing catalog file
    Validate {
        /// Catalog file (.yaml, .yml, or .json)
        file: PathBuf,
    },
    /// Compare the catalog against live Stripe state
    Diff {
        file: PathBuf,
        /// Environment: sandbox or production
        #[arg(long, short)]
        env: EnvArg,
        /// Output as JSON instead of a table
        #[arg(long, short)]
        json: bool,
    },
    /// Sync the catalog to Stripe (creates/archives products and prices)
    Apply {
        file: PathBuf,
        /// Environment: sandbox or production
        #[arg(long, short)]
        env: EnvArg,
        /// Preview changes without applying
        #[arg(long)]
        dry_run: bool,
        /// Output as JSON (only with --dry-run)
        #[arg(long, short)]
        json: bool,
    },
    /// Import products and prices from Stripe into a catalog file
    Import {
        /// Environment: sandbox or production
        #[arg(long, short)]
        env: EnvArg,
        /// Output file path
        #[arg(long, short)]
        output: PathBuf,
    },
    /// Archive all products and prices in Stripe (sandbox only)
    Truncate {
        /// Skip interactive confirmation (for CI/CD)
        #[arg(long)]
        confirm: bool,
    },
    /// Manage CLI configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Set a configuration value
    Set { key: String, value: String },
    /// Get a configuration value
    Get { key: String },
    /// List all configuration values
    List,
    /// Show configuration file path
    Path,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EnvArg {
    Sandbox,
    Production,
}

impl From<EnvArg> for Environment {
    fn from(arg: EnvArg) -> Self {
        match arg {
            EnvArg::Sandbox => Environment::Sandbox,
            EnvArg::Production => Environment::Production,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let quiet = cli.quiet
        || pricebook_catalog::settings::load_settings()
            .map(|s| s.quiet)
            .unwrap_or(false);
    let out = output::Output::new(quiet);

    // The compare exit contract reserves 1 for "differences exist", so its
    // operational errors use a distinct code.
    let error_code = match &cli.command {
        Commands::Diff { .. } => ExitCode::from(2),
        Commands::Apply { dry_run: true, .. } => ExitCode::from(2),
        _ => ExitCode::from(1),
    };

    let result = match cli.command {
        Commands::Validate { file } => commands::validate::run(&file, &out),
        Commands::Diff { file, env, json } => {
            commands::diff::run(&file, env.into(), json, &out).await
        }
        Commands::Apply {
            file,
            env,
            dry_run,
            json,
        } => commands::apply::run(&file, env.into(), dry_run, json, &out).await,
        Commands::Import { env, output } => {
            commands::import::run(env.into(), &output, &out).await
        }
        Commands::Truncate { confirm } => commands::truncate::run(confirm, &out).await,
        Commands::Config { action } => commands::config::run(action),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            error_code
        }
    }
}
