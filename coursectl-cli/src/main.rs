//! coursectl CLI - course management service
//!
//! Entry point for the `coursectl` command-line tool, which provides:
//! - The JSON HTTP API over a SQLite database (`serve`)
//! - Roster import from the CSV exports (`import`)
//! - Database setup (`db init`)
//! - Configuration management (`config`)

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;

mod commands;
mod config;
mod tracing_setup;

use config::CoursectlConfig;

#[derive(Parser, Debug)]
#[command(
    name = "coursectl",
    author,
    version,
    about = "Course management: enrollment, grades and course forums over SQLite",
    long_about = "Serve the coursectl JSON API, import student and professor rosters, \
                  and manage the database and configuration."
)]
struct Cli {
    /// Enable debug logging (RUST_LOG still takes precedence)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Import roster CSV exports into the database
    Import(commands::import::ImportArgs),
    /// Database maintenance (init)
    Db(commands::db::DbArgs),
    /// Manage coursectl configuration (init, show, path)
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Before parsing, so `.env` values reach clap's env fallbacks.
    let env_files = config::load_dotenv();
    let cli = Cli::parse();

    tracing_setup::init(&tracing_setup::TracingConfig { debug: cli.debug }).ok();
    for path in &env_files {
        debug!("Loaded environment from {}", path.display());
    }

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args, &CoursectlConfig::load()?).await?,
        Commands::Import(args) => commands::run_import(args, &CoursectlConfig::load()?).await?,
        Commands::Db(args) => commands::run_db(args, &CoursectlConfig::load()?).await?,
        Commands::Config(args) => config::run_config(args)?,
    }
    Ok(())
}
