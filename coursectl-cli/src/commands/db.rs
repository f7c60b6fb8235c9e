//! Database maintenance commands

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use coursectl_server::db::{create_pool, schema};
use sqlx::SqlitePool;

use crate::config::CoursectlConfig;

#[derive(Parser, Debug)]
pub struct DbArgs {
    #[command(subcommand)]
    pub command: DbCommands,
}

#[derive(Subcommand, Debug)]
pub enum DbCommands {
    /// Create the database file and any missing tables
    Init(InitArgs),
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Database URL (overrides config)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

/// Open (creating if needed) the database and bring the schema up to date.
pub async fn open_database(database_url: &str) -> Result<SqlitePool> {
    let pool = create_pool(database_url)
        .await
        .with_context(|| format!("Failed to open database {}", database_url))?;
    schema::apply(&pool)
        .await
        .context("Failed to apply database schema")?;
    Ok(pool)
}

pub async fn run_db(args: DbArgs, config: &CoursectlConfig) -> Result<()> {
    match args.command {
        DbCommands::Init(args) => {
            let database_url = config.database_url(args.database_url)?;
            let pool = open_database(&database_url).await?;
            pool.close().await;
            println!("Database ready: {}", database_url);
            Ok(())
        }
    }
}
