//! HTTP server command
//!
//! Runs the coursectl JSON API until Ctrl+C or SIGTERM.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use coursectl_server::http::{run_server, ServerConfig};
use coursectl_server::CapacityPolicy;

use super::db::open_database;
use crate::config::CoursectlConfig;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default from config: 127.0.0.1:3030)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Database URL (overrides config)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Section capacity policy: lenient or strict (overrides config)
    #[arg(long)]
    pub capacity_policy: Option<CapacityPolicy>,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, config: &CoursectlConfig) -> Result<()> {
    let database_url = config.database_url(args.database_url)?;
    let pool = open_database(&database_url).await?;

    let server_config = ServerConfig {
        bind_addr: args.bind.unwrap_or(config.server.bind),
        cors_permissive: args.cors_permissive || config.server.cors_permissive,
        capacity_policy: args
            .capacity_policy
            .unwrap_or(config.enrollment.capacity_policy),
    };

    tracing::info!("Starting coursectl server on {}", server_config.bind_addr);

    // Run server (blocks until shutdown)
    run_server(pool, server_config)
        .await
        .context("Server error")?;

    Ok(())
}
