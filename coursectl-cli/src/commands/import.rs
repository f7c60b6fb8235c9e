//! Roster import command
//!
//! Loads the student, professor and forum CSV exports into the database in
//! one transaction.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use coursectl_server::import::{
    import_all, ImportSources, FORUM_FILE, PROFESSORS_FILE, STUDENTS_FILE,
};

use super::db::open_database;
use crate::config::CoursectlConfig;

#[derive(Parser, Debug)]
pub struct ImportArgs {
    /// Directory holding Students_TA.csv, Professors.csv and Posts_Comments.csv
    #[arg(long, value_name = "DIR", conflicts_with_all = ["students", "professors", "forum"])]
    pub dir: Option<PathBuf>,

    /// Student roster CSV
    #[arg(long, value_name = "PATH")]
    pub students: Option<PathBuf>,

    /// Professor roster CSV
    #[arg(long, value_name = "PATH")]
    pub professors: Option<PathBuf>,

    /// Forum seed CSV (drop deadlines, first post and comment)
    #[arg(long, value_name = "PATH")]
    pub forum: Option<PathBuf>,

    /// Database URL (overrides config)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Print the import report as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run_import(args: ImportArgs, config: &CoursectlConfig) -> Result<()> {
    let sources = match &args.dir {
        Some(dir) => ImportSources::from_dir(dir)?,
        None => ImportSources::from_files(
            args.students.as_deref(),
            args.professors.as_deref(),
            args.forum.as_deref(),
        )?,
    };

    if sources.is_empty() {
        anyhow::bail!(
            "no roster files to import (expected {}, {} or {})",
            STUDENTS_FILE,
            PROFESSORS_FILE,
            FORUM_FILE
        );
    }

    let database_url = config.database_url(args.database_url)?;
    let pool = open_database(&database_url).await?;

    let report = import_all(&pool, &sources)
        .await
        .context("Import failed; no changes were written")?;
    pool.close().await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report);
    }
    Ok(())
}
