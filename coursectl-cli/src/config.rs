//! coursectl configuration
//!
//! Settings come from, highest priority first:
//! 1. Command-line flags
//! 2. Environment (`DATABASE_URL`, including values from `.env` files)
//! 3. `~/.coursectl/config.toml`
//! 4. Built-in defaults

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use coursectl_server::CapacityPolicy;
use serde::{Deserialize, Serialize};

const CONFIG_TEMPLATE: &str = include_str!("../config.template.toml");

/// Load `.env` files from the current directory and `~/.coursectl/.env`.
///
/// Runs before logging is set up, so it returns the files it read for the
/// caller to report. Variables already set in the environment are kept.
pub fn load_dotenv() -> Vec<PathBuf> {
    let mut loaded = Vec::new();

    if let Ok(path) = dotenvy::dotenv() {
        loaded.push(path);
    }

    if let Some(env_file) = config_dir().map(|dir| dir.join(".env")) {
        if env_file.exists() && dotenvy::from_path(&env_file).is_ok() {
            loaded.push(env_file);
        }
    }

    loaded
}

/// The coursectl config directory (`~/.coursectl`)
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".coursectl"))
}

pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoursectlConfig {
    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub database: DatabaseSection,

    #[serde(default)]
    pub enrollment: EnrollmentSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,

    /// Allow requests from any origin
    #[serde(default)]
    pub cors_permissive: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            cors_permissive: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseSection {
    /// SQLite URL or path; defaults to `~/.coursectl/coursectl.db`
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnrollmentSection {
    #[serde(default)]
    pub capacity_policy: CapacityPolicy,
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3030))
}

impl CoursectlConfig {
    /// Load `~/.coursectl/config.toml`, or defaults when it does not exist.
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => {
                tracing::debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Database URL: explicit flag or `DATABASE_URL`, then the config file,
    /// then the default file in the config directory.
    pub fn database_url(&self, flag: Option<String>) -> Result<String> {
        if let Some(url) = flag.or_else(|| self.database.url.clone()) {
            return Ok(url);
        }
        let dir = config_dir().context("Could not determine home directory")?;
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        Ok(dir.join("coursectl.db").display().to_string())
    }
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Write a starter config file
    Init(InitArgs),
    /// Show the effective configuration as TOML
    Show,
    /// Show config file path
    Path,
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Force overwrite existing config
    #[arg(long, short)]
    pub force: bool,
}

pub fn run_config(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Init(args) => run_init(args),
        ConfigCommands::Show => run_show(),
        ConfigCommands::Path => run_path(),
    }
}

fn run_init(args: InitArgs) -> Result<()> {
    let path = config_path().context("Could not determine home directory")?;

    if path.exists() && !args.force {
        anyhow::bail!(
            "Config already exists at {}\n\nUse --force to overwrite",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(&path, CONFIG_TEMPLATE)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;

    println!("Created config at: {}", path.display());
    Ok(())
}

fn run_show() -> Result<()> {
    let config = CoursectlConfig::load()?;
    let rendered =
        toml::to_string_pretty(&config).context("Failed to serialize config to TOML")?;
    println!("{}", rendered);
    Ok(())
}

fn run_path() -> Result<()> {
    let path = config_path().context("Could not determine home directory")?;
    println!("{}", path.display());
    Ok(())
}
