// SPDX-License-Identifier: GPL-3.0-only

use camera_settings::Config;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "camera-settings")]
#[command(about = "Inspect and change camera settings with their dependencies")]
#[command(version, long_version = env!("GIT_VERSION"))]
#[command(subcommand_required = false)]
struct Cli {
    /// Configuration file (default: ~/.config/camera-settings/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Setting declarations file
    #[arg(long, global = true)]
    declarations: Option<PathBuf>,

    /// Dependency rules file
    #[arg(long, global = true)]
    rules: Option<PathBuf>,

    /// Camera capabilities file
    #[arg(long, global = true)]
    capabilities: Option<PathBuf>,

    /// Stored preferences file
    #[arg(long, global = true)]
    preferences: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show every setting with its value and overrides
    Show {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Apply KEY=VALUE assignments in order
    Set {
        #[arg(required = true, value_name = "KEY=VALUE")]
        assignments: Vec<String>,
    },

    /// Show the dependency rules
    Rules,

    /// List settings the camera does not support
    Unavailable,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=camera_settings=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(path) = cli.declarations {
        config.declarations = path;
    }
    if let Some(path) = cli.rules {
        config.rules = path;
    }
    if let Some(path) = cli.capabilities {
        config.capabilities = path;
    }
    if let Some(path) = cli.preferences {
        config.preferences = path;
    }

    match cli.command {
        Some(Commands::Show { json }) => cli::show(&config, json),
        Some(Commands::Set { assignments }) => cli::set(&config, &assignments),
        Some(Commands::Rules) => cli::rules(&config),
        Some(Commands::Unavailable) => cli::unavailable(&config),
        None => cli::show(&config, false),
    }
}
