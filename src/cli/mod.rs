//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for the exporter using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// irods-exporter - prepares repository collections for export
#[derive(Parser, Debug)]
#[command(name = "irods-exporter")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "exporter.toml", env = "EXPORTER_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "EXPORTER_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Prepare a collection for export and print its metadata record
    Prepare(commands::prepare::PrepareArgs),

    /// Remove all export state from a collection and close it
    Cleanup(commands::cleanup::CleanupArgs),

    /// Show the export state of a collection
    Status(commands::status::StatusArgs),

    /// Parse a local metadata.xml and print the extracted fields
    Inspect(commands::inspect::InspectArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

impl Commands {
    /// Whether the command reads the configuration file
    pub fn needs_config(&self) -> bool {
        !matches!(self, Commands::Inspect(_) | Commands::Init(_))
    }
}
