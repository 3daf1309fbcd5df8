//! Prepare command implementation
//!
//! Runs collection preparation and prints the metadata record as JSON. On
//! failure the export state is cleaned up before exiting.

use super::{build_orchestrator, CollectionArgs};
use crate::config::load_config;
use clap::Args;

/// Arguments for the prepare command
#[derive(Args, Debug)]
pub struct PrepareArgs {
    #[command(flatten)]
    pub target: CollectionArgs,

    /// Print compact JSON instead of pretty JSON
    #[arg(long)]
    pub compact: bool,
}

impl PrepareArgs {
    /// Execute the prepare command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ Failed to load configuration file");
                eprintln!("   Error: {e}");
                return Ok(e.exit_code());
            }
        };

        let (path, repository) = match self.target.resolve(&config) {
            Ok(target) => target,
            Err(e) => {
                eprintln!("❌ Invalid collection: {e}");
                return Ok(2);
            }
        };

        tracing::info!(collection = %path, repository = %repository, "Preparing collection");

        let mut orchestrator = build_orchestrator(&config);
        let error = match orchestrator.prepare(&path, &repository) {
            Ok(record) => {
                let json = if self.compact {
                    serde_json::to_string(record)?
                } else {
                    serde_json::to_string_pretty(record)?
                };
                println!("{json}");
                return Ok(0);
            }
            Err(e) => e,
        };

        crate::log_error_with_context!(&error, "Collection preparation failed");
        eprintln!("❌ Failed to prepare collection {path}");
        eprintln!("   Error: {error}");

        match orchestrator.status_cleanup(&repository) {
            Ok(()) => eprintln!("   Export state for {repository} removed"),
            Err(cleanup) => {
                tracing::warn!(error = %cleanup, "Status cleanup failed");
                eprintln!("   Cleanup skipped: {cleanup}");
            }
        }

        Ok(error.exit_code())
    }
}
