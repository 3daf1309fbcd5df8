//! Status command implementation
//!
//! Lists the export states of a repository attached to a collection.

use super::{build_orchestrator, CollectionArgs};
use crate::config::load_config;
use crate::core::state::ExporterState;
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub target: CollectionArgs,
}

impl StatusArgs {
    /// Execute the status command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking export status");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(e.exit_code());
            }
        };

        let (path, repository) = match self.target.resolve(&config) {
            Ok(target) => target,
            Err(e) => {
                println!("❌ Invalid collection: {e}");
                return Ok(2);
            }
        };

        let mut orchestrator = build_orchestrator(&config);
        if let Err(e) = orchestrator.open(&path) {
            println!("❌ Failed to open collection {path}");
            println!("   Error: {e}");
            return Ok(e.exit_code());
        }

        let states = match orchestrator.status(&repository) {
            Ok(states) => states,
            Err(e) => {
                println!("❌ Failed to read export state");
                println!("   Error: {e}");
                return Ok(e.exit_code());
            }
        };

        println!("📊 Export status of {path} for {repository}");
        println!();

        if states.is_empty() {
            println!("No export state found.");
            println!("Run 'irods-exporter prepare --path {path}' to start an export.");
            return Ok(0);
        }

        for state in &states {
            println!("  {} {state}", marker(*state));
        }

        if states.len() > 1 {
            println!();
            println!("⚠️  Several states are attached; run 'cleanup' before the next export.");
        }

        Ok(0)
    }
}

fn marker(state: ExporterState) -> &'static str {
    if state.is_failure() {
        "❌"
    } else if state.is_terminal() {
        "✅"
    } else {
        "⏳"
    }
}
