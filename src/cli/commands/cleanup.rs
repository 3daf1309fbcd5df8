//! Cleanup command implementation
//!
//! Crash recovery for a collection: removes every export-state tag of the
//! repository and runs the close-collection rule.

use super::{build_orchestrator, CollectionArgs};
use crate::config::load_config;
use clap::Args;

/// Arguments for the cleanup command
#[derive(Args, Debug)]
pub struct CleanupArgs {
    #[command(flatten)]
    pub target: CollectionArgs,
}

impl CleanupArgs {
    /// Execute the cleanup command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
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

        match orchestrator.status_cleanup(&repository) {
            Ok(()) => {
                println!("✅ Removed export state for {repository} from {path}");
                Ok(0)
            }
            Err(e) => {
                println!("❌ Cleanup failed");
                println!("   Error: {e}");
                Ok(e.exit_code())
            }
        }
    }
}
