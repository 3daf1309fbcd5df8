//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the exporter configuration file.

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // Loading validates every section
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Backend: {:?}", config.repository.backend);
        println!(
            "  Repository: {}@{}:{} (zone {})",
            config.repository.user,
            config.repository.host,
            config.repository.port,
            config.repository.zone
        );
        println!("  Local Root: {}", config.repository.root);
        println!("  Export Target: {}", config.export.repository_name);
        println!("  Metadata Document: {}", config.export.metadata_document);
        println!("  Attribute Prefix: {}", config.export.attribute_prefix);
        if config.logging.local_enabled {
            println!(
                "  Log Files: {} ({})",
                config.logging.local_path, config.logging.local_rotation
            );
        }
        println!();
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_validate_missing_file() {
        let args = ValidateArgs {};
        assert_eq!(args.execute("/nonexistent/exporter.toml").unwrap(), 2);
    }

    #[test]
    fn test_validate_generated_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("exporter.toml");
        let contents = crate::cli::commands::init::InitArgs::generate_config()
            .replace("${EXPORTER_IRODS_PASSWORD}", "rods");
        fs::write(&path, contents).unwrap();

        let args = ValidateArgs {};
        assert_eq!(args.execute(path.to_str().unwrap()).unwrap(), 0);
    }
}
