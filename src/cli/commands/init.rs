//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "exporter.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing exporter configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        match fs::write(&self.output, Self::generate_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Set EXPORTER_IRODS_PASSWORD in the environment or a .env file");
                println!("  3. Validate configuration: irods-exporter validate-config");
                println!("  4. Prepare a collection: irods-exporter prepare --path <collection>");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    /// Sample configuration with comments
    pub fn generate_config() -> String {
        r#"# irods-exporter configuration

[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

[repository]
# Backend: "local" maps collections onto directories below `root`
backend = "local"
host = "irods.example.org"
port = 1247
user = "rods"
password = "${EXPORTER_IRODS_PASSWORD}"
zone = "nlmumc"
root = "./repository"

[export]
# Publishing platform; used as prefix of the exporterState tags
repository_name = "Dataverse"

# Data object inside the collection holding the descriptive metadata
metadata_document = "metadata.xml"

# Namespace prefix stripped from collection attribute names
attribute_prefix = "dcat:"

[logging]
# JSON log files in addition to console output
local_enabled = false
local_path = "./logs"

# Rotation: daily, hourly or never
local_rotation = "daily"
"#
        .to_string()
    }
}
