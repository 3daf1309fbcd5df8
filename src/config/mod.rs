//! Configuration management for the exporter.
//!
//! TOML configuration with:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `EXPORTER_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation per section
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Application settings (log level)
//! - [`RepositoryConfig`] - Repository backend and connection
//! - [`ExportConfig`] - Target repository name, document name, attribute prefix
//! - [`LoggingConfig`] - Local file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [repository]
//! backend = "local"
//! host = "irods.example.org"
//! port = 1247
//! user = "rods"
//! password = "${EXPORTER_IRODS_PASSWORD}"
//! zone = "nlmumc"
//! root = "./repository"
//!
//! [export]
//! repository_name = "Dataverse"
//! metadata_document = "metadata.xml"
//! attribute_prefix = "dcat:"
//!
//! [logging]
//! local_enabled = false
//! local_path = "./logs"
//! local_rotation = "daily"
//! ```
//!
//! # Loading
//!
//! ```rust
//! use irods_exporter::config::load_config_from_str;
//!
//! let config = load_config_from_str(r#"
//! [repository]
//! host = "localhost"
//! user = "rods"
//! password = "rods"
//! zone = "tempZone"
//!
//! [export]
//! repository_name = "Dataverse"
//! "#).unwrap();
//! assert_eq!(config.export.metadata_document, "metadata.xml");
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, load_config_from_str, ENV_PREFIX};
pub use schema::{
    ApplicationConfig, ExportConfig, ExporterConfig, LoggingConfig, RepositoryBackend,
    RepositoryConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
